//! Candidate selection rules.
use crate::candidate::Candidate;
use rand::Rng;
use rand::seq::SliceRandom;

/// The candidate with the highest engagement. A missing metric counts as 0
/// and the first candidate seen wins a tie.
pub fn pick_most_engaged(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, c| match best {
        Some(b) if score(b) >= score(c) => Some(b),
        _ => Some(c),
    })
}

fn score(c: &Candidate) -> u64 {
    c.engagement.unwrap_or(0)
}

/// Uniform pick driven by the caller's random source.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}
