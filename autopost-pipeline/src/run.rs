//! One linear pass: fetch, select, compose, publish.
use crate::candidate::Candidate;
use crate::generate::{Composition, ContentGenerator, Rejection, truncate_chars};
use crate::publish::{PublishResult, Publisher};
use crate::select::{pick_most_engaged, pick_random};
use crate::source::CandidateSource;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// How the candidate(s) handed to the composer are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Highest engagement, first seen on ties.
    MostEngaged,
    /// Uniform pick; a seed makes the choice reproducible.
    Random { seed: Option<u64> },
    /// Every candidate, in fetch order.
    All,
}

impl Selector {
    pub fn select(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        match self {
            Selector::MostEngaged => pick_most_engaged(&candidates).cloned().into_iter().collect(),
            Selector::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                pick_random(&candidates, &mut rng).cloned().into_iter().collect()
            }
            Selector::All => candidates,
        }
    }
}

/// Turns the selection into the text to publish.
pub enum Composer {
    Generate(ContentGenerator),
    /// Post the first selected candidate's text as is, cut to `char_limit`.
    Verbatim { char_limit: usize },
}

impl Composer {
    async fn compose(&self, selected: &[Candidate]) -> Composition {
        match self {
            Composer::Generate(generator) => generator.compose(selected).await,
            Composer::Verbatim { char_limit } => match selected.first().map(|c| c.text.trim()) {
                Some(text) if !text.is_empty() => {
                    Composition::Generated(truncate_chars(text, *char_limit))
                }
                _ => Composition::Skipped(Rejection::Empty),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published(PublishResult),
    /// Composed but not sent.
    DryRun { text: String },
    NoCandidates,
    Rejected(Rejection),
    PublishFailed(PublishResult),
}

impl RunOutcome {
    /// Only a failed publish call makes a run unsuccessful.
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::PublishFailed(_))
    }
}

pub struct Pipeline {
    name: &'static str,
    source: Box<dyn CandidateSource>,
    selector: Selector,
    composer: Composer,
    publisher: Box<dyn Publisher>,
    reply_to_target: bool,
}

impl Pipeline {
    pub fn new(
        name: &'static str,
        source: Box<dyn CandidateSource>,
        selector: Selector,
        composer: Composer,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            name,
            source,
            selector,
            composer,
            publisher,
            reply_to_target: false,
        }
    }

    /// Publish as a reply to the selected candidate.
    pub fn replying(mut self) -> Self {
        self.reply_to_target = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn run(&self) -> RunOutcome {
        let fetched = self.source.fetch().await;
        tracing::info!(
            job = self.name,
            source = self.source.name(),
            fetched = fetched.len(),
            "run.fetched"
        );

        let selected = self.selector.select(fetched);
        let Some(target) = selected.first() else {
            tracing::info!(job = self.name, "run.no_candidates");
            return RunOutcome::NoCandidates;
        };
        tracing::info!(
            job = self.name,
            selected = selected.len(),
            target = %target.id,
            engagement = ?target.engagement,
            "run.selected"
        );

        let text = match self.composer.compose(&selected).await {
            Composition::Generated(text) | Composition::Fallback(text) => text,
            Composition::Skipped(rejection) => {
                tracing::info!(job = self.name, reason = %rejection, "run.skipped");
                return RunOutcome::Rejected(rejection);
            }
        };

        let in_reply_to = self.reply_to_target.then_some(target.id.as_str());
        let result = self.publisher.publish(&text, in_reply_to).await;

        if self.publisher.is_dry_run() {
            RunOutcome::DryRun { text }
        } else if result.success {
            RunOutcome::Published(result)
        } else {
            RunOutcome::PublishFailed(result)
        }
    }
}
