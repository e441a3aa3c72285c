//! The fetch → select → generate → publish pipeline behind every job.
//!
//! Each stage sits behind a small seam so a run can be assembled from live
//! clients in the binary and from in-memory doubles in tests:
//!
//! - [`source::CandidateSource`]: timeline, news search or a literal list
//! - [`run::Selector`]: most engaged, random, or everything
//! - [`generate::ContentGenerator`]: prompt, acceptance check, rejection policy
//! - [`publish::Publisher`]: the create-post endpoint or a dry run
//!
//! Every stage reports failure as a value; [`run::Pipeline::run`] always
//! returns a [`run::RunOutcome`].
pub mod candidate;
pub mod generate;
pub mod publish;
pub mod run;
pub mod select;
pub mod source;

pub use candidate::{Candidate, MediaAsset};
pub use generate::{Composition, ContentGenerator, GeneratorSettings, PromptStyle, Rejection};
pub use publish::{DryRunPublisher, PublishResult, Publisher, TweetPublisher};
pub use run::{Composer, Pipeline, RunOutcome, Selector};
pub use source::{CandidateSource, LiteralSource, NewsSource, TimelineSource};
