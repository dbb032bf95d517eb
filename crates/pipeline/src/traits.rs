//! The `Filter` trait: one stage of a `FilterPipeline`.

use anyhow::Result;
use sources::Candidate;

/// A candidate filter.
///
/// Each filter carries its own parameters (a user's rated recipes, a diet
/// rule, a rating floor) and sees nothing but the candidate list. It takes
/// the list by value and returns the survivors in their original relative
/// order.
pub trait Filter: Send + Sync {
    /// Name used in pipeline logs
    fn name(&self) -> &str;

    /// Keep the candidates that pass; `Err` aborts the whole pipeline
    fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>>;
}
