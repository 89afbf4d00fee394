use super::candidate::Candidate;
use super::context::RoutingContext;

/// A named, prioritized filter-and-score policy.
///
/// Strategies are stateless with respect to a request: the context is
/// borrowed immutably and the only thing a strategy changes is candidate
/// scores, through [`Candidate::add_score`].
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Fixed at construction. Higher runs earlier.
    fn priority(&self) -> i32;

    /// Narrow the working set. The default passes everything through.
    fn filter(&self, _ctx: &RoutingContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
    }

    /// Add to candidate scores. The default adds nothing.
    fn score(&self, _ctx: &RoutingContext, _candidates: &mut [Candidate]) {}
}
