//! Pairwise comparison between the query image and one candidate.

use serde::Serialize;

use super::{
    assets::UrlResolver,
    error::{Error, Result},
    score::SimilarityScore,
    types::{Candidate, QueryImage},
};

/// The candidate currently shown next to the query image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSelection {
    /// Identifier of the selected candidate.
    pub candidate_id: String,
    /// 1-based position of the candidate in the result set.
    pub rank: usize,
    /// Image URL of the candidate.
    pub display_url: String,
    /// Display representation of the query image.
    pub query_display_url: String,
    /// Similarity between query and candidate.
    pub score: SimilarityScore,
}

/// Read-only projection over one candidate of a result set.
///
/// The view never changes the result set it reads from; the owning session
/// clears it whenever that result set is replaced.
#[derive(Debug, Default)]
pub struct ComparisonView {
    selection: Option<ComparisonSelection>,
}

impl ComparisonView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects candidate `id` from `results`.
    ///
    /// The display URL is resolved from the candidate's `filename` metadata,
    /// falling back to its identifier. If `id` is not in `results`, the
    /// current selection is left as it was and `StaleSelection` is returned.
    pub fn select<R>(
        &mut self,
        results: &[Candidate],
        query: Option<&QueryImage>,
        id: &str,
        resolver: &R,
    ) -> Result<&ComparisonSelection>
    where
        R: UrlResolver + ?Sized,
    {
        let Some((index, candidate)) = results.iter().enumerate().find(|(_, c)| c.id == id) else {
            tracing::info!(id, "iplens: selected candidate is not in the current results");
            return Err(Error::StaleSelection { id: id.to_string() });
        };

        let selection = ComparisonSelection {
            candidate_id: candidate.id.clone(),
            rank: index + 1,
            display_url: resolver.resolve(candidate.asset_name()),
            query_display_url: query.map(|q| q.display_url.clone()).unwrap_or_default(),
            score: SimilarityScore::from_distance(candidate.distance),
        };

        Ok(self.selection.insert(selection))
    }

    /// Drops the current selection.
    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Returns the current selection.
    pub fn current(&self) -> Option<&ComparisonSelection> {
        self.selection.as_ref()
    }
}
