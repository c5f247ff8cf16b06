//! Core traits for the scoring models.
//!
//! The hybrid ranker depends on these abstractions only, never on a
//! concrete model type, so either stage can be swapped or mocked.

/// A scored candidate row passed between scoring stages and the merge.
///
/// Display metadata travels with the score so the final ranking can be
/// rendered without another feed lookup. When a business is scored by both
/// stages, the metadata captured first wins.
///
/// # Examples
///
/// ```
/// use recomendar::traits::ScoredCandidate;
///
/// let candidate = ScoredCandidate::new("biz_1", 4.2).with_name("Blue Bottle Cafe");
/// assert_eq!(candidate.business_id, "biz_1");
/// assert_eq!(candidate.name.as_deref(), Some("Blue Bottle Cafe"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Join key into the business feed
    pub business_id: String,
    /// Stage score, unweighted and unrounded
    pub score: f64,
    /// Display name captured at candidate-collection time
    pub name: Option<String>,
    /// Displayed feed rating captured at candidate-collection time
    pub rating: Option<f64>,
}

impl ScoredCandidate {
    /// Create a candidate with no display metadata.
    #[must_use]
    pub fn new(business_id: impl Into<String>, score: f64) -> Self {
        Self {
            business_id: business_id.into(),
            score,
            name: None,
            rating: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a displayed feed rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Predicts a rating for arbitrary (user, business) pairs.
///
/// Implementations must never fail for structurally valid string ids: an
/// unseen user or business falls back to the model's intrinsic bias
/// estimate. Estimates are deliberately unclipped so callers can use them
/// as relative ranking strength.
pub trait RatingPredictor {
    /// Estimated rating for the pair, on the feed's 1-5 scale.
    fn predict(&self, user_id: &str, business_id: &str) -> f64;
}

/// Ranks indexed businesses by similarity to a query.
pub trait SimilarityIndex {
    /// The `top_n` businesses most similar to `business_id`, excluding the
    /// query business itself. Returns an empty vec for ids that were not
    /// present at fit time.
    fn similar_to(&self, business_id: &str, top_n: usize) -> Vec<ScoredCandidate>;

    /// The `top_n` businesses most similar to an arbitrary text profile
    /// projected into the fitted vocabulary. Out-of-vocabulary terms are
    /// silently dropped; nothing is excluded from the results.
    fn similar_to_profile(&self, profile_text: &str, top_n: usize) -> Vec<ScoredCandidate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fixed-answer mocks to exercise the trait seams the way the engine
    // consumes them.
    struct ConstantPredictor(f64);

    impl RatingPredictor for ConstantPredictor {
        fn predict(&self, _user_id: &str, _business_id: &str) -> f64 {
            self.0
        }
    }

    struct TwoItemIndex;

    impl SimilarityIndex for TwoItemIndex {
        fn similar_to(&self, business_id: &str, top_n: usize) -> Vec<ScoredCandidate> {
            if business_id != "a" && business_id != "b" {
                return Vec::new();
            }
            let other = if business_id == "a" { "b" } else { "a" };
            let mut out = vec![ScoredCandidate::new(other, 0.5)];
            out.truncate(top_n);
            out
        }

        fn similar_to_profile(&self, profile_text: &str, top_n: usize) -> Vec<ScoredCandidate> {
            if profile_text.trim().is_empty() {
                return Vec::new();
            }
            let mut out = vec![
                ScoredCandidate::new("a", 0.9),
                ScoredCandidate::new("b", 0.4),
            ];
            out.truncate(top_n);
            out
        }
    }

    #[test]
    fn test_predictor_trait_object() {
        let predictor: Box<dyn RatingPredictor> = Box::new(ConstantPredictor(3.5));
        assert!((predictor.predict("u1", "b1") - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_index_excludes_self() {
        let index = TwoItemIndex;
        let results = index.similar_to("a", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].business_id, "b");
    }

    #[test]
    fn test_index_unknown_id_is_empty() {
        let index = TwoItemIndex;
        assert!(index.similar_to("missing", 5).is_empty());
    }

    #[test]
    fn test_index_profile_respects_top_n() {
        let index = TwoItemIndex;
        assert_eq!(index.similar_to_profile("coffee", 1).len(), 1);
    }

    #[test]
    fn test_scored_candidate_builders() {
        let c = ScoredCandidate::new("x", 1.0).with_name("X").with_rating(4.0);
        assert_eq!(c.name.as_deref(), Some("X"));
        assert_eq!(c.rating, Some(4.0));
    }
}
