//! Content similarity over business text attributes.
//!
//! [`ContentIndex`] concatenates each business's name, category,
//! description, and city into one document, fits a TF-IDF vocabulary
//! over the corpus, and keeps one unit-norm vector per business. Both
//! lookups (by indexed business, or by free profile text) rank every
//! indexed business by cosine similarity.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RecomendarError, Result};
use crate::feed::Business;
use crate::text::{sparse_dot, SparseVector, TfidfVectorizer};
use crate::traits::{ScoredCandidate, SimilarityIndex};

/// Vocabulary cap applied when indexing a corpus.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedBusiness {
    business_id: String,
    name: String,
    rating: Option<f64>,
    vector: SparseVector,
}

/// TF-IDF similarity index over a business corpus.
///
/// Rows keep the feed's first-seen order, and ranking uses a stable
/// sort, so equal scores resolve to corpus order and repeated queries
/// are reproducible. Duplicate `business_id`s in the feed keep the
/// first occurrence.
///
/// # Examples
///
/// ```
/// use recomendar::content::ContentIndex;
/// use recomendar::feed::Business;
///
/// let businesses = vec![
///     Business::new("b1", "Blue Bottle Cafe", "Coffee").with_city("Lisbon"),
///     Business::new("b2", "Iron Temple Gym", "Fitness").with_city("Porto"),
///     Business::new("b3", "Bean Scene Cafe", "Coffee").with_city("Lisbon"),
/// ];
///
/// let mut index = ContentIndex::new();
/// index.fit(&businesses).unwrap();
///
/// let similar = index.try_similar_to("b1", 2).unwrap();
/// assert_eq!(similar[0].business_id, "b3");
/// assert!(similar[0].score > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentIndex {
    vectorizer: TfidfVectorizer,
    rows: Vec<IndexedBusiness>,
    id_to_row: HashMap<String, usize>,
    max_features: usize,
    min_df: usize,
}

impl ContentIndex {
    /// Create an unfitted index capped at [`DEFAULT_MAX_FEATURES`] terms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(),
            rows: Vec::new(),
            id_to_row: HashMap::new(),
            max_features: DEFAULT_MAX_FEATURES,
            min_df: 1,
        }
    }

    /// Set the vocabulary cap used at fit time.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Ignore terms appearing in fewer than `min_df` businesses.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Fit the vocabulary and index one vector per business.
    ///
    /// Missing optional fields contribute nothing to the document text.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InsufficientData`] if `businesses` is
    /// empty.
    pub fn fit(&mut self, businesses: &[Business]) -> Result<()> {
        if businesses.is_empty() {
            return Err(RecomendarError::insufficient_data(
                "no businesses to build a content index on",
            ));
        }

        let mut kept: Vec<&Business> = Vec::with_capacity(businesses.len());
        let mut seen: HashSet<&str> = HashSet::new();
        for business in businesses {
            if !seen.insert(business.business_id.as_str()) {
                warn!(
                    business_id = %business.business_id,
                    "duplicate business id in feed, keeping first occurrence"
                );
                continue;
            }
            kept.push(business);
        }

        let documents: Vec<String> = kept.iter().map(|b| document_for(b)).collect();
        let mut vectorizer = TfidfVectorizer::new()
            .with_max_features(self.max_features)
            .with_min_df(self.min_df);
        vectorizer.fit(&documents)?;

        self.rows = kept
            .iter()
            .zip(documents.iter())
            .map(|(business, document)| IndexedBusiness {
                business_id: business.business_id.clone(),
                name: business.name.clone(),
                rating: business.rating,
                vector: vectorizer.vectorize(document),
            })
            .collect();
        self.id_to_row = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.business_id.clone(), idx))
            .collect();
        self.vectorizer = vectorizer;

        debug!(
            businesses = self.rows.len(),
            vocabulary = self.vectorizer.vocabulary_size(),
            "content index fitted"
        );
        Ok(())
    }

    /// Rank the `top_n` businesses most similar to an indexed business,
    /// excluding the business itself.
    ///
    /// A query business whose document carried no weighted terms has an
    /// empty vector and yields no results.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::UnknownEntity`] if `business_id` was
    /// not present at fit time.
    pub fn try_similar_to(&self, business_id: &str, top_n: usize) -> Result<Vec<ScoredCandidate>> {
        let row = self
            .id_to_row
            .get(business_id)
            .copied()
            .ok_or_else(|| RecomendarError::unknown_entity(business_id))?;

        let query = &self.rows[row].vector;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.rank_against(query, top_n, Some(row)))
    }

    /// Rank the `top_n` businesses most similar to free profile text.
    ///
    /// The text is projected into the fitted vocabulary, dropping
    /// out-of-vocabulary terms. No business is excluded from the
    /// results. Text that projects to a zero vector carries no ranking
    /// signal and yields no results.
    #[must_use]
    pub fn similar_to_profile(&self, profile_text: &str, top_n: usize) -> Vec<ScoredCandidate> {
        let query = self.vectorizer.vectorize(profile_text);
        if query.is_empty() {
            debug!("profile text projected to an empty vector");
            return Vec::new();
        }
        self.rank_against(&query, top_n, None)
    }

    fn rank_against(
        &self,
        query: &[(usize, f64)],
        top_n: usize,
        exclude: Option<usize>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(self.rows.len());
        for (idx, row) in self.rows.iter().enumerate() {
            if exclude == Some(idx) {
                continue;
            }
            let mut candidate =
                ScoredCandidate::new(row.business_id.clone(), sparse_dot(query, &row.vector))
                    .with_name(row.name.clone());
            if let Some(rating) = row.rating {
                candidate = candidate.with_rating(rating);
            }
            scored.push(candidate);
        }
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_n);
        scored
    }

    /// Whether `business_id` was present at fit time.
    #[must_use]
    pub fn contains(&self, business_id: &str) -> bool {
        self.id_to_row.contains_key(business_id)
    }

    /// Number of indexed businesses.
    #[must_use]
    pub fn n_businesses(&self) -> usize {
        self.rows.len()
    }

    /// Number of terms in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

impl Default for ContentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityIndex for ContentIndex {
    fn similar_to(&self, business_id: &str, top_n: usize) -> Vec<ScoredCandidate> {
        match self.try_similar_to(business_id, top_n) {
            Ok(results) => results,
            Err(err) => {
                warn!(business_id, %err, "similarity lookup degraded to empty");
                Vec::new()
            }
        }
    }

    fn similar_to_profile(&self, profile_text: &str, top_n: usize) -> Vec<ScoredCandidate> {
        ContentIndex::similar_to_profile(self, profile_text, top_n)
    }
}

fn document_for(business: &Business) -> String {
    format!(
        "{} {} {} {}",
        business.name,
        business.category,
        business.description.as_deref().unwrap_or(""),
        business.city.as_deref().unwrap_or(""),
    )
}
