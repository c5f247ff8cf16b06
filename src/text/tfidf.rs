//! TF-IDF vectorization over a fitted vocabulary.
//!
//! The vectorizer learns a capped vocabulary from a document corpus, then
//! projects any text into that space as a sparse, l2-normalized vector.
//! With unit-norm rows, cosine similarity reduces to a sparse dot product.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{RecomendarError, Result};
use crate::text::stopwords::StopWords;
use crate::text::tokenize::tokenize;

/// Sparse vector of (vocabulary index, weight) pairs, sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Learns term weights from a corpus and vectorizes text against them.
///
/// Term weight is `tf * ln(n_docs / df)`. Stop words are dropped before
/// any counting. The vocabulary is capped to the most frequent terms,
/// with alphabetical order breaking frequency ties so fits are
/// reproducible.
///
/// # Examples
///
/// ```
/// use recomendar::text::TfidfVectorizer;
///
/// let docs = vec!["fresh coffee roastery", "city gym and fitness"];
/// let mut vectorizer = TfidfVectorizer::new();
/// vectorizer.fit(&docs).unwrap();
///
/// assert_eq!(vectorizer.vocabulary_size(), 6);
/// assert!(!vectorizer.vectorize("coffee gym").is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    max_features: Option<usize>,
    min_df: usize,
    #[serde(skip, default)]
    stop_words: StopWords,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer with no vocabulary cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            max_features: None,
            min_df: 1,
            stop_words: StopWords::english(),
        }
    }

    /// Cap the vocabulary to the `max_features` most frequent terms.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Ignore terms appearing in fewer than `min_df` documents.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    fn tokens_of(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| !self.stop_words.is_stop_word(t))
            .collect()
    }

    /// Learn the vocabulary and document frequencies from `documents`.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InsufficientData`] for an empty corpus.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(RecomendarError::insufficient_data(
                "no documents to fit a vocabulary on",
            ));
        }

        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = self.tokens_of(doc.as_ref());
            let mut doc_terms: HashSet<&str> = HashSet::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
                doc_terms.insert(token);
            }
            for term in doc_terms {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| doc_freq.get(term).copied().unwrap_or(0) >= self.min_df)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max_features) = self.max_features {
            ranked.truncate(max_features);
        }

        self.vocabulary = ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        self.idf = vec![0.0; self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            let df = doc_freq.get(term).copied().unwrap_or(1);
            self.idf[idx] = (n_docs as f64 / df as f64).ln();
        }

        Ok(())
    }

    /// Project `text` into the fitted vocabulary space.
    ///
    /// Out-of-vocabulary terms are silently dropped. The result is
    /// l2-normalized and sorted by vocabulary index; text with no
    /// weighted in-vocabulary terms yields an empty vector.
    #[must_use]
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in self.tokens_of(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .filter(|&(_, w)| w != 0.0)
            .collect();

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for (_, w) in &mut weighted {
            *w /= norm;
        }
        weighted.sort_by_key(|&(idx, _)| idx);
        weighted
    }

    /// The fitted term-to-index mapping.
    #[must_use]
    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    /// Number of terms in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot product of two index-sorted sparse vectors.
///
/// Unit-norm inputs make this the cosine similarity of the two texts.
#[must_use]
pub fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}
