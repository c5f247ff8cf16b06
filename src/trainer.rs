//! Batch training of the rating model and content index.
//!
//! The trainer owns the fit lifecycle: it validates the feed snapshots,
//! refuses corpora too small to fit anything meaningful, and hands back
//! freshly fitted models. Persistence and swapping the live models are
//! the caller's concern.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collaborative::FunkSvd;
use crate::content::ContentIndex;
use crate::error::{RecomendarError, Result};
use crate::feed::{Business, Review};

/// Reviews required before a training run is allowed.
pub const MIN_REVIEWS: usize = 10;

/// Businesses required before a training run is allowed.
pub const MIN_BUSINESSES: usize = 5;

/// Outcome summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub reviews_used: usize,
    pub businesses_indexed: usize,
    pub validation_rmse: Option<f64>,
    pub validation_mae: Option<f64>,
}

/// A freshly fitted model pair plus its training report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModels {
    pub predictor: FunkSvd,
    pub index: ContentIndex,
    pub report: TrainingReport,
}

/// Fits both models from feed snapshots in one batch pass.
///
/// Hyperparameters are carried as unfitted templates: each run clones
/// the templates and fits the clones, so a trainer can be reused across
/// retrains.
///
/// # Examples
///
/// ```
/// use recomendar::feed::{Business, Review};
/// use recomendar::trainer::Trainer;
///
/// let businesses: Vec<Business> = (0..5)
///     .map(|i| Business::new(format!("b{i}"), format!("Place {i}"), "Coffee"))
///     .collect();
/// let reviews: Vec<Review> = (0..10)
///     .map(|i| Review::new(format!("u{}", i % 3), format!("b{}", i % 5), 4.0))
///     .collect();
///
/// let trained = Trainer::new().train(&reviews, &businesses).unwrap();
/// assert_eq!(trained.report.businesses_indexed, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    min_reviews: usize,
    min_businesses: usize,
    predictor_template: FunkSvd,
    index_template: ContentIndex,
}

impl Trainer {
    /// Create a trainer with default thresholds and model templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_reviews: MIN_REVIEWS,
            min_businesses: MIN_BUSINESSES,
            predictor_template: FunkSvd::new(),
            index_template: ContentIndex::new(),
        }
    }

    /// Set the minimum review count required to train.
    #[must_use]
    pub fn with_min_reviews(mut self, min_reviews: usize) -> Self {
        self.min_reviews = min_reviews;
        self
    }

    /// Set the minimum business count required to train.
    #[must_use]
    pub fn with_min_businesses(mut self, min_businesses: usize) -> Self {
        self.min_businesses = min_businesses;
        self
    }

    /// Replace the unfitted rating model template.
    #[must_use]
    pub fn with_predictor(mut self, predictor: FunkSvd) -> Self {
        self.predictor_template = predictor;
        self
    }

    /// Replace the unfitted content index template.
    #[must_use]
    pub fn with_index(mut self, index: ContentIndex) -> Self {
        self.index_template = index;
        self
    }

    /// Validate the feeds and fit a fresh model pair.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::DataValidation`] when a required field
    /// is missing or a rating falls outside `[1, 5]`, and
    /// [`RecomendarError::InsufficientData`] when either feed is below
    /// its volume threshold. Nothing is fitted on failure.
    pub fn train(&self, reviews: &[Review], businesses: &[Business]) -> Result<TrainedModels> {
        validate_reviews(reviews)?;
        validate_businesses(businesses)?;

        if reviews.len() < self.min_reviews {
            return Err(RecomendarError::insufficient_data(format!(
                "need at least {} reviews to train, got {}",
                self.min_reviews,
                reviews.len()
            )));
        }
        if businesses.len() < self.min_businesses {
            return Err(RecomendarError::insufficient_data(format!(
                "need at least {} businesses to train, got {}",
                self.min_businesses,
                businesses.len()
            )));
        }

        info!(
            reviews = reviews.len(),
            businesses = businesses.len(),
            "training model pair"
        );

        let mut predictor = self.predictor_template.clone();
        predictor.fit(reviews)?;
        let mut index = self.index_template.clone();
        index.fit(businesses)?;

        let report = TrainingReport {
            reviews_used: reviews.len(),
            businesses_indexed: index.n_businesses(),
            validation_rmse: predictor.validation_rmse(),
            validation_mae: predictor.validation_mae(),
        };
        info!(
            reviews_used = report.reviews_used,
            businesses_indexed = report.businesses_indexed,
            validation_rmse = report.validation_rmse,
            "training complete"
        );

        Ok(TrainedModels {
            predictor,
            index,
            report,
        })
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_reviews(reviews: &[Review]) -> Result<()> {
    for (row, review) in reviews.iter().enumerate() {
        if review.user_id.trim().is_empty() {
            return Err(RecomendarError::data_validation(format!(
                "review row {row}: user_id is empty"
            )));
        }
        if review.business_id.trim().is_empty() {
            return Err(RecomendarError::data_validation(format!(
                "review row {row}: business_id is empty"
            )));
        }
        if !review.rating.is_finite() || !(1.0..=5.0).contains(&review.rating) {
            return Err(RecomendarError::data_validation(format!(
                "review row {row}: rating {} outside [1, 5]",
                review.rating
            )));
        }
    }
    Ok(())
}

fn validate_businesses(businesses: &[Business]) -> Result<()> {
    for (row, business) in businesses.iter().enumerate() {
        if business.business_id.trim().is_empty() {
            return Err(RecomendarError::data_validation(format!(
                "business row {row}: business_id is empty"
            )));
        }
        if business.name.trim().is_empty() {
            return Err(RecomendarError::data_validation(format!(
                "business row {row}: name is empty"
            )));
        }
        if business.category.trim().is_empty() {
            return Err(RecomendarError::data_validation(format!(
                "business row {row}: category is empty"
            )));
        }
    }
    Ok(())
}
