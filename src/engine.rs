//! Hybrid recommendation engine.
//!
//! [`RecommendationEngine`] orchestrates the full request path: generate
//! unrated candidates, score them with the rating model, query the
//! content index with a synthesized user profile, and merge the two
//! ranked lists with fixed weights. Fitted models live behind a
//! [`ModelHandle`] so many scoring requests can share a snapshot while a
//! retrain prepares the next pair.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::error::{RecomendarError, Result};
use crate::feed::{Business, DataFeed, Recommendation, Review};
use crate::profile::build_user_profile;
use crate::trainer::{TrainedModels, Trainer, TrainingReport};
use crate::traits::{RatingPredictor, ScoredCandidate, SimilarityIndex};

/// Weight applied to collaborative-stage scores in the merge.
pub const COLLABORATIVE_WEIGHT: f64 = 0.7;

/// Weight applied to content-stage scores in the merge.
pub const CONTENT_WEIGHT: f64 = 0.3;

/// Each stage fetches this multiple of `top_n` before the merge, so the
/// ensemble has headroom ahead of the final truncation.
pub const OVERFETCH_FACTOR: usize = 2;

/// All business ids eligible for recommendation to `user_id`: the full
/// business feed minus everything the user has already rated.
///
/// Feed order is preserved and duplicate feed rows are dropped, so both
/// scoring stages see the same candidate universe in the same order.
#[must_use]
pub fn candidate_ids(user_id: &str, reviews: &[Review], businesses: &[Business]) -> Vec<String> {
    let rated = rated_ids(user_id, reviews);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();
    for business in businesses {
        let id = business.business_id.as_str();
        if rated.contains(id) || !seen.insert(id) {
            continue;
        }
        candidates.push(business.business_id.clone());
    }
    candidates
}

fn rated_ids<'a>(user_id: &str, reviews: &'a [Review]) -> HashSet<&'a str> {
    reviews
        .iter()
        .filter(|r| r.user_id == user_id)
        .map(|r| r.business_id.as_str())
        .collect()
}

/// A matched pair of fitted models, swapped as one unit.
///
/// The engine only sees the two traits, so any predictor/index
/// implementation can stand in for the stock models.
pub struct FittedModels {
    predictor: Box<dyn RatingPredictor + Send + Sync>,
    index: Box<dyn SimilarityIndex + Send + Sync>,
}

impl FittedModels {
    /// Pair up a fitted predictor and a fitted index.
    pub fn new(
        predictor: impl RatingPredictor + Send + Sync + 'static,
        index: impl SimilarityIndex + Send + Sync + 'static,
    ) -> Self {
        Self {
            predictor: Box::new(predictor),
            index: Box::new(index),
        }
    }

    /// The rating model of the pair.
    #[must_use]
    pub fn predictor(&self) -> &(dyn RatingPredictor + Send + Sync) {
        self.predictor.as_ref()
    }

    /// The content index of the pair.
    #[must_use]
    pub fn index(&self) -> &(dyn SimilarityIndex + Send + Sync) {
        self.index.as_ref()
    }
}

impl From<TrainedModels> for FittedModels {
    fn from(trained: TrainedModels) -> Self {
        Self::new(trained.predictor, trained.index)
    }
}

/// Swappable reference to the currently installed model pair.
///
/// Readers take cheap [`Arc`] snapshots and keep scoring against them
/// even while a new pair is being fitted; [`install`](Self::install)
/// replaces the whole pair in one write, so no request ever sees a
/// fresh predictor next to a stale index. The training latch rejects a
/// second concurrent run instead of interleaving two.
pub struct ModelHandle {
    models: RwLock<Option<Arc<FittedModels>>>,
    training: AtomicBool,
}

impl ModelHandle {
    /// Create a handle with no models installed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: RwLock::new(None),
            training: AtomicBool::new(false),
        }
    }

    /// The installed pair, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<FittedModels>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The installed pair, or [`RecomendarError::ModelUnavailable`].
    pub fn models(&self) -> Result<Arc<FittedModels>> {
        self.snapshot()
            .ok_or_else(|| RecomendarError::model_unavailable("the model pair"))
    }

    /// Atomically replace the installed pair.
    pub fn install(&self, models: FittedModels) {
        let fresh = Some(Arc::new(models));
        *self.models.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// Whether a training run currently holds the latch.
    #[must_use]
    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::Acquire)
    }

    /// Claim the training latch for the duration of the returned guard.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::TrainingInProgress`] if another run
    /// holds the latch.
    pub fn begin_training(&self) -> Result<TrainingGuard<'_>> {
        if self
            .training
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RecomendarError::TrainingInProgress);
        }
        Ok(TrainingGuard { handle: self })
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::empty()
    }
}

/// Releases the training latch when dropped, including on fit errors.
pub struct TrainingGuard<'a> {
    handle: &'a ModelHandle,
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        self.handle.training.store(false, Ordering::Release);
    }
}

/// Hybrid recommender over a [`DataFeed`].
///
/// Scoring reads a model snapshot and fresh feed data on every call;
/// nothing is mutated, so any number of requests may run concurrently.
/// An unavailable model degrades its stage to empty results rather than
/// failing the request.
///
/// # Examples
///
/// ```
/// use recomendar::engine::RecommendationEngine;
/// use recomendar::feed::{Business, InMemoryFeed, Review};
///
/// let businesses: Vec<Business> = (0..5)
///     .map(|i| Business::new(format!("b{i}"), format!("Place {i}"), "Coffee"))
///     .collect();
/// let reviews: Vec<Review> = (0..10)
///     .map(|i| Review::new(format!("u{}", i / 2), format!("b{}", i % 5), 4.0))
///     .collect();
///
/// let engine = RecommendationEngine::new(InMemoryFeed::new(reviews, businesses));
/// engine.retrain().unwrap();
///
/// let picks = engine.recommend("u0", 3).unwrap();
/// assert!(!picks.is_empty() && picks.len() <= 3);
/// // u0 already rated b0 and b1, so neither may come back.
/// assert!(picks.iter().all(|r| r.business_id != "b0" && r.business_id != "b1"));
/// ```
pub struct RecommendationEngine<F> {
    feed: F,
    trainer: Trainer,
    handle: Arc<ModelHandle>,
    collaborative_weight: f64,
    content_weight: f64,
}

impl<F: DataFeed> RecommendationEngine<F> {
    /// Create an engine with no models installed and default weights.
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            trainer: Trainer::new(),
            handle: Arc::new(ModelHandle::empty()),
            collaborative_weight: COLLABORATIVE_WEIGHT,
            content_weight: CONTENT_WEIGHT,
        }
    }

    /// Replace the trainer used by [`train`](Self::train) and
    /// [`retrain`](Self::retrain).
    #[must_use]
    pub fn with_trainer(mut self, trainer: Trainer) -> Self {
        self.trainer = trainer;
        self
    }

    /// Override the stage weights. The defaults reproduce the stock
    /// 0.7/0.3 blend.
    #[must_use]
    pub fn with_weights(mut self, collaborative: f64, content: f64) -> Self {
        self.collaborative_weight = collaborative;
        self.content_weight = content;
        self
    }

    /// Shared handle to the installed model pair.
    #[must_use]
    pub fn handle(&self) -> Arc<ModelHandle> {
        Arc::clone(&self.handle)
    }

    /// Install an externally fitted model pair.
    pub fn install_models(&self, models: FittedModels) {
        self.handle.install(models);
    }

    /// Blend both scoring stages into the top `top_n` recommendations.
    ///
    /// Businesses the user already rated never appear. An empty result
    /// means no signal was available for this user, not a fault.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::DataValidation`] when `top_n` is zero,
    /// or a feed error if a snapshot cannot be loaded.
    pub fn recommend(&self, user_id: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        ensure_top_n(top_n)?;
        let Some(models) = self.handle.snapshot() else {
            warn!(user_id, "no models installed, nothing to recommend");
            return Ok(Vec::new());
        };

        let reviews = self.feed.load_reviews()?;
        let businesses = self.feed.load_businesses()?;
        let limit = top_n * OVERFETCH_FACTOR;

        let collaborative = collaborative_stage(&models, user_id, &reviews, &businesses, limit);
        let content = content_stage(&models, user_id, &reviews, &businesses, limit);
        debug!(
            user_id,
            collaborative = collaborative.len(),
            content = content.len(),
            "stage results collected"
        );

        Ok(merge_stages(
            &collaborative,
            &content,
            self.collaborative_weight,
            self.content_weight,
            top_n,
        ))
    }

    /// The collaborative stage alone, for diagnostics and comparison.
    ///
    /// Scores are raw predicted ratings rounded to 2 decimals, with no
    /// stage weight applied.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`recommend`](Self::recommend).
    pub fn recommend_collaborative_only(
        &self,
        user_id: &str,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        ensure_top_n(top_n)?;
        let Some(models) = self.handle.snapshot() else {
            return Ok(Vec::new());
        };
        let reviews = self.feed.load_reviews()?;
        let businesses = self.feed.load_businesses()?;
        let stage = collaborative_stage(&models, user_id, &reviews, &businesses, top_n);
        Ok(stage.into_iter().map(to_recommendation).collect())
    }

    /// The content stage alone, for diagnostics and comparison.
    ///
    /// Scores are raw cosine similarities rounded to 2 decimals, with no
    /// stage weight applied.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`recommend`](Self::recommend).
    pub fn recommend_content_only(
        &self,
        user_id: &str,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        ensure_top_n(top_n)?;
        let Some(models) = self.handle.snapshot() else {
            return Ok(Vec::new());
        };
        let reviews = self.feed.load_reviews()?;
        let businesses = self.feed.load_businesses()?;
        let stage = content_stage(&models, user_id, &reviews, &businesses, top_n);
        Ok(stage.into_iter().map(to_recommendation).collect())
    }

    /// Businesses most similar to `business_id` in the content index.
    ///
    /// An unindexed id degrades to an empty list; the query business
    /// itself never appears.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::ModelUnavailable`] before the first
    /// training run, or [`RecomendarError::DataValidation`] when `top_n`
    /// is zero.
    pub fn similar_businesses(
        &self,
        business_id: &str,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        ensure_top_n(top_n)?;
        let models = self.handle.models()?;
        let similar = models.index().similar_to(business_id, top_n);
        Ok(similar.into_iter().map(to_recommendation).collect())
    }

    /// Fit a fresh model pair on the given snapshots and install it.
    ///
    /// Scoring requests keep using the previous pair until the install,
    /// which swaps both models at once. On any failure the previous pair
    /// stays in effect.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::TrainingInProgress`] if another run is
    /// active, plus everything [`Trainer::train`] can return.
    pub fn train(&self, reviews: &[Review], businesses: &[Business]) -> Result<TrainingReport> {
        let _guard = self.handle.begin_training()?;
        let trained = self.trainer.train(reviews, businesses)?;
        let report = trained.report.clone();
        self.handle.install(FittedModels::from(trained));
        info!(
            reviews_used = report.reviews_used,
            businesses_indexed = report.businesses_indexed,
            "new model pair installed"
        );
        Ok(report)
    }

    /// Load both feeds and [`train`](Self::train) on them.
    ///
    /// # Errors
    ///
    /// Feed errors propagate, in addition to the failure modes of
    /// [`train`](Self::train).
    pub fn retrain(&self) -> Result<TrainingReport> {
        let reviews = self.feed.load_reviews()?;
        let businesses = self.feed.load_businesses()?;
        self.train(&reviews, &businesses)
    }
}

fn ensure_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(RecomendarError::data_validation("top_n must be at least 1"));
    }
    Ok(())
}

fn collaborative_stage(
    models: &FittedModels,
    user_id: &str,
    reviews: &[Review],
    businesses: &[Business],
    limit: usize,
) -> Vec<ScoredCandidate> {
    let mut meta: HashMap<&str, &Business> = HashMap::new();
    for business in businesses {
        meta.entry(business.business_id.as_str()).or_insert(business);
    }

    let mut scored = Vec::new();
    for business_id in candidate_ids(user_id, reviews, businesses) {
        let score = models.predictor().predict(user_id, &business_id);
        if !score.is_finite() {
            warn!(%business_id, "skipping candidate with non-finite prediction");
            continue;
        }
        let business = meta.get(business_id.as_str()).copied();
        let mut candidate = ScoredCandidate::new(business_id, score);
        if let Some(business) = business {
            candidate = candidate.with_name(business.name.clone());
            if let Some(rating) = business.rating {
                candidate = candidate.with_rating(rating);
            }
        }
        scored.push(candidate);
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

fn content_stage(
    models: &FittedModels,
    user_id: &str,
    reviews: &[Review],
    businesses: &[Business],
    limit: usize,
) -> Vec<ScoredCandidate> {
    let profile = build_user_profile(user_id, reviews, businesses);
    if profile.is_empty() {
        debug!(user_id, "empty profile, content stage contributes nothing");
        return Vec::new();
    }

    let rated = rated_ids(user_id, reviews);
    models
        .index()
        .similar_to_profile(&profile.as_query_text(), limit)
        .into_iter()
        .filter(|candidate| {
            if rated.contains(candidate.business_id.as_str()) {
                return false;
            }
            if !candidate.score.is_finite() {
                warn!(
                    business_id = %candidate.business_id,
                    "skipping candidate with non-finite similarity"
                );
                return false;
            }
            true
        })
        .collect()
}

/// Merge the two stage rankings into the final recommendation list.
///
/// Collaborative entries land first with `collaborative_weight` applied;
/// content entries add `content_weight * score` onto an existing entry
/// or insert a fresh one. Display metadata captured by the collaborative
/// stage wins for businesses present in both. The merged list is sorted
/// by accumulated score descending with a stable sort, truncated to
/// `top_n`, and rounded to 2 decimals.
#[must_use]
pub fn merge_stages(
    collaborative: &[ScoredCandidate],
    content: &[ScoredCandidate],
    collaborative_weight: f64,
    content_weight: f64,
    top_n: usize,
) -> Vec<Recommendation> {
    let mut merged: Vec<ScoredCandidate> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for candidate in collaborative {
        match slots.get(candidate.business_id.as_str()) {
            Some(&slot) => merged[slot].score += collaborative_weight * candidate.score,
            None => {
                slots.insert(candidate.business_id.clone(), merged.len());
                let mut entry = candidate.clone();
                entry.score = collaborative_weight * candidate.score;
                merged.push(entry);
            }
        }
    }
    for candidate in content {
        match slots.get(candidate.business_id.as_str()) {
            Some(&slot) => merged[slot].score += content_weight * candidate.score,
            None => {
                slots.insert(candidate.business_id.clone(), merged.len());
                let mut entry = candidate.clone();
                entry.score = content_weight * candidate.score;
                merged.push(entry);
            }
        }
    }

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(top_n);
    merged.into_iter().map(to_recommendation).collect()
}

/// Round a score to 2 decimal places, the precision recommendations
/// are reported at.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn to_recommendation(candidate: ScoredCandidate) -> Recommendation {
    Recommendation {
        business_id: candidate.business_id,
        display_name: candidate.name,
        displayed_rating: candidate.rating,
        predicted_score: round_score(candidate.score),
    }
}
