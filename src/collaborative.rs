//! Latent-factor rating prediction.
//!
//! [`FunkSvd`] learns biased matrix factorization with stochastic
//! gradient descent: each rating is modeled as the global mean plus a
//! user bias, an item bias, and the dot product of two latent factor
//! vectors. An internal 80/20 split holds out reviews for validation
//! metrics; the model itself is fitted on the remaining 80%.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecomendarError, Result};
use crate::feed::Review;
use crate::metrics::{mean_absolute_error, root_mean_squared_error};
use crate::traits::RatingPredictor;

/// Fraction of reviews held out for validation during fit.
const VALIDATION_FRACTION: f64 = 0.2;

/// Biased matrix factorization rating model.
///
/// Prediction never fails: unknown users or businesses degrade to the
/// global mean plus whichever biases are known. Scores are raw model
/// output on the rating scale and are not clipped.
///
/// # Examples
///
/// ```
/// use recomendar::collaborative::FunkSvd;
/// use recomendar::feed::Review;
///
/// let reviews = vec![
///     Review::new("u1", "b1", 5.0),
///     Review::new("u1", "b2", 4.0),
///     Review::new("u2", "b1", 2.0),
/// ];
///
/// let mut model = FunkSvd::new().with_epochs(5);
/// model.fit(&reviews).unwrap();
///
/// assert!(model.predict("u1", "b1").is_finite());
/// // Unseen pairs fall back to the global mean.
/// assert!((model.predict("ghost", "nowhere") - model.global_mean()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunkSvd {
    n_factors: usize,
    n_epochs: usize,
    learning_rate: f64,
    regularization: f64,
    seed: u64,
    global_mean: f64,
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    user_biases: Vec<f64>,
    item_biases: Vec<f64>,
    user_factors: Vec<Vec<f64>>,
    item_factors: Vec<Vec<f64>>,
    validation_rmse: Option<f64>,
    validation_mae: Option<f64>,
}

impl FunkSvd {
    /// Create an unfitted model with standard hyperparameters:
    /// 100 factors, 20 epochs, learning rate 0.005, regularization 0.02.
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_factors: 100,
            n_epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            seed: 42,
            global_mean: 0.0,
            user_index: HashMap::new(),
            item_index: HashMap::new(),
            user_biases: Vec::new(),
            item_biases: Vec::new(),
            user_factors: Vec::new(),
            item_factors: Vec::new(),
            validation_rmse: None,
            validation_mae: None,
        }
    }

    /// Set the number of latent factors per user and business.
    #[must_use]
    pub fn with_factors(mut self, n_factors: usize) -> Self {
        self.n_factors = n_factors;
        self
    }

    /// Set the number of gradient descent passes over the training set.
    #[must_use]
    pub fn with_epochs(mut self, n_epochs: usize) -> Self {
        self.n_epochs = n_epochs;
        self
    }

    /// Set the gradient descent step size.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the L2 regularization strength.
    #[must_use]
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the seed for the validation split and factor initialization.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the model on `reviews`.
    ///
    /// A seeded 20% holdout is scored after training and exposed via
    /// [`validation_rmse`](Self::validation_rmse) and
    /// [`validation_mae`](Self::validation_mae); the holdout is empty
    /// for very small corpora and the metrics stay `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RecomendarError::InsufficientData`] if `reviews` is empty.
    pub fn fit(&mut self, reviews: &[Review]) -> Result<()> {
        if reviews.is_empty() {
            return Err(RecomendarError::insufficient_data(
                "no reviews to fit the rating model on",
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut indices: Vec<usize> = (0..reviews.len()).collect();
        indices.shuffle(&mut rng);
        let n_test = (reviews.len() as f64 * VALIDATION_FRACTION).round() as usize;
        let (test_indices, train_indices) = indices.split_at(n_test);

        // Index users and businesses over the training partition only,
        // so holdout scoring exercises the same fallbacks live traffic does.
        self.user_index.clear();
        self.item_index.clear();
        for &row in train_indices {
            let review = &reviews[row];
            let n_users = self.user_index.len();
            self.user_index
                .entry(review.user_id.clone())
                .or_insert(n_users);
            let n_items = self.item_index.len();
            self.item_index
                .entry(review.business_id.clone())
                .or_insert(n_items);
        }

        let train_sum: f64 = train_indices.iter().map(|&row| reviews[row].rating).sum();
        self.global_mean = train_sum / train_indices.len() as f64;

        let n_users = self.user_index.len();
        let n_items = self.item_index.len();
        self.user_biases = vec![0.0; n_users];
        self.item_biases = vec![0.0; n_items];
        self.user_factors = Self::random_factors(&mut rng, n_users, self.n_factors);
        self.item_factors = Self::random_factors(&mut rng, n_items, self.n_factors);

        for epoch in 0..self.n_epochs {
            let mut squared_error = 0.0;
            for &row in train_indices {
                let review = &reviews[row];
                let u = self.user_index[&review.user_id];
                let i = self.item_index[&review.business_id];

                let predicted = self.global_mean
                    + self.user_biases[u]
                    + self.item_biases[i]
                    + dot(&self.user_factors[u], &self.item_factors[i]);
                let err = review.rating - predicted;
                squared_error += err * err;

                self.user_biases[u] +=
                    self.learning_rate * (err - self.regularization * self.user_biases[u]);
                self.item_biases[i] +=
                    self.learning_rate * (err - self.regularization * self.item_biases[i]);

                for f in 0..self.n_factors {
                    let puf = self.user_factors[u][f];
                    let qif = self.item_factors[i][f];
                    self.user_factors[u][f] +=
                        self.learning_rate * (err * qif - self.regularization * puf);
                    self.item_factors[i][f] +=
                        self.learning_rate * (err * puf - self.regularization * qif);
                }
            }
            debug!(
                epoch,
                train_mse = squared_error / train_indices.len() as f64,
                "sgd epoch complete"
            );
        }

        if test_indices.is_empty() {
            self.validation_rmse = None;
            self.validation_mae = None;
        } else {
            let predictions: Vec<f64> = test_indices
                .iter()
                .map(|&row| self.predict(&reviews[row].user_id, &reviews[row].business_id))
                .collect();
            let actuals: Vec<f64> = test_indices.iter().map(|&row| reviews[row].rating).collect();
            self.validation_rmse = Some(root_mean_squared_error(&predictions, &actuals));
            self.validation_mae = Some(mean_absolute_error(&predictions, &actuals));
        }

        Ok(())
    }

    fn random_factors(rng: &mut StdRng, rows: usize, n_factors: usize) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| (0..n_factors).map(|_| rng.gen_range(-0.1..0.1)).collect())
            .collect()
    }

    /// Predict the rating `user_id` would give `business_id`.
    ///
    /// Always returns a finite score: unknown users and businesses
    /// contribute no bias and no factor term, leaving the global mean.
    #[must_use]
    pub fn predict(&self, user_id: &str, business_id: &str) -> f64 {
        let user = self.user_index.get(user_id).copied();
        let item = self.item_index.get(business_id).copied();

        let mut score = self.global_mean;
        if let Some(u) = user {
            score += self.user_biases[u];
        }
        if let Some(i) = item {
            score += self.item_biases[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            score += dot(&self.user_factors[u], &self.item_factors[i]);
        }
        score
    }

    /// Mean rating of the training partition.
    #[must_use]
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    /// Root mean squared error on the validation holdout, if any.
    #[must_use]
    pub fn validation_rmse(&self) -> Option<f64> {
        self.validation_rmse
    }

    /// Mean absolute error on the validation holdout, if any.
    #[must_use]
    pub fn validation_mae(&self) -> Option<f64> {
        self.validation_mae
    }

    /// Number of users seen during training.
    #[must_use]
    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    /// Number of businesses seen during training.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.item_index.len()
    }
}

impl Default for FunkSvd {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingPredictor for FunkSvd {
    fn predict(&self, user_id: &str, business_id: &str) -> f64 {
        FunkSvd::predict(self, user_id, business_id)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
