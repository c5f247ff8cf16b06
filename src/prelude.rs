//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use recomendar::prelude::*;
//! ```

pub use crate::collaborative::FunkSvd;
pub use crate::content::ContentIndex;
pub use crate::engine::{FittedModels, ModelHandle, RecommendationEngine};
pub use crate::error::{RecomendarError, Result};
pub use crate::feed::{Business, CsvFeed, DataFeed, InMemoryFeed, Recommendation, Review};
pub use crate::profile::{build_user_profile, UserProfile};
pub use crate::trainer::{TrainedModels, Trainer, TrainingReport};
pub use crate::traits::{RatingPredictor, ScoredCandidate, SimilarityIndex};
