//! Recomendar: hybrid business recommendations in pure Rust.
//!
//! Recomendar blends two independently trained signals into one ranked
//! list: a latent-factor collaborative filter over user ratings, and a
//! TF-IDF content index over business text attributes. Candidate
//! generation, per-candidate scoring, user-profile synthesis, and the
//! weighted ensemble merge all live behind one engine type.
//!
//! # Quick Start
//!
//! ```
//! use recomendar::prelude::*;
//!
//! // Five businesses and ten reviews, the minimum training corpus.
//! let businesses: Vec<Business> = (0..5)
//!     .map(|i| Business::new(format!("b{i}"), format!("Cafe {i}"), "Coffee"))
//!     .collect();
//! let reviews: Vec<Review> = (0..10)
//!     .map(|i| Review::new(format!("u{}", i / 2), format!("b{}", i % 5), 4.0))
//!     .collect();
//!
//! let engine = RecommendationEngine::new(InMemoryFeed::new(reviews, businesses));
//! let report = engine.retrain().unwrap();
//! assert_eq!(report.businesses_indexed, 5);
//!
//! // u0 has rated b0 and b1; the rest of the catalog is fair game.
//! let picks = engine.recommend("u0", 3).unwrap();
//! assert!(!picks.is_empty() && picks.len() <= 3);
//! ```
//!
//! # Modules
//!
//! - [`feed`]: Review/Business records and the data feed adapters
//! - [`traits`]: The predictor/index abstractions and `ScoredCandidate`
//! - [`collaborative`]: Latent-factor rating model (`FunkSvd`)
//! - [`text`]: Tokenization, stop words, and TF-IDF vectorization
//! - [`content`]: Content similarity index over business text
//! - [`profile`]: User profile synthesis from review history
//! - [`trainer`]: Feed validation and batch model fitting
//! - [`engine`]: Candidate generation, stage scoring, and the hybrid merge
//! - [`metrics`]: Regression metrics for validation holdouts
//! - [`error`]: Error taxonomy shared across the crate

pub mod collaborative;
pub mod content;
pub mod engine;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod prelude;
pub mod profile;
pub mod text;
pub mod trainer;
pub mod traits;

pub use engine::RecommendationEngine;
pub use error::{RecomendarError, Result};
pub use feed::{Business, DataFeed, Recommendation, Review};
pub use traits::{RatingPredictor, ScoredCandidate, SimilarityIndex};
