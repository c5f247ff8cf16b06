//! Feed data model and read-only feed adapters.
//!
//! The engine consumes two snapshot feeds: reviews and businesses. A feed
//! returns empty vectors when no data exists, never an error for mere
//! emptiness. Rows carrying a moderation status are filtered here, before
//! the core ever sees them: only approved reviews and active businesses
//! pass through, while rows without a status are kept as-is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// One user rating of one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer id
    pub user_id: String,
    /// Reviewed business id
    pub business_id: String,
    /// Rating on the 1-5 scale
    pub rating: f64,
    /// Free-text comment, unused by the models
    #[serde(default)]
    pub text: Option<String>,
    /// Moderation status; only "approved" rows (or rows without a status)
    /// are served by the feed adapters
    #[serde(default)]
    pub status: Option<String>,
}

impl Review {
    /// Create a review with no text or status.
    #[must_use]
    pub fn new(user_id: impl Into<String>, business_id: impl Into<String>, rating: f64) -> Self {
        Self {
            user_id: user_id.into(),
            business_id: business_id.into(),
            rating,
            text: None,
            status: None,
        }
    }

    /// Attach free-text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach a moderation status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// One business record from the catalog feed.
///
/// Missing `category`, `description` or `city` degrade to empty strings in
/// the content features rather than failing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Unique id, join key for `Review::business_id`
    pub business_id: String,
    /// Display name
    pub name: String,
    /// Primary category label
    #[serde(default)]
    pub category: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// City name
    #[serde(default)]
    pub city: Option<String>,
    /// Aggregate feed rating shown to users
    #[serde(default)]
    pub rating: Option<f64>,
    /// Listing status; only "active" rows (or rows without a status) are
    /// served by the feed adapters
    #[serde(default)]
    pub status: Option<String>,
}

impl Business {
    /// Create a business with the required fields only.
    #[must_use]
    pub fn new(
        business_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            city: None,
            rating: None,
            status: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Attach an aggregate feed rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Attach a listing status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// One ranked recommendation, produced fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended business id
    pub business_id: String,
    /// Display name captured at candidate-collection time
    pub display_name: Option<String>,
    /// Aggregate feed rating captured at candidate-collection time
    pub displayed_rating: Option<f64>,
    /// Final score, rounded to 2 decimal places
    pub predicted_score: f64,
}

/// Read-only source of the two snapshot feeds.
///
/// Both loaders return empty vectors when no data exists. Implementations
/// apply the status filtering documented on [`Review`] and [`Business`].
pub trait DataFeed {
    /// All approved reviews.
    fn load_reviews(&self) -> Result<Vec<Review>>;

    /// All active businesses.
    fn load_businesses(&self) -> Result<Vec<Business>>;
}

fn review_is_served(review: &Review) -> bool {
    review.status.as_deref().map_or(true, |s| s == "approved")
}

fn business_is_served(business: &Business) -> bool {
    business.status.as_deref().map_or(true, |s| s == "active")
}

/// In-memory feed for tests and embedding hosts that already hold the data.
///
/// # Examples
///
/// ```
/// use recomendar::feed::{Business, DataFeed, InMemoryFeed, Review};
///
/// let feed = InMemoryFeed::new(
///     vec![Review::new("u1", "b1", 5.0)],
///     vec![Business::new("b1", "Blue Bottle Cafe", "Coffee")],
/// );
/// assert_eq!(feed.load_reviews().unwrap().len(), 1);
/// assert_eq!(feed.load_businesses().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeed {
    reviews: Vec<Review>,
    businesses: Vec<Business>,
}

impl InMemoryFeed {
    /// Create a feed over the given rows.
    #[must_use]
    pub fn new(reviews: Vec<Review>, businesses: Vec<Business>) -> Self {
        Self {
            reviews,
            businesses,
        }
    }
}

impl DataFeed for InMemoryFeed {
    fn load_reviews(&self) -> Result<Vec<Review>> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| review_is_served(r))
            .cloned()
            .collect())
    }

    fn load_businesses(&self) -> Result<Vec<Business>> {
        Ok(self
            .businesses
            .iter()
            .filter(|b| business_is_served(b))
            .cloned()
            .collect())
    }
}

/// Feed over two flat CSV files with header rows.
///
/// The reviews file needs `user_id,business_id,rating` columns; the
/// businesses file needs `business_id,name`. All other columns are
/// optional and map to the corresponding [`Review`]/[`Business`] fields.
///
/// # Examples
///
/// ```no_run
/// use recomendar::feed::{CsvFeed, DataFeed};
///
/// let feed = CsvFeed::new("data/reviews.csv", "data/businesses.csv");
/// let reviews = feed.load_reviews()?;
/// # Ok::<(), recomendar::RecomendarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsvFeed {
    reviews_path: PathBuf,
    businesses_path: PathBuf,
}

impl CsvFeed {
    /// Create a feed over the given file paths.
    #[must_use]
    pub fn new(reviews_path: impl AsRef<Path>, businesses_path: impl AsRef<Path>) -> Self {
        Self {
            reviews_path: reviews_path.as_ref().to_path_buf(),
            businesses_path: businesses_path.as_ref().to_path_buf(),
        }
    }
}

impl DataFeed for CsvFeed {
    fn load_reviews(&self) -> Result<Vec<Review>> {
        let mut reader = csv::Reader::from_path(&self.reviews_path)?;
        let mut reviews = Vec::new();
        for row in reader.deserialize() {
            let review: Review = row?;
            if review_is_served(&review) {
                reviews.push(review);
            }
        }
        debug!(count = reviews.len(), path = %self.reviews_path.display(), "loaded reviews");
        Ok(reviews)
    }

    fn load_businesses(&self) -> Result<Vec<Business>> {
        let mut reader = csv::Reader::from_path(&self.businesses_path)?;
        let mut businesses = Vec::new();
        for row in reader.deserialize() {
            let business: Business = row?;
            if business_is_served(&business) {
                businesses.push(business);
            }
        }
        debug!(
            count = businesses.len(),
            path = %self.businesses_path.display(),
            "loaded businesses"
        );
        Ok(businesses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_in_memory_feed_roundtrip() {
        let feed = InMemoryFeed::new(
            vec![Review::new("u1", "b1", 4.0)],
            vec![Business::new("b1", "Cafe", "Food")],
        );
        let reviews = feed.load_reviews().expect("load should succeed");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].user_id, "u1");
        assert!((reviews[0].rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_feed_returns_empty_vecs() {
        let feed = InMemoryFeed::default();
        assert!(feed.load_reviews().expect("ok").is_empty());
        assert!(feed.load_businesses().expect("ok").is_empty());
    }

    #[test]
    fn test_unapproved_reviews_filtered() {
        let feed = InMemoryFeed::new(
            vec![
                Review::new("u1", "b1", 4.0).with_status("approved"),
                Review::new("u2", "b1", 2.0).with_status("pending"),
                Review::new("u3", "b1", 5.0),
            ],
            Vec::new(),
        );
        let reviews = feed.load_reviews().expect("ok");
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.user_id != "u2"));
    }

    #[test]
    fn test_inactive_businesses_filtered() {
        let feed = InMemoryFeed::new(
            Vec::new(),
            vec![
                Business::new("b1", "Cafe", "Food").with_status("active"),
                Business::new("b2", "Closed Gym", "Fitness").with_status("suspended"),
                Business::new("b3", "Bakery", "Food"),
            ],
        );
        let businesses = feed.load_businesses().expect("ok");
        let ids: Vec<&str> = businesses.iter().map(|b| b.business_id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3"]);
    }

    #[test]
    fn test_csv_feed_loads_and_filters() {
        let mut reviews_file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(reviews_file, "user_id,business_id,rating,text,status").expect("write");
        writeln!(reviews_file, "u1,b1,5.0,great spot,approved").expect("write");
        writeln!(reviews_file, "u2,b2,1.0,spam,rejected").expect("write");
        writeln!(reviews_file, "u3,b1,4.0,,").expect("write");

        let mut businesses_file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            businesses_file,
            "business_id,name,category,description,city,rating,status"
        )
        .expect("write");
        writeln!(businesses_file, "b1,Cafe,Food,cozy,Lisbon,4.5,active").expect("write");
        writeln!(businesses_file, "b2,Gym,Fitness,,,,suspended").expect("write");

        let feed = CsvFeed::new(reviews_file.path(), businesses_file.path());

        let reviews = feed.load_reviews().expect("load reviews");
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].text.as_deref(), Some("great spot"));
        assert_eq!(reviews[1].user_id, "u3");
        assert!(reviews[1].text.is_none());

        let businesses = feed.load_businesses().expect("load businesses");
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].business_id, "b1");
        assert_eq!(businesses[0].city.as_deref(), Some("Lisbon"));
        assert_eq!(businesses[0].rating, Some(4.5));
    }

    #[test]
    fn test_csv_feed_optional_columns_absent() {
        let mut businesses_file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(businesses_file, "business_id,name").expect("write");
        writeln!(businesses_file, "b1,Cafe").expect("write");

        let feed = CsvFeed::new(businesses_file.path(), businesses_file.path());
        let businesses = feed.load_businesses().expect("load businesses");
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].category, "");
        assert!(businesses[0].description.is_none());
    }

    #[test]
    fn test_csv_feed_missing_file_errors() {
        let feed = CsvFeed::new("/nonexistent/reviews.csv", "/nonexistent/businesses.csv");
        assert!(feed.load_reviews().is_err());
    }

    #[test]
    fn test_review_serde_roundtrip() {
        let review = Review::new("u1", "b1", 3.5).with_text("fine");
        let json = serde_json::to_string(&review).expect("serialize");
        let back: Review = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(review, back);
    }
}
