//! User profile synthesis from review history.
//!
//! The profile is an ephemeral, per-request summary of what a user
//! likes: categories and cities ranked by the sum of ratings the user
//! gave them, plus a duplicate-retaining bag of reviewed categories.
//! Rendered as text, it becomes the query for the content index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feed::{Business, Review};

/// Ranked preferences derived from one user's reviews.
///
/// `preferred_categories` and `preferred_cities` hold keys sorted by
/// rating-weighted frequency descending, space-joined. `interests`
/// keeps one category entry per distinct reviewed business, so a
/// category the user visits often repeats and weighs more in the
/// content query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub preferred_categories: String,
    pub preferred_cities: String,
    pub interests: Vec<String>,
}

impl UserProfile {
    /// Whether the profile carries any content signal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferred_categories.is_empty()
            && self.preferred_cities.is_empty()
            && self.interests.is_empty()
    }

    /// Render the profile as a single content query string.
    #[must_use]
    pub fn as_query_text(&self) -> String {
        format!(
            "{} {} {}",
            self.preferred_categories,
            self.preferred_cities,
            self.interests.join(" ")
        )
    }
}

/// Accumulates weights per key, remembering first-encounter order so
/// equal weights rank reproducibly.
#[derive(Debug, Default)]
struct WeightBag {
    entries: Vec<(String, f64)>,
    slots: HashMap<String, usize>,
}

impl WeightBag {
    fn add(&mut self, key: &str, weight: f64) {
        if let Some(&slot) = self.slots.get(key) {
            self.entries[slot].1 += weight;
        } else {
            self.slots.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), weight));
        }
    }

    fn ranked_keys(mut self) -> Vec<String> {
        self.entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
        });
        self.entries.into_iter().map(|(key, _)| key).collect()
    }
}

/// Build the profile for `user_id` from the feed snapshots.
///
/// Reviews whose business cannot be resolved are skipped. A user with
/// no reviews gets an empty profile, which callers treat as "no
/// content signal", not an error.
///
/// # Examples
///
/// ```
/// use recomendar::feed::{Business, Review};
/// use recomendar::profile::build_user_profile;
///
/// let businesses = vec![
///     Business::new("b1", "Blue Bottle", "Coffee").with_city("Lisbon"),
///     Business::new("b2", "Iron Temple", "Fitness").with_city("Porto"),
/// ];
/// let reviews = vec![
///     Review::new("u1", "b1", 5.0),
///     Review::new("u1", "b2", 2.0),
/// ];
///
/// let profile = build_user_profile("u1", &reviews, &businesses);
/// assert_eq!(profile.preferred_categories, "Coffee Fitness");
/// assert_eq!(profile.preferred_cities, "Lisbon Porto");
/// assert_eq!(profile.interests, vec!["Coffee", "Fitness"]);
/// ```
#[must_use]
pub fn build_user_profile(
    user_id: &str,
    reviews: &[Review],
    businesses: &[Business],
) -> UserProfile {
    let user_reviews: Vec<&Review> = reviews.iter().filter(|r| r.user_id == user_id).collect();
    if user_reviews.is_empty() {
        return UserProfile::default();
    }

    let mut business_by_id: HashMap<&str, &Business> = HashMap::new();
    for business in businesses {
        business_by_id
            .entry(business.business_id.as_str())
            .or_insert(business);
    }

    let mut categories = WeightBag::default();
    let mut cities = WeightBag::default();
    let mut reviewed_ids: HashSet<&str> = HashSet::new();
    for review in &user_reviews {
        let Some(business) = business_by_id.get(review.business_id.as_str()) else {
            debug!(
                business_id = %review.business_id,
                "review references an unknown business, skipping"
            );
            continue;
        };
        reviewed_ids.insert(business.business_id.as_str());
        if !business.category.is_empty() {
            categories.add(&business.category, review.rating);
        }
        if let Some(city) = business.city.as_deref().filter(|c| !c.is_empty()) {
            cities.add(city, review.rating);
        }
    }

    // One interest entry per distinct reviewed business, in feed order.
    let mut interests = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for business in businesses {
        if reviewed_ids.contains(business.business_id.as_str())
            && seen.insert(business.business_id.as_str())
            && !business.category.is_empty()
        {
            interests.push(business.category.clone());
        }
    }

    UserProfile {
        preferred_categories: categories.ranked_keys().join(" "),
        preferred_cities: cities.ranked_keys().join(" "),
        interests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn businesses() -> Vec<Business> {
        vec![
            Business::new("cafe_a", "Blue Bottle", "Coffee").with_city("Lisbon"),
            Business::new("cafe_b", "Bean Scene", "Coffee").with_city("Lisbon"),
            Business::new("gym_a", "Iron Temple", "Fitness").with_city("Porto"),
        ]
    }

    #[test]
    fn test_zero_reviews_gives_empty_profile() {
        let profile = build_user_profile("nobody", &[], &businesses());
        assert!(profile.is_empty());
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_single_strong_rating_outweighs_repeat_weak_ones() {
        // One 5-star coffee visit vs two 2-star gym visits: 5 > 4.
        let reviews = vec![
            Review::new("u1", "gym_a", 2.0),
            Review::new("u1", "gym_a", 2.0),
            Review::new("u1", "cafe_a", 5.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.preferred_categories, "Coffee Fitness");
        assert_eq!(profile.preferred_cities, "Lisbon Porto");
    }

    #[test]
    fn test_interests_repeat_per_distinct_business() {
        let reviews = vec![
            Review::new("u1", "cafe_a", 4.0),
            Review::new("u1", "cafe_b", 3.0),
            Review::new("u1", "gym_a", 5.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.interests, vec!["Coffee", "Coffee", "Fitness"]);
    }

    #[test]
    fn test_rereviewed_business_counts_once_in_interests() {
        let reviews = vec![
            Review::new("u1", "cafe_a", 4.0),
            Review::new("u1", "cafe_a", 5.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.interests, vec!["Coffee"]);
        // Both ratings still count toward the category weight.
        assert_eq!(profile.preferred_categories, "Coffee");
    }

    #[test]
    fn test_unresolvable_review_is_skipped() {
        let reviews = vec![
            Review::new("u1", "ghost_business", 5.0),
            Review::new("u1", "gym_a", 3.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.preferred_categories, "Fitness");
        assert_eq!(profile.interests, vec!["Fitness"]);
    }

    #[test]
    fn test_only_unresolvable_reviews_give_blank_profile() {
        let reviews = vec![Review::new("u1", "ghost_business", 5.0)];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert!(profile.is_empty());
    }

    #[test]
    fn test_other_users_reviews_are_ignored() {
        let reviews = vec![
            Review::new("u1", "cafe_a", 5.0),
            Review::new("u2", "gym_a", 5.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.preferred_categories, "Coffee");
    }

    #[test]
    fn test_equal_weights_keep_first_encounter_order() {
        let reviews = vec![
            Review::new("u1", "gym_a", 3.0),
            Review::new("u1", "cafe_a", 3.0),
        ];
        let profile = build_user_profile("u1", &reviews, &businesses());
        assert_eq!(profile.preferred_categories, "Fitness Coffee");
    }

    #[test]
    fn test_query_text_joins_all_signals() {
        let reviews = vec![Review::new("u1", "cafe_a", 5.0)];
        let profile = build_user_profile("u1", &reviews, &businesses());
        let text = profile.as_query_text();
        assert!(text.contains("Coffee"));
        assert!(text.contains("Lisbon"));
    }

    #[test]
    fn test_missing_city_contributes_nothing() {
        let businesses = vec![Business::new("b1", "Nowhere Diner", "Food")];
        let reviews = vec![Review::new("u1", "b1", 4.0)];
        let profile = build_user_profile("u1", &reviews, &businesses);
        assert_eq!(profile.preferred_categories, "Food");
        assert!(profile.preferred_cities.is_empty());
    }
}
