//! Property-based tests using proptest.
//!
//! These tests verify invariants of candidate generation, the stage
//! merge, and the end-to-end recommendation path.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use recomendar::engine::{candidate_ids, merge_stages, round_score};
use recomendar::prelude::*;

const CATEGORIES: &[&str] = &["coffee", "fitness", "food", "nightlife", "books"];
const CITIES: &[&str] = &["lisbon", "porto", "braga", "faro"];

// Strategy for ratings on the 1-5 scale in 0.1 steps
fn rating_strategy() -> impl Strategy<Value = f64> {
    (10u32..=50).prop_map(|r| f64::from(r) / 10.0)
}

// Strategy for a catalog plus reviews that reference it
fn corpus_strategy() -> impl Strategy<Value = (Vec<Review>, Vec<Business>)> {
    (1usize..8).prop_flat_map(|n_businesses| {
        let businesses: Vec<Business> = (0..n_businesses)
            .map(|i| {
                Business::new(
                    format!("b{i}"),
                    format!("Place {i}"),
                    CATEGORIES[i % CATEGORIES.len()],
                )
                .with_city(CITIES[i % CITIES.len()])
            })
            .collect();
        proptest::collection::vec((0usize..4, 0..n_businesses, rating_strategy()), 1..30).prop_map(
            move |raw| {
                let reviews = raw
                    .into_iter()
                    .map(|(user, business, rating)| {
                        Review::new(format!("u{user}"), format!("b{business}"), rating)
                    })
                    .collect();
                (reviews, businesses.clone())
            },
        )
    })
}

// Small fits keep the per-case cost down while exercising the full path.
fn engine_with_models(
    reviews: &[Review],
    businesses: &[Business],
) -> RecommendationEngine<InMemoryFeed> {
    let mut predictor = FunkSvd::new().with_factors(4).with_epochs(2);
    predictor.fit(reviews).expect("Test reviews should fit");
    let mut index = ContentIndex::new();
    index.fit(businesses).expect("Test catalog should fit");

    let engine =
        RecommendationEngine::new(InMemoryFeed::new(reviews.to_vec(), businesses.to_vec()));
    engine.install_models(FittedModels::new(predictor, index));
    engine
}

fn rated_by<'a>(user_id: &str, reviews: &'a [Review]) -> HashSet<&'a str> {
    reviews
        .iter()
        .filter(|r| r.user_id == user_id)
        .map(|r| r.business_id.as_str())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn recommendation_count_never_exceeds_top_n(
        (reviews, businesses) in corpus_strategy(),
        top_n in 1usize..8,
    ) {
        let engine = engine_with_models(&reviews, &businesses);
        let picks = engine.recommend("u0", top_n).expect("recommend");
        prop_assert!(picks.len() <= top_n);
    }

    #[test]
    fn rated_businesses_never_come_back(
        (reviews, businesses) in corpus_strategy(),
        top_n in 1usize..8,
    ) {
        let user = reviews[0].user_id.clone();
        let rated = rated_by(&user, &reviews);
        let engine = engine_with_models(&reviews, &businesses);

        let picks = engine.recommend(&user, top_n).expect("recommend");
        for pick in &picks {
            prop_assert!(!rated.contains(pick.business_id.as_str()));
        }
    }

    #[test]
    fn candidates_are_exactly_the_unrated_catalog(
        (reviews, businesses) in corpus_strategy(),
    ) {
        let rated = rated_by("u1", &reviews);
        let candidates = candidate_ids("u1", &reviews, &businesses);

        for id in &candidates {
            prop_assert!(!rated.contains(id.as_str()));
        }
        let expected = businesses
            .iter()
            .filter(|b| !rated.contains(b.business_id.as_str()))
            .count();
        prop_assert_eq!(candidates.len(), expected);
    }

    #[test]
    fn similar_to_never_returns_the_query(
        (_, businesses) in corpus_strategy(),
    ) {
        let mut index = ContentIndex::new();
        index.fit(&businesses).expect("fit");

        for business in &businesses {
            let similar = index
                .try_similar_to(&business.business_id, businesses.len())
                .expect("indexed id");
            for candidate in &similar {
                prop_assert_ne!(&candidate.business_id, &business.business_id);
            }
        }
    }

    #[test]
    fn merge_respects_stage_weights(
        s1 in rating_strategy(),
        s2 in 0.0f64..1.0,
    ) {
        let collaborative = vec![
            ScoredCandidate::new("both", s1),
            ScoredCandidate::new("solo_collab", s1),
        ];
        let content = vec![
            ScoredCandidate::new("both", s2),
            ScoredCandidate::new("solo_content", s2),
        ];
        let merged = merge_stages(&collaborative, &content, 0.7, 0.3, 10);

        let by_id: HashMap<&str, f64> = merged
            .iter()
            .map(|r| (r.business_id.as_str(), r.predicted_score))
            .collect();
        prop_assert_eq!(by_id["both"], round_score(0.7 * s1 + 0.3 * s2));
        prop_assert_eq!(by_id["solo_collab"], round_score(0.7 * s1));
        prop_assert_eq!(by_id["solo_content"], round_score(0.3 * s2));
    }

    #[test]
    fn merged_scores_are_sorted_descending(
        (reviews, businesses) in corpus_strategy(),
        top_n in 1usize..8,
    ) {
        let engine = engine_with_models(&reviews, &businesses);
        let picks = engine.recommend("u1", top_n).expect("recommend");
        for pair in picks.windows(2) {
            prop_assert!(pair[0].predicted_score >= pair[1].predicted_score);
        }
    }

    #[test]
    fn rounding_reports_two_decimals(score in -100.0f64..100.0) {
        let rounded = round_score(score);
        let scaled = rounded * 100.0;
        prop_assert!((scaled - scaled.round()).abs() < 1e-6);
        prop_assert!((rounded - score).abs() <= 0.005 + 1e-9);
    }

    #[test]
    fn identical_fits_recommend_identically(
        (reviews, businesses) in corpus_strategy(),
        top_n in 1usize..8,
    ) {
        let first = engine_with_models(&reviews, &businesses);
        let second = engine_with_models(&reviews, &businesses);

        let a = first.recommend("u2", top_n).expect("first engine");
        let b = second.recommend("u2", top_n).expect("second engine");
        prop_assert_eq!(&a, &b);

        let again = first.recommend("u2", top_n).expect("repeat call");
        prop_assert_eq!(&a, &again);
    }

    #[test]
    fn profile_categories_rank_by_accumulated_weight(
        (reviews, businesses) in corpus_strategy(),
    ) {
        let profile = build_user_profile("u0", &reviews, &businesses);

        let by_id: HashMap<&str, &Business> = businesses
            .iter()
            .map(|b| (b.business_id.as_str(), b))
            .collect();
        let mut weights: HashMap<&str, f64> = HashMap::new();
        for review in reviews.iter().filter(|r| r.user_id == "u0") {
            if let Some(business) = by_id.get(review.business_id.as_str()) {
                *weights.entry(business.category.as_str()).or_insert(0.0) += review.rating;
            }
        }

        let tokens: Vec<&str> = profile.preferred_categories.split_whitespace().collect();
        prop_assert_eq!(tokens.len(), weights.len());
        for pair in tokens.windows(2) {
            prop_assert!(weights[pair[0]] >= weights[pair[1]] - 1e-9);
        }
    }
}
