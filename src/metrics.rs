//! Regression metrics for rating prediction quality.
//!
//! The trainer holds out a slice of reviews and scores the fitted
//! predictor against the known ratings with these functions.

/// Mean squared error between predictions and true values.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
///
/// # Examples
///
/// ```
/// use recomendar::metrics::mean_squared_error;
///
/// let predictions = [3.0, 4.0, 5.0];
/// let actuals = [3.0, 4.0, 4.0];
/// assert!((mean_squared_error(&predictions, &actuals) - 1.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn mean_squared_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    assert_eq!(
        predictions.len(),
        actuals.len(),
        "predictions and actuals must have the same length"
    );
    assert!(!predictions.is_empty(), "inputs must not be empty");

    let sum: f64 = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    sum / predictions.len() as f64
}

/// Root mean squared error between predictions and true values.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
#[must_use]
pub fn root_mean_squared_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    mean_squared_error(predictions, actuals).sqrt()
}

/// Mean absolute error between predictions and true values.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
///
/// # Examples
///
/// ```
/// use recomendar::metrics::mean_absolute_error;
///
/// let predictions = [2.0, 5.0];
/// let actuals = [3.0, 3.0];
/// assert!((mean_absolute_error(&predictions, &actuals) - 1.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    assert_eq!(
        predictions.len(),
        actuals.len(),
        "predictions and actuals must have the same length"
    );
    assert!(!predictions.is_empty(), "inputs must not be empty");

    let sum: f64 = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).abs())
        .sum();
    sum / predictions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_perfect_predictions() {
        let values = [1.0, 2.5, 4.0];
        assert!(mean_squared_error(&values, &values).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mse_known_value() {
        let predictions = [4.0, 2.0];
        let actuals = [3.0, 4.0];
        // errors 1 and -2, squares 1 and 4, mean 2.5
        assert!((mean_squared_error(&predictions, &actuals) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_is_sqrt_of_mse() {
        let predictions = [4.0, 2.0];
        let actuals = [3.0, 4.0];
        let rmse = root_mean_squared_error(&predictions, &actuals);
        assert!((rmse - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mae_known_value() {
        let predictions = [1.0, 5.0, 3.0];
        let actuals = [2.0, 3.0, 3.0];
        assert!((mean_absolute_error(&predictions, &actuals) - 1.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mse_length_mismatch_panics() {
        mean_squared_error(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_mae_empty_panics() {
        mean_absolute_error(&[], &[]);
    }
}
