/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points. Missing values (`NaN`) are ignored
/// when the percentiles are computed.
///
/// # Examples
///
/// ```
/// use tagsift_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(5.5));
/// assert_eq!(percentiles.get(25.0), Some(3.25));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Percentile-value pairs, in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    /// The value is `None` when the dataset had no non-missing values.
    values: Vec<(f64, Option<f64>)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Arguments
    ///
    /// * `sorted_values` - Non-missing values sorted in ascending order
    /// * `percentile_points` - The percentile points to compute (e.g., [25.0, 50.0, 75.0])
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values, skipping `NaN`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsift_stats::percentiles::Percentiles;
    ///
    /// let values = vec![5.0, f64::NAN, 2.0, 8.0, 1.0, 9.0];
    /// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(5.0));
    /// ```
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let sorted = sorted_non_missing(values.iter().copied());
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed or the dataset
    /// had no non-missing values.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsift_stats::percentiles::Percentiles;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    /// let percentiles = Percentiles::new(&values, &[50.0, 95.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(3.0));
    /// assert_eq!(percentiles.get(25.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                *value
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.values.iter().copied()
    }
}

/// Collects the non-missing values of an iterator, sorted ascending.
#[must_use]
pub fn sorted_non_missing<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted = values.into_iter().filter(|v| !v.is_nan()).collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: for `n` values
/// the `k`-th percentile sits at fractional position `(n - 1) * k / 100`.
/// This matches the default method of NumPy's `percentile` and pandas'
/// `quantile`.
///
/// Returns `None` if the input is empty.
///
/// # Examples
///
/// ```
/// use tagsift_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 100.0];
///
/// assert_eq!(compute_percentile(&values, 25.0), Some(2.0));
/// assert_eq!(compute_percentile(&values, 75.0), Some(4.0));
/// assert_eq!(compute_percentile(&[], 50.0), None);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let (lo_value, hi_value) = (sorted_values[lo], sorted_values[hi.min(last)]);
    Some(lo_value + (hi_value - lo_value) * (position - lo as f64))
}
