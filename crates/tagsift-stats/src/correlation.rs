//! Linear and rank correlation between numeric series
//!
//! Correlations are computed over pairwise-complete observations: a row
//! contributes only when both series have a non-missing (`!NaN`) value.
//! A correlation is undefined when fewer than two complete pairs remain or
//! when either side has zero variance over those pairs.

/// Correlation coefficient used to build a [`CorrelationMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Linear (product-moment) correlation.
    #[default]
    Pearson,
    /// Pearson correlation of the average ranks; captures monotone
    /// non-linear relations.
    Spearman,
}

impl Method {
    /// Coefficient of two equally long series, `None` if undefined.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `y` have different lengths.
    #[must_use]
    pub fn coefficient(self, x: &[f64], y: &[f64]) -> Option<f64> {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => spearman(x, y),
        }
    }
}

/// Pearson sample correlation coefficient of two equally long series.
///
/// Rows where either value is `NaN` are skipped.
///
/// # Returns
///
/// * `Some(r)` with `-1.0 <= r <= 1.0`
/// * `None` - if the correlation is undefined
///
/// # Panics
///
/// Panics if `x` and `y` have different lengths.
///
/// # Examples
///
/// ```
/// use tagsift_stats::correlation::pearson;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [2.0, 4.0, 6.0, 8.0];
/// assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
///
/// let constant = [5.0, 5.0, 5.0, 5.0];
/// assert_eq!(pearson(&x, &constant), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    assert_eq!(x.len(), y.len(), "series must have the same length");

    let pairs = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .collect::<Vec<_>>();
    let (first_x, first_y) = *pairs.first()?;
    if pairs.len() < 2
        || pairs.iter().all(|(a, _)| *a == first_x)
        || pairs.iter().all(|(_, b)| *b == first_y)
    {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let (dx, dy) = (a - mean_x, b - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Spearman rank correlation coefficient of two equally long series.
///
/// Rows where either value is `NaN` are skipped before ranking. Tied values
/// share the average of their ranks.
///
/// # Panics
///
/// Panics if `x` and `y` have different lengths.
///
/// # Examples
///
/// ```
/// use tagsift_stats::correlation::spearman;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let cubed = [1.0, 8.0, 27.0, 64.0];
/// assert!((spearman(&x, &cubed).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    assert_eq!(x.len(), y.len(), "series must have the same length");

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip();
    pearson(&average_ranks(&xs), &average_ranks(&ys))
}

/// 1-based ranks of `values` (no `NaN`), ties sharing their mean rank.
#[expect(clippy::cast_precision_loss)]
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Square matrix of pairwise correlations between named series.
///
/// Undefined correlations are stored as `NaN` and reported as `None` by the
/// accessors. The diagonal is exactly `1.0` for every series with a defined
/// self-correlation.
///
/// # Examples
///
/// ```
/// use tagsift_stats::correlation::CorrelationMatrix;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [3.0, 2.0, 1.0];
/// let matrix = CorrelationMatrix::from_series([("a", &a[..]), ("b", &b[..])]);
///
/// assert_eq!(matrix.get("a", "a"), Some(1.0));
/// assert!((matrix.get("a", "b").unwrap() + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    /// Row-major `names.len() x names.len()` values.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Computes the full Pearson correlation matrix of the given series.
    ///
    /// # Panics
    ///
    /// Panics if the series have different lengths.
    #[must_use]
    pub fn from_series<'a, I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a [f64])>,
        S: Into<String>,
    {
        Self::with_method(Method::Pearson, series)
    }

    /// Computes the full correlation matrix of the given series using
    /// `method`.
    ///
    /// # Panics
    ///
    /// Panics if the series have different lengths.
    #[must_use]
    pub fn with_method<'a, I, S>(method: Method, series: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a [f64])>,
        S: Into<String>,
    {
        let (names, columns): (Vec<String>, Vec<&[f64]>) = series
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .unzip();
        let size = names.len();
        let mut values = vec![f64::NAN; size * size];
        for i in 0..size {
            for j in i..size {
                let r = match method.coefficient(columns[i], columns[j]) {
                    Some(_) if i == j => 1.0,
                    Some(r) => r,
                    None => f64::NAN,
                };
                values[i * size + j] = r;
                values[j * size + i] = r;
            }
        }
        Self { names, values }
    }

    /// Series names, in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the matrix has no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a series in the matrix.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Correlation between two series, `None` if unknown or undefined.
    #[must_use]
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let (i, j) = (self.index_of(row)?, self.index_of(col)?);
        self.get_by_index(i, j)
    }

    /// Correlation at a matrix position, `None` if undefined.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get_by_index(&self, row: usize, col: usize) -> Option<f64> {
        assert!(row < self.len() && col < self.len(), "index out of bounds");
        let r = self.values[row * self.len() + col];
        (!r.is_nan()).then_some(r)
    }

    /// All defined correlations of one series, in matrix order.
    ///
    /// Returns `None` if the series is not part of the matrix.
    #[must_use]
    pub fn correlations_with(&self, name: &str) -> Option<Vec<(&str, f64)>> {
        let i = self.index_of(name)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .filter_map(|(j, other)| Some((other.as_str(), self.get_by_index(i, j)?)))
                .collect(),
        )
    }

    /// Square sub-matrix restricted to `names`, in the given order.
    ///
    /// Names that are not part of the matrix are skipped.
    #[must_use]
    pub fn subset<S>(&self, names: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let indices = names
            .iter()
            .filter_map(|name| self.index_of(name.as_ref()))
            .collect::<Vec<_>>();
        let names = indices.iter().map(|&i| self.names[i].clone()).collect();
        let size = indices.len();
        let mut values = Vec::with_capacity(size * size);
        for &i in &indices {
            for &j in &indices {
                values.push(self.values[i * self.len() + j]);
            }
        }
        Self { names, values }
    }

    /// Iterates over rows as `(name, values)`, undefined entries as `None`.
    pub fn rows(&self) -> impl Iterator<Item = (&str, Vec<Option<f64>>)> + '_ {
        self.names.iter().enumerate().map(|(i, name)| {
            let row = (0..self.len()).map(|j| self.get_by_index(i, j)).collect();
            (name.as_str(), row)
        })
    }
}
