//! Numeric kernels behind the correlation matrix and histogram charts.

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient of two row-aligned columns, computed
/// over the rows where both values are finite. NaN when fewer than two such
/// rows exist or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len() as f64;
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Full pairwise correlation matrix. Symmetric, with the diagonal pinned to
/// exactly 1.0; off-diagonal cells are NaN where [`pearson`] is undefined.
pub fn correlation_matrix(columns: &[&[f64]]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(columns[i], columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Equal-width bins over the finite values of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Lower edge of the first bin.
    pub start: f64,
    /// Width of every bin.
    pub width: f64,
    /// Value count per bin.
    pub counts: Vec<usize>,
}

/// Bin the finite values of `values` into `bins` equal-width buckets.
/// Returns None when there are no finite values. A constant column gets a
/// unit-wide range centered on the value so the single occupied bin still
/// draws.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max) = bounds(&finite)?;

    let (start, range) = if min == max {
        (min - 0.5, 1.0)
    } else {
        (min, max - min)
    };
    let width = range / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - start) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram {
        start,
        width,
        counts,
    })
}

/// Min and max of a slice of finite values; None when empty.
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_column_correlates_perfectly_with_itself() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let matrix = correlation_matrix(&[&a, &a]);
        assert_eq!(matrix[0][0], 1.0);
        assert_eq!(matrix[1][1], 1.0);
        assert!((matrix[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 1.0, 4.0, 3.0, 5.0];
        let c = [-1.0, 0.5, 2.0, -3.0, 1.0];
        let matrix = correlation_matrix(&[&a, &b, &c]);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
    }

    #[test]
    fn anticorrelated_columns_hit_minus_one() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        assert!((pearson(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_is_nan() {
        let flat = [2.0, 2.0, 2.0];
        let ramp = [1.0, 2.0, 3.0];
        assert!(pearson(&flat, &ramp).is_nan());
        // But the diagonal stays 1.0 even for a flat column.
        assert_eq!(correlation_matrix(&[&flat, &ramp])[0][0], 1.0);
    }

    #[test]
    fn nan_rows_are_ignored_pairwise() {
        let a = [1.0, f64::NAN, 3.0, 4.0];
        let b = [1.0, 100.0, 3.0, 4.0];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_counts_cover_every_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, 1.0];
        let hist = histogram(&values, 4).unwrap();
        assert_eq!(hist.counts.len(), 4);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        // Maximum lands in the last bin, not one past the end.
        assert_eq!(hist.counts[3], 3);
    }

    #[test]
    fn histogram_of_constant_column_occupies_one_bin() {
        let hist = histogram(&[5.0, 5.0, 5.0], 10).unwrap();
        assert_eq!(hist.counts.iter().sum::<usize>(), 3);
        assert_eq!(hist.counts.iter().filter(|&&c| c > 0).count(), 1);
    }

    #[test]
    fn histogram_of_all_nan_is_none() {
        assert!(histogram(&[f64::NAN, f64::NAN], 5).is_none());
        assert!(histogram(&[], 5).is_none());
    }
}
