use itertools::Itertools;

/// Indices of strict local maxima. The first and last element are never peaks.
pub fn find_peaks(series: &[f64]) -> Vec<usize> {
    series
        .iter()
        .tuple_windows()
        .enumerate()
        .filter(|(_, (prev, cur, next))| cur > prev && cur > next)
        .map(|(i, _)| i + 1)
        .collect()
}
