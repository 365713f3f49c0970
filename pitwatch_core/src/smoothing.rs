//! Trailing moving average used to denoise a series before the trend fit.
//!
//! `out[i] = mean(in[max(0, i - w + 1) ..= i])`. The window shrinks near the
//! start (no padding, no look-ahead) and timestamps pass through unchanged.

use crate::history::Point;

/// Smooth `points` with a trailing window of `window` samples.
/// A window of 0 is treated as 1 (identity).
pub fn smooth(points: &[Point], window: usize) -> Vec<Point> {
    let w = window.max(1);
    if w == 1 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    let mut sum = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        if i >= w && i % w == 0 {
            // Resync so cancellation error never outlives one window.
            sum = points[i + 1 - w..=i].iter().map(|q| q.value).sum();
        } else {
            sum += p.value;
            if i >= w {
                sum -= points[i - w].value;
            }
        }
        let n = (i + 1).min(w);
        out.push(Point::new(p.timestamp, sum / n as f64));
    }
    out
}

/// Reference O(N·W) form; used by tests to pin the running-sum variant.
#[cfg(test)]
fn smooth_naive(points: &[Point], window: usize) -> Vec<Point> {
    let w = window.max(1);
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let start = (i + 1).saturating_sub(w);
            let slice = &points[start..=i];
            let avg = slice.iter().map(|q| q.value).sum::<f64>() / slice.len() as f64;
            Point::new(p.timestamp, avg)
        })
        .collect()
}
