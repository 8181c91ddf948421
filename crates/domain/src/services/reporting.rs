//! Pure derived-metric functions shared by the analytics route handlers.
//!
//! Everything here is deterministic and side-effect free; the handlers feed
//! in aggregate query results and serialize the output.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::analytics::{MonthlyCount, ScoreBucket};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace regex");
}

/// Fixed score-histogram bucket labels, in emission order. The last label is
/// the overflow bucket for scores outside [0, 100].
pub const SCORE_BUCKET_LABELS: [&str; 6] = ["0-19", "20-39", "40-59", "60-79", "80-100", "other"];

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `whole`, rounded to two decimals. Zero when the
/// denominator is zero.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

/// Average of `total` over `count` items, rounded to two decimals. Zero when
/// there are no items.
pub fn safe_average(total: f64, count: i64) -> f64 {
    if count == 0 {
        0.0
    } else {
        round2(total / count as f64)
    }
}

/// NPS composite: (promoters - detractors) / responses x 100, rounded to two
/// decimals. Zero when there are no responses.
pub fn nps_composite(promoters: i64, detractors: i64, responses: i64) -> f64 {
    if responses == 0 {
        0.0
    } else {
        round2((promoters - detractors) as f64 / responses as f64 * 100.0)
    }
}

/// Format a display name from first/last parts.
///
/// Non-empty parts join with exactly one space; internal runs of whitespace
/// collapse to single spaces. A missing part never produces a leading,
/// trailing, or double space.
pub fn display_name(first_name: &str, last_name: &str) -> String {
    let joined = [first_name.trim(), last_name.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    WHITESPACE.replace_all(&joined, " ").into_owned()
}

/// Zero-fill the fixed score-histogram buckets from sparse grouped counts.
///
/// Emits all six buckets in [`SCORE_BUCKET_LABELS`] order; labels outside
/// the fixed set fold into the `other` overflow bucket.
pub fn fill_score_buckets(sparse: &[(String, i64)]) -> Vec<ScoreBucket> {
    SCORE_BUCKET_LABELS
        .iter()
        .map(|label| {
            let count = if *label == "other" {
                sparse
                    .iter()
                    .filter(|(bucket, _)| !SCORE_BUCKET_LABELS[..5].contains(&bucket.as_str()))
                    .map(|(_, count)| count)
                    .sum()
            } else {
                sparse
                    .iter()
                    .find(|(bucket, _)| bucket == label)
                    .map(|(_, count)| *count)
                    .unwrap_or(0)
            };
            ScoreBucket {
                range: label.to_string(),
                count,
            }
        })
        .collect()
}

/// Densify a sparse monthly series against an inclusive (year, month) window.
///
/// The analytics endpoints deliberately return sparse series; consumers that
/// want one entry per month can run the sparse output through this.
pub fn densify_monthly(
    sparse: &[MonthlyCount],
    from: (i32, u32),
    to: (i32, u32),
) -> Vec<MonthlyCount> {
    let mut dense = Vec::new();
    let (mut year, mut month) = from;

    while (year, month) <= to {
        let count = sparse
            .iter()
            .find(|entry| entry.year == year && entry.month == month)
            .map(|entry| entry.count)
            .unwrap_or(0);
        dense.push(MonthlyCount { year, month, count });

        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    dense
}
