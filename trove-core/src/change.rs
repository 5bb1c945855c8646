//! Engagement change-significance detection.
//!
//! Decides whether a freshly fetched engagement snapshot differs enough
//! from the stored one to justify a metrics update and score recalculation.

use trove_types::{ChangeThresholds, EngagementSnapshot};

/// Whether `new` differs significantly from `old` under `thresholds`.
///
/// Reading time is load-bearing for text scoring, so any change counts.
/// For views, likes, and reactions, a change is significant when the
/// absolute delta reaches the per-axis threshold, or when the relative
/// delta reaches the percent threshold. When the old value is zero the
/// relative delta is undefined and any positive change counts.
#[must_use]
pub fn has_changed(
    old: &EngagementSnapshot,
    new: &EngagementSnapshot,
    thresholds: &ChangeThresholds,
) -> bool {
    if old.reading_time != new.reading_time {
        return true;
    }
    significant(old.views, new.views, thresholds.percent, thresholds.abs_views)
        || significant(old.likes, new.likes, thresholds.percent, thresholds.abs_likes)
        || significant(
            i64::from(old.reactions),
            i64::from(new.reactions),
            thresholds.percent,
            thresholds.abs_reactions,
        )
}

fn significant(old: i64, new: i64, percent: u32, abs: i64) -> bool {
    let diff = (new - old).abs();
    if diff >= abs {
        return true;
    }
    if old == 0 {
        return diff > 0;
    }
    (diff as f64 / old as f64) * 100.0 >= f64::from(percent)
}
