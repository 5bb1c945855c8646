//! The pure ranking function.
//!
//! `final_score = round2(base * type_multiplier + freshness + engagement)`,
//! deterministic given the content, its metrics, and an explicit "now".

use chrono::{DateTime, Utc};

use trove_types::{Content, ContentMetrics, ContentType, FreshnessWeights, ScoringConfig};

/// Round to two decimal places, the precision stored on every metrics row.
#[must_use]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Deterministic scoring of one content given its engagement metrics.
///
/// The function never fails for well-formed inputs: negative stored axes
/// clamp to zero in the base term, and a missing publication time simply
/// contributes no freshness bonus.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    video_multiplier: f64,
    text_multiplier: f64,
    freshness: FreshnessWeights,
}

impl ScoringEngine {
    /// Build an engine from scoring configuration.
    #[must_use]
    pub const fn new(cfg: &ScoringConfig) -> Self {
        Self {
            video_multiplier: cfg.video_multiplier,
            text_multiplier: cfg.text_multiplier,
            freshness: cfg.freshness,
        }
    }

    /// Compute the final score of `content` at `now`.
    ///
    /// Pure: repeated calls with identical inputs yield identical output.
    #[must_use]
    pub fn calculate(
        &self,
        content: &Content,
        metrics: &ContentMetrics,
        now: DateTime<Utc>,
    ) -> f64 {
        let base = Self::base_score(content.content_type, metrics);
        let multiplier = self.type_multiplier(content.content_type);
        let freshness = self.freshness_score(content.published_at, now);
        let engagement = Self::engagement_score(content.content_type, metrics);
        round2(base * multiplier + freshness + engagement)
    }

    fn base_score(content_type: ContentType, m: &ContentMetrics) -> f64 {
        match content_type {
            ContentType::Video => {
                let views = m.views.max(0) as f64;
                let likes = m.likes.max(0) as f64;
                views / 1000.0 + likes / 100.0
            }
            ContentType::Text => {
                let reading_time = f64::from(m.reading_time.max(0));
                let reactions = f64::from(m.reactions.max(0));
                reading_time + reactions / 50.0
            }
        }
    }

    const fn type_multiplier(&self, content_type: ContentType) -> f64 {
        match content_type {
            ContentType::Video => self.video_multiplier,
            ContentType::Text => self.text_multiplier,
        }
    }

    fn freshness_score(&self, published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(published) = published_at else {
            return 0.0;
        };
        let days = (now - published).num_seconds() as f64 / 86_400.0;
        if days <= 7.0 {
            self.freshness.within_week
        } else if days <= 30.0 {
            self.freshness.within_month
        } else if days <= 90.0 {
            self.freshness.within_quarter
        } else {
            0.0
        }
    }

    fn engagement_score(content_type: ContentType, m: &ContentMetrics) -> f64 {
        match content_type {
            ContentType::Video => {
                if m.views > 0 {
                    (m.likes.max(0) as f64 / m.views as f64) * 10.0
                } else {
                    0.0
                }
            }
            ContentType::Text => {
                if m.reading_time > 0 {
                    (f64::from(m.reactions.max(0)) / f64::from(m.reading_time)) * 5.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl From<&ScoringConfig> for ScoringEngine {
    fn from(cfg: &ScoringConfig) -> Self {
        Self::new(cfg)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use proptest::prelude::*;

    use super::*;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(&ScoringConfig::default())
    }

    fn content(content_type: ContentType, published_at: Option<DateTime<Utc>>) -> Content {
        let now = Utc::now();
        Content {
            id: 1,
            provider_id: "provider1".into(),
            provider_content_id: "c1".into(),
            title: "t".into(),
            content_type,
            description: None,
            url: None,
            thumbnail_url: None,
            published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn metrics(views: i64, likes: i64, reading_time: i32, reactions: i32) -> ContentMetrics {
        let now = Utc::now();
        ContentMetrics {
            id: 1,
            content_id: 1,
            views,
            likes,
            reading_time,
            reactions,
            final_score: 0.0,
            recalculated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_video_with_heavy_engagement() {
        let now = Utc::now();
        let c = content(ContentType::Video, Some(now - Duration::days(3)));
        let m = metrics(100_000, 5_000, 0, 0);

        // (100 + 50) * 1.5 + 5 + (5000/100000)*10 = 230.50
        let score = engine().calculate(&c, &m, now);
        assert!((score - 230.50).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn old_text_with_low_engagement() {
        let now = Utc::now();
        let c = content(ContentType::Text, Some(now - Duration::days(180)));
        let m = metrics(0, 0, 5, 10);

        // (5 + 10/50) * 1.0 + 0 + (10/5)*5 = 15.20
        let score = engine().calculate(&c, &m, now);
        assert!((score - 15.20).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn freshness_boundaries_use_the_lower_bucket() {
        let now = Utc::now();
        let e = engine();
        let m = metrics(0, 0, 0, 0);

        for (days, expected) in [(7, 5.0), (30, 3.0), (90, 1.0), (91, 0.0)] {
            let c = content(ContentType::Video, Some(now - Duration::days(days)));
            let score = e.calculate(&c, &m, now);
            assert!((score - expected).abs() < 1e-9, "{days} days: got {score}");
        }
    }

    #[test]
    fn missing_publication_time_earns_no_freshness() {
        let now = Utc::now();
        let c = content(ContentType::Text, None);
        let score = engine().calculate(&c, &metrics(0, 0, 0, 0), now);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn negative_axes_clamp_to_zero_in_the_base() {
        let now = Utc::now();
        let c = content(ContentType::Video, None);
        let score = engine().calculate(&c, &metrics(-10, -5, 0, 0), now);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn zero_views_skip_the_engagement_ratio() {
        let now = Utc::now();
        let c = content(ContentType::Video, None);
        // likes without views: base counts them, the ratio does not divide.
        let score = engine().calculate(&c, &metrics(0, 100, 0, 0), now);
        assert!((score - 1.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn scoring_is_pure() {
        let now = Utc::now();
        let c = content(ContentType::Video, Some(now - Duration::days(3)));
        let m = metrics(12_345, 678, 0, 0);
        let e = engine();

        let first = e.calculate(&c, &m, now);
        for _ in 0..10 {
            assert_eq!(e.calculate(&c, &m, now), first);
        }
    }

    proptest! {
        #[test]
        fn scores_are_non_negative_with_two_decimals(
            views in 0i64..1_000_000_000,
            likes in 0i64..1_000_000_000,
            reading_time in 0i32..100_000,
            reactions in 0i32..100_000,
            days in 0i64..1000,
            video in proptest::bool::ANY,
        ) {
            let now = Utc::now();
            let kind = if video { ContentType::Video } else { ContentType::Text };
            let c = content(kind, Some(now - Duration::days(days)));
            let score = engine().calculate(&c, &metrics(views, likes, reading_time, reactions), now);

            prop_assert!(score >= 0.0);
            let cents = score * 100.0;
            prop_assert!((cents - cents.round()).abs() < 1e-6);
        }
    }
}
