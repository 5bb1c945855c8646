//! trove-providers
//!
//! Concrete [`ContentProvider`](trove_core::ContentProvider) adapters for the
//! two canonical upstreams: a paginated JSON feed and an XML feed. Each
//! adapter owns its transport: URL composition, HTTP-client timeout,
//! status-code checks, and payload decoding.
#![warn(missing_docs)]

/// The JSON feed adapter ("provider1").
pub mod json_feed;
/// The XML feed adapter ("provider2").
pub mod xml_feed;

pub use json_feed::JsonFeedProvider;
pub use xml_feed::XmlFeedProvider;

use chrono::{DateTime, NaiveDate, Utc};

/// Parse an upstream publication timestamp.
///
/// Accepts RFC 3339 and plain `YYYY-MM-DD` (midnight UTC). When neither
/// parses, the current time is substituted and the substitution is logged.
pub(crate) fn parse_published(provider: &str, raw: &str) -> DateTime<Utc> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map_or_else(Utc::now, |dt| dt.and_utc());
    }
    tracing::warn!(provider, raw, "unparseable publication date; substituting now");
    Utc::now()
}
