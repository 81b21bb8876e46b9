//! Defines the [`Post`] type, the unit of content for the whole crate. A
//! [`Post`] is an immutable snapshot read out of the post store; everything
//! downstream (indexing, pagination, rendering, the feed) borrows it and
//! nothing mutates it.

use chrono::{DateTime, LocalResult, TimeZone, Utc};
use std::collections::BTreeSet;

/// A single blog post. The `key` doubles as the post's stable identifier and
/// its output path segment (the permalink page for a post lives at
/// `{key}/index.html`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The post's unique slug.
    pub key: String,

    /// Publication time in seconds since the Unix epoch, UTC.
    pub timestamp: i64,

    /// The post's title, if any.
    pub title: Option<String>,

    /// The markdown body. Opaque to indexing and pagination; only the
    /// renderer interprets it.
    pub body: String,

    /// The post's tags. Membership is order-insignificant; index nodes are
    /// keyed by tag value.
    pub tags: BTreeSet<String>,
}

impl Post {
    /// Interprets the post's timestamp as a UTC instant. Returns [`None`]
    /// when the timestamp is outside the representable range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match Utc.timestamp_opt(self.timestamp, 0) {
            LocalResult::Single(datetime) => Some(datetime),
            _ => None,
        }
    }

    /// Returns the portion of the body above the fold and whether a fold
    /// marker was found. Index pages show the summary; permalink pages show
    /// the whole body.
    pub fn summary(&self) -> (&str, bool) {
        const FOLD_TAG: &str = "<!-- more -->";
        match self.body.find(FOLD_TAG) {
            Some(i) => (&self.body[..i], true),
            None => (&self.body, false),
        }
    }
}
