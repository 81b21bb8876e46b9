//! Support for creating Atom feeds from a list of posts.

use crate::config::Author;
use crate::post::Post;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`]. This function
/// takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(
    config: FeedConfig,
    posts: &[Post],
    w: W,
) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[Post]) -> Result<Feed> {
    use std::collections::BTreeMap;
    Ok(Feed {
        entries: feed_entries(&config, posts)?,
        title: config.title.into(),
        id: config.id,
        updated: FixedOffset::east(0).from_utc_datetime(&Utc::now().naive_utc()),
        authors: author_to_people(config.author),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        extensions: BTreeMap::new(),
        namespaces: BTreeMap::new(),
        base: None,
        lang: None,
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: None,
            mime_type: None,
            length: None,
        }],
    })
}

fn feed_entries(config: &FeedConfig, posts: &[Post]) -> Result<Vec<Entry>> {
    use std::collections::BTreeMap;
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        let (summary, _) = post.summary();
        let date = entry_date(post)?;
        let url = config
            .home_page
            .join(&format!("{}/", post.key))?;

        entries.push(Entry {
            id: url.to_string(),
            title: match &post.title {
                Some(title) => title.clone(),
                None => post.key.clone(),
            }
            .into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: url.to_string(),
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: Some(summary.to_owned().into()),
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: None,
            extensions: BTreeMap::new(),
        })
    }
    Ok(entries)
}

/// Converts a post's epoch timestamp into the fixed-offset (UTC) date-time
/// the Atom format wants.
fn entry_date(post: &Post) -> Result<DateTime<FixedOffset>> {
    match post.datetime() {
        Some(datetime) => {
            Ok(FixedOffset::east(0).from_utc_datetime(&datetime.naive_utc()))
        }
        None => Err(Error::MalformedPost {
            key: post.key.clone(),
            timestamp: post.timestamp,
        }),
    }
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, URL,
/// and timestamp issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when a post URL cannot be joined onto the home page URL.
    Url(url::ParseError),

    /// Returned when a post's timestamp is not a valid UTC instant.
    MalformedPost { key: String, timestamp: i64 },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::MalformedPost { key, timestamp } => write!(
                f,
                "post `{}`: timestamp {} is not a valid UTC instant",
                key, timestamp
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Url(err) => Some(err),
            Error::MalformedPost { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    #[test]
    fn test_feed_entries() -> Result<()> {
        let posts = vec![Post {
            key: "hello-world".to_owned(),
            timestamp: Utc.ymd(2014, 8, 2).and_hms(10, 17, 0).timestamp(),
            title: Some("Hello, world".to_owned()),
            body: "Body.".to_owned(),
            tags: BTreeSet::new(),
        }];
        let config = FeedConfig {
            title: "My blog".to_owned(),
            id: "https://example.org/".to_owned(),
            author: None,
            home_page: Url::parse("https://example.org/").unwrap(),
        };
        let entries = feed_entries(&config, &posts)?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_str(), "Hello, world");
        assert_eq!(entries[0].id, "https://example.org/hello-world/");
        assert_eq!(
            entries[0].updated.to_rfc3339(),
            "2014-08-02T10:17:00+00:00"
        );
        Ok(())
    }
}
