//! The file-based post store. A blog's posts live in a single directory as
//! markdown files with YAML frontmatter:
//!
//! ```text
//! ---
//! title: My first post
//! date: 2014-08-02 10:17:00
//! tags: [octocat, rust]
//! ---
//!
//! Post body in markdown.
//! ```
//!
//! The file's base name is the post's key. The store guarantees the ordering
//! contract the index builder depends on: [`Store::load_posts`] returns
//! posts newest-first, sorted by timestamp descending with a stable sort.

use crate::post::Post;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

const MARKDOWN_EXTENSION: &str = ".md";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The YAML frontmatter block of a post file.
#[derive(Deserialize, Serialize)]
struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    date: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

/// A directory of post files.
pub struct Store {
    posts_directory: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(posts_directory: P) -> Store {
        Store {
            posts_directory: posts_directory.into(),
        }
    }

    /// Loads every post in the store, newest first.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut file_names: Vec<String> = Vec::new();
        for result in fs::read_dir(&self.posts_directory)? {
            let entry = result?;
            let os_file_name = entry.file_name();
            let file_name = os_file_name.to_string_lossy();
            if file_name.ends_with(MARKDOWN_EXTENSION) {
                file_names.push(file_name.into_owned());
            }
        }

        // Parse in file-name order so timestamp ties break the same way on
        // every platform; the stable sort below preserves that order.
        file_names.sort();

        let mut posts: Vec<Post> = Vec::with_capacity(file_names.len());
        for file_name in file_names {
            let key = file_name.trim_end_matches(MARKDOWN_EXTENSION);
            let contents = fs::read_to_string(self.posts_directory.join(&file_name))?;
            posts.push(parse_post(key, &contents).map_err(|e| {
                Error::Annotated(
                    format!("parsing post `{}`", file_name),
                    Box::new(e),
                )
            })?);
        }

        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(posts)
    }

    /// Creates a new post file from `post` and returns its path. Fails if a
    /// post with the same key already exists.
    pub fn create(&self, post: &Post) -> Result<PathBuf> {
        let path = self.post_path(&post.key);
        if path.exists() {
            return Err(Error::DuplicateKey(post.key.clone()));
        }
        let datetime = post.datetime().ok_or(Error::Timestamp {
            key: post.key.clone(),
            timestamp: post.timestamp,
        })?;
        let frontmatter = Frontmatter {
            title: post.title.clone(),
            date: datetime.format(DATETIME_FORMAT).to_string(),
            tags: post.tags.iter().cloned().collect(),
        };

        // serde_yaml emits the leading `---` document marker itself.
        let yaml = serde_yaml::to_string(&frontmatter)?;
        fs::create_dir_all(&self.posts_directory)?;
        fs::write(
            &path,
            format!("{}\n---\n\n{}", yaml.trim_end(), post.body),
        )?;
        Ok(path)
    }

    /// The path of the post file for `key`, whether or not it exists.
    pub fn post_path(&self, key: &str) -> PathBuf {
        self.posts_directory
            .join(format!("{}{}", key, MARKDOWN_EXTENSION))
    }
}

/// Parses a single post from its file contents. `key` is the file's base
/// name less the extension.
pub fn parse_post(key: &str, input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter =
        serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
    Ok(Post {
        key: key.to_owned(),
        timestamp: parse_date(&frontmatter.date)?,
        title: frontmatter.title,
        body: input[body_start..].trim_start().to_owned(),
        tags: frontmatter.tags.into_iter().collect(),
    })
}

/// Parses a frontmatter date into epoch seconds. Accepts a full date-time
/// or a bare date (interpreted as midnight UTC).
fn parse_date(date: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(date, DATETIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map(|d| d.and_hms(0, 0, 0))
        })
        .map(|dt| dt.timestamp())
        .map_err(|err| Error::Date {
            value: date.to_owned(),
            err,
        })
}

/// The result of a fallible store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or writing the post store.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post file does not begin with the `---` fence.
    FrontmatterMissingStartFence,

    /// Returned when a post file's frontmatter is never closed.
    FrontmatterMissingEndFence,

    /// Returned when frontmatter is not valid YAML or is missing fields.
    Frontmatter(serde_yaml::Error),

    /// Returned when a frontmatter date is in neither accepted format.
    Date {
        value: String,
        err: chrono::ParseError,
    },

    /// Returned when creating a post whose key is already taken.
    DuplicateKey(String),

    /// Returned when writing a post whose timestamp is not a valid UTC
    /// instant.
    Timestamp { key: String, timestamp: i64 },

    /// A nested error annotated with the file it came from.
    Annotated(String, Box<Error>),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "missing closing `---`")
            }
            Error::Frontmatter(err) => err.fmt(f),
            Error::Date { value, err } => {
                write!(f, "invalid date `{}`: {}", value, err)
            }
            Error::DuplicateKey(key) => {
                write!(f, "a post with key `{}` already exists", key)
            }
            Error::Timestamp { key, timestamp } => write!(
                f,
                "post `{}`: timestamp {} is not a valid UTC instant",
                key, timestamp
            ),
            Error::Annotated(context, err) => {
                write!(f, "{}: {}", context, err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            Error::Date { value: _, err } => Some(err),
            Error::Annotated(_, err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for frontmatter operations.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Frontmatter(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_post() -> Result<()> {
        let input = "---\n\
                     title: Hello, world\n\
                     date: 2014-08-02 10:17:00\n\
                     tags: [octocat, rust]\n\
                     ---\n\n\
                     First paragraph.\n";
        let post = parse_post("hello-world", input)?;
        assert_eq!(post.key, "hello-world");
        assert_eq!(post.title.as_deref(), Some("Hello, world"));
        assert_eq!(
            post.timestamp,
            Utc.ymd(2014, 8, 2).and_hms(10, 17, 0).timestamp()
        );
        assert_eq!(post.body, "First paragraph.\n");
        let wanted_tags: BTreeSet<String> =
            vec!["octocat".to_owned(), "rust".to_owned()]
                .into_iter()
                .collect();
        assert_eq!(post.tags, wanted_tags);
        Ok(())
    }

    #[test]
    fn test_parse_post_untitled_and_untagged() -> Result<()> {
        let input = "---\ndate: 2014-08-02\n---\nBody.";
        let post = parse_post("untitled", input)?;
        assert_eq!(post.title, None);
        assert!(post.tags.is_empty());
        assert_eq!(
            post.timestamp,
            Utc.ymd(2014, 8, 2).and_hms(0, 0, 0).timestamp()
        );
        Ok(())
    }

    #[test]
    fn test_parse_post_missing_start_fence() {
        match parse_post("bad", "title: no fence\n") {
            Err(Error::FrontmatterMissingStartFence) => {}
            other => panic!("unexpected result: {:?}", other.map(|p| p.key)),
        }
    }

    #[test]
    fn test_parse_post_missing_end_fence() {
        match parse_post("bad", "---\ntitle: unterminated\n") {
            Err(Error::FrontmatterMissingEndFence) => {}
            other => panic!("unexpected result: {:?}", other.map(|p| p.key)),
        }
    }

    #[test]
    fn test_parse_post_bad_date() {
        let input = "---\ndate: not-a-date\n---\nBody.";
        match parse_post("bad", input) {
            Err(Error::Date { value, .. }) => assert_eq!(value, "not-a-date"),
            other => panic!("unexpected result: {:?}", other.map(|p| p.key)),
        }
    }

    #[test]
    fn test_load_posts_newest_first() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("older.md"),
            "---\ndate: 2014-08-02\n---\nOlder.",
        )?;
        fs::write(
            dir.path().join("newer.md"),
            "---\ndate: 2015-01-01\n---\nNewer.",
        )?;
        fs::write(dir.path().join("notes.txt"), "not a post")?;

        let posts = Store::new(dir.path()).load_posts()?;
        let keys: Vec<&str> = posts.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["newer", "older"]);
        Ok(())
    }

    #[test]
    fn test_create_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Store::new(dir.path());
        let post = Post {
            key: "first-post".to_owned(),
            timestamp: Utc.ymd(2014, 8, 2).and_hms(10, 17, 0).timestamp(),
            title: Some("First post".to_owned()),
            body: "Hello.\n".to_owned(),
            tags: vec!["octocat".to_owned()].into_iter().collect(),
        };
        store.create(&post)?;
        let loaded = store.load_posts()?;
        assert_eq!(loaded, vec![post]);
        Ok(())
    }

    #[test]
    fn test_create_rejects_duplicate_key() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Store::new(dir.path());
        let post = Post {
            key: "twice".to_owned(),
            timestamp: 0,
            title: None,
            body: String::new(),
            tags: BTreeSet::new(),
        };
        store.create(&post)?;
        match store.create(&post) {
            Err(Error::DuplicateKey(key)) => assert_eq!(key, "twice"),
            other => panic!("unexpected result: {:?}", other.err()),
        }
        Ok(())
    }
}
