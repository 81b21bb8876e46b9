//! Builds the hierarchical post index. The index is a tree of [`Node`]s
//! rooted at the all-posts node; below the root sit one node per publication
//! year (each with one child per publication month) and one node per tag.
//! A single post is referenced from every node it belongs to — the root, its
//! year, its year-month, and each of its tags — so the tree holds shared
//! `&Post` references rather than copies.
//!
//! The tree is rebuilt from scratch on every build invocation and discarded
//! after rendering. Nothing here performs I/O or logging; [`build`] is a pure
//! function of the post list.

use crate::post::Post;
use std::collections::BTreeMap;
use std::fmt;

/// One addressable grouping of posts: the site root, a year, a year-month,
/// or a tag. Each node gets its own paginated listing in the output site.
#[derive(Debug, PartialEq)]
pub struct Node<'a> {
    /// The posts belonging directly to this node, newest first. Invariant:
    /// sorted by timestamp descending, ties broken by input order. This
    /// holds without a sort step because [`build`] consumes posts in
    /// newest-first order and only ever appends.
    pub posts: Vec<&'a Post>,

    /// Child nodes, keyed by a single path segment. A `BTreeMap` keeps
    /// sibling iteration deterministic so the rendered output is
    /// reproducible across runs.
    pub children: BTreeMap<String, Node<'a>>,
}

impl<'a> Node<'a> {
    fn new() -> Node<'a> {
        Node {
            posts: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Descends from `self` along `key`, creating missing children on the
    /// way, and appends `post` to the terminal node.
    fn insert(&mut self, key: Vec<String>, post: &'a Post) {
        let mut node = self;
        for segment in key {
            node = node.children.entry(segment).or_insert_with(Node::new);
        }
        node.posts.push(post);
    }
}

/// Builds the index tree for a list of posts. The input must be ordered
/// newest-first (the post store's contract); every node's post list then
/// comes out newest-first with no reordering anywhere in the tree.
///
/// Fails with [`Error::MalformedPost`] if any post's timestamp cannot be
/// interpreted as a UTC instant. The whole build aborts on the first such
/// post — a partial static site is worse than a clear failure.
pub fn build<'a>(posts: &'a [Post]) -> Result<Node<'a>> {
    let mut root = Node::new();
    for post in posts {
        for key in membership_keys(post)? {
            root.insert(key, post);
        }
    }
    Ok(root)
}

/// Computes the path-segment tuples identifying the nodes a post belongs
/// to: the root, the post's UTC year, its year-month, and one per tag. The
/// sequence is finite — at most `3 + |tags|` keys.
fn membership_keys(post: &Post) -> Result<Vec<Vec<String>>> {
    let datetime = post.datetime().ok_or_else(|| Error::MalformedPost {
        key: post.key.clone(),
        timestamp: post.timestamp,
    })?;
    let year = datetime.format("%Y").to_string();
    let month = datetime.format("%m").to_string();
    let mut keys = vec![
        Vec::new(),
        vec![year.clone()],
        vec![year, month],
    ];
    keys.extend(post.tags.iter().map(|tag| vec![tag.clone()]));
    Ok(keys)
}

/// The result of a fallible indexing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error classifying posts into the index tree.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's timestamp is not a valid UTC instant. Carries
    /// the key of the offending post so the caller can report it.
    MalformedPost { key: String, timestamp: i64 },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedPost { key, timestamp } => write!(
                f,
                "post `{}`: timestamp {} is not a valid UTC instant",
                key, timestamp
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(key: &str, (y, m, d): (i32, u32, u32), tags: &[&str]) -> Post {
        Post {
            key: key.to_owned(),
            timestamp: Utc.ymd(y, m, d).and_hms(12, 0, 0).timestamp(),
            title: Some(key.to_owned()),
            body: String::new(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn newest_first(posts: &mut Vec<Post>) {
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    fn keys<'a>(node: &Node<'a>) -> Vec<&'a str> {
        node.posts.iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn test_membership_completeness() -> Result<()> {
        let mut posts = vec![
            post("first", (2014, 8, 2), &["octocat", "rust"]),
            post("second", (2014, 9, 14), &["octocat"]),
            post("third", (2015, 1, 1), &[]),
        ];
        newest_first(&mut posts);
        let root = build(&posts)?;

        // Every post is in the root; order is newest first.
        assert_eq!(keys(&root), vec!["third", "second", "first"]);

        // Year and year-month nodes.
        let y2014 = &root.children["2014"];
        assert_eq!(keys(y2014), vec!["second", "first"]);
        assert_eq!(keys(&y2014.children["08"]), vec!["first"]);
        assert_eq!(keys(&y2014.children["09"]), vec!["second"]);
        let y2015 = &root.children["2015"];
        assert_eq!(keys(y2015), vec!["third"]);
        assert_eq!(keys(&y2015.children["01"]), vec!["third"]);

        // Tag nodes: exactly one per distinct tag, tagless posts absent.
        assert_eq!(keys(&root.children["octocat"]), vec!["second", "first"]);
        assert_eq!(keys(&root.children["rust"]), vec!["first"]);

        // No extra nodes beyond the years and tags present.
        let segments: Vec<&str> =
            root.children.keys().map(String::as_str).collect();
        assert_eq!(segments, vec!["2014", "2015", "octocat", "rust"]);
        Ok(())
    }

    #[test]
    fn test_order_preserved_in_every_node() -> Result<()> {
        let mut posts = vec![
            post("a", (2014, 8, 1), &["t"]),
            post("b", (2014, 8, 2), &["t"]),
            post("c", (2014, 8, 3), &["t"]),
        ];
        newest_first(&mut posts);
        let root = build(&posts)?;
        let want = vec!["c", "b", "a"];
        assert_eq!(keys(&root), want);
        assert_eq!(keys(&root.children["2014"]), want);
        assert_eq!(keys(&root.children["2014"].children["08"]), want);
        assert_eq!(keys(&root.children["t"]), want);
        Ok(())
    }

    #[test]
    fn test_empty_input_yields_bare_root() -> Result<()> {
        let root = build(&[])?;
        assert!(root.posts.is_empty());
        assert!(root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_tagless_post_only_gets_date_nodes() -> Result<()> {
        let posts = vec![post("lonely", (2014, 8, 2), &[])];
        let root = build(&posts)?;
        let segments: Vec<&str> =
            root.children.keys().map(String::as_str).collect();
        assert_eq!(segments, vec!["2014"]);
        Ok(())
    }

    #[test]
    fn test_build_is_idempotent() -> Result<()> {
        let mut posts = vec![
            post("first", (2014, 8, 2), &["octocat"]),
            post("second", (2014, 9, 14), &["rust", "octocat"]),
        ];
        newest_first(&mut posts);
        assert_eq!(build(&posts)?, build(&posts)?);
        Ok(())
    }

    #[test]
    fn test_malformed_timestamp_aborts_build() {
        let mut bad = post("bad", (2014, 8, 2), &[]);
        bad.timestamp = i64::MAX;
        match build(&[bad]) {
            Err(Error::MalformedPost { key, .. }) => assert_eq!(key, "bad"),
            Ok(_) => panic!("expected a malformed-post error"),
        }
    }
}
