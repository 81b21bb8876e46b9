//! Splits an index node's post list into fixed-size pages. Pagination is
//! order-preserving and purely structural: concatenating the pages of a node
//! reproduces the node's post list exactly.

use crate::post::Post;
use std::fmt;

/// A contiguous slice of a node's posts, corresponding to one output listing
/// document.
#[derive(Debug, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,

    /// Whether this is the node's final page.
    pub is_last: bool,

    /// The posts on this page, in node order. At most `page_size` long;
    /// empty only for the single page of an empty node.
    pub posts: &'a [&'a Post],
}

/// Partitions `posts` into pages of at most `page_size` posts each,
/// preserving order. An empty input still yields exactly one (empty) page —
/// index locations are structural, not post-count-gated, so even a tag with
/// no remaining posts materializes a listing document.
pub fn paginate<'a>(
    posts: &'a [&'a Post],
    page_size: usize,
) -> Result<Vec<Page<'a>>> {
    if page_size == 0 {
        return Err(Error::InvalidPageSize);
    }
    if posts.is_empty() {
        return Ok(vec![Page {
            number: 1,
            is_last: true,
            posts: &[],
        }]);
    }
    let total = (posts.len() + page_size - 1) / page_size;
    Ok(posts
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            is_last: i + 1 == total,
            posts: chunk,
        })
        .collect())
}

/// The result of a fallible pagination operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a pagination configuration error.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when the requested page size is zero. A page size this small
    /// can only come from a bad configuration value; it is never silently
    /// defaulted.
    InvalidPageSize,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidPageSize => {
                write!(f, "invalid page size; must be at least 1")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| Post {
                key: format!("post-{}", i),
                timestamp: (n - i) as i64,
                title: None,
                body: String::new(),
                tags: BTreeSet::new(),
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_one_empty_page() -> Result<()> {
        let pages = paginate(&[], 10)?;
        assert_eq!(
            pages,
            vec![Page {
                number: 1,
                is_last: true,
                posts: &[],
            }]
        );
        Ok(())
    }

    #[test]
    fn test_partial_last_page() -> Result<()> {
        let posts = posts(25);
        let refs: Vec<&Post> = posts.iter().collect();
        let pages = paginate(&refs, 10)?;
        assert_eq!(pages.len(), 3);
        let sizes: Vec<usize> = pages.iter().map(|p| p.posts.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let last_flags: Vec<bool> = pages.iter().map(|p| p.is_last).collect();
        assert_eq!(last_flags, vec![false, false, true]);
        Ok(())
    }

    #[test]
    fn test_exact_multiple_has_no_stub_page() -> Result<()> {
        let posts = posts(20);
        let refs: Vec<&Post> = posts.iter().collect();
        let pages = paginate(&refs, 10)?;
        assert_eq!(pages.len(), 2);
        assert!(pages[1].is_last);
        assert_eq!(pages[1].posts.len(), 10);
        Ok(())
    }

    #[test]
    fn test_concatenation_reproduces_input() -> Result<()> {
        let posts = posts(23);
        let refs: Vec<&Post> = posts.iter().collect();
        let rejoined: Vec<&Post> = paginate(&refs, 7)?
            .iter()
            .flat_map(|page| page.posts.iter().copied())
            .collect();
        assert_eq!(refs, rejoined);
        Ok(())
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let posts = posts(3);
        let refs: Vec<&Post> = posts.iter().collect();
        assert_eq!(paginate(&refs, 0).unwrap_err(), Error::InvalidPageSize);
    }
}
