//! Walks the index tree and yields one [`Entry`] per output listing
//! document. The walk is a lazy depth-first pre-order traversal: a node's
//! own pages come out before any descendant's, and siblings are visited in
//! ascending segment order so output is reproducible across runs.

use crate::index::Node;
use crate::page::{self, Page};
use std::collections::VecDeque;

/// One output listing document: the derived output path segments plus the
/// page itself. Page 1 of a node lives at the node's own path; page N>1
/// appends the decimal page number as a trailing segment, e.g. a node at
/// `2014/08` yields `2014/08` and `2014/08/2`.
#[derive(Debug, PartialEq)]
pub struct Entry<'a> {
    pub path: Vec<String>,
    pub page: Page<'a>,
}

/// Starts a walk over `root`. The page size is validated here, before any
/// pagination occurs; a zero page size fails up front with
/// [`page::Error::InvalidPageSize`] and produces no entries.
pub fn walk<'a>(root: &'a Node<'a>, page_size: usize) -> page::Result<Walk<'a>> {
    if page_size == 0 {
        return Err(page::Error::InvalidPageSize);
    }
    Ok(Walk {
        page_size,
        pending: VecDeque::new(),
        stack: vec![(Vec::new(), root)],
    })
}

/// A lazy iterator over the index tree's listing documents. See [`walk`].
pub struct Walk<'a> {
    page_size: usize,
    pending: VecDeque<Entry<'a>>,
    stack: Vec<(Vec<String>, &'a Node<'a>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Entry<'a>> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(entry);
            }
            let (path, node) = self.stack.pop()?;

            // Push children in reverse so the smallest segment pops first.
            for (segment, child) in node.children.iter().rev() {
                let mut child_path = path.clone();
                child_path.push(segment.clone());
                self.stack.push((child_path, child));
            }

            // The page size was validated in `walk`, so pagination cannot
            // fail here.
            let pages = page::paginate(node.posts.as_slice(), self.page_size)
                .expect("page size validated before traversal");
            self.pending.extend(pages.into_iter().map(|page| {
                let mut entry_path = path.clone();
                if page.number > 1 {
                    entry_path.push(page.number.to_string());
                }
                Entry {
                    path: entry_path,
                    page,
                }
            }));
        }
    }
}
