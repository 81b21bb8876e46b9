//! Responsible for templating and writing HTML pages to disk. The writer
//! consumes the index tree through [`crate::walk`] — one listing document
//! per (path, page) pair — and makes a separate flat pass over all posts for
//! their permalink pages. Every output document is an `index.html` under the
//! directory named by its path segments.

use crate::config::Config;
use crate::index::Node;
use crate::markdown;
use crate::page;
use crate::post::Post;
use crate::walk::{self, Entry};
use gtmpl::{Template, Value};
use log::info;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Writes a site's pages to disk from an index tree and a post list.
pub struct Writer<'a> {
    /// The template for index (listing) pages.
    pub index_template: &'a Template,

    /// The template for post permalink pages.
    pub post_template: &'a Template,

    /// The root output directory.
    pub output_directory: &'a Path,

    /// The number of posts per index page.
    pub page_size: usize,

    /// The blog options exposed to every template as `options`.
    pub options: Value,
}

impl Writer<'_> {
    /// Writes every index page and every post permalink page. The page size
    /// is validated by the walker before any file is created.
    pub fn write_site(&self, root: &Node, posts: &[Post]) -> Result<()> {
        for entry in walk::walk(root, self.page_size)? {
            self.write_index_page(&entry)?;
        }
        for post in posts {
            self.write_post_page(post)?;
        }
        Ok(())
    }

    fn write_index_page(&self, entry: &Entry) -> Result<()> {
        let mut path = self.output_directory.to_owned();
        for segment in &entry.path {
            path.push(segment);
        }
        let path = path.join("index.html");
        info!(
            "Building index page `{}`: {} posts…",
            path.display(),
            entry.page.posts.len()
        );

        // The walker appends the page number to the path for pages after the
        // first; the owning node's own segments are everything before it.
        let node_segments = match entry.page.number {
            1 => &entry.path[..],
            _ => &entry.path[..entry.path.len() - 1],
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("options".to_owned(), self.options.clone());
        m.insert(
            "current_page".to_owned(),
            Value::from(entry.page.number as u64),
        );
        m.insert("is_last_page".to_owned(), Value::from(entry.page.is_last));
        m.insert(
            "segments".to_owned(),
            Value::Array(
                node_segments
                    .iter()
                    .map(|s| Value::String(s.clone()))
                    .collect(),
            ),
        );
        m.insert(
            "posts".to_owned(),
            Value::Array(
                entry.page.posts.iter().map(|p| summarize(p)).collect(),
            ),
        );
        m.insert(
            "prev".to_owned(),
            match entry.page.number {
                1 => Value::Nil,
                n => Value::String(page_address(node_segments, n - 1)),
            },
        );
        m.insert(
            "next".to_owned(),
            match entry.page.is_last {
                true => Value::Nil,
                false => Value::String(page_address(
                    node_segments,
                    entry.page.number + 1,
                )),
            },
        );

        self.render(self.index_template, &path, Value::Object(m))
    }

    fn write_post_page(&self, post: &Post) -> Result<()> {
        let path = self
            .output_directory
            .join(&post.key)
            .join("index.html");
        info!("Building post page `{}`…", path.display());

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("options".to_owned(), self.options.clone());
        m.insert(
            "post".to_owned(),
            post_value(post, markdown::to_html(&post.body)),
        );
        self.render(self.post_template, &path, Value::Object(m))
    }

    fn render(
        &self,
        template: &Template,
        path: &Path,
        context: Value,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        template.execute(
            &mut File::create(path)?,
            &gtmpl::Context::from(context).unwrap(),
        )?;
        Ok(())
    }
}

/// The site-root-relative address of page `number` of the node at
/// `segments`, e.g. `/2014/08/` for page 1 and `/2014/08/2/` for page 2.
fn page_address(segments: &[String], number: usize) -> String {
    let mut address = String::from("/");
    for segment in segments {
        address.push_str(segment);
        address.push('/');
    }
    if number > 1 {
        address.push_str(&number.to_string());
        address.push('/');
    }
    address
}

/// Converts a [`Config`] into the `options` template value.
pub fn options_value(config: &Config) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(config.title.clone()));
    m.insert("url".to_owned(), Value::String(config.url.to_string()));
    m.insert(
        "author".to_owned(),
        match &config.author {
            None => Value::Nil,
            Some(author) => {
                let mut a: HashMap<String, Value> = HashMap::new();
                a.insert("name".to_owned(), Value::String(author.name.clone()));
                a.insert(
                    "email".to_owned(),
                    match &author.email {
                        Some(email) => Value::String(email.clone()),
                        None => Value::Nil,
                    },
                );
                Value::Object(a)
            }
        },
    );
    Value::Object(m)
}

/// Converts a post into its index-page template value, with the body
/// truncated at the fold marker.
fn summarize(post: &Post) -> Value {
    let (summary, summarized) = post.summary();
    let mut value = post_value(post, markdown::to_html(summary));
    if let Value::Object(m) = &mut value {
        m.insert("summarized".to_owned(), Value::from(summarized));
    }
    value
}

fn post_value(post: &Post, body_html: String) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("key".to_owned(), Value::String(post.key.clone()));
    m.insert(
        "title".to_owned(),
        // Untitled posts fall back to their key for display.
        Value::String(match &post.title {
            Some(title) => title.clone(),
            None => post.key.clone(),
        }),
    );
    m.insert(
        "date".to_owned(),
        match post.datetime() {
            Some(datetime) => Value::String(
                datetime.format(DATE_DISPLAY_FORMAT).to_string(),
            ),
            None => Value::Nil,
        },
    );
    m.insert("body".to_owned(), Value::String(body_html));
    m.insert(
        "tags".to_owned(),
        Value::Array(
            post.tags
                .iter()
                .map(|tag| Value::String(tag.clone()))
                .collect(),
        ),
    );
    Value::Object(m)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during pagination.
    Page(page::Error),

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<page::Error> for Error {
    /// Converts a [`page::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator when walking the index tree.
    fn from(err: page::Error) -> Error {
        Error::Page(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page(err) => Some(err),
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
