//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output static site: loading posts from
//! the store ([`crate::store`]), classifying them into the index tree
//! ([`crate::index`]), rendering index and post pages ([`crate::write`]),
//! copying the theme's static assets, and generating the Atom feed
//! ([`crate::feed`]).

use crate::config::Config;
use crate::feed::{self, Error as FeedError, FeedConfig};
use crate::index::{self, Error as IndexError};
use crate::store::{Error as StoreError, Store};
use crate::write::{self, Error as WriteError, Writer};
use gtmpl::Template;
use log::info;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds the site from a [`Config`] object into `output_directory`. This
/// calls into [`Store::load_posts`], [`index::build`], and
/// [`Writer::write_site`] which do the heavy lifting; the rest is copying
/// the theme's static assets and writing the feed.
pub fn build_site(config: &Config, output_directory: &Path) -> Result<()> {
    let store = Store::new(&config.posts_directory);
    let posts = store.load_posts()?;
    info!("Loaded {} posts…", posts.len());

    // Classify every post into the index tree before writing anything; a
    // malformed post aborts the whole build with no partial output.
    let root = index::build(&posts)?;

    // Parse the template files.
    let index_template = parse_template(&config.index_template)?;
    let post_template = parse_template(&config.post_template)?;

    // Write the index and post pages.
    let writer = Writer {
        index_template: &index_template,
        post_template: &post_template,
        output_directory,
        page_size: config.page_size,
        options: write::options_value(config),
    };
    writer.write_site(&root, &posts)?;

    copy_static_files(&config.theme_directory, output_directory)?;

    info!("Writing feed…");
    feed::write_feed(
        FeedConfig {
            title: config.title.clone(),
            id: config.url.to_string(),
            author: config.author.clone(),
            home_page: config.url.clone(),
        },
        &posts,
        File::create(output_directory.join("feed.atom"))?,
    )?;

    Ok(())
}

/// Copies everything in the theme directory except the templates themselves
/// into the output root (the stylesheet, favicons, fonts, and so on).
fn copy_static_files(
    theme_directory: &Path,
    output_directory: &Path,
) -> Result<()> {
    info!("Copying static files…");
    for result in WalkDir::new(theme_directory) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map(|e| e == "tmpl").unwrap_or(false) {
            continue;
        }
        // strip_prefix can't fail: every entry is under `theme_directory`.
        let relative = entry.path().strip_prefix(theme_directory).unwrap();
        let target = output_directory.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target)?;
    }
    Ok(())
}

// Loads the template file contents and parses them into a template.
fn parse_template(path: &Path) -> Result<Template> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| Error::OpenTemplateFile {
            path: path.to_owned(),
            err: e,
        })?
        .read_to_string(&mut contents)?;

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading posts,
/// indexing, writing pages, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading posts from the store.
    Store(StoreError),

    /// Returned for errors classifying posts into the index tree.
    Index(IndexError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for I/O problems while copying static files.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Store(err) => err.fmt(f),
            Error::Index(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<StoreError> for Error {
    /// Converts [`StoreError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: StoreError) -> Error {
        Error::Store(err)
    }
}

impl From<IndexError> for Error {
    /// Converts [`IndexError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: IndexError) -> Error {
        Error::Index(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
