//! Composes new posts: derives a key from the title, writes a fresh post
//! file with frontmatter into the store, and optionally opens it in an
//! editor.

use crate::post::Post;
use crate::store::Store;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::info;
use std::path::Path;
use std::process::Command;

/// Parameters for composing a post.
pub struct Compose {
    /// The post title.
    pub title: String,

    /// An explicit key; defaults to the slugified title.
    pub key: Option<String>,

    /// Tags to assign.
    pub tags: Vec<String>,

    /// The editor command to open the new file with, if any. May contain
    /// arguments (`"code --wait"`); the file path is appended.
    pub editor: Option<String>,
}

/// Creates the post file and returns its path. The publication timestamp is
/// the current time.
pub fn compose(store: &Store, params: Compose) -> Result<()> {
    let key = match params.key {
        Some(key) => key,
        None => slug::slugify(&params.title),
    };
    let post = Post {
        key,
        timestamp: Utc::now().timestamp(),
        title: Some(params.title),
        body: String::new(),
        tags: params.tags.into_iter().collect(),
    };
    let path = store.create(&post)?;
    info!("Created `{}`.", path.display());

    match params.editor {
        Some(editor) => edit(&editor, &path),
        None => Ok(()),
    }
}

fn edit(editor: &str, path: &Path) -> Result<()> {
    let mut words = editor.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| anyhow!("empty editor command"))?;
    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .with_context(|| format!("running editor `{}`", editor))?;
    if !status.success() {
        return Err(anyhow!("editor `{}` exited with {}", editor, status));
    }
    Ok(())
}
