//! Loads blog configuration. A blog is a directory containing a
//! `stanza.yaml` project file, a `posts` directory, and a theme directory;
//! [`Config::from_directory`] searches upward from the starting directory so
//! commands can be run from anywhere inside the blog.
//!
//! The configuration layer performs no validation or normalization of
//! values; a bad `page_size` surfaces later as the paginator's
//! invalid-page-size error.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

const PROJECT_FILE: &str = "stanza.yaml";
const DEFAULT_THEME: &str = "theme";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

/// The blog's author, as advertised in the Atom feed.
#[derive(Clone, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    title: String,
    url: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default)]
    theme: Option<String>,
}

pub struct Config {
    pub title: String,
    pub url: Url,
    pub author: Option<Author>,
    pub page_size: usize,
    pub posts_directory: PathBuf,
    pub theme_directory: PathBuf,
    pub index_template: PathBuf,
    pub post_template: PathBuf,
}

impl Config {
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path)?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_directory = project_root
                    .join(project.theme.as_deref().unwrap_or(DEFAULT_THEME));
                Ok(Config {
                    title: project.title,
                    url: project.url,
                    author: project.author,
                    page_size: project.page_size.0,
                    posts_directory: project_root.join("posts"),
                    index_template: theme_directory.join("index.html.tmpl"),
                    post_template: theme_directory.join("post.html.tmpl"),
                    theme_directory,
                })
            }
        }
    }
}

fn open(path: &Path) -> Result<File> {
    match File::open(path) {
        Err(e) => {
            Err(anyhow!("Opening project file `{}`: {}", path.display(), e))
        }
        Ok(file) => Ok(file),
    }
}
