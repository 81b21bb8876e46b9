//! Scaffolds a new blog directory: the `stanza.yaml` project file, an empty
//! `posts` directory, and a copy of the built-in theme.

use anyhow::{anyhow, Result};
use log::info;
use std::fs;
use std::path::Path;

const INDEX_TEMPLATE: &str = include_str!("../themes/plain/index.html.tmpl");
const POST_TEMPLATE: &str = include_str!("../themes/plain/post.html.tmpl");
const STYLESHEET: &str = include_str!("../themes/plain/theme.css");

/// Options for a new blog's project file.
pub struct Options<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub author_name: Option<&'a str>,
    pub author_email: Option<&'a str>,
}

/// Creates a new blog at `path`. Refuses to touch a directory that already
/// exists.
pub fn init_blog(path: &Path, options: &Options) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("`{}` already exists", path.display()));
    }
    fs::create_dir_all(path.join("posts"))?;
    fs::create_dir_all(path.join("theme"))?;

    fs::write(path.join("stanza.yaml"), project_file(options))?;
    fs::write(path.join("theme").join("index.html.tmpl"), INDEX_TEMPLATE)?;
    fs::write(path.join("theme").join("post.html.tmpl"), POST_TEMPLATE)?;
    fs::write(path.join("theme").join("theme.css"), STYLESHEET)?;

    info!("Initialized new blog in `{}`.", path.display());
    Ok(())
}

fn project_file(options: &Options) -> String {
    // {:?} double-quotes and escapes the values, which YAML accepts.
    let mut yaml = format!(
        "title: {:?}\nurl: {:?}\npage_size: 10\n",
        options.title, options.url
    );
    if let Some(name) = options.author_name {
        yaml.push_str(&format!("author:\n  name: {:?}\n", name));
        if let Some(email) = options.author_email {
            yaml.push_str(&format!("  email: {:?}\n", email));
        }
    }
    yaml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_init_blog_is_loadable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let blog = dir.path().join("myblog");
        init_blog(
            &blog,
            &Options {
                title: "My blog",
                url: "https://example.org",
                author_name: Some("Octo Cat"),
                author_email: None,
            },
        )?;

        let config = Config::from_directory(&blog)?;
        assert_eq!(config.title, "My blog");
        assert_eq!(config.page_size, 10);
        assert_eq!(
            config.author.as_ref().map(|a| a.name.as_str()),
            Some("Octo Cat")
        );
        assert!(config.index_template.exists());
        assert!(config.post_template.exists());
        Ok(())
    }

    #[test]
    fn test_init_blog_refuses_existing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let options = Options {
            title: "My blog",
            url: "https://example.org",
            author_name: None,
            author_email: None,
        };
        assert!(init_blog(dir.path(), &options).is_err());
        Ok(())
    }
}
