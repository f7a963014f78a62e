//! Layout of a site root: where the bank lives and which files are pages.

use std::path::{Path, PathBuf};

use pagesmith_bank::ProducedPages;
use pagesmith_shared::{PagesmithError, Result, SiteConfig, file_key};
use tracing::debug;

/// Paths and page filtering for one site root.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    root: PathBuf,
    bank_path: PathBuf,
    /// Lower-cased filenames that are never treated as produced pages.
    exclude: Vec<String>,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>, config: &SiteConfig) -> Self {
        let root = root.into();
        Self {
            bank_path: root.join(&config.bank_file),
            exclude: config.exclude.iter().map(|name| file_key(name)).collect(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bank_path(&self) -> &Path {
        &self.bank_path
    }

    /// Path of a file directly under the site root.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn is_excluded(&self, filename: &str) -> bool {
        self.exclude.contains(&file_key(filename))
    }

    /// Filenames of every produced page: `*.html` directly under the root,
    /// minus the excluded site pages, sorted.
    pub fn list_pages(&self) -> Result<Vec<String>> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| PagesmithError::io(&self.root, e))?;

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PagesmithError::io(&self.root, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();

            if !is_file || name.starts_with('.') || self.is_excluded(&name) {
                continue;
            }
            if name.to_ascii_lowercase().ends_with(".html") {
                pages.push(name);
            }
        }

        pages.sort_by_cached_key(|name| (file_key(name), name.clone()));
        debug!(count = pages.len(), root = %self.root.display(), "listed pages");
        Ok(pages)
    }

    pub fn produced_pages(&self) -> Result<ProducedPages> {
        Ok(self.list_pages()?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_site() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ps-site-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lists_only_article_pages() {
        let root = temp_site();
        for name in [
            "index.html",
            "Articles.html",
            "404.html",
            "b-example.html",
            "A-example.HTML",
            ".a-example.html.tmp",
            "style.css",
            "articles.json",
        ] {
            std::fs::write(root.join(name), "x").unwrap();
        }
        std::fs::create_dir_all(root.join("nested.html")).unwrap();

        let site = SiteLayout::new(&root, &SiteConfig::default());
        assert_eq!(site.list_pages().unwrap(), vec!["A-example.HTML", "b-example.html"]);
        assert!(site.produced_pages().unwrap().contains("a-example.html"));
        assert_eq!(site.bank_path(), root.join("topic_bank_auto.json"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_root_is_io_error() {
        let site = SiteLayout::new("/nonexistent/pagesmith-site", &SiteConfig::default());
        assert!(matches!(site.list_pages(), Err(PagesmithError::Io { .. })));
    }
}
