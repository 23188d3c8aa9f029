use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use walkdir::WalkDir;

static FRONT_MATTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---\r?\n?").expect("front matter regex"));
static FIRST_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#\s+(.+?)\s*#*\s*$").expect("heading regex"));

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("site path {0} does not exist")]
    NotFound(PathBuf),
    #[error("unsupported site file {0}; expected a directory of markdown posts or a .yaml index")]
    Unsupported(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleItem {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub has_embedded_content: bool,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    articles: HashMap<usize, Article>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, article: Article) {
        self.articles.insert(index, article);
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(&index)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Site {
    pub name: String,
    pub items: Vec<ArticleItem>,
    pub store: Option<ContentStore>,
}

impl Site {
    pub fn item(&self, index: usize) -> Option<&ArticleItem> {
        self.items.get(index)
    }

    pub fn article(&self, index: usize) -> Option<&Article> {
        self.store.as_ref().and_then(|store| store.get(index))
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn from_entries<I, T, U>(name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (T, U, Option<String>)>,
        T: Into<String>,
        U: Into<String>,
    {
        let mut items = Vec::new();
        let mut store = ContentStore::new();
        for (index, (title, url, body)) in entries.into_iter().enumerate() {
            let title = title.into();
            if let Some(body) = body {
                store.insert(
                    index,
                    Article {
                        title: title.clone(),
                        body,
                    },
                );
            }
            items.push(ArticleItem {
                index,
                has_embedded_content: store.get(index).is_some(),
                title,
                url: url.into(),
                date: None,
            });
        }
        Self {
            name: name.to_string(),
            items,
            store: (!store.is_empty()).then_some(store),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    slug: Option<String>,
    url: Option<String>,
    date: Option<String>,
    #[serde(default)]
    draft: bool,
}

#[derive(Debug, Deserialize)]
struct LinkIndex {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    posts: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    title: String,
    url: String,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    date: Option<String>,
}

struct Draft {
    title: String,
    url: String,
    date: Option<NaiveDate>,
    body: Option<String>,
    sort_key: PathBuf,
}

pub fn load_site(path: &Path) -> Result<Site> {
    if !path.exists() {
        return Err(SiteError::NotFound(path.to_path_buf()).into());
    }
    if path.is_dir() {
        return load_post_dir(path);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_link_index(path),
        _ => Err(SiteError::Unsupported(path.to_path_buf()).into()),
    }
}

fn load_post_dir(dir: &Path) -> Result<Site> {
    let mut drafts = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let raw = fs::read_to_string(entry.path())
            .with_context(|| format!("read post {}", entry.path().display()))?;
        match parse_post(entry.path(), &raw) {
            Some(draft) => drafts.push(draft),
            None => log::debug!("skipping draft {}", entry.path().display()),
        }
    }

    drafts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.sort_key.cmp(&b.sort_key)));
    log::info!("loaded {} posts from {}", drafts.len(), dir.display());

    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "posts".to_string());
    Ok(assemble(name, drafts, true))
}

fn load_link_index(path: &Path) -> Result<Site> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read index {}", path.display()))?;
    let index: LinkIndex = serde_yaml::from_str(&raw)
        .with_context(|| format!("parse index {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut drafts = Vec::with_capacity(index.posts.len());
    for entry in index.posts {
        let body = match entry.file.as_ref() {
            Some(file) => {
                let full = base.join(file);
                let raw = fs::read_to_string(&full)
                    .with_context(|| format!("read post {}", full.display()))?;
                Some(strip_front_matter(&raw).to_string())
            }
            None => None,
        };
        drafts.push(Draft {
            date: entry.date.as_deref().and_then(parse_date),
            sort_key: PathBuf::from(&entry.url),
            title: entry.title,
            url: entry.url,
            body,
        });
    }
    let embedded = drafts.iter().any(|draft| draft.body.is_some());
    let name = index.title.unwrap_or_else(|| "posts".to_string());
    Ok(assemble(name, drafts, embedded))
}

fn assemble(name: String, drafts: Vec<Draft>, embedded: bool) -> Site {
    let mut items = Vec::with_capacity(drafts.len());
    let mut store = ContentStore::new();
    for (index, draft) in drafts.into_iter().enumerate() {
        let has_embedded_content = embedded && draft.body.is_some();
        if has_embedded_content {
            if let Some(body) = draft.body {
                store.insert(
                    index,
                    Article {
                        title: draft.title.clone(),
                        body,
                    },
                );
            }
        }
        items.push(ArticleItem {
            index,
            title: draft.title,
            url: draft.url,
            has_embedded_content,
            date: draft.date,
        });
    }
    Site {
        name,
        items,
        store: embedded.then_some(store),
    }
}

fn parse_post(path: &Path, raw: &str) -> Option<Draft> {
    let meta = FRONT_MATTER
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| match serde_yaml::from_str::<FrontMatter>(m.as_str()) {
            Ok(meta) => Some(meta),
            Err(err) => {
                log::warn!("bad front matter in {}: {err}", path.display());
                None
            }
        })
        .unwrap_or_default();
    if meta.draft {
        return None;
    }
    let body = strip_front_matter(raw).to_string();
    let title = meta
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            FIRST_HEADING
                .captures(&body)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_else(|| file_title(path));
    let url = meta
        .url
        .clone()
        .unwrap_or_else(|| post_url(path, meta.slug.as_deref()));
    Some(Draft {
        title,
        url,
        date: meta.date.as_deref().and_then(parse_date),
        body: Some(body),
        sort_key: path.to_path_buf(),
    })
}

fn strip_front_matter(raw: &str) -> &str {
    match FRONT_MATTER.find(raw) {
        Some(m) => &raw[m.end()..],
        None => raw,
    }
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("md") | Some("markdown")
    )
}

fn post_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "index" || stem == "_index" {
        if let Some(parent) = path.parent().and_then(|p| p.file_name()) {
            return parent.to_string_lossy().into_owned();
        }
    }
    stem
}

fn post_url(path: &Path, slug: Option<&str>) -> String {
    let slug = slug
        .map(str::to_string)
        .unwrap_or_else(|| post_stem(path).to_ascii_lowercase().replace(' ', "-"));
    format!("/post/{slug}/")
}

fn file_title(path: &Path) -> String {
    post_stem(path).replace(['-', '_'], " ")
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_markdown_directory_newest_first() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("older.md"),
            "---\ntitle: Older post\ndate: 2023-01-01\n---\nBody one",
        )
        .unwrap();
        fs::write(
            dir.path().join("newer.md"),
            "---\ntitle: Newer post\ndate: 2024-05-01T10:00:00Z\n---\nBody two",
        )
        .unwrap();
        fs::create_dir(dir.path().join("bundle")).unwrap();
        fs::write(dir.path().join("bundle").join("index.md"), "# Bundled\n\ntext").unwrap();
        fs::write(
            dir.path().join("wip.md"),
            "---\ntitle: Not yet\ndraft: true\n---\n",
        )
        .unwrap();

        let site = load_site(dir.path()).unwrap();
        let titles: Vec<_> = site.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer post", "Older post", "Bundled"]);
        assert_eq!(site.items[2].url, "/post/bundle/");
        assert!(site.has_store());
        assert_eq!(site.article(0).unwrap().body, "Body two");
        assert!(site.items.iter().all(|item| item.has_embedded_content));
    }

    #[test]
    fn link_index_without_files_has_no_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("links.yaml");
        fs::write(
            &path,
            "title: Links\nposts:\n  - title: A\n    url: /post/a/\n  - title: B\n    url: https://example.com/b\n",
        )
        .unwrap();
        let site = load_site(&path).unwrap();
        assert_eq!(site.name, "Links");
        assert_eq!(site.items.len(), 2);
        assert!(!site.has_store());
        assert!(!site.items[0].has_embedded_content);
    }

    #[test]
    fn link_index_with_files_embeds_content() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "---\ntitle: x\n---\nHello").unwrap();
        let path = dir.path().join("links.yml");
        fs::write(
            &path,
            "posts:\n  - title: A\n    url: /post/a/\n    file: a.md\n  - title: B\n    url: /post/b/\n",
        )
        .unwrap();
        let site = load_site(&path).unwrap();
        assert!(site.has_store());
        assert_eq!(site.article(0).unwrap().body, "Hello");
        assert!(site.article(1).is_none());
        assert!(!site.items[1].has_embedded_content);
    }

    #[test]
    fn missing_path_is_reported() {
        let err = load_site(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn from_entries_builds_store_for_bodies() {
        let site = Site::from_entries(
            "t",
            vec![
                ("One", "/post/1/", Some("b1".to_string())),
                ("Two", "/post/2/", None),
            ],
        );
        assert!(site.items[0].has_embedded_content);
        assert!(!site.items[1].has_embedded_content);
        assert!(site.has_store());
    }
}
