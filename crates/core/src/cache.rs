//! Local cache of Noto instance fonts, synced from the source repositories.
//!
//! Each family folder holds its `instance_ttf` files and a `sha.md` token
//! recording the remote tree they were downloaded from; an unchanged token
//! means nothing is downloaded.

use std::{
    collections::BTreeSet,
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{
    config::{
        API_BASE_URL, FONTS_TTF_PATH, INSTANCE_DIR_NAME, SOURCE_BRANCH, TOKEN_FILE_NAME,
        USER_AGENT,
    },
    io::FontFile,
    naming::{FamilyName, ResolvedFamily},
    styles::{StyleKey, file_name},
};

/// Where families live under the cache root.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<base family>/instance_ttf`
    pub fn family_dir(&self, family: &FamilyName) -> PathBuf {
        self.root.join(family.base()).join(INSTANCE_DIR_NAME)
    }

    pub fn font_path(&self, family: &FamilyName, style: &StyleKey) -> PathBuf {
        self.family_dir(family).join(file_name(family, style))
    }

    pub fn token_path(&self, family: &FamilyName) -> PathBuf {
        self.root.join(family.base()).join(TOKEN_FILE_NAME)
    }
}

/// One downloadable entry of a remote instance directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    pub download_url: Option<String>,
}

/// Access to the remote font repositories.
pub trait SourceFetcher {
    /// Token that changes whenever the family's instance directory does.
    ///
    /// Fails when the family has no such directory.
    fn change_token(&self, family: &str) -> Result<String>;

    /// Entries of the family's instance directory.
    fn list(&self, family: &str) -> Result<Vec<RemoteFile>>;

    fn fetch(&self, file: &RemoteFile) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    sha: String,
}

/// Fetches from the repository contents API.
pub struct GithubFetcher {
    client: Client,
    api_base: String,
    hinting: &'static str,
}

impl GithubFetcher {
    pub fn new(hinted: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_base: API_BASE_URL.to_string(),
            hinting: if hinted { "hinted" } else { "unhinted" },
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn contents_url(&self, family: &str, path: &str) -> String {
        format!("{}/{family}/contents/{path}?ref={SOURCE_BRANCH}", self.api_base)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response =
            self.client.get(url).send().with_context(|| format!("Failed to fetch {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {status} for {url}");
        }
        Ok(response)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let body = self.get(url)?.text()?;
        serde_json::from_str(&body).with_context(|| format!("Unexpected listing from {url}"))
    }
}

impl SourceFetcher for GithubFetcher {
    fn change_token(&self, family: &str) -> Result<String> {
        let parent = format!("{FONTS_TTF_PATH}/{}", self.hinting);
        let entries: Vec<DirEntry> = self.get_json(&self.contents_url(family, &parent))?;
        entries
            .into_iter()
            .find(|e| e.name == INSTANCE_DIR_NAME)
            .map(|e| e.sha)
            .with_context(|| format!("{family} has no {parent}/{INSTANCE_DIR_NAME}"))
    }

    fn list(&self, family: &str) -> Result<Vec<RemoteFile>> {
        let path = format!("{FONTS_TTF_PATH}/{}/{INSTANCE_DIR_NAME}", self.hinting);
        self.get_json(&self.contents_url(family, &path))
    }

    fn fetch(&self, file: &RemoteFile) -> Result<Vec<u8>> {
        let url =
            file.download_url.as_deref().with_context(|| format!("{} has no URL", file.name))?;
        Ok(self.get(url)?.bytes()?.to_vec())
    }
}

/// Keeps the local font repository in step with the remote one.
pub struct SourceCache<F> {
    layout: CacheLayout,
    fetcher: F,
}

impl<F: SourceFetcher> SourceCache<F> {
    pub fn new(root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self { layout: CacheLayout::new(root), fetcher }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn family_dir(&self, family: &FamilyName) -> PathBuf {
        self.layout.family_dir(family)
    }

    pub fn font_path(&self, family: &FamilyName, style: &StyleKey) -> PathBuf {
        self.layout.font_path(family, style)
    }

    /// Syncs every family, trying the other contrast once for families
    /// that are unavailable. Families still unavailable are dropped.
    pub fn ensure(&self, families: &[ResolvedFamily]) -> Vec<ResolvedFamily> {
        let mut available: Vec<ResolvedFamily> = Vec::with_capacity(families.len());
        let mut synced = BTreeSet::new();

        for family in families {
            let name = match self.sync_once(&family.name, &mut synced) {
                Ok(()) => family.name.clone(),
                Err(e) => {
                    warn!("{}: unavailable ({e:#})", family.name);
                    let Some(other) = family.name.swap_contrast() else {
                        warn!("{}: dropped", family.name);
                        continue;
                    };
                    match self.sync_once(&other, &mut synced) {
                        Ok(()) => {
                            info!("{}: using {other} instead", family.name);
                            other
                        }
                        Err(e) => {
                            warn!("{}: dropped, {other} unavailable too ({e:#})", family.name);
                            continue;
                        }
                    }
                }
            };
            if available.iter().all(|f| f.name != name) {
                available.push(ResolvedFamily { script: family.script.clone(), name });
            }
        }
        available
    }

    fn sync_once(&self, family: &FamilyName, synced: &mut BTreeSet<String>) -> Result<()> {
        if synced.contains(family.base()) {
            return Ok(());
        }
        self.sync(family)?;
        synced.insert(family.base().to_string());
        Ok(())
    }

    /// Downloads the family unless its stored token matches the remote one.
    pub fn sync(&self, family: &FamilyName) -> Result<()> {
        let base = family.base();
        let token = self.fetcher.change_token(base)?;
        let token_path = self.layout.token_path(family);
        let dir = self.layout.family_dir(family);

        let stored = read_to_string(&token_path).ok();
        if stored.as_deref().map(str::trim) == Some(token.as_str()) && dir.is_dir() {
            debug!("{base}: up to date ({token})");
            return Ok(());
        }

        let files: Vec<RemoteFile> = self
            .fetcher
            .list(base)?
            .into_iter()
            .filter(|f| f.name.ends_with(".ttf") && f.download_url.is_some())
            .collect();
        if files.is_empty() {
            bail!("{base} lists no instance fonts");
        }

        println!("  Downloading {base} ({} files)", files.len());
        create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        for file in &files {
            let data = self.fetcher.fetch(file)?;
            FontFile::new(dir.join(&file.name)).write(&data)?;
        }

        write(&token_path, &token)
            .with_context(|| format!("Failed to write {}", token_path.display()))?;
        info!("{base}: synced {} files at {token}", files.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap};

    use tempfile::tempdir;

    use super::*;
    use crate::styles::{Weight, Width};

    /// Families keyed by base name, each with a token and named files.
    #[derive(Default)]
    struct MemoryFetcher {
        families: BTreeMap<String, (String, Vec<String>)>,
        fetched: RefCell<Vec<String>>,
    }

    impl MemoryFetcher {
        fn with(mut self, family: &str, token: &str, files: &[&str]) -> Self {
            let files = files.iter().map(|f| f.to_string()).collect();
            self.families.insert(family.to_string(), (token.to_string(), files));
            self
        }
    }

    impl SourceFetcher for &MemoryFetcher {
        fn change_token(&self, family: &str) -> Result<String> {
            match self.families.get(family) {
                Some((token, _)) => Ok(token.clone()),
                None => bail!("HTTP 404 Not Found"),
            }
        }

        fn list(&self, family: &str) -> Result<Vec<RemoteFile>> {
            let (_, files) = self.families.get(family).context("missing")?;
            Ok(files
                .iter()
                .map(|name| RemoteFile {
                    name: name.clone(),
                    download_url: Some(format!("mem://{family}/{name}")),
                })
                .collect())
        }

        fn fetch(&self, file: &RemoteFile) -> Result<Vec<u8>> {
            self.fetched.borrow_mut().push(file.name.clone());
            Ok(file.name.as_bytes().to_vec())
        }
    }

    fn resolved(script: &str, name: &str) -> ResolvedFamily {
        ResolvedFamily { script: script.to_string(), name: FamilyName::new(name) }
    }

    #[test]
    fn test_sync_downloads_then_skips() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .with("NotoSans", "abc", &["NotoSans-Regular.ttf", "NotoSans-Bold.ttf", "OFL.txt"]);
        let cache = SourceCache::new(dir.path(), &fetcher);
        let family = FamilyName::new("NotoSans");

        cache.sync(&family).unwrap();
        assert_eq!(fetcher.fetched.borrow().len(), 2);
        let regular = StyleKey::new(Width::Normal, Weight::Regular);
        assert!(cache.font_path(&family, &regular).is_file());
        let token = read_to_string(cache.layout().token_path(&family)).unwrap();
        assert_eq!(token, "abc");

        cache.sync(&family).unwrap();
        assert_eq!(fetcher.fetched.borrow().len(), 2, "unchanged token must not refetch");
    }

    #[test]
    fn test_changed_token_refetches() {
        let dir = tempdir().unwrap();
        let family = FamilyName::new("NotoSansThai");

        let files = ["NotoSansThai-Regular.ttf"];

        let old = MemoryFetcher::default().with("NotoSansThai", "v1", &files);
        SourceCache::new(dir.path(), &old).sync(&family).unwrap();

        let new = MemoryFetcher::default().with("NotoSansThai", "v2", &files);
        SourceCache::new(dir.path(), &new).sync(&family).unwrap();
        assert_eq!(new.fetched.borrow().len(), 1);
    }

    #[test]
    fn test_ensure_falls_back_and_drops() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .with("NotoSans", "1", &["NotoSans-Regular.ttf"])
            .with("NotoSansAdlam", "2", &["NotoSansAdlam-Regular.ttf"]);
        let cache = SourceCache::new(dir.path(), &fetcher);

        let families = [
            resolved("Latin", "NotoSans"),
            resolved("Adlam", "NotoSerifAdlam"),
            resolved("Klingon", "NotoSansKlingon"),
            resolved("Music", "NotoMusic"),
        ];
        let available = cache.ensure(&families);

        assert_eq!(
            available,
            vec![resolved("Latin", "NotoSans"), resolved("Adlam", "NotoSansAdlam")]
        );
    }

    #[test]
    fn test_ensure_syncs_shared_base_once() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .with("NotoSans", "1", &["NotoSans-Regular.ttf", "NotoSans-Italic.ttf"]);
        let cache = SourceCache::new(dir.path(), &fetcher);

        let families = [resolved("Latin", "NotoSans"), resolved("Greek", "NotoSans-Italic")];
        assert_eq!(cache.ensure(&families).len(), 2);
        assert_eq!(fetcher.fetched.borrow().len(), 2);
    }
}
