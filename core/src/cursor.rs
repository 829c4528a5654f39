use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FIRST_PAGE: u32 = 1;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor file io error at {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("cursor file {path} is not valid JSON: {source}")]
    Json { path: String, source: serde_json::Error },
}

/// JSON file mapping source name to the next catalog page to crawl,
/// e.g. `{"kanobu": 4}`.
#[derive(Debug, Clone)]
pub struct CursorFile {
    path: PathBuf,
}

impl CursorFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All persisted cursors; an absent file means no source has progressed.
    pub fn load_all(&self) -> Result<BTreeMap<String, u32>, CursorError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| CursorError::Json { path: self.display(), source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(CursorError::Io { path: self.display(), source }),
        }
    }

    /// Page to start `source` at: the persisted value, or 1.
    pub fn load(&self, source: &str) -> Result<u32, CursorError> {
        Ok(self.load_all()?.get(source).copied().filter(|p| *p >= FIRST_PAGE).unwrap_or(FIRST_PAGE))
    }

    /// Record `page` for `source`, keeping the other sources' entries.
    pub fn save(&self, source: &str, page: u32) -> Result<(), CursorError> {
        let mut all = self.load_all()?;
        all.insert(source.to_string(), page);
        let json = serde_json::to_string_pretty(&all).map_err(|source| CursorError::Json { path: self.display(), source })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| CursorError::Io { path: self.display(), source })?;
        }
        // atomic replace: temp file, then rename
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| CursorError::Io { path: tmp.display().to_string(), source })?;
        fs::rename(&tmp, &self.path).map_err(|source| CursorError::Io { path: self.display(), source })?;
        Ok(())
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}
