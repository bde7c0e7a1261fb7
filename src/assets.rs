use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{DebugError, Result};

/// Resource served when a request carries no route.
pub const INDEX: &str = "index.html";

const BUILTIN_INDEX: &[u8] = include_bytes!("../assets/index.html");

/// Resolves a static resource name to bytes and a MIME type.
pub trait AssetProvider: Send + Sync {
    fn load(&self, name: &str) -> Result<(Vec<u8>, &'static str)>;
}

/// Files under an optional base directory, with the landing page built in.
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    base_dir: Option<PathBuf>,
}

impl StaticAssets {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn map_path(base: &Path, name: &str) -> Option<PathBuf> {
        let mut pb = base.to_path_buf();
        for comp in Path::new(name.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    pub fn content_type(name: &str) -> &'static str {
        let ext = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "ico" => "image/x-icon",
            _ => "application/octet-stream",
        }
    }

    fn read_file(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(base) = &self.base_dir else {
            return Ok(None);
        };
        let path = Self::map_path(base, name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).map(Some)
    }
}

impl AssetProvider for StaticAssets {
    fn load(&self, name: &str) -> Result<(Vec<u8>, &'static str)> {
        let path = name.split('?').next().unwrap_or_default();
        match self.read_file(path) {
            Ok(Some(bytes)) => Ok((bytes, Self::content_type(path))),
            Ok(None) if path == INDEX => Ok((BUILTIN_INDEX.to_vec(), "text/html")),
            Ok(None) => Err(DebugError::AssetNotFound(path.to_string())),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                Err(DebugError::AssetNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
