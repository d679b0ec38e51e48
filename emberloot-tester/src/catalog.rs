use emberloot_sim::{CatalogSource, GameCatalog};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error("failed to read catalog {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Catalog read from a JSON file on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalog {
    type Error = CatalogFileError;

    fn load_catalog(&self) -> Result<GameCatalog, Self::Error> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| CatalogFileError::Read {
            path: self.path.clone(),
            source,
        })?;
        GameCatalog::from_json(&raw).map_err(|source| CatalogFileError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "emberloot-catalog-{label}-{}.json",
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let source = FileCatalog::new(scratch("missing"));
        assert!(matches!(
            source.load_catalog(),
            Err(CatalogFileError::Read { .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let path = scratch("garbage");
        std::fs::write(&path, "{ not json").unwrap();
        let source = FileCatalog::new(&path);
        let err = source.load_catalog().unwrap_err();
        assert!(matches!(err, CatalogFileError::Parse { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn round_trips_the_bundled_catalog() {
        let path = scratch("bundled");
        let bundled = GameCatalog::embedded();
        std::fs::write(&path, serde_json::to_string(bundled).unwrap()).unwrap();
        let loaded = FileCatalog::new(&path).load_catalog().unwrap();
        assert_eq!(&loaded, bundled);
        let _ = std::fs::remove_file(path);
    }
}
