//! Offline Asset Cache
//!
//! Versioned on-disk copies of the application shell so it can be served
//! without the origin. Each version lives in its own directory under the
//! cache root; activating a version purges every other one.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(test)]
use mockall::automock;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Current cache version.
pub const CACHE_VERSION: &str = "client-archive-cache-v3";

/// Assets installed into a fresh cache.
pub const ASSET_MANIFEST: [&str; 6] = [
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.webmanifest",
    "./logo.png",
];

/// Key used for the site root.
const ROOT_KEY: &str = "index";

/// Errors raised by the asset cache or an asset source.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Path escapes the cache or is otherwise unusable.
    #[error("invalid asset path {0:?}")]
    InvalidPath(String),

    /// Source has no such asset.
    #[error("asset {0:?} not available")]
    Unavailable(String),

    /// Reading or writing the cache failed.
    #[error("asset I/O failed for {}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Where fetched asset bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    /// Served from the versioned cache
    Cache,
    /// Fetched from the source and copied into the cache
    Source,
}

/// Asset bytes plus their origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Asset contents
    pub bytes: Vec<u8>,

    /// Where the contents came from
    pub origin: AssetOrigin,
}

/// Origin of assets not yet cached.
#[cfg_attr(test, automock)]
pub trait AssetSource {
    /// Fetch an asset by its normalized key.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] when the asset cannot be produced.
    fn fetch(&self, key: &str) -> Result<Vec<u8>, AssetError>;
}

/// Source reading assets from a directory, e.g. a built web bundle.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    /// Source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        let file = if key == ROOT_KEY { "index.html" } else { key };
        let path = self.dir.join(file);

        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::Unavailable(key.to_string()),
            _ => AssetError::Io { path, source },
        })
    }
}

/// Normalize an asset path into a cache key.
///
/// Leading `./` and `/` are stripped and the site root becomes `index`.
///
/// # Errors
///
/// Returns [`AssetError::InvalidPath`] for `..`, `.` or empty components and
/// backslashes.
pub fn asset_key(path: &str) -> Result<String, AssetError> {
    let trimmed = path.trim();
    let relative = trimmed
        .strip_prefix("./")
        .unwrap_or(trimmed)
        .trim_start_matches('/');

    if relative.is_empty() || relative == "." {
        return Ok(ROOT_KEY.to_string());
    }

    let valid = !relative.contains('\\')
        && relative
            .split('/')
            .all(|component| !matches!(component, "" | "." | ".."));

    if valid {
        Ok(relative.to_string())
    } else {
        Err(AssetError::InvalidPath(path.to_string()))
    }
}

/// Versioned asset cache rooted in a directory.
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
    version: String,
}

impl AssetCache {
    /// Cache at `root` using [`CACHE_VERSION`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_version(root, CACHE_VERSION)
    }

    /// Cache at `root` using an explicit version name.
    pub fn with_version(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
        }
    }

    /// Cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active version name.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn version_dir(&self) -> PathBuf {
        self.root.join(&self.version)
    }

    /// Fetch every manifest entry from `source` and store them all.
    ///
    /// Nothing is written unless every entry was fetched.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssetError`] from path normalization, the source or
    /// the filesystem.
    pub fn install<S: AssetSource + ?Sized>(
        &self,
        manifest: &[&str],
        source: &S,
    ) -> Result<usize, AssetError> {
        let fetched = manifest
            .iter()
            .map(|path| {
                let key = asset_key(path)?;
                let bytes = source.fetch(&key)?;

                Ok((key, bytes))
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        for (key, bytes) in &fetched {
            self.store(key, bytes)?;
        }

        info!(version = %self.version, assets = fetched.len(), "installed asset cache");

        Ok(fetched.len())
    }

    /// Remove every cache version other than the active one.
    ///
    /// Returns the purged version names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError::Io`] when the root cannot be listed or a stale
    /// version cannot be removed.
    pub fn activate(&self) -> Result<Vec<String>, AssetError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AssetError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut purged = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Io {
                path: self.root.clone(),
                source,
            })?;

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if name == self.version || !path.is_dir() {
                continue;
            }

            fs::remove_dir_all(&path).map_err(|source| AssetError::Io { path, source })?;

            purged.push(name);
        }

        purged.sort();

        if !purged.is_empty() {
            info!(version = %self.version, ?purged, "purged stale asset caches");
        }

        Ok(purged)
    }

    /// Cached copy of an asset, if present.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] for invalid paths or unreadable cache files.
    pub fn cached(&self, path: &str) -> Result<Option<Vec<u8>>, AssetError> {
        self.read(&asset_key(path)?)
    }

    /// Serve an asset cache-first.
    ///
    /// On a miss the asset is fetched from `source` and a copy is stored; a
    /// failed copy is logged and the fetched bytes are still returned.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] for invalid paths, or the source's error when
    /// the asset is neither cached nor fetchable.
    pub fn fetch<S: AssetSource + ?Sized>(
        &self,
        path: &str,
        source: &S,
    ) -> Result<Asset, AssetError> {
        let key = asset_key(path)?;

        if let Some(bytes) = self.read(&key)? {
            debug!(%key, "asset cache hit");

            return Ok(Asset {
                bytes,
                origin: AssetOrigin::Cache,
            });
        }

        let bytes = source.fetch(&key)?;

        if let Err(error) = self.store(&key, &bytes) {
            warn!(%error, %key, "failed to cache fetched asset");
        }

        Ok(Asset {
            bytes,
            origin: AssetOrigin::Source,
        })
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError> {
        let path = self.version_dir().join(key);

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AssetError::Io { path, source }),
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), AssetError> {
        let path = self.version_dir().join(key);
        let dir = path.parent().unwrap_or(self.root.as_path()).to_path_buf();

        let io_error = |source: io::Error| AssetError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(io_error)?;

        let mut file = NamedTempFile::new_in(&dir).map_err(io_error)?;

        file.write_all(bytes).map_err(io_error)?;
        file.persist(&path).map_err(|error| io_error(error.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn bundle() -> Result<tempfile::TempDir, io::Error> {
        let dir = tempfile::tempdir()?;

        for (name, contents) in [
            ("index.html", "<html></html>"),
            ("style.css", "body{}"),
            ("app.js", "main()"),
            ("manifest.webmanifest", "{}"),
            ("logo.png", "png"),
        ] {
            fs::write(dir.path().join(name), contents)?;
        }

        Ok(dir)
    }

    #[test]
    fn normalizes_asset_paths() -> TestResult {
        assert_eq!(asset_key("./")?, "index");
        assert_eq!(asset_key("/")?, "index");
        assert_eq!(asset_key("./style.css")?, "style.css");
        assert_eq!(asset_key("/icons/logo.png")?, "icons/logo.png");

        for bad in ["../secret", "./a/../../b", "a//b", "a\\b"] {
            assert!(
                matches!(asset_key(bad), Err(AssetError::InvalidPath(_))),
                "accepted {bad:?}"
            );
        }

        Ok(())
    }

    #[test]
    fn install_caches_manifest() -> TestResult {
        let bundle = bundle()?;
        let root = tempfile::tempdir()?;
        let cache = AssetCache::new(root.path());

        assert_eq!(cache.install(&ASSET_MANIFEST, &DirSource::new(bundle.path()))?, 6);

        assert_eq!(cache.cached("./")?, Some(b"<html></html>".to_vec()));
        assert_eq!(cache.cached("./app.js")?, Some(b"main()".to_vec()));
        assert!(root.path().join(CACHE_VERSION).join("logo.png").is_file());

        Ok(())
    }

    #[test]
    fn install_is_all_or_nothing() -> TestResult {
        let bundle = bundle()?;
        fs::remove_file(bundle.path().join("logo.png"))?;

        let root = tempfile::tempdir()?;
        let cache = AssetCache::new(root.path());

        let result = cache.install(&ASSET_MANIFEST, &DirSource::new(bundle.path()));

        assert!(matches!(result, Err(AssetError::Unavailable(key)) if key == "logo.png"));
        assert_eq!(cache.cached("./index.html")?, None);

        Ok(())
    }

    #[test]
    fn activate_purges_other_versions() -> TestResult {
        let root = tempfile::tempdir()?;

        for version in ["client-archive-cache-v1", "client-archive-cache-v2", CACHE_VERSION] {
            fs::create_dir_all(root.path().join(version))?;
        }
        fs::write(root.path().join("notes.txt"), "keep")?;

        let purged = AssetCache::new(root.path()).activate()?;

        assert_eq!(purged, ["client-archive-cache-v1", "client-archive-cache-v2"]);
        assert!(root.path().join(CACHE_VERSION).is_dir());
        assert!(root.path().join("notes.txt").is_file());

        Ok(())
    }

    #[test]
    fn activate_without_root_is_empty() -> TestResult {
        let root = tempfile::tempdir()?;

        assert!(AssetCache::new(root.path().join("missing")).activate()?.is_empty());

        Ok(())
    }

    #[test]
    fn fetch_prefers_cache_then_stores_source_copy() -> TestResult {
        let root = tempfile::tempdir()?;
        let cache = AssetCache::new(root.path());

        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .withf(|key| key.to_string() == "style.css")
            .times(1)
            .returning(|_| Ok(b"body{}".to_vec()));

        let first = cache.fetch("./style.css", &source)?;
        let second = cache.fetch("style.css", &source)?;

        assert_eq!(first.origin, AssetOrigin::Source);
        assert_eq!(second.origin, AssetOrigin::Cache);
        assert_eq!(second.bytes, b"body{}");

        Ok(())
    }

    #[test]
    fn fetch_miss_with_failing_source_errors() -> TestResult {
        let root = tempfile::tempdir()?;
        let cache = AssetCache::new(root.path());

        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .returning(|key| Err(AssetError::Unavailable(key.to_string())));

        assert!(matches!(
            cache.fetch("./app.js", &source),
            Err(AssetError::Unavailable(_))
        ));

        Ok(())
    }
}
