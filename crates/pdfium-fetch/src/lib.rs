//! # pdfium-fetch
//!
//! Finds a usable [PDFium](https://pdfium.googlesource.com/pdfium/) shared
//! library for `pdfium-render`, downloading and caching it when needed, and
//! binds to it.
//!
//! ## Resolution order
//!
//! [`locate_library`] returns the first match of:
//!
//! 1. [`FetchOptions::library_path`] (usually from `PDFIUM_LIB_PATH`), if the
//!    file exists.
//! 2. The per-version cache: `{cache_root}/pdfium-{VERSION}/{lib_name}`.
//! 3. A fresh download of the platform archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    extracted into the cache.
//!
//! Everything here blocks. Async callers run it under
//! `tokio::task::spawn_blocking`.
//!
//! ```rust,no_run
//! use pdfium_fetch::{bind, locate_library, FetchOptions};
//!
//! let located = locate_library(&FetchOptions::from_env()).expect("pdfium unavailable");
//! let pdfium = bind(&located.path).expect("bind failed");
//! ```
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH`: path to an existing pdfium library; skips download.
//! - `PDFIUM_AUTO_CACHE_DIR`: override the cache root.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdfium_render::prelude::Pdfium;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

const RELEASE_BASE: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors returned while locating or binding the library.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cache directory error: {0}")]
    Cache(#[source] std::io::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

/// Release asset layout for one OS/architecture pair.
#[derive(Debug, PartialEq, Eq)]
pub struct Platform {
    /// Asset filename in the release, e.g. `pdfium-linux-x64.tgz`.
    pub archive: &'static str,
    /// Path of the library inside the archive.
    pub member: &'static str,
    /// Filename written to the cache.
    pub file_name: &'static str,
}

impl Platform {
    const fn new(archive: &'static str, library: (&'static str, &'static str)) -> Self {
        Self {
            archive,
            member: library.0,
            file_name: library.1,
        }
    }
}

const DYLIB: (&str, &str) = ("lib/libpdfium.dylib", "libpdfium.dylib");
const SO: (&str, &str) = ("lib/libpdfium.so", "libpdfium.so");
const DLL: (&str, &str) = ("bin/pdfium.dll", "pdfium.dll");

const PLATFORMS: &[(&str, &str, Platform)] = &[
    ("macos", "aarch64", Platform::new("pdfium-mac-arm64.tgz", DYLIB)),
    ("macos", "x86_64", Platform::new("pdfium-mac-x64.tgz", DYLIB)),
    ("linux", "x86_64", Platform::new("pdfium-linux-x64.tgz", SO)),
    ("linux", "aarch64", Platform::new("pdfium-linux-arm64.tgz", SO)),
    ("windows", "x86_64", Platform::new("pdfium-win-x64.tgz", DLL)),
    ("windows", "aarch64", Platform::new("pdfium-win-arm64.tgz", DLL)),
    ("windows", "x86", Platform::new("pdfium-win-x86.tgz", DLL)),
];

/// Look up the release layout for an OS/architecture pair.
pub fn platform_for(os: &str, arch: &str) -> Result<&'static Platform, FetchError> {
    PLATFORMS
        .iter()
        .find(|(o, a, _)| *o == os && *a == arch)
        .map(|(_, _, p)| p)
        .ok_or_else(|| FetchError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// Release layout for the running process.
pub fn current_platform() -> Result<&'static Platform, FetchError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

/// Where the library came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    Explicit,
    Cached,
    Downloaded,
}

/// A library file on disk, ready for [`bind`].
#[derive(Debug, Clone)]
pub struct LocatedLibrary {
    pub path: PathBuf,
    pub source: LibrarySource,
}

/// Knobs for [`locate_library`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Use this library file instead of the cache when it exists.
    pub library_path: Option<PathBuf>,
    /// Cache root. The versioned directory is created beneath it.
    pub cache_dir: Option<PathBuf>,
    /// Whole-request download timeout. Default: 120 s.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Options populated from `PDFIUM_LIB_PATH` and `PDFIUM_AUTO_CACHE_DIR`.
    pub fn from_env() -> Self {
        Self {
            library_path: non_empty_env("PDFIUM_LIB_PATH").map(PathBuf::from),
            cache_dir: non_empty_env("PDFIUM_AUTO_CACHE_DIR").map(PathBuf::from),
            timeout: None,
        }
    }

    /// The versioned directory the library is cached in.
    pub fn versioned_cache_dir(&self) -> PathBuf {
        let root = self.cache_dir.clone().unwrap_or_else(default_cache_root);
        root.join(format!("pdfium-{PDFIUM_VERSION}"))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Platform cache root, e.g. `~/.cache/pdf2img` on Linux.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join("pdf2img")
}

/// Download URL of the release archive for `platform`.
pub fn archive_url(platform: &Platform) -> String {
    format!("{RELEASE_BASE}/chromium%2F{PDFIUM_VERSION}/{}", platform.archive)
}

/// Resolve a library file, downloading it into the cache if nothing usable
/// is on disk yet.
pub fn locate_library(opts: &FetchOptions) -> Result<LocatedLibrary, FetchError> {
    if let Some(explicit) = &opts.library_path {
        if explicit.is_file() {
            debug!(path = %explicit.display(), "using explicit pdfium library");
            return Ok(LocatedLibrary {
                path: explicit.clone(),
                source: LibrarySource::Explicit,
            });
        }
        warn!(
            path = %explicit.display(),
            "configured pdfium library not found; falling back to cache"
        );
    }

    let platform = current_platform()?;
    let dir = opts.versioned_cache_dir();
    let target = dir.join(platform.file_name);

    if target.is_file() {
        debug!(path = %target.display(), "using cached pdfium library");
        return Ok(LocatedLibrary {
            path: target,
            source: LibrarySource::Cached,
        });
    }

    fs::create_dir_all(&dir).map_err(FetchError::Cache)?;

    let url = archive_url(platform);
    info!(%url, "downloading pdfium");
    let archive = download(&url, opts.timeout.unwrap_or(DEFAULT_TIMEOUT))?;
    extract_member(&archive, platform.member, &target)?;
    info!(path = %target.display(), bytes = archive.len(), "pdfium cached");

    Ok(LocatedLibrary {
        path: target,
        source: LibrarySource::Downloaded,
    })
}

/// Bind `pdfium-render` to the library at `path`.
pub fn bind(path: &Path) -> Result<Pdfium, FetchError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| FetchError::Bind {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })
}

fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-fetch/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let mut buf = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    response
        .read_to_end(&mut buf)
        .map_err(|e| FetchError::Download(format!("read error: {e}")))?;
    Ok(buf)
}

/// Unpack `member` from a gzipped tarball into `dest`.
///
/// The file is staged under a unique temporary name beside `dest` and
/// renamed into place, so concurrent extractions into one cache never share
/// a partial file and a reader never sees a half-written library.
pub fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), FetchError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut tarball = Archive::new(GzDecoder::new(archive));
    let entries = tarball
        .entries()
        .map_err(|e| FetchError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| FetchError::Extract(e.to_string()))?;
        let matches = entry
            .path()
            .map(|p| p.to_string_lossy() == member)
            .map_err(|e| FetchError::Extract(e.to_string()))?;
        if !matches {
            continue;
        }

        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(FetchError::Cache)?;
        io::copy(&mut entry, &mut staged)
            .map_err(|e| FetchError::Extract(format!("unpack failed: {e}")))?;
        staged
            .persist(dest)
            .map_err(|e| FetchError::Cache(e.error))?;
        return Ok(());
    }

    Err(FetchError::Extract(format!("'{member}' not found in archive")))
}
