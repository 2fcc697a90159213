//! Configuration for first-page rasterisation.
//!
//! Every knob lives in [`RasterConfig`], built through
//! [`RasterConfigBuilder`] or loaded from JSON / the environment. The
//! defaults reproduce the preview pipeline exactly: a 2.5 MP budget, the
//! host's pixel ratio (or 1.0), and pdfium fetched into the user cache.

use crate::error::Pdf2ImgError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pixel budget used when none is configured.
pub const DEFAULT_PIXEL_BUDGET: f64 = 2_500_000.0;

/// Configuration for a [`crate::convert::Converter`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::RasterConfig;
///
/// let config = RasterConfig::builder()
///     .pixel_budget(1_000_000.0)
///     .density_hint(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.resolved_density(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Maximum rendered area (width × height) before the density multiplier.
    /// Default: 2 500 000.
    pub pixel_budget: f64,

    /// Output device pixel ratio reported by the host. `None` means the host
    /// did not report one.
    pub density_hint: Option<f64>,

    /// Explicit pdfium shared library. Skips the cache and download.
    pub library_path: Option<PathBuf>,

    /// Cache root for the downloaded pdfium library.
    pub cache_dir: Option<PathBuf>,

    /// Timeout for the one-time pdfium download, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Conversions in flight at once for [`crate::stream::convert_stream`].
    /// Default: 4.
    pub concurrency: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pixel_budget: DEFAULT_PIXEL_BUDGET,
            density_hint: None,
            library_path: None,
            cache_dir: None,
            download_timeout_secs: 120,
            concurrency: 4,
        }
    }
}

impl RasterConfig {
    pub fn builder() -> RasterConfigBuilder {
        RasterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults overlaid with `PDF2IMG_PIXEL_BUDGET`, `PDF2IMG_DENSITY`,
    /// `PDFIUM_LIB_PATH` and `PDFIUM_AUTO_CACHE_DIR`.
    ///
    /// Unparseable numbers are rejected rather than silently ignored.
    pub fn from_env() -> Result<Self, Pdf2ImgError> {
        let mut builder = Self::builder();

        if let Some(budget) = env_var("PDF2IMG_PIXEL_BUDGET") {
            let v = budget.parse::<f64>().map_err(|e| {
                Pdf2ImgError::InvalidConfig(format!("PDF2IMG_PIXEL_BUDGET={budget:?}: {e}"))
            })?;
            builder = builder.pixel_budget(v);
        }
        if let Some(density) = env_var("PDF2IMG_DENSITY") {
            let v = density.parse::<f64>().map_err(|e| {
                Pdf2ImgError::InvalidConfig(format!("PDF2IMG_DENSITY={density:?}: {e}"))
            })?;
            builder = builder.density_hint(v);
        }
        if let Some(path) = env_var("PDFIUM_LIB_PATH") {
            builder = builder.library_path(path);
        }
        if let Some(dir) = env_var("PDFIUM_AUTO_CACHE_DIR") {
            builder = builder.cache_dir(dir);
        }

        builder.build()
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Pdf2ImgError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Pdf2ImgError::InvalidConfig(format!("config JSON: {e}")))?;
        RasterConfigBuilder { config }.build()
    }

    /// The density hint the pipeline actually uses.
    ///
    /// Missing, zero, negative or non-finite ratios fall back to 1.0, the
    /// same way a host reporting a falsy pixel ratio is treated.
    pub fn resolved_density(&self) -> f64 {
        match self.density_hint {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => 1.0,
        }
    }

    pub(crate) fn fetch_options(&self) -> pdfium_fetch::FetchOptions {
        pdfium_fetch::FetchOptions {
            library_path: self.library_path.clone(),
            cache_dir: self.cache_dir.clone(),
            timeout: Some(std::time::Duration::from_secs(self.download_timeout_secs)),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`RasterConfig`].
#[derive(Debug)]
pub struct RasterConfigBuilder {
    config: RasterConfig,
}

impl RasterConfigBuilder {
    pub fn pixel_budget(mut self, pixels: f64) -> Self {
        self.config.pixel_budget = pixels;
        self
    }

    pub fn density_hint(mut self, ratio: f64) -> Self {
        self.config.density_hint = Some(ratio);
        self
    }

    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.library_path = Some(path.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RasterConfig, Pdf2ImgError> {
        let c = &self.config;
        if !(c.pixel_budget.is_finite() && c.pixel_budget > 0.0) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "pixel budget must be a positive number, got {}",
                c.pixel_budget
            )));
        }
        if c.concurrency == 0 {
            return Err(Pdf2ImgError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
