//! Locators: short-lived, process-unique references to produced images.
//!
//! A successful conversion registers its PNG bytes and hands back an
//! [`ImageLocator`]. The locator stays resolvable until the caller revokes
//! it or the registry is dropped. Locators are never reused, even across
//! registries, because the sequence counter is process-wide.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

const SCHEME: &str = "blob:pdf2img";

static NEXT_LOCATOR: AtomicU64 = AtomicU64::new(1);

/// Opaque reference to an image held by a [`LocatorRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageLocator(String);

impl ImageLocator {
    fn next() -> Self {
        let seq = NEXT_LOCATOR.fetch_add(1, Ordering::Relaxed);
        Self(format!("{SCHEME}/{}-{seq}", std::process::id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory table from locator to image bytes.
#[derive(Debug, Default)]
pub struct LocatorRegistry {
    entries: Mutex<HashMap<ImageLocator, Arc<[u8]>>>,
}

impl LocatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under a fresh locator.
    pub fn register(&self, bytes: Arc<[u8]>) -> ImageLocator {
        let locator = ImageLocator::next();
        debug!(locator = %locator, bytes = bytes.len(), "locator registered");
        self.lock().insert(locator.clone(), bytes);
        locator
    }

    pub fn resolve(&self, locator: &ImageLocator) -> Option<Arc<[u8]>> {
        self.lock().get(locator).cloned()
    }

    /// Release the bytes behind `locator`. Returns whether it was live.
    pub fn revoke(&self, locator: &ImageLocator) -> bool {
        let removed = self.lock().remove(locator).is_some();
        if removed {
            debug!(locator = %locator, "locator revoked");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ImageLocator, Arc<[u8]>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
