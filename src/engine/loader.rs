//! Lazy, single-flight engine initialisation.
//!
//! Loading pdfium can mean a ~30 MB download on first run, so it happens on
//! demand and exactly once no matter how many conversions ask at the same
//! moment. Callers that arrive while an attempt is running await that same
//! attempt through a [`Shared`] future and all see its outcome, success or
//! failure. A failed attempt is forgotten so the next `acquire` retries; a
//! successful one is cached for the loader's lifetime.

use super::pdfium::PdfiumEngine;
use super::SharedEngine;
use crate::config::RasterConfig;
use crate::error::EngineError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

type InitFuture = BoxFuture<'static, Result<SharedEngine, EngineError>>;
type Initializer = Box<dyn Fn() -> InitFuture + Send + Sync>;

#[derive(Default)]
struct LoaderState {
    ready: Option<SharedEngine>,
    in_flight: Option<(u64, Shared<InitFuture>)>,
    attempts: u64,
}

/// Owner of the process' rendering engine.
///
/// Create one per application context and share it (it is `Send + Sync`);
/// every [`crate::convert::Converter`] built from it reuses the same engine.
pub struct EngineLoader {
    init: Initializer,
    state: Mutex<LoaderState>,
}

impl EngineLoader {
    /// A loader whose engine is produced by `init`.
    ///
    /// `init` runs once per attempt. It is not called again after an
    /// attempt succeeds.
    pub fn new<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SharedEngine, EngineError>> + Send + 'static,
    {
        Self {
            init: Box::new(move || init().boxed()),
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// A loader that locates (downloading if needed) and binds pdfium using
    /// the library settings in `config`.
    pub fn pdfium(config: &RasterConfig) -> Self {
        let options = config.fetch_options();
        Self::new(move || {
            let options = options.clone();
            async move {
                let engine = tokio::task::spawn_blocking(move || PdfiumEngine::load(&options))
                    .await
                    .map_err(|e| EngineError::new(format!("pdfium loader task failed: {e}")))??;
                Ok::<_, EngineError>(Arc::new(engine) as SharedEngine)
            }
        })
    }

    /// Return the engine, initialising it if nobody has yet.
    pub async fn acquire(&self) -> Result<SharedEngine, EngineError> {
        let (attempt, pending) = {
            let mut state = self.lock();
            if let Some(engine) = &state.ready {
                return Ok(Arc::clone(engine));
            }
            match &state.in_flight {
                Some((attempt, pending)) => (*attempt, pending.clone()),
                None => {
                    state.attempts += 1;
                    let attempt = state.attempts;
                    let pending = (self.init)().shared();
                    state.in_flight = Some((attempt, pending.clone()));
                    debug!(attempt, "engine initialisation started");
                    (attempt, pending)
                }
            }
        };

        let outcome = pending.await;

        let mut state = self.lock();
        let current = matches!(&state.in_flight, Some((id, _)) if *id == attempt);
        if current {
            state.in_flight = None;
            match &outcome {
                Ok(engine) => {
                    state.ready = Some(Arc::clone(engine));
                    info!(attempt, "engine ready");
                }
                Err(e) => warn!(attempt, error = %e, "engine initialisation failed"),
            }
        }
        outcome
    }

    /// Whether a successful initialisation has been cached.
    pub fn is_ready(&self) -> bool {
        self.lock().ready.is_some()
    }

    /// Number of initialisation attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EngineLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("EngineLoader")
            .field("ready", &state.ready.is_some())
            .field("in_flight", &state.in_flight.is_some())
            .field("attempts", &state.attempts)
            .finish()
    }
}
