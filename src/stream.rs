//! Batch conversion: many files, results as they complete.
//!
//! Files are converted concurrently, at most
//! [`RasterConfig::concurrency`](crate::config::RasterConfig) at a time, and
//! emitted in completion order. Each item is tagged with the input name so
//! callers can match results to files. All conversions share the
//! converter's engine, so the first wave waits on a single initialisation.

use crate::convert::Converter;
use crate::output::ConversionResult;
use crate::pipeline::input::InputFile;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of `(input name, result)` pairs.
pub type ConversionStream = Pin<Box<dyn Stream<Item = (String, ConversionResult)> + Send>>;

/// Convert `files`, yielding each result as soon as it is ready.
pub fn convert_stream(converter: Arc<Converter>, files: Vec<InputFile>) -> ConversionStream {
    let concurrency = converter.config().concurrency.max(1);
    info!(files = files.len(), concurrency, "starting batch conversion");

    let s = stream::iter(files.into_iter().map(move |file| {
        let converter = Arc::clone(&converter);
        async move {
            let name = file.name().to_string();
            let result = converter.convert(file).await;
            (name, result)
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
