//! Pipeline stages for first-page rasterisation.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and the engine can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ───────────────────────────────▶ encode
//! (sniff,   (engine → document → page 1 → scale     (PNG)
//!  bytes)    → white surface → paint)
//! ```
//!
//! 1. [`input`] : PDF sniffing, lazy byte sources, output naming
//! 2. [`scale`] : pixel-budget render scale, a pure function
//! 3. [`render`]: drive the engine; engine calls run in `spawn_blocking`
//! 4. [`encode`]: lossless PNG at maximum compression

pub mod encode;
pub mod input;
pub mod render;
pub mod scale;
