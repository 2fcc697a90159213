//! Render-scale planning.
//!
//! Rendered area grows with the square of the scale, so the scale that
//! exactly spends a pixel budget is `sqrt(budget / page_area)`. That is
//! clamped to `[0.5, 3.0]`, multiplied by the display density (itself capped
//! at 2×), and capped at 3.0 again. The lower bound is *not* re-applied
//! after the density multiplier: a hint below 1.0 may take the final scale
//! under 0.5.

/// Smallest scale the budget step may produce.
pub const MIN_SCALE: f64 = 0.5;

/// Largest scale, before and after the density multiplier.
pub const MAX_SCALE: f64 = 3.0;

/// Largest density multiplier honoured.
pub const MAX_DENSITY: f64 = 2.0;

/// Compute the render scale for a page of `natural_width × natural_height`
/// units.
///
/// Degenerate (zero-area) pages count as one unit of area, which drives the
/// budget step to its 3.0 ceiling instead of dividing by zero.
pub fn plan_scale(
    natural_width: f64,
    natural_height: f64,
    pixel_budget: f64,
    density_hint: f64,
) -> f64 {
    let page_pixels = (natural_width * natural_height).max(1.0);
    let budget_scale = (pixel_budget / page_pixels).sqrt();
    let safe_scale = budget_scale.clamp(MIN_SCALE, MAX_SCALE);
    (safe_scale * density_hint.min(MAX_DENSITY)).min(MAX_SCALE)
}
