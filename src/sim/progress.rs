//! Level progress estimate
//!
//! Progress is read off the scroll offset, but which point of the viewport
//! should stand for the player's position? The top of the screen never
//! reaches 0 at the start, the bottom never reaches 1 at the end, and the
//! middle reaches neither. The reference point is therefore chosen as a
//! fraction of the viewport that itself depends on progress:
//!
//! ```text
//! add = (offset + add * viewport) / world
//! ```
//!
//! The recurrence converges, so it is unrolled a fixed number of times
//! instead of being solved exactly. Three terms are the reference depth.

/// Offsets this close to either end of the scroll range snap to 0 or 1
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Progress in [0, 1]: 0 at the bottom of the level, 1 at the top
pub fn estimate_progress(
    offset: f64,
    viewport_height: f64,
    world_height: f64,
    iterations: u32,
) -> f64 {
    let travel = world_height - viewport_height;
    if travel <= 0.0 || offset <= BOUNDARY_EPSILON {
        return 1.0;
    }
    if offset >= travel - BOUNDARY_EPSILON {
        return 0.0;
    }

    let n = iterations as i32;
    let mut add = 0.0;
    for k in (0..n).rev() {
        add += offset * world_height.powi(k) * viewport_height.powi(n - k - 1);
    }
    add /= world_height.powi(n);
    add *= viewport_height;

    (1.0 - (offset + add) / world_height).clamp(0.0, 1.0)
}
