//! Wedge geometry for the selection wheel.
//!
//! Layout contract: wedge `i`'s center sits at absolute angle `i * (360/N)`,
//! a fixed pointer sits at angle 0 ("top"), and the wheel rotates under it.
//! The functions here are the whole angle↔index derivation; the half-wedge
//! offset and the 0/360 wrap live in exactly one place so the round-trip can
//! be tested exhaustively.

/// Minimum whole revolutions added to a spin. Presentation only.
pub const MIN_FULL_SPINS: u32 = 5;

/// Maximum whole revolutions added to a spin. Presentation only.
pub const MAX_FULL_SPINS: u32 = 8;

/// Map any angle onto `[0, 360)`.
#[must_use]
pub fn normalize_deg(angle: f64) -> f64 {
    let r = angle % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

/// Angular width of one wedge.
#[must_use]
pub fn wedge_width(wedge_count: usize) -> f64 {
    debug_assert!(wedge_count > 0, "a wheel needs at least one wedge");
    360.0 / wedge_count as f64
}

/// Absolute angle the wheel must rest at for wedge `index` to sit under the
/// pointer.
#[must_use]
pub fn rest_angle(index: usize, wedge_count: usize) -> f64 {
    normalize_deg(360.0 - index as f64 * wedge_width(wedge_count))
}

/// Total rotation for a spin: continue from `current`, add `full_spins`
/// whole revolutions, then land exactly on the winner's rest angle.
///
/// `full_spins` changes the animated distance, never the landing wedge.
#[must_use]
pub fn final_rotation(current: f64, index: usize, wedge_count: usize, full_spins: u32) -> f64 {
    let delta = normalize_deg(rest_angle(index, wedge_count) - current);
    current + f64::from(full_spins) * 360.0 + delta
}

/// Recover the wedge index a rotation rests on. Exact inverse of
/// [`final_rotation`] for every index and wedge count.
#[must_use]
pub fn recover_index(final_rotation: f64, wedge_count: usize) -> usize {
    let s = wedge_width(wedge_count);
    let normalized = normalize_deg(final_rotation);
    let idx = (normalize_deg(360.0 - normalized + s / 2.0) / s).floor() as usize;
    // normalize_deg can round to exactly 360.0 for tiny negative inputs.
    idx % wedge_count
}
