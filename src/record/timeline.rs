use crate::foundation::core::Fps;

/// Frames emitted while image `index` is held for `secs_per_image`.
///
/// Rounding is done on cumulative boundaries, so the sum over `n` images is exactly
/// `round(n * secs_per_image * fps)` with no drift.
pub fn frames_for_image(index: usize, secs_per_image: f64, fps: Fps) -> u64 {
    let start = boundary(index, secs_per_image, fps);
    let end = boundary(index + 1, secs_per_image, fps);
    end.saturating_sub(start)
}

/// Total frames for `count` images.
pub fn total_frames(count: usize, secs_per_image: f64, fps: Fps) -> u64 {
    boundary(count, secs_per_image, fps)
}

/// Nominal duration of a render, in seconds.
pub fn nominal_duration_secs(count: usize, secs_per_image: f64) -> f64 {
    count as f64 * secs_per_image
}

fn boundary(index: usize, secs_per_image: f64, fps: Fps) -> u64 {
    fps.secs_to_frames_round(index as f64 * secs_per_image)
}

#[cfg(test)]
#[path = "../../tests/unit/record/timeline.rs"]
mod tests;
