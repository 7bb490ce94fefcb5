//! Math types.
//!
//! Data coordinates stay in `f64` all the way to pixel space, so the double
//! precision `glam` vectors are the ones used by the scene code.

pub use glam::{DVec2, Vec2};

/// Euclidean distance between two pixel positions given as components.
#[inline]
pub fn pixel_distance(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_distance() {
        assert_eq!(pixel_distance(3.0, 4.0), 5.0);
        assert_eq!(pixel_distance(0.0, 0.0), 0.0);
        assert_eq!(DVec2::new(0.0, 0.0).distance(DVec2::new(3.0, 4.0)), 5.0);
    }
}
