//! Collision and force helpers shared by arrows, targets, pickups and obstacles
//!
//! Everything here is a pure function of positions; entity modules decide
//! which radius to use and what a contact means.

use glam::{Vec2, Vec3};

/// Point-in-sphere test (boundary inclusive)
#[inline]
pub fn sphere_contains(center: Vec3, radius: f32, point: Vec3) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Two spheres overlap
#[inline]
pub fn spheres_overlap(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    sphere_contains(a, ra + rb, b)
}

/// Distance in the ground (XZ) plane, ignoring height
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Where the segment `from → to` crosses the plane `z = plane_z`, if it does.
///
/// Only crossings that start on the near side (`from.z > plane_z`) count, so
/// an arrow already past the wheel never "re-enters" it.
pub fn plane_crossing(from: Vec3, to: Vec3, plane_z: f32) -> Option<Vec3> {
    if from.z <= plane_z || to.z > plane_z {
        return None;
    }
    let span = from.z - to.z;
    let t = if span.abs() > f32::EPSILON {
        (from.z - plane_z) / span
    } else {
        0.0
    };
    Some(from.lerp(to, t.clamp(0.0, 1.0)))
}

/// Attraction toward `source` with magnitude `strength / distance`.
///
/// Returns `None` at or inside `inner_radius` and beyond `range`.
pub fn inverse_distance_pull(
    source: Vec3,
    point: Vec3,
    inner_radius: f32,
    range: f32,
    strength: f32,
) -> Option<Vec3> {
    let offset = source - point;
    let dist = offset.length();
    if dist <= inner_radius || dist > range || dist <= f32::EPSILON {
        return None;
    }
    Some(offset / dist * (strength / dist))
}

/// Axis-aligned bounds check (inclusive)
#[inline]
pub fn within_bounds(point: Vec3, min: Vec3, max: Vec3) -> bool {
    point.cmpge(min).all() && point.cmple(max).all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_contains_boundary() {
        let c = Vec3::new(0.0, 1.0, 0.0);
        assert!(sphere_contains(c, 1.0, Vec3::new(1.0, 1.0, 0.0)));
        assert!(!sphere_contains(c, 1.0, Vec3::new(1.01, 1.0, 0.0)));
    }

    #[test]
    fn test_spheres_overlap() {
        assert!(spheres_overlap(Vec3::ZERO, 0.5, Vec3::new(0.9, 0.0, 0.0), 0.5));
        assert!(!spheres_overlap(Vec3::ZERO, 0.5, Vec3::new(1.1, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let d = horizontal_distance(Vec3::new(0.0, 10.0, 0.0), Vec3::new(3.0, -4.0, 4.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_crossing_interpolates() {
        let hit = plane_crossing(Vec3::new(0.0, 2.0, -8.0), Vec3::new(0.0, 0.0, -12.0), -10.0)
            .expect("segment crosses plane");
        assert!((hit - Vec3::new(0.0, 1.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn test_plane_crossing_one_sided() {
        // Already past the plane
        assert!(plane_crossing(Vec3::new(0.0, 0.0, -11.0), Vec3::new(0.0, 0.0, -12.0), -10.0).is_none());
        // Moving away from it
        assert!(plane_crossing(Vec3::new(0.0, 0.0, -11.0), Vec3::new(0.0, 0.0, -9.0), -10.0).is_none());
        // Not reaching it
        assert!(plane_crossing(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -9.0), -10.0).is_none());
    }

    #[test]
    fn test_pull_points_at_source() {
        let f = inverse_distance_pull(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 0.5, 5.0, 4.0).unwrap();
        assert!((f - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_pull_range_limits() {
        assert!(inverse_distance_pull(Vec3::ZERO, Vec3::new(0.4, 0.0, 0.0), 0.5, 5.0, 4.0).is_none());
        assert!(inverse_distance_pull(Vec3::ZERO, Vec3::new(5.1, 0.0, 0.0), 0.5, 5.0, 4.0).is_none());
    }

    #[test]
    fn test_within_bounds() {
        let min = Vec3::splat(-1.0);
        let max = Vec3::splat(1.0);
        assert!(within_bounds(Vec3::ZERO, min, max));
        assert!(!within_bounds(Vec3::new(0.0, 1.5, 0.0), min, max));
    }
}
