//! Collision detection for circles against rectangles and circles
//!
//! Characters, projectiles, pools and pickups are all circles; terrain is
//! axis-aligned rectangles. Everything reduces to closest-point tests.

use glam::Vec2;

use super::rect::Rect;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the rectangle surface
    pub point: Vec2,
    /// Surface normal pointing from the rectangle toward the circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle overlaps rectangle (closest-point distance test)
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    (center - rect.closest_point(center)).length_squared() < radius * radius
}

/// Circle overlaps circle
#[inline]
pub fn circle_circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    (a - b).length_squared() < r * r
}

/// Full contact info between a circle and a rectangle
pub fn circle_rect_contact(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(center);
    let offset = center - closest;
    let dist = offset.length();

    if dist >= radius {
        return CollisionResult::miss();
    }

    if dist > 1e-4 {
        return CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Centre is inside the rectangle - push out through the nearest face
    let to_min = center - rect.min;
    let to_max = rect.max - center;
    let faces = [
        (to_min.x, Vec2::NEG_X),
        (to_max.x, Vec2::X),
        (to_min.y, Vec2::NEG_Y),
        (to_max.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .iter()
        .copied()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::X));

    CollisionResult {
        hit: true,
        point: center + normal * depth,
        normal,
        penetration: depth + radius,
    }
}

/// Does the segment `a -> b` swept by a circle of `radius` touch the circle
/// at `c` with radius `rc`?
pub fn swept_circle_hit(a: Vec2, b: Vec2, radius: f32, c: Vec2, rc: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq < 1e-6 {
        0.0
    } else {
        ((c - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    circle_circle_overlap(closest, radius, c, rc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Rect {
        Rect::new(Vec2::ZERO, Vec2::splat(100.0))
    }

    #[test]
    fn test_circle_rect_overlap_edges() {
        let rect = unit_box();
        assert!(circle_rect_overlap(Vec2::new(110.0, 50.0), 15.0, &rect));
        assert!(!circle_rect_overlap(Vec2::new(120.0, 50.0), 15.0, &rect));
        // Corner: distance to (100,100) is ~14.14
        assert!(circle_rect_overlap(Vec2::new(110.0, 110.0), 15.0, &rect));
        assert!(!circle_rect_overlap(Vec2::new(112.0, 112.0), 15.0, &rect));
    }

    #[test]
    fn test_contact_normal_points_out() {
        let rect = unit_box();
        let result = circle_rect_contact(Vec2::new(-5.0, 50.0), 10.0, &rect);
        assert!(result.hit);
        assert!((result.normal - Vec2::NEG_X).length() < 1e-5);
        assert!((result.penetration - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_contact_inside_uses_nearest_face() {
        let rect = unit_box();
        let result = circle_rect_contact(Vec2::new(50.0, 95.0), 10.0, &rect);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_swept_hit_catches_tunneling() {
        // Fast projectile jumps over a character in one step
        let hit = swept_circle_hit(
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 0.0),
            5.0,
            Vec2::new(100.0, 10.0),
            28.0,
        );
        assert!(hit);
        let miss = swept_circle_hit(
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 0.0),
            5.0,
            Vec2::new(100.0, 60.0),
            28.0,
        );
        assert!(!miss);
    }
}
