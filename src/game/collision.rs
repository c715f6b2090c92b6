//! Collision System
//!
//! Circle-vs-rectangle collision response. Bodies (the player and loose
//! extinguishers) are circles; obstacles are axis-aligned rectangles.
//!
//! Resolution works on the closest point of each rectangle:
//! 1. Clamp the circle centre into the rectangle to get the closest point
//! 2. If that point is nearer than the radius, push the centre out along the
//!    contact normal until it sits exactly `radius` away
//! 3. Reflect the part of the velocity that points into the surface
//!
//! There is no broad phase. Obstacles are resolved one after another in store
//! order, which is plenty for the handful of rectangles a level has.

use macroquad::math::{vec2, Vec2};

use super::geometry::{project, Bounds};

/// A resolved contact against one rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Corrected circle centre
    pub position: Vec2,
    /// Unit normal pointing from the rectangle toward the circle
    pub normal: Vec2,
    /// How far the circle was pushed
    pub depth: f32,
}

/// Push a circle out of a rectangle.
///
/// Returns `None` when the circle does not touch the rectangle.
pub fn correct_position(position: Vec2, radius: f32, bounds: &Bounds) -> Option<Contact> {
    let closest = bounds.closest_point(position);
    let offset = position - closest;
    let distance = offset.length();

    if distance >= radius {
        return None;
    }

    if distance > f32::EPSILON {
        let normal = offset / distance;
        return Some(Contact {
            position: closest + normal * radius,
            normal,
            depth: radius - distance,
        });
    }

    // Centre is inside the rectangle: leave through the nearest face
    let to_left = position.x - bounds.x;
    let to_right = bounds.right() - position.x;
    let to_top = position.y - bounds.y;
    let to_bottom = bounds.bottom() - position.y;
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

    let (normal, surface) = if nearest == to_left {
        (vec2(-1.0, 0.0), vec2(bounds.x, position.y))
    } else if nearest == to_right {
        (vec2(1.0, 0.0), vec2(bounds.right(), position.y))
    } else if nearest == to_top {
        (vec2(0.0, -1.0), vec2(position.x, bounds.y))
    } else {
        (vec2(0.0, 1.0), vec2(position.x, bounds.bottom()))
    };

    Some(Contact {
        position: surface + normal * radius,
        normal,
        depth: nearest + radius,
    })
}

/// Reflect the component of `velocity` moving into a surface.
///
/// `restitution` of 0 cancels the inward component (slide along the wall),
/// 1 mirrors it (perfect bounce). Velocity already moving away is unchanged.
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    if velocity.dot(normal) >= 0.0 {
        return velocity;
    }
    velocity - project(velocity, normal) * (1.0 + restitution.clamp(0.0, 1.0))
}

/// Resolve a moving circle against every obstacle.
///
/// Updates `position` and `velocity` in place and returns true if any obstacle
/// was touched.
pub fn resolve_circle(
    position: &mut Vec2,
    velocity: &mut Vec2,
    radius: f32,
    obstacles: &[Bounds],
    restitution: f32,
) -> bool {
    let mut hit = false;
    for obstacle in obstacles {
        if let Some(contact) = correct_position(*position, radius, obstacle) {
            *position = contact.position;
            *velocity = reflect_velocity(*velocity, contact.normal, restitution);
            hit = true;
        }
    }
    hit
}

/// True if `point` lies inside any of the rectangles
pub fn point_in_any(point: Vec2, rects: &[Bounds]) -> bool {
    rects.iter().any(|r| r.contains(point))
}
