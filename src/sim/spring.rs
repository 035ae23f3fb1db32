//! Spring and smoothing integrators (one step per frame)

use glam::Vec2;

/// One step of a damped Hookean spring.
///
/// Returns the new `(current, velocity)`.
#[inline]
pub fn damped_spring(
    current: f32,
    target: f32,
    velocity: f32,
    stiffness: f32,
    damping: f32,
) -> (f32, f32) {
    let force = (target - current) * stiffness;
    let velocity = (velocity + force) * damping;
    (current + velocity, velocity)
}

/// Component-wise [`damped_spring`] for 2D offsets
#[inline]
pub fn damped_spring_vec2(
    current: Vec2,
    target: Vec2,
    velocity: Vec2,
    stiffness: f32,
    damping: f32,
) -> (Vec2, Vec2) {
    let (x, vx) = damped_spring(current.x, target.x, velocity.x, stiffness, damping);
    let (y, vy) = damped_spring(current.y, target.y, velocity.y, stiffness, damping);
    (Vec2::new(x, y), Vec2::new(vx, vy))
}

/// Exponential smoothing: move `speed` of the way toward `target`
#[inline]
pub fn approach(current: f32, target: f32, speed: f32) -> f32 {
    current + (target - current) * speed
}
