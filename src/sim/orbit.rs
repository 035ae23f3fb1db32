//! Orbital placement of child blobs around the parent
//!
//! Children keep a fixed angle; revolution is a rigid rotation of the whole
//! child group about the parent (see `tick`). This module handles the tilted
//! plane, the perspective projection and the overlap push-out.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PERSPECTIVE;
use crate::polar_to_cartesian;

/// Per-child orbit shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalProfile {
    /// Distance from the parent center (before orb scale)
    pub radius: f32,
    /// Tilt of the orbital plane (radians)
    pub inclination: f32,
}

/// Preset profiles, cycled by child index
pub const ORBIT_PRESETS: [OrbitalProfile; 5] = [
    OrbitalProfile {
        radius: 60.0,
        inclination: PI / 12.0,
    },
    OrbitalProfile {
        radius: 85.0,
        inclination: -PI / 8.0,
    },
    OrbitalProfile {
        radius: 55.0,
        inclination: PI / 6.0,
    },
    OrbitalProfile {
        radius: 95.0,
        inclination: PI / 4.0,
    },
    OrbitalProfile {
        radius: 75.0,
        inclination: -PI / 10.0,
    },
];

/// Largest preset orbit radius (used for layout)
pub const MAX_ORBIT_RADIUS: f32 = 95.0;

impl OrbitalProfile {
    pub fn preset(index: usize) -> Self {
        ORBIT_PRESETS[index % ORBIT_PRESETS.len()]
    }
}

/// A child's orbital slot after tilting and projecting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Screen-plane offset from the parent, perspective applied (before orb scale)
    pub offset: Vec2,
    /// Out-of-plane coordinate (positive = farther away)
    pub depth: f32,
    /// Raw pinhole factor `perspective / (perspective + depth)`
    pub perspective: f32,
}

impl Projection {
    /// Size falloff with depth (never below 20%)
    pub fn depth_scale(&self) -> f32 {
        self.perspective * 0.8 + 0.2
    }

    /// Opacity falloff with depth (never below 30%)
    pub fn depth_opacity(&self) -> f32 {
        self.perspective * 0.7 + 0.3
    }
}

/// Place a child at `angle` on `profile`'s tilted orbit
pub fn project(profile: &OrbitalProfile, angle: f32) -> Projection {
    let planar = polar_to_cartesian(profile.radius, angle);
    let y = planar.y * profile.inclination.cos();
    let depth = planar.y * profile.inclination.sin();
    let perspective = PERSPECTIVE / (PERSPECTIVE + depth);
    Projection {
        offset: Vec2::new(planar.x, y) * perspective,
        depth,
        perspective,
    }
}

/// Exponential lag toward `target` (`smoothing` of the gap closed per frame)
#[inline]
pub fn lag_toward(current: Vec2, target: Vec2, smoothing: f32) -> Vec2 {
    current + (target - current) * smoothing
}

/// One-step push that moves `child` out of the parent's buffer zone.
///
/// Returns the correction to add; zero when there is no overlap (or the
/// centers coincide and no direction exists).
pub fn overlap_push(child: Vec2, parent: Vec2, min_distance: f32) -> Vec2 {
    let delta = child - parent;
    let dist = delta.length();
    if dist > 0.0 && dist < min_distance {
        delta / dist * (min_distance - dist) * 0.5
    } else {
        Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_cycle() {
        assert_eq!(OrbitalProfile::preset(0), OrbitalProfile::preset(5));
        assert_eq!(OrbitalProfile::preset(3).radius, MAX_ORBIT_RADIUS);
        let max = ORBIT_PRESETS.iter().map(|p| p.radius).fold(0.0, f32::max);
        assert_eq!(max, MAX_ORBIT_RADIUS);
    }

    #[test]
    fn test_flat_orbit_has_no_depth() {
        let profile = OrbitalProfile {
            radius: 50.0,
            inclination: 0.0,
        };
        let p = project(&profile, PI / 2.0);
        assert!(p.depth.abs() < 1e-4);
        assert!((p.perspective - 1.0).abs() < 1e-5);
        assert!((p.offset.y - 50.0).abs() < 1e-3);
        assert!((p.depth_scale() - 1.0).abs() < 1e-5);
        assert!((p.depth_opacity() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_far_side_shrinks_and_dims() {
        let profile = OrbitalProfile::preset(3); // 45 degree tilt
        let near = project(&profile, -PI / 2.0);
        let far = project(&profile, PI / 2.0);
        assert!(far.depth > 0.0 && near.depth < 0.0);
        assert!(far.depth_scale() < near.depth_scale());
        assert!(far.depth_opacity() < near.depth_opacity());
        // Foreshortened vertical extent
        assert!(far.offset.y < profile.radius);
    }

    #[test]
    fn test_lag_closes_fifteen_percent() {
        let next = lag_toward(Vec2::ZERO, Vec2::new(100.0, -20.0), 0.15);
        assert!((next - Vec2::new(15.0, -3.0)).length() < 1e-4);
    }

    #[test]
    fn test_overlap_push() {
        let parent = Vec2::new(10.0, 10.0);
        // 20 units away, buffer 60: pushed 20 further along +x
        let push = overlap_push(Vec2::new(30.0, 10.0), parent, 60.0);
        assert!((push - Vec2::new(20.0, 0.0)).length() < 1e-4);
        assert_eq!(overlap_push(Vec2::new(100.0, 10.0), parent, 60.0), Vec2::ZERO);
        assert_eq!(overlap_push(parent, parent, 60.0), Vec2::ZERO);
    }
}
