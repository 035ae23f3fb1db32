//! Orb Hero - animated blob background for a landing-page hero section
//!
//! Core modules:
//! - `sim`: Deterministic simulation (springs, orbits, particles, lightning)
//! - `renderer`: WebGPU rendering of simulation frames
//! - `platform`: Browser binding (mount, input listeners, frame loop)
//! - `settings`: Quality preset and tuning constants

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{OrbError, OrbResult};
pub use settings::{QualityPreset, Settings, Tuning};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Number of orbiting child blobs
    pub const CHILD_COUNT: usize = 5;

    /// Blob base radii (before orb scale)
    pub const PARENT_RADIUS: f32 = 30.0;
    pub const CHILD_RADIUS: f32 = 11.0;
    /// Child outline noise amplitude (before orb scale)
    pub const CHILD_AMP: f32 = 0.15;

    /// Direction the parent stretches when dragged (radians, screen space: down)
    pub const PARENT_MORPH_DIRECTION: f32 = std::f32::consts::FRAC_PI_2;

    /// Pinhole distance used to project child depth
    pub const PERSPECTIVE: f32 = 800.0;

    /// Navbar height the parent overlaps
    pub const NAVBAR_HEIGHT: f32 = 40.0;
    /// Breakpoints (CSS pixels)
    pub const MOBILE_MAX_WIDTH: f32 = 768.0;
    pub const TABLET_MAX_WIDTH: f32 = 1024.0;

    /// Lightning polyline resolution
    pub const LIGHTNING_SEGMENTS: usize = 5;

    /// Nominal frame spacing (ms) for headless runs
    pub const FRAME_MS: f64 = 16.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Rotate `point` about `origin` by `radians` (screen space, clockwise for positive angles)
#[inline]
pub fn rotate_about(point: Vec2, origin: Vec2, radians: f32) -> Vec2 {
    origin + Vec2::from_angle(radians).rotate(point - origin)
}
