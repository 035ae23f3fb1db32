//! Deterministic orb simulation
//!
//! All animation logic lives here. This module must stay pure:
//! - Time only enters through the `now_ms` passed to `tick` and input events
//! - Seeded RNG only
//! - Stable iteration order (by child depth, then index)
//! - No rendering or platform dependencies

pub mod blob;
pub mod color;
pub mod frame;
pub mod input;
pub mod orbit;
pub mod particles;
pub mod spring;
pub mod state;
pub mod tick;
pub mod transmission;
pub mod trig;

pub use blob::{BlobPath, CubicSegment, smooth_blob};
pub use color::{GradientPair, Rgb, color_family, gradient_pair, hsl_to_hex, lerp_color};
pub use frame::{BlobShape, ChildShape, Frame, GradientStop, GroupRotation, ParticleDot, RadialFill};
pub use input::{InputEvent, InputOutcome, handle_input};
pub use orbit::{ORBIT_PRESETS, OrbitalProfile, Projection, project};
pub use particles::{Particle, ParticleSystem};
pub use spring::{approach, damped_spring, damped_spring_vec2};
pub use state::{ChildOrb, DeviceClass, DisruptionPhase, Layout, OrbEngine, ParentOrb, ScrollTracker};
pub use tick::tick;
pub use transmission::{Flash, LightningShape, Transmission};
pub use trig::{TrigCache, TrigTables};
