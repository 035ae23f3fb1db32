//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Mounting and teardown (web)
//! - Input events and hero visibility (web)
//! - The frame loop (requestAnimationFrame on web, a fixed-step loop natively)

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use headless::{HeadlessReport, ScriptedInput, run_headless};
#[cfg(target_arch = "wasm32")]
pub use web::{OrbHeroHandle, mount_orb_hero};
