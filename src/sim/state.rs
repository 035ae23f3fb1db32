//! Engine state and core simulation types
//!
//! Everything the animation loop mutates lives in [`OrbEngine`]; one engine
//! per mounted hero, nothing shared between instances.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::orbit::{MAX_ORBIT_RADIUS, OrbitalProfile};
use super::particles::ParticleSystem;
use super::transmission::Transmission;
use super::trig::TrigCache;
use crate::consts::*;
use crate::settings::Settings;

/// Device class picked from the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// Where the orb sits and how large it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub viewport: Vec2,
    pub device: DeviceClass,
    /// Parent rest position before drift, pointer pull and scroll offset
    pub base_center: Vec2,
    /// Multiplier applied to every radius and orbital offset
    pub scale: f32,
}

impl Layout {
    /// Fit the orb system into a `width` x `height` viewport
    pub fn compute(width: f32, height: f32) -> Self {
        let max_orbit = PARENT_RADIUS + 120.0 + (CHILD_COUNT as f32 - 1.0) * 40.0;
        let max_reach = max_orbit + CHILD_RADIUS + 8.0;
        let fit = width.min(height) / (max_reach * 2.0);
        let total_max_radius = MAX_ORBIT_RADIUS + CHILD_RADIUS + 10.0;

        let (device, x, factor) = if width < MOBILE_MAX_WIDTH {
            let available = (width - 40.0).min(height - NAVBAR_HEIGHT - 40.0);
            (
                DeviceClass::Mobile,
                width * 0.5,
                (available / (total_max_radius * 2.2)).clamp(0.0, 0.7),
            )
        } else if width < TABLET_MAX_WIDTH {
            (DeviceClass::Tablet, width - PARENT_RADIUS - 100.0, 0.85)
        } else {
            (DeviceClass::Desktop, width - PARENT_RADIUS - 120.0, 1.0)
        };

        Self {
            viewport: Vec2::new(width, height),
            device,
            base_center: Vec2::new(x, NAVBAR_HEIGHT - PARENT_RADIUS),
            scale: fit * factor,
        }
    }
}

/// The central blob
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentOrb {
    /// Spring-driven deformation
    pub drag: f32,
    /// Where input pushed the deformation; decays back to 0
    pub drag_target: f32,
    pub drag_velocity: f32,
    /// Phase of the settle wobble
    pub wobble: f32,
    /// Scroll-induced positional velocity
    pub velocity: Vec2,
    /// Current center (after drift, pointer pull and scroll offset)
    pub center: Vec2,
}

impl ParentOrb {
    /// Displacement along the morph direction (before orb scale)
    pub fn drag_offset(&self) -> Vec2 {
        Vec2::from_angle(PARENT_MORPH_DIRECTION) * self.drag
    }

    /// Visible center: `center` plus the scaled drag displacement
    pub fn visual_center(&self, scale: f32) -> Vec2 {
        self.center + self.drag_offset() * scale
    }
}

/// Where a child is in its knock-out/return cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisruptionPhase {
    /// On its orbit
    #[default]
    Settled,
    /// Impulse received, applied on the next frame
    Disrupted,
    /// Springing back toward the orbit
    Recovering,
}

/// An orbiting child blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildOrb {
    pub index: usize,
    pub profile: OrbitalProfile,
    /// Fixed angle on the orbit (the group rotates as a whole)
    pub angle: f32,
    /// Smoothed offset from the parent's visual center
    pub lag: Vec2,
    /// Projected depth from the last frame (for back-to-front ordering)
    pub depth: f32,
    pub disruption_offset: Vec2,
    pub return_velocity: Vec2,
    /// Impulse waiting to be applied on the next frame
    pub pending_disruption: Vec2,
    pub phase: DisruptionPhase,
    /// Drawn (fade above the hidden threshold) as of the last frame
    pub was_visible: bool,
    pub last_transmission_ms: f64,
}

impl ChildOrb {
    pub fn new(index: usize, count: usize, mount_ms: f64) -> Self {
        Self {
            index,
            profile: OrbitalProfile::preset(index),
            angle: index as f32 * TAU / count as f32,
            lag: Vec2::ZERO,
            depth: 0.0,
            disruption_offset: Vec2::ZERO,
            return_velocity: Vec2::ZERO,
            pending_disruption: Vec2::ZERO,
            phase: DisruptionPhase::Settled,
            was_visible: true,
            last_transmission_ms: mount_ms,
        }
    }

    pub fn is_disrupted(&self) -> bool {
        self.phase != DisruptionPhase::Settled
    }

    /// Knock the child out of its orbit; replaces any unapplied impulse
    pub fn disrupt(&mut self, impulse: Vec2) {
        self.pending_disruption = impulse;
        self.phase = DisruptionPhase::Disrupted;
    }
}

/// Scroll/wheel bookkeeping for velocity estimates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrollTracker {
    pub position: f32,
    pub last_scroll_ms: f64,
    /// Last estimated scroll velocity (pixels per 120th of a second)
    pub velocity: f32,
    pub last_wheel_ms: f64,
}

/// Complete engine state for one mounted hero
#[derive(Debug)]
pub struct OrbEngine {
    pub settings: Settings,
    pub layout: Layout,
    pub parent: ParentOrb,
    pub children: Vec<ChildOrb>,
    pub particles: ParticleSystem,
    pub transmissions: Vec<Transmission>,
    pub scroll: ScrollTracker,
    /// Pointer position in surface coordinates, once it has moved
    pub pointer: Option<Vec2>,
    /// Whether the hero region is on screen (the loop idles otherwise)
    pub hero_visible: bool,
    /// Timestamp of the most recent frame
    pub time_ms: f64,
    /// Frames simulated since mount
    pub frame_count: u64,
    pub(crate) trig: TrigCache,
    pub(crate) rng: Pcg32,
}

impl OrbEngine {
    /// Mount an engine for a `width` x `height` surface at `now_ms`
    pub fn new(settings: Settings, width: f32, height: f32, now_ms: f64) -> Self {
        let seed = settings.seed.unwrap_or(now_ms.to_bits());
        let layout = Layout::compute(width, height);

        let mut trig = TrigCache::new();
        trig.tables(settings.quality.parent_points());
        trig.tables(settings.quality.child_points());

        let children = (0..CHILD_COUNT)
            .map(|i| ChildOrb::new(i, CHILD_COUNT, now_ms))
            .collect();

        log::info!(
            "Orb engine mounted: {}x{} ({:?}, scale {:.3}), seed {}",
            width,
            height,
            layout.device,
            layout.scale,
            seed
        );

        Self {
            settings,
            parent: ParentOrb {
                center: layout.base_center,
                ..Default::default()
            },
            layout,
            children,
            particles: ParticleSystem::new(),
            transmissions: Vec::new(),
            scroll: ScrollTracker {
                last_scroll_ms: now_ms,
                last_wheel_ms: now_ms,
                ..Default::default()
            },
            pointer: None,
            hero_visible: true,
            time_ms: now_ms,
            frame_count: 0,
            trig,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Recompute the layout after a viewport change
    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Layout::compute(width, height);
        self.parent.center = self.layout.base_center;
        log::debug!(
            "Orb layout: {:?} at {:?}, scale {:.3}",
            self.layout.device,
            self.layout.base_center,
            self.layout.scale
        );
    }

    /// Number of point resolutions in the trig cache
    pub fn cached_resolutions(&self) -> usize {
        self.trig.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_layout() {
        let layout = Layout::compute(1024.0, 768.0);
        assert_eq!(layout.device, DeviceClass::Desktop);
        assert_eq!(layout.base_center, Vec2::new(1024.0 - 150.0, 10.0));
        assert!((layout.scale - 768.0 / 658.0).abs() < 1e-4);
    }

    #[test]
    fn test_tablet_and_mobile_layout() {
        let tablet = Layout::compute(800.0, 1000.0);
        assert_eq!(tablet.device, DeviceClass::Tablet);
        assert_eq!(tablet.base_center.x, 800.0 - 130.0);
        assert!((tablet.scale - 800.0 / 658.0 * 0.85).abs() < 1e-4);

        let mobile = Layout::compute(375.0, 667.0);
        assert_eq!(mobile.device, DeviceClass::Mobile);
        assert_eq!(mobile.base_center.x, 187.5);
        let factor = (335.0f32 / (116.0 * 2.2)).min(0.7);
        assert!((mobile.scale - 375.0 / 658.0 * factor).abs() < 1e-4);
    }

    #[test]
    fn test_short_mobile_viewport_never_inverts() {
        // Shorter than the navbar plus margin
        let layout = Layout::compute(360.0, 60.0);
        assert_eq!(layout.device, DeviceClass::Mobile);
        assert_eq!(layout.scale, 0.0);
        let tiny = Layout::compute(20.0, 400.0);
        assert!(tiny.scale >= 0.0);
    }

    #[test]
    fn test_children_evenly_spaced() {
        let engine = OrbEngine::new(Settings::default(), 1024.0, 768.0, 0.0);
        assert_eq!(engine.children.len(), CHILD_COUNT);
        for (i, child) in engine.children.iter().enumerate() {
            assert!((child.angle - i as f32 * TAU / 5.0).abs() < 1e-6);
            assert!(!child.is_disrupted());
            assert!(child.was_visible);
        }
        // Parent and child resolutions are warmed at mount
        assert_eq!(engine.cached_resolutions(), 2);
    }

    #[test]
    fn test_disrupt_marks_child() {
        let mut child = ChildOrb::new(0, 5, 0.0);
        child.disrupt(Vec2::new(3.0, 4.0));
        assert_eq!(child.phase, DisruptionPhase::Disrupted);
        assert!(child.is_disrupted());
        assert_eq!(child.disruption_offset, Vec2::ZERO);
        assert_eq!(child.pending_disruption, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_resize_moves_parent_home() {
        let mut engine = OrbEngine::new(Settings::default(), 1024.0, 768.0, 0.0);
        engine.resize(500.0, 800.0);
        assert_eq!(engine.layout.device, DeviceClass::Mobile);
        assert_eq!(engine.parent.center, engine.layout.base_center);
    }
}
