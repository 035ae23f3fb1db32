//! Input events and how they perturb the engine
//!
//! Handlers only write velocity/target fields; the next `tick` reads them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::OrbEngine;
use crate::consts::PARENT_MORPH_DIRECTION;

/// Wheel velocity clamp (pixels per 120th of a second)
const MAX_WHEEL_VELOCITY: f32 = 80.0;

/// Environment signal sampled by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer moved to a surface-relative position
    PointerMove { x: f32, y: f32 },
    /// Page scrolled to `scroll_y` at `at_ms`
    Scroll { scroll_y: f32, at_ms: f64 },
    /// Wheel turned by `delta_y` at `at_ms`
    Wheel { delta_y: f32, at_ms: f64 },
    /// Viewport resized
    Resize { width: f32, height: f32 },
    /// Hero region entered or left the viewport
    HeroVisibility { visible: bool },
}

/// What the frame loop should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// The hero just came back on screen; restart the loop if it stopped
    pub resume: bool,
}

/// Apply one input event to the engine
pub fn handle_input(engine: &mut OrbEngine, event: &InputEvent) -> InputOutcome {
    match *event {
        InputEvent::PointerMove { x, y } => {
            engine.pointer = Some(Vec2::new(x, y));
        }
        InputEvent::Scroll { scroll_y, at_ms } => on_scroll(engine, scroll_y, at_ms),
        InputEvent::Wheel { delta_y, at_ms } => on_wheel(engine, delta_y, at_ms),
        InputEvent::Resize { width, height } => engine.resize(width, height),
        InputEvent::HeroVisibility { visible } => {
            let was_visible = engine.hero_visible;
            engine.hero_visible = visible;
            if was_visible != visible {
                log::debug!("Hero visibility: {}", visible);
            }
            return InputOutcome {
                resume: visible && !was_visible,
            };
        }
    }
    InputOutcome::default()
}

fn on_scroll(engine: &mut OrbEngine, scroll_y: f32, at_ms: f64) {
    let scroll = &mut engine.scroll;
    let dt = at_ms - scroll.last_scroll_ms;
    if dt > 0.0 {
        scroll.velocity = (scroll_y - scroll.position) / dt as f32 * 120.0;
    }
    scroll.position = scroll_y;
    scroll.last_scroll_ms = at_ms;
    let velocity = scroll.velocity;

    let parent = &mut engine.parent;
    parent.drag_target += velocity * 0.5;
    parent.velocity.y = velocity * 0.3;

    if velocity.abs() > engine.settings.tuning.disruption_velocity {
        let strength = (velocity.abs() * 0.02).min(1.0);
        for child in &mut engine.children {
            let lateral = (engine.rng.random::<f32>() - 0.5) * strength * 30.0;
            child.disrupt(Vec2::new(lateral, velocity * 0.1));
        }
        log::debug!("Scroll velocity {:.1} disrupted children", velocity);
    }
}

fn on_wheel(engine: &mut OrbEngine, delta_y: f32, at_ms: f64) {
    let dt = (at_ms - engine.scroll.last_wheel_ms).max(1.0);
    engine.scroll.last_wheel_ms = at_ms;
    let velocity = (delta_y / dt as f32 * 120.0).clamp(-MAX_WHEEL_VELOCITY, MAX_WHEEL_VELOCITY);
    let angle = PARENT_MORPH_DIRECTION;
    engine.parent.drag_target += angle.sin() * velocity * 1.8 + angle.cos() * velocity * 0.7;
}
