//! Per-frame simulation step
//!
//! `tick` advances the engine to `now_ms` and returns the [`Frame`] to draw.
//! It never fails and never touches a surface.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::blob::smooth_blob;
use super::color::{Rgb, color_family, family_hue, gradient_pair, parent_stop};
use super::frame::{BlobShape, ChildShape, Frame, GradientStop, GroupRotation, ParticleDot, RadialFill};
use super::orbit::{lag_toward, overlap_push, project};
use super::spring::{approach, damped_spring, damped_spring_vec2};
use super::state::{DisruptionPhase, OrbEngine};
use super::transmission::Transmission;
use crate::consts::*;

/// Fade at or below which a child counts as hidden
const HIDDEN_FADE: f32 = 0.05;
/// Fade below which a visible child sheds particles
const DISSOLVE_FADE: f32 = 0.5;
/// Particles shed when a child vanishes / reappears
const VANISH_BURST: usize = 6;
const APPEAR_BURST: usize = 5;
/// Parent and child blobs are drawn at most this opaque
const BLOB_OPACITY: f32 = 0.95;
/// Degrees the child group turns per millisecond
const REVOLUTION_DEG_PER_MS: f64 = 0.012;
/// Pointer attraction range and strength
const POINTER_RANGE: f32 = 400.0;
const POINTER_PULL: f32 = 20.0;
/// Max parent offset caused by page scroll
const MAX_SCROLL_OFFSET: f32 = 50.0;

/// Advance the engine to `now_ms` and build the frame to draw
pub fn tick(engine: &mut OrbEngine, now_ms: f64) -> Frame {
    let gradient = gradient_pair(now_ms);
    let parent_fill = RadialFill::new(
        [(0.0, 0.0), (FRAC_PI_2, 1.0), (PI, 0.5), (PI * 1.5, 0.75)]
            .into_iter()
            .map(|(phase, offset)| GradientStop {
                offset,
                color: parent_stop(now_ms, phase),
            })
            .collect(),
    );

    update_parent_drag(engine);
    update_parent_position(engine, now_ms);

    let scale = engine.layout.scale;
    let parent_center = engine.parent.visual_center(scale);
    let drag = engine.parent.drag;
    let parent_path = smooth_blob(
        &mut engine.trig,
        parent_center,
        (PARENT_RADIUS + drag * 0.15) * scale,
        engine.settings.quality.parent_points(),
        (now_ms * 0.00015) as f32,
        (1.0 + drag.abs() * 0.008) * scale * 0.5,
        0.0,
    );
    let parent = BlobShape {
        center: parent_center,
        path: parent_path,
        fill: parent_fill,
        opacity: BLOB_OPACITY,
    };

    let child_rotation = GroupRotation {
        origin: parent_center,
        radians: if engine.settings.effective_motion() {
            (now_ms * REVOLUTION_DEG_PER_MS).rem_euclid(360.0).to_radians() as f32
        } else {
            0.0
        },
    };

    let children = update_children(engine, now_ms, parent_center, child_rotation);

    for transmission in &mut engine.transmissions {
        transmission.advance();
    }
    engine.transmissions.retain(|t| !t.is_done());
    let transmissions = engine
        .transmissions
        .iter()
        .map(|t| t.shape(&mut engine.rng))
        .collect();

    engine.particles.step();
    let particles = engine
        .particles
        .particles
        .iter()
        .map(|p| ParticleDot {
            pos: p.pos,
            radius: p.radius * p.opacity,
            color: p.color,
            alpha: 0.7 * p.opacity,
        })
        .collect();

    engine.time_ms = now_ms;
    engine.frame_count += 1;

    Frame {
        time_ms: now_ms,
        parent,
        children,
        child_rotation,
        transmissions,
        particles,
        gradient,
    }
}

/// Parent deformation spring plus the settle wobble
fn update_parent_drag(engine: &mut OrbEngine) {
    let tuning = &engine.settings.tuning;
    let m = tuning.morph_speed;
    let stiffness = tuning.parent_stiffness * (1.0 + m);
    let damping = tuning.parent_damping - m * 0.2;
    let parent = &mut engine.parent;

    (parent.drag, parent.drag_velocity) = damped_spring(
        parent.drag,
        parent.drag_target,
        parent.drag_velocity,
        stiffness,
        damping,
    );

    if parent.drag_target.abs() < 0.1 {
        if parent.drag.abs() > 0.1 {
            parent.wobble += 0.04 + m * 0.9;
            parent.drag += parent.wobble.sin() * parent.drag.abs() * 0.13 * (1.0 + m);
        } else {
            parent.wobble = 0.0;
        }
    }

    parent.drag_target = approach(parent.drag_target, 0.0, 0.025 + m * 0.4);
}

/// Drift, pointer pull, scroll offset and scroll velocity
fn update_parent_position(engine: &mut OrbEngine, now_ms: f64) {
    let base = engine.layout.base_center;
    let parent = &mut engine.parent;
    parent.velocity.x *= 0.97;
    parent.velocity.y *= 0.96;

    let pull = engine
        .pointer
        .map(|pointer| {
            let delta = pointer - base;
            let dist = delta.length();
            if dist > 0.0 {
                delta / dist * (1.0 - dist / POINTER_RANGE).max(0.0) * POINTER_PULL
            } else {
                Vec2::ZERO
            }
        })
        .unwrap_or(Vec2::ZERO);

    let drift = if engine.settings.effective_motion() {
        Vec2::new(
            ((now_ms * 0.0001).sin() * 15.0 + (now_ms * 0.00015).cos() * 10.0) as f32,
            ((now_ms * 0.00012).cos() * 10.0 + (now_ms * 0.00008).sin() * 8.0) as f32,
        )
    } else {
        Vec2::ZERO
    };

    let scroll_offset =
        (engine.scroll.position * -0.08).clamp(-MAX_SCROLL_OFFSET, MAX_SCROLL_OFFSET);

    let mut center = base + drift + pull + parent.velocity;
    center.y = (center.y + scroll_offset).max(PARENT_RADIUS);
    parent.center = center;
}

/// Fade of the children for the parent's current drag target (1 = fully shown)
pub fn child_fade(drag_target: f32, fade_start: f32, fade_end: f32) -> f32 {
    ((fade_end - drag_target.abs()) / (fade_end - fade_start)).clamp(0.0, 1.0)
}

/// Whether the red channels are within `threshold` of each other; green and
/// blue are ignored
pub fn red_channels_match(a: Rgb, b: Rgb, threshold: u8) -> bool {
    a.r.abs_diff(b.r) < threshold
}

fn update_children(
    engine: &mut OrbEngine,
    now_ms: f64,
    parent_center: Vec2,
    rotation: GroupRotation,
) -> Vec<ChildShape> {
    let tuning = engine.settings.tuning.clone();
    let scale = engine.layout.scale;
    let child_points = engine.settings.quality.child_points();
    let emit_particles = engine.settings.particles;
    let transmissions = engine.settings.effective_transmissions();
    let fade = child_fade(engine.parent.drag_target, tuning.fade_start, tuning.fade_end);
    let min_distance = (PARENT_RADIUS + CHILD_RADIUS) * scale * 1.2;

    let parent_family = color_family(0, now_ms);
    let parent_color = parent_family[0].lerp(parent_family[1], 0.5 + 0.5 * (now_ms * 0.0002).sin());

    // Farthest first, by last frame's depth
    let mut order: Vec<usize> = (0..engine.children.len()).collect();
    order.sort_by(|&a, &b| engine.children[b].depth.total_cmp(&engine.children[a].depth));

    let mut shapes = Vec::with_capacity(order.len());
    for idx in order {
        let child = &mut engine.children[idx];
        let i = child.index;

        if child.phase == DisruptionPhase::Disrupted {
            child.disruption_offset += child.pending_disruption;
            child.pending_disruption = Vec2::ZERO;
            child.phase = DisruptionPhase::Recovering;
        }
        (child.disruption_offset, child.return_velocity) = damped_spring_vec2(
            child.disruption_offset,
            Vec2::ZERO,
            child.return_velocity,
            tuning.return_stiffness,
            tuning.return_damping,
        );
        if child.disruption_offset.x.abs() < tuning.settle_threshold
            && child.disruption_offset.y.abs() < tuning.settle_threshold
        {
            child.phase = DisruptionPhase::Settled;
        }

        let family = color_family(i, now_ms);
        let tcol = 0.5 + 0.5 * (now_ms * 0.0005 + i as f64).sin();
        let color = family[0].lerp(family[1], tcol);
        let fill = RadialFill::new(vec![
            GradientStop { offset: 0.0, color },
            GradientStop {
                offset: 1.0,
                color: family[1].lerp(family[0], tcol),
            },
        ]);

        let projection = project(&child.profile, child.angle);
        child.depth = projection.depth;
        child.lag = lag_toward(
            child.lag,
            projection.offset * scale + child.disruption_offset,
            tuning.lag_smoothing,
        );
        let slot = parent_center + child.lag;
        let pos = slot + overlap_push(slot, parent_center, min_distance);
        let on_screen = rotation.apply(pos);

        if transmissions
            && red_channels_match(color, parent_color, tuning.color_match_threshold)
            && now_ms - child.last_transmission_ms >= tuning.transmission_cooldown_ms
        {
            engine
                .transmissions
                .push(Transmission::new(i, on_screen, parent_center, color));
            child.last_transmission_ms = now_ms;
            log::trace!("Transmission from child {} at {:.0}ms", i, now_ms);
        }

        let depth_scale = projection.depth_scale();
        let path = smooth_blob(
            &mut engine.trig,
            pos,
            CHILD_RADIUS * scale * depth_scale,
            child_points,
            (now_ms * 0.0002) as f32 + i as f32 * 10.0,
            CHILD_AMP * scale * depth_scale,
            i as f32,
        );

        let (opacity, burst) = if fade > HIDDEN_FADE && fade < DISSOLVE_FADE {
            (BLOB_OPACITY * fade, ((DISSOLVE_FADE - fade) * 8.0).ceil() as usize)
        } else if child.was_visible && fade <= HIDDEN_FADE {
            child.was_visible = false;
            (0.0, VANISH_BURST)
        } else if !child.was_visible && fade > HIDDEN_FADE {
            child.was_visible = true;
            (BLOB_OPACITY * fade, APPEAR_BURST)
        } else if child.was_visible {
            (BLOB_OPACITY * projection.depth_opacity(), 0)
        } else {
            (0.0, 0)
        };
        if emit_particles && burst > 0 {
            engine
                .particles
                .emit(&mut engine.rng, on_screen, family_hue(i, now_ms), burst);
        }

        shapes.push(ChildShape {
            index: i,
            depth: projection.depth,
            blob: BlobShape {
                center: pos,
                path,
                fill,
                opacity,
            },
        });
    }

    shapes.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    shapes
}
