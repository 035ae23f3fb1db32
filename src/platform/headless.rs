//! Native fixed-step loop without a surface
//!
//! Drives the engine at a nominal 16 ms per frame, feeding scripted input,
//! and reports what happened. Used by the preview binary and tests.

use serde::{Deserialize, Serialize};

use crate::consts::FRAME_MS;
use crate::settings::Settings;
use crate::sim::{Frame, InputEvent, OrbEngine, handle_input, tick};

/// An input delivered just before frame `frame`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub frame: u64,
    pub event: InputEvent,
}

/// Summary of a headless run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessReport {
    pub frames: u64,
    /// Most particles alive in any frame
    pub peak_particles: usize,
    /// Frames that drew at least one lightning strike
    pub lightning_frames: u64,
    /// Frames in which at least one child was off its orbit
    pub disrupted_frames: u64,
    pub last_frame: Option<Frame>,
}

/// Run `frames` frames of a `width` x `height` hero starting at t = 0
pub fn run_headless(
    settings: Settings,
    width: f32,
    height: f32,
    frames: u64,
    script: &[ScriptedInput],
) -> HeadlessReport {
    let mut engine = OrbEngine::new(settings, width, height, 0.0);
    let mut report = HeadlessReport {
        frames,
        peak_particles: 0,
        lightning_frames: 0,
        disrupted_frames: 0,
        last_frame: None,
    };

    for k in 1..=frames {
        for input in script.iter().filter(|s| s.frame == k) {
            handle_input(&mut engine, &input.event);
        }
        let frame = tick(&mut engine, k as f64 * FRAME_MS);

        report.peak_particles = report.peak_particles.max(frame.particles.len());
        if !frame.transmissions.is_empty() {
            report.lightning_frames += 1;
        }
        if engine.children.iter().any(|c| c.is_disrupted()) {
            report.disrupted_frames += 1;
        }
        if k % 60 == 0 {
            log::debug!(
                "frame {}: {} particles, {} strikes, drag {:.2}",
                k,
                frame.particles.len(),
                frame.transmissions.len(),
                engine.parent.drag
            );
        }
        report.last_frame = Some(frame);
    }

    log::info!(
        "Headless run: {} frames, peak {} particles, {} lightning frames",
        report.frames,
        report.peak_particles,
        report.lightning_frames
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Settings {
        Settings {
            seed: Some(21),
            ..Settings::default()
        }
    }

    #[test]
    fn test_idle_run() {
        let report = run_headless(seeded(), 1024.0, 768.0, 120, &[]);
        assert_eq!(report.frames, 120);
        assert_eq!(report.peak_particles, 0);
        assert_eq!(report.lightning_frames, 0);
        assert_eq!(report.disrupted_frames, 0);
        let last = report.last_frame.expect("last frame recorded");
        assert_eq!(last.time_ms, 120.0 * FRAME_MS);
    }

    #[test]
    fn test_scripted_scroll_disrupts() {
        let script = [ScriptedInput {
            frame: 10,
            event: InputEvent::Scroll {
                scroll_y: 300.0,
                at_ms: 150.0,
            },
        }];
        let report = run_headless(seeded(), 1024.0, 768.0, 200, &script);
        assert!(report.disrupted_frames > 0);
        assert!(report.disrupted_frames < 190);
    }
}
