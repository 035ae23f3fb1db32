//! Lightning strikes between a child and the parent
//!
//! A strike lives for about twelve frames. Its jagged path is regenerated
//! every frame with jitter that shrinks toward the parent end.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::color::Rgb;
use crate::consts::LIGHTNING_SEGMENTS;

/// Progress added per frame
pub const TRANSMISSION_STEP: f32 = 0.08;
/// Base opacity of a strike
pub const TRANSMISSION_OPACITY: f32 = 0.3;
/// Jitter at the start of the path (pixels)
const MAX_JITTER: f32 = 10.0;

/// A live strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    pub child: usize,
    pub start: Vec2,
    pub end: Vec2,
    /// 0 at spawn; removed once it reaches 1
    pub progress: f32,
    pub color: Rgb,
    pub opacity: f32,
}

/// Bright burst drawn at the child end early in a strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub center: Vec2,
    pub radius: f32,
    pub opacity: f32,
}

/// Drawable form of a strike for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningShape {
    pub points: Vec<Vec2>,
    pub color: Rgb,
    pub stroke_width: f32,
    pub opacity: f32,
    pub flash: Option<Flash>,
}

impl Transmission {
    pub fn new(child: usize, start: Vec2, end: Vec2, color: Rgb) -> Self {
        Self {
            child,
            start,
            end,
            progress: 0.0,
            color,
            opacity: TRANSMISSION_OPACITY,
        }
    }

    pub fn advance(&mut self) {
        self.progress += TRANSMISSION_STEP;
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 1.0
    }

    /// Build this frame's jagged path
    pub fn shape<R: Rng>(&self, rng: &mut R) -> LightningShape {
        let t = self.progress;
        let mut points = Vec::with_capacity(LIGHTNING_SEGMENTS + 1);
        points.push(self.start);
        for seg in 1..=LIGHTNING_SEGMENTS {
            let along = seg as f32 / LIGHTNING_SEGMENTS as f32 * t;
            let base = self.start.lerp(self.end, along);
            let spread = (1.0 - along) * MAX_JITTER;
            let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * spread;
            points.push(base + jitter);
        }

        let flash = (t < 0.2).then(|| Flash {
            center: self.start,
            radius: 10.0 * (1.0 - t * 5.0),
            opacity: 0.8 * (1.0 - t * 5.0),
        });

        LightningShape {
            points,
            color: self.color,
            stroke_width: if t < 0.5 { 2.0 } else { 1.0 },
            opacity: self.opacity * 2.0 * (1.0 - t),
            flash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn strike() -> Transmission {
        Transmission::new(
            1,
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Rgb::new(200, 100, 50),
        )
    }

    #[test]
    fn test_lifetime_is_twelve_frames() {
        let mut t = strike();
        let mut frames = 0;
        loop {
            t.advance();
            if t.is_done() {
                break;
            }
            frames += 1;
        }
        assert_eq!(frames, 12);
    }

    #[test]
    fn test_shape_progression() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut t = strike();
        t.advance();
        let early = t.shape(&mut rng);
        assert_eq!(early.points.len(), LIGHTNING_SEGMENTS + 1);
        assert_eq!(early.points[0], Vec2::ZERO);
        assert_eq!(early.stroke_width, 2.0);
        let flash = early.flash.expect("flash early in the strike");
        assert!(flash.radius > 0.0 && flash.opacity > 0.0);

        for _ in 0..6 {
            t.advance();
        }
        let late = t.shape(&mut rng);
        assert!(late.flash.is_none());
        assert_eq!(late.stroke_width, 1.0);
        assert!(late.opacity < early.opacity);
    }

    #[test]
    fn test_path_reaches_toward_parent() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut t = strike();
        t.progress = 0.96;
        let shape = t.shape(&mut rng);
        let tip = shape.points[LIGHTNING_SEGMENTS];
        // 96% of the way with at most 0.2px jitter per axis
        assert!((tip.x - 96.0).abs() <= 0.21, "tip {:?}", tip);
        assert!(tip.y.abs() <= 0.21);
    }
}
