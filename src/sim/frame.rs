//! Per-frame snapshot handed to renderers
//!
//! A [`Frame`] is a declarative list of everything to draw; the simulation
//! never touches a surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::blob::BlobPath;
use super::color::{GradientPair, Rgb};
use super::transmission::LightningShape;
use crate::rotate_about;

/// One color stop of a radial gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the radius, 0 = center, 1 = gradient edge
    pub offset: f32,
    pub color: Rgb,
}

/// Radial gradient fill, stops sorted by offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialFill {
    pub stops: Vec<GradientStop>,
}

impl RadialFill {
    /// Build a fill from unsorted stops
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { stops }
    }

    /// Color at `offset`, clamped to the first/last stop
    pub fn sample(&self, offset: f32) -> Rgb {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgb::new(0, 0, 0);
        };
        if offset <= first.offset {
            return first.color;
        }
        if offset >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if offset <= b.offset {
                let span = b.offset - a.offset;
                let t = if span > 0.0 { (offset - a.offset) / span } else { 1.0 };
                return a.color.lerp(b.color, t as f64);
            }
        }
        last.color
    }
}

/// A filled blob outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobShape {
    pub center: Vec2,
    pub path: BlobPath,
    pub fill: RadialFill,
    pub opacity: f32,
}

/// A child blob with its draw-order key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildShape {
    pub index: usize,
    /// Projected depth (larger = farther)
    pub depth: f32,
    pub blob: BlobShape,
}

/// Rigid rotation applied to every child shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupRotation {
    pub origin: Vec2,
    pub radians: f32,
}

impl GroupRotation {
    /// Map a point from group space to screen space
    pub fn apply(&self, point: Vec2) -> Vec2 {
        rotate_about(point, self.origin, self.radians)
    }
}

/// A particle as drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleDot {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub alpha: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time_ms: f64,
    pub parent: BlobShape,
    /// Back to front, in group space
    pub children: Vec<ChildShape>,
    pub child_rotation: GroupRotation,
    pub transmissions: Vec<LightningShape>,
    pub particles: Vec<ParticleDot>,
    /// Colors exported to sibling UI
    pub gradient: GradientPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill() -> RadialFill {
        RadialFill::new(vec![
            GradientStop {
                offset: 1.0,
                color: Rgb::new(200, 0, 0),
            },
            GradientStop {
                offset: 0.0,
                color: Rgb::new(0, 0, 0),
            },
            GradientStop {
                offset: 0.5,
                color: Rgb::new(100, 100, 100),
            },
        ])
    }

    #[test]
    fn test_stops_sorted() {
        let offsets: Vec<f32> = fill().stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_sample() {
        let fill = fill();
        assert_eq!(fill.sample(-1.0), Rgb::new(0, 0, 0));
        assert_eq!(fill.sample(0.25), Rgb::new(50, 50, 50));
        assert_eq!(fill.sample(0.75), Rgb::new(150, 50, 50));
        assert_eq!(fill.sample(2.0), Rgb::new(200, 0, 0));
        assert_eq!(RadialFill::new(Vec::new()).sample(0.5), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_group_rotation() {
        let rotation = GroupRotation {
            origin: Vec2::new(10.0, 10.0),
            radians: std::f32::consts::FRAC_PI_2,
        };
        let p = rotation.apply(Vec2::new(20.0, 10.0));
        assert!((p - Vec2::new(10.0, 20.0)).length() < 1e-4);
    }
}
