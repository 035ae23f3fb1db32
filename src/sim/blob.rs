//! Smooth blob outlines
//!
//! A blob is a circle whose radius is perturbed by three sine harmonics of the
//! sample angle and time, closed with a cardinal spline (tension 1/6) so the
//! outline shows no polygon facets.

use std::fmt::Write;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::trig::TrigCache;

/// One cubic Bezier segment, starting where the previous one ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub c1: Vec2,
    pub c2: Vec2,
    pub to: Vec2,
}

impl CubicSegment {
    /// Evaluate the segment at `t` in [0, 1] given its start point
    pub fn point_at(&self, from: Vec2, t: f32) -> Vec2 {
        let u = 1.0 - t;
        from * (u * u * u) + self.c1 * (3.0 * u * u * t) + self.c2 * (3.0 * u * t * t) + self.to * (t * t * t)
    }
}

/// Closed outline: a start anchor followed by cubic segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobPath {
    pub start: Vec2,
    pub segments: Vec<CubicSegment>,
}

impl BlobPath {
    /// True when the last segment ends on the start anchor
    pub fn is_closed(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|seg| seg.to.distance(self.start) < 1e-3)
    }

    /// SVG path data (`M x,y C c1 c2 p ... Z`, two decimals)
    pub fn to_svg_path(&self) -> String {
        let mut d = String::with_capacity(16 + self.segments.len() * 48);
        let _ = write!(d, "M{:.2},{:.2}", self.start.x, self.start.y);
        for seg in &self.segments {
            let _ = write!(
                d,
                " C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                seg.c1.x, seg.c1.y, seg.c2.x, seg.c2.y, seg.to.x, seg.to.y
            );
        }
        d.push('Z');
        d
    }

    /// Sample the outline into a polyline (`steps` points per segment, closing
    /// point omitted)
    pub fn flatten(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(self.segments.len() * steps);
        let mut from = self.start;
        for seg in &self.segments {
            for k in 0..steps {
                points.push(seg.point_at(from, k as f32 / steps as f32));
            }
            from = seg.to;
        }
        points
    }
}

/// Radius perturbation at sample angle `angle`
#[inline]
fn noise(angle: f32, t: f32, amp: f32, phase: f32) -> f32 {
    (angle * 3.0 + t * 0.7 + phase).sin() * 0.75 * amp
        + (angle * 5.0 - t * 1.1 + phase).sin() * 0.4 * amp
        + (angle * 2.0 + t * 1.7 + phase).sin() * 0.25 * amp
}

/// Generate a closed blob outline around `center`
pub fn smooth_blob(
    trig: &mut TrigCache,
    center: Vec2,
    radius: f32,
    points: usize,
    t: f32,
    amp: f32,
    phase: f32,
) -> BlobPath {
    if points == 0 {
        return BlobPath {
            start: center,
            segments: Vec::new(),
        };
    }

    let tables = trig.tables(points);
    let pts: Vec<Vec2> = (0..points)
        .map(|i| {
            let rad = radius + noise(tables.angles[i], t, amp, phase);
            center + Vec2::new(tables.cos[i], tables.sin[i]) * rad
        })
        .collect();

    let segments = (0..points)
        .map(|i| {
            let p0 = pts[(i + points - 1) % points];
            let p1 = pts[i];
            let p2 = pts[(i + 1) % points];
            let p3 = pts[(i + 2) % points];
            CubicSegment {
                c1: p1 + (p2 - p0) / 6.0,
                c2: p2 - (p3 - p1) / 6.0,
                to: p2,
            }
        })
        .collect();

    BlobPath {
        start: pts[0],
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_amplitude_is_a_circle() {
        let mut trig = TrigCache::new();
        let center = Vec2::new(100.0, 50.0);
        let path = smooth_blob(&mut trig, center, 20.0, 32, 1.3, 0.0, 0.0);
        for seg in &path.segments {
            assert!((seg.to.distance(center) - 20.0).abs() < 1e-3);
        }
        // Interpolated points stay close to the circle
        for p in path.flatten(4) {
            assert!((p.distance(center) - 20.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_svg_path_shape() {
        let mut trig = TrigCache::new();
        let path = smooth_blob(&mut trig, Vec2::new(10.0, 10.0), 5.0, 8, 0.0, 1.0, 0.0);
        let d = path.to_svg_path();
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches(" C").count(), 8);
    }

    #[test]
    fn test_flatten_count() {
        let mut trig = TrigCache::new();
        let path = smooth_blob(&mut trig, Vec2::ZERO, 5.0, 16, 0.0, 1.0, 0.0);
        assert_eq!(path.flatten(3).len(), 48);
        assert_eq!(path.flatten(0).len(), 16);
    }

    #[test]
    fn test_uses_engine_cache() {
        let mut trig = TrigCache::new();
        smooth_blob(&mut trig, Vec2::ZERO, 5.0, 64, 0.0, 1.0, 0.0);
        smooth_blob(&mut trig, Vec2::ZERO, 5.0, 64, 2.0, 1.0, 1.0);
        smooth_blob(&mut trig, Vec2::ZERO, 5.0, 128, 0.0, 1.0, 0.0);
        assert_eq!(trig.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_blob_is_closed_with_one_segment_per_point(
            cx in -500.0f32..500.0,
            cy in -500.0f32..500.0,
            radius in 1.0f32..200.0,
            points in 3usize..200,
            t in 0.0f32..1000.0,
            amp in 0.0f32..5.0,
        ) {
            let mut trig = TrigCache::new();
            let path = smooth_blob(&mut trig, Vec2::new(cx, cy), radius, points, t, amp, 0.0);
            prop_assert_eq!(path.segments.len(), points);
            prop_assert!(path.is_closed());
        }
    }
}
