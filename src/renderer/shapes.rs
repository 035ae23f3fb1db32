//! Shape generation for 2D primitives
//!
//! Everything is emitted as plain triangle lists in surface pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, rgba};
use crate::sim::{BlobShape, Frame, LightningShape, ParticleDot};

/// Concentric bands used to approximate a radial gradient
pub const GRADIENT_RINGS: usize = 6;
/// Gradient offset reached at the blob outline (gradient radius is 70% of
/// the blob's bounding box, i.e. 1.4 blob radii)
pub const OUTLINE_GRADIENT_OFFSET: f32 = 0.5 / 0.7;
/// Segments for particle dots and flashes
pub const DOT_SEGMENTS: u32 = 12;

/// Fill a blob outline with its radial gradient.
///
/// `transform` maps outline points to surface space (identity for the
/// parent, the group rotation for children).
pub fn blob_fill(shape: &BlobShape, steps: usize, transform: impl Fn(Vec2) -> Vec2) -> Vec<Vertex> {
    let outline: Vec<Vec2> = shape.path.flatten(steps).into_iter().map(&transform).collect();
    let n = outline.len();
    if n < 3 || shape.opacity <= 0.0 {
        return Vec::new();
    }
    let center = transform(shape.center);

    let ring_point = |p: Vec2, k: usize| center + (p - center) * (k as f32 / GRADIENT_RINGS as f32);
    let ring_color = |k: usize| {
        let offset = k as f32 / GRADIENT_RINGS as f32 * OUTLINE_GRADIENT_OFFSET;
        rgba(shape.fill.sample(offset), shape.opacity)
    };

    let mut vertices = Vec::with_capacity(n * 3 + (GRADIENT_RINGS - 1) * n * 6);

    // Center fan
    let c0 = ring_color(0);
    let c1 = ring_color(1);
    for i in 0..n {
        let a = ring_point(outline[i], 1);
        let b = ring_point(outline[(i + 1) % n], 1);
        vertices.push(Vertex::new(center.x, center.y, c0));
        vertices.push(Vertex::new(a.x, a.y, c1));
        vertices.push(Vertex::new(b.x, b.y, c1));
    }

    // Bands between consecutive rings
    for k in 1..GRADIENT_RINGS {
        let inner_color = ring_color(k);
        let outer_color = ring_color(k + 1);
        for i in 0..n {
            let j = (i + 1) % n;
            let inner1 = ring_point(outline[i], k);
            let inner2 = ring_point(outline[j], k);
            let outer1 = ring_point(outline[i], k + 1);
            let outer2 = ring_point(outline[j], k + 1);

            vertices.push(Vertex::new(inner1.x, inner1.y, inner_color));
            vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
            vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));

            vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));
            vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
            vertices.push(Vertex::new(outer2.x, outer2.y, outer_color));
        }
    }

    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    if radius <= 0.0 || segments < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// A particle as a filled dot
pub fn dot(particle: &ParticleDot) -> Vec<Vertex> {
    circle(
        particle.pos,
        particle.radius,
        rgba(particle.color, particle.alpha),
        DOT_SEGMENTS,
    )
}

/// Thick open polyline, one quad per segment
pub fn polyline(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }
    let half = width * 0.5;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dir = (p2 - p1).normalize_or_zero();
        // Perpendicular for width
        let perp = Vec2::new(-dir.y, dir.x) * half;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        vertices.push(Vertex::new(v1a.x, v1a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2a.x, v2a.y, color));

        vertices.push(Vertex::new(v2a.x, v2a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2b.x, v2b.y, color));
    }

    vertices
}

/// Lightning stroke plus its flash
pub fn lightning(shape: &LightningShape) -> Vec<Vertex> {
    let mut vertices = polyline(&shape.points, shape.stroke_width, rgba(shape.color, shape.opacity));
    if let Some(flash) = &shape.flash {
        vertices.extend(circle(
            flash.center,
            flash.radius,
            rgba(shape.color, flash.opacity),
            DOT_SEGMENTS,
        ));
    }
    vertices
}

/// Tessellate a whole frame, in draw order: particles, parent, lightning,
/// then children back to front
pub fn frame_vertices(frame: &Frame, steps: usize) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for particle in &frame.particles {
        vertices.extend(dot(particle));
    }

    vertices.extend(blob_fill(&frame.parent, steps, |p| p));

    for shape in &frame.transmissions {
        vertices.extend(lightning(shape));
    }

    let rotation = frame.child_rotation;
    for child in &frame.children {
        vertices.extend(blob_fill(&child.blob, steps, |p| rotation.apply(p)));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{OrbEngine, RadialFill, Rgb, TrigCache, smooth_blob, tick};
    use crate::sim::frame::GradientStop;

    fn blob(points: usize, opacity: f32) -> BlobShape {
        let mut trig = TrigCache::new();
        BlobShape {
            center: Vec2::new(50.0, 50.0),
            path: smooth_blob(&mut trig, Vec2::new(50.0, 50.0), 20.0, points, 0.0, 0.5, 0.0),
            fill: RadialFill::new(vec![
                GradientStop {
                    offset: 0.0,
                    color: Rgb::new(255, 255, 255),
                },
                GradientStop {
                    offset: 1.0,
                    color: Rgb::new(0, 0, 0),
                },
            ]),
            opacity,
        }
    }

    #[test]
    fn test_blob_fill_vertex_count() {
        let shape = blob(16, 0.9);
        let steps = 3;
        let n = 16 * steps;
        let vertices = blob_fill(&shape, steps, |p| p);
        assert_eq!(vertices.len(), n * 3 + (GRADIENT_RINGS - 1) * n * 6);
        assert!(vertices.iter().all(|v| (v.color[3] - 0.9).abs() < 1e-6));
        // Center is white, outline sampled at the gradient's 5/7 mark
        assert_eq!(vertices[0].color[0], 1.0);
        let outer = vertices.last().map(|v| v.color[0]).unwrap_or_default();
        assert!((outer - (1.0 - OUTLINE_GRADIENT_OFFSET)).abs() < 0.01);
    }

    #[test]
    fn test_invisible_blob_skipped() {
        assert!(blob_fill(&blob(16, 0.0), 2, |p| p).is_empty());
        assert!(blob_fill(&blob(0, 1.0), 2, |p| p).is_empty());
    }

    #[test]
    fn test_blob_fill_applies_transform() {
        let shape = blob(8, 1.0);
        let offset = Vec2::new(100.0, 0.0);
        let plain = blob_fill(&shape, 1, |p| p);
        let moved = blob_fill(&shape, 1, |p| p + offset);
        for (a, b) in plain.iter().zip(&moved) {
            assert!((b.position[0] - a.position[0] - 100.0).abs() < 1e-3);
            assert_eq!(a.position[1], b.position[1]);
        }
    }

    #[test]
    fn test_circle_and_polyline() {
        assert_eq!(circle(Vec2::ZERO, 2.0, [1.0; 4], 12).len(), 36);
        assert!(circle(Vec2::ZERO, 0.0, [1.0; 4], 12).is_empty());

        let line = polyline(&[Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)], 2.0, [1.0; 4]);
        assert_eq!(line.len(), 12);
        // First quad spans y = +-1 around the horizontal segment
        assert_eq!(line[0].position, [0.0, 1.0]);
        assert_eq!(line[1].position, [0.0, -1.0]);
        assert!(polyline(&[Vec2::ZERO], 2.0, [1.0; 4]).is_empty());
    }

    #[test]
    fn test_frame_vertices() {
        let settings = Settings {
            seed: Some(3),
            ..Settings::default()
        };
        let mut engine = OrbEngine::new(settings, 1024.0, 768.0, 0.0);
        let frame = tick(&mut engine, 16.0);
        let steps = 2;
        let per_blob = |segments: usize| {
            let n = segments * steps;
            n * 3 + (GRADIENT_RINGS - 1) * n * 6
        };
        let expected = per_blob(frame.parent.path.segments.len())
            + frame
                .children
                .iter()
                .map(|c| per_blob(c.blob.path.segments.len()))
                .sum::<usize>();
        assert_eq!(frame_vertices(&frame, steps).len(), expected);
    }
}
