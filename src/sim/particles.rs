//! Dissolve/materialize particles
//!
//! Short-lived dots emitted when a child fades in or out. They are integrated
//! and faded every frame and dropped once their life runs out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Life every particle starts with
pub const PARTICLE_LIFE: f32 = 0.6;
/// Per-frame velocity damping (each axis)
pub const PARTICLE_DAMPING: f32 = 0.98;

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life: f32,
    /// Life lost per frame
    pub decay: f32,
    pub color: Rgb,
    pub opacity: f32,
}

impl Particle {
    /// Integrate one frame
    pub fn step(&mut self) {
        self.pos += self.vel;
        self.vel *= PARTICLE_DAMPING;
        self.life -= self.decay;
        self.opacity = self.life.max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Owned particle pool (unbounded; expiry is the only limit)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` particles at `pos`, colored around `base_hue`
    pub fn emit<R: Rng>(&mut self, rng: &mut R, pos: Vec2, base_hue: f64, count: usize) {
        self.particles.reserve(count);
        for _ in 0..count {
            let hue = base_hue + (rng.random::<f64>() - 0.5) * 24.0;
            let sat = 85.0 + rng.random::<f64>() * 10.0;
            let light = 55.0 + rng.random::<f64>() * 20.0;
            let angle = rng.random::<f32>() * TAU;
            let speed = 0.4 + rng.random::<f32>() * 0.7;
            self.particles.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                radius: 1.1 + rng.random::<f32>() * 1.2,
                life: PARTICLE_LIFE,
                decay: 0.025 + rng.random::<f32>() * 0.015,
                color: Rgb::from_hsl(hue, sat, light),
                opacity: 0.45,
            });
        }
    }

    /// Integrate every particle and drop the expired ones
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.step();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_emit_ranges() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut system = ParticleSystem::new();
        system.emit(&mut rng, Vec2::new(5.0, 6.0), 200.0, 50);
        assert_eq!(system.len(), 50);
        for p in &system.particles {
            assert_eq!(p.pos, Vec2::new(5.0, 6.0));
            let speed = p.vel.length();
            assert!((0.4 - 1e-4..=1.1 + 1e-4).contains(&speed), "speed {}", speed);
            assert!((0.025..=0.04).contains(&p.decay));
            assert!((1.1..=2.3).contains(&p.radius));
            assert_eq!(p.life, PARTICLE_LIFE);
        }
    }

    #[test]
    fn test_life_decreases_by_decay_each_step() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut system = ParticleSystem::new();
        system.emit(&mut rng, Vec2::ZERO, 10.0, 1);
        let decay = system.particles[0].decay;
        let mut last = system.particles[0].life;
        while !system.is_empty() {
            system.step();
            if let Some(p) = system.particles.first() {
                assert!(p.life < last);
                assert!((last - p.life - decay).abs() < 1e-6);
                assert!(p.life > 0.0, "expired particle survived the step");
                assert_eq!(p.opacity, p.life);
                last = p.life;
            }
        }
    }

    #[test]
    fn test_all_expire_within_bounded_frames() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut system = ParticleSystem::new();
        system.emit(&mut rng, Vec2::ZERO, 0.0, 100);
        // Slowest decay is 0.025/frame from 0.6 life: 24 frames
        for _ in 0..25 {
            system.step();
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_velocity_damping() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -1.0),
            radius: 1.0,
            life: 0.5,
            decay: 0.1,
            color: Rgb::new(0, 0, 0),
            opacity: 0.45,
        };
        p.step();
        assert_eq!(p.pos, Vec2::new(1.0, -1.0));
        assert!((p.vel - Vec2::new(0.98, -0.98)).length() < 1e-6);
    }
}
