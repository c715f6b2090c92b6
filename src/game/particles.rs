//! Particle System
//!
//! Decorative particles kept in a fixed ring buffer. Spawning always writes the
//! slot under the cursor and advances it, so the oldest particle is silently
//! overwritten once the pool wraps. Nothing is ever freed: a particle whose
//! lifetime reached zero just stops being drawn until its slot is reused.
//!
//! Two kinds exist. Embers rise from fires. Retardant is sprayed by the
//! extinguisher and is the only kind that interacts with gameplay (it douses
//! fires it lands in).

use macroquad::color::Color;
use macroquad::math::{vec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::geometry::Bounds;

/// Number of particle slots in the ring
pub const MAX_PARTICLES: usize = 512;

/// Upward acceleration applied to embers (screen space is y-down)
const EMBER_LIFT: f32 = 60.0;
/// Fraction of retardant velocity kept per second
const SPRAY_DRAG: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Ember,
    Retardant,
}

/// A single particle slot
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life in seconds
    pub life: f32,
    /// Total lifetime (for fading)
    pub max_life: f32,
    pub color: Color,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// 1 when just spawned, 0 when dead
    pub fn fade(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            life: 0.0,
            max_life: 1.0,
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            kind: ParticleKind::Ember,
        }
    }
}

/// The particle ring buffer
pub struct ParticlePool {
    particles: Vec<Particle>,
    cursor: usize,
    rng: StdRng,
}

impl ParticlePool {
    pub fn new(seed: u64) -> Self {
        Self::with_capacity(MAX_PARTICLES, seed)
    }

    pub fn with_capacity(capacity: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::default(); capacity.max(1)],
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Write a particle at the cursor and advance it
    pub fn spawn(&mut self, particle: Particle) {
        let slot = self.cursor;
        self.particles[slot] = particle;
        self.cursor = (slot + 1) % self.particles.len();
    }

    /// Embers rising out of a fire zone, hotter fires give brighter embers
    pub fn emit_embers(&mut self, bounds: &Bounds, intensity: f32, count: usize) {
        for _ in 0..count {
            let position = vec2(
                self.rng.gen_range(bounds.x..=bounds.right()),
                self.rng.gen_range(bounds.y..=bounds.bottom()),
            );
            let velocity = vec2(self.rng.gen_range(-20.0..=20.0), self.rng.gen_range(-60.0..=-15.0));
            let life: f32 = self.rng.gen_range(0.4..=1.0);
            let heat = intensity.clamp(0.0, 1.0);
            self.spawn(Particle {
                position,
                velocity,
                life,
                max_life: life,
                color: Color::new(1.0, 0.35 + 0.5 * heat, 0.1, 1.0),
                kind: ParticleKind::Ember,
            });
        }
    }

    /// A cone of retardant leaving `origin` along `direction`
    pub fn emit_spray(&mut self, origin: Vec2, direction: Vec2, speed: f32, count: usize) {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        for _ in 0..count {
            let angle: f32 = self.rng.gen_range(-0.25..=0.25);
            let (sin, cos) = angle.sin_cos();
            let dir = vec2(direction.x * cos - direction.y * sin, direction.x * sin + direction.y * cos);
            let jitter: f32 = self.rng.gen_range(0.7..=1.1);
            let velocity = dir * speed * jitter;
            let life: f32 = self.rng.gen_range(0.35..=0.6);
            self.spawn(Particle {
                position: origin,
                velocity,
                life,
                max_life: life,
                color: Color::new(0.85, 0.92, 1.0, 1.0),
                kind: ParticleKind::Retardant,
            });
        }
    }

    /// Age and move every particle. Lifetime never goes below zero.
    pub fn update(&mut self, delta_time: f32) {
        let drag = SPRAY_DRAG.powf(delta_time);
        for p in &mut self.particles {
            if !p.is_alive() {
                continue;
            }
            p.life = (p.life - delta_time).max(0.0);
            match p.kind {
                ParticleKind::Ember => p.velocity.y -= EMBER_LIFT * delta_time,
                ParticleKind::Retardant => p.velocity *= drag,
            }
            p.position += p.velocity * delta_time;
        }
    }

    /// Live particles with their slot index
    pub fn alive(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.particles.iter().enumerate().filter(|(_, p)| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// End a particle early (e.g. retardant that hit a fire)
    pub fn kill(&mut self, index: usize) {
        if let Some(p) = self.particles.get_mut(index) {
            p.life = 0.0;
        }
    }

    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.life = 0.0;
        }
        self.cursor = 0;
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ember(life: f32) -> Particle {
        Particle { life, max_life: life, ..Default::default() }
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut pool = ParticlePool::with_capacity(3, 1);
        for i in 0..4 {
            pool.spawn(Particle { position: vec2(i as f32, 0.0), ..ember(1.0) });
        }
        let xs: Vec<f32> = pool.alive().map(|(_, p)| p.position.x).collect();
        // Slot 0 was reused by the fourth spawn
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_lifetime_decreases_and_clamps_at_zero() {
        let mut pool = ParticlePool::with_capacity(4, 1);
        pool.spawn(ember(0.5));
        let mut last = 0.5;
        for _ in 0..10 {
            pool.update(0.1);
            let life = pool.particles[0].life;
            assert!(life <= last);
            assert!(life >= 0.0);
            last = life;
        }
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_embers_rise() {
        let mut pool = ParticlePool::with_capacity(4, 1);
        pool.spawn(ember(1.0));
        pool.update(0.5);
        assert!(pool.particles[0].position.y < 0.0);
    }

    #[test]
    fn test_emit_spray_follows_direction() {
        let mut pool = ParticlePool::with_capacity(16, 7);
        pool.emit_spray(Vec2::ZERO, vec2(1.0, 0.0), 300.0, 8);
        assert_eq!(pool.alive_count(), 8);
        for (_, p) in pool.alive() {
            assert_eq!(p.kind, ParticleKind::Retardant);
            assert!(p.velocity.x > 0.0);
            assert!(p.velocity.y.abs() < p.velocity.x);
        }
        // Zero direction emits nothing
        pool.clear();
        pool.emit_spray(Vec2::ZERO, Vec2::ZERO, 300.0, 8);
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_embers_spawn_inside_zone() {
        let mut pool = ParticlePool::with_capacity(32, 3);
        let zone = Bounds::new(50.0, 50.0, 20.0, 10.0);
        pool.emit_embers(&zone, 1.0, 20);
        for (_, p) in pool.alive() {
            assert!(zone.contains(p.position));
        }
    }

    #[test]
    fn test_kill_and_fade() {
        let mut pool = ParticlePool::with_capacity(2, 1);
        pool.spawn(ember(2.0));
        pool.update(1.0);
        assert!((pool.particles[0].fade() - 0.5).abs() < 1e-5);
        pool.kill(0);
        assert_eq!(pool.alive_count(), 0);
        pool.kill(99);
    }
}
