//! Short-lived decorative particles kept in a time-to-live pool.
//!
//! Particles are plain records; nothing here owns display state. A renderer
//! reads [`ParticlePool::live`] each frame and the pool is pruned on tick.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::params::ParticleParams;
use crate::timeline::Millis;

/// Glyphs used by the confetti burst
pub const CONFETTI_GLYPHS: [char; 5] = ['🍗', '🍹', '🥂', '🥃', '🍸'];

/// Visual flavour of a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Falling glyph (confetti)
    Glyph(char),
    /// Falling droplet (confetti)
    Drop,
    /// Splash flying out of a cheers click
    Splash,
    /// Bubble rising out of a cheers click
    Bubble,
}

/// Animation curve from origin to origin + travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseOut,
}

/// One particle: where it starts, where it goes, and for how long
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub origin: Vec2,
    /// Total displacement over the lifetime
    pub travel: Vec2,
    pub size: f32,
    /// Rotation reached at the end of the animation (degrees)
    pub rotation_deg: f32,
    pub easing: Easing,
    pub spawned_at: Millis,
    pub ttl_ms: Millis,
}

impl Particle {
    /// Normalized animation progress in [0, 1]
    pub fn progress(&self, now: Millis) -> f32 {
        let elapsed = now.saturating_sub(self.spawned_at) as f32;
        (elapsed / self.ttl_ms.max(1) as f32).min(1.0)
    }

    pub fn position(&self, now: Millis) -> Vec2 {
        let t = self.progress(now);
        let eased = match self.easing {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        };
        self.origin + self.travel * eased
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        now >= self.spawned_at + self.ttl_ms
    }
}

/// Bounded pool of live particles, oldest first
#[derive(Debug)]
pub struct ParticlePool {
    particles: VecDeque<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Add particles, evicting the oldest once the pool is full
    pub fn spawn(&mut self, burst: impl IntoIterator<Item = Particle>) {
        for particle in burst {
            if self.particles.len() == self.capacity {
                self.particles.pop_front();
            }
            self.particles.push_back(particle);
        }
    }

    /// Remove expired particles; returns how many were removed
    pub fn prune(&mut self, now: Millis) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !p.is_expired(now));
        before - self.particles.len()
    }

    /// Particles still alive at `now`
    pub fn live(&self, now: Millis) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(move |p| !p.is_expired(now))
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// One-time confetti rain across the full view width
pub fn confetti_burst<R: Rng + ?Sized>(
    rng: &mut R,
    params: &ParticleParams,
    now: Millis,
) -> Vec<Particle> {
    (0..params.confetti_count)
        .map(|_| {
            let kind = if rng.random_bool(0.6) {
                ParticleKind::Glyph(CONFETTI_GLYPHS[rng.random_range(0..CONFETTI_GLYPHS.len())])
            } else {
                ParticleKind::Drop
            };
            Particle {
                kind,
                origin: Vec2::new(rng.random_range(0.0..params.view_width), -50.0),
                // Fall past the bottom edge
                travel: Vec2::new(0.0, params.view_height + 100.0),
                size: rng.random_range(15.0..40.0),
                rotation_deg: rng.random_range(0.0..360.0),
                easing: Easing::Linear,
                spawned_at: now,
                ttl_ms: rng.random_range(2000..6000),
            }
        })
        .collect()
}

/// Splash of particles flying out of a click position
pub fn cheers_burst<R: Rng + ?Sized>(
    rng: &mut R,
    params: &ParticleParams,
    now: Millis,
    origin: Vec2,
) -> Vec<Particle> {
    (0..params.cheers_count)
        .map(|_| {
            let kind = if rng.random_bool(0.6) {
                ParticleKind::Splash
            } else {
                ParticleKind::Bubble
            };
            let angle = rng.random_range(0.0..TAU);
            let distance = rng.random_range(50.0..200.0);
            Particle {
                kind,
                origin,
                // Biased upward so the splash rises out of the glass
                travel: Vec2::new(angle.cos() * distance, angle.sin() * distance - 200.0),
                size: rng.random_range(5.0..13.0),
                rotation_deg: rng.random_range(0.0..360.0),
                easing: Easing::EaseOut,
                spawned_at: now,
                ttl_ms: rng.random_range(800..1800),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle(spawned_at: Millis, ttl_ms: Millis) -> Particle {
        Particle {
            kind: ParticleKind::Drop,
            origin: Vec2::ZERO,
            travel: Vec2::new(0.0, 100.0),
            size: 10.0,
            rotation_deg: 0.0,
            easing: Easing::Linear,
            spawned_at,
            ttl_ms,
        }
    }

    #[test]
    fn test_particle_motion() {
        let p = particle(1000, 2000);
        assert_relative_eq!(p.position(1000).y, 0.0);
        assert_relative_eq!(p.position(2000).y, 50.0);
        assert_relative_eq!(p.position(9000).y, 100.0);
        assert!(!p.is_expired(2999));
        assert!(p.is_expired(3000));
    }

    #[test]
    fn test_pool_prunes_expired() {
        let mut pool = ParticlePool::new(16);
        pool.spawn([particle(0, 100), particle(0, 500), particle(50, 100)]);

        assert_eq!(pool.live(120).count(), 2);
        assert_eq!(pool.prune(120), 1);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.prune(1000), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_is_bounded() {
        let mut pool = ParticlePool::new(3);
        pool.spawn((0..5).map(|i| particle(i, 1000)));

        assert_eq!(pool.len(), 3);
        // The two oldest were evicted
        let spawn_times: Vec<Millis> = pool.live(0).map(|p| p.spawned_at).collect();
        assert_eq!(spawn_times, vec![2, 3, 4]);
    }

    #[test]
    fn test_confetti_burst_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = ParticleParams::default();
        let burst = confetti_burst(&mut rng, &params, 0);

        assert_eq!(burst.len(), 100);
        for p in &burst {
            assert!((0.0..params.view_width).contains(&p.origin.x));
            assert!((15.0..40.0).contains(&p.size));
            assert!((2000..6000).contains(&p.ttl_ms));
            assert!(matches!(p.kind, ParticleKind::Glyph(_) | ParticleKind::Drop));
        }
    }

    #[test]
    fn test_cheers_burst_anchored_at_click() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = ParticleParams::default();
        let origin = Vec2::new(120.0, 300.0);
        let burst = cheers_burst(&mut rng, &params, 500, origin);

        assert_eq!(burst.len(), 25);
        for p in &burst {
            assert_eq!(p.origin, origin);
            assert!((800..1800).contains(&p.ttl_ms));
            // Horizontal spread never exceeds the maximum distance
            assert!(p.travel.x.abs() <= 200.0);
            assert!(matches!(p.kind, ParticleKind::Splash | ParticleKind::Bubble));
        }
    }
}
