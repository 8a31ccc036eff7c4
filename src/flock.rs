use crate::config::{DisplayConfig, FlockConfig};
use crate::geom::Vec2;
use crate::runner::Simulation;
use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;
use std::f64::consts::TAU;

/// Velocity pushed onto a reflected bird so it cannot stick to a wall.
const WALL_NUDGE: f64 = 0.1;

/// One flocking agent.
#[derive(Debug, Clone, Copy)]
pub struct Bird {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Flocking engine.
///
/// Owns the birds and the random number generator, and advances the flock
/// one tick at a time. All steering forces for a tick are computed from a
/// snapshot of the flock taken at the start of that tick, so the update is
/// order-independent across birds and reproducible for a fixed seed.
pub struct Flock {
    cfg: FlockConfig,
    bounds: Vec2,
    birds: Vec<Bird>,
    leader: Option<usize>,
    rng: ChaCha12Rng,
}

impl Flock {
    /// Create a new `Flock` with random positions in bounds and random
    /// velocity directions scaled by the maximum speed.
    pub fn new(cfg: FlockConfig, display: &DisplayConfig, mut rng: ChaCha12Rng) -> Result<Self> {
        let bounds = Vec2::new(f64::from(display.width), f64::from(display.height));

        let pos_x_dist = Uniform::new(0.0, bounds.x)?;
        let pos_y_dist = Uniform::new(0.0, bounds.y)?;
        let dir_dist = Uniform::new(-1.0, 1.0)?;

        let mut birds = Vec::with_capacity(cfg.n_birds);
        for _ in 0..cfg.n_birds {
            birds.push(Bird {
                pos: Vec2::new(pos_x_dist.sample(&mut rng), pos_y_dist.sample(&mut rng)),
                vel: Vec2::new(
                    dir_dist.sample(&mut rng) * cfg.max_speed,
                    dir_dist.sample(&mut rng) * cfg.max_speed,
                ),
            });
        }

        let leader = cfg.leader_follow.then_some(0);

        Ok(Self {
            cfg,
            bounds,
            birds,
            leader,
            rng,
        })
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    /// Advance the flock by one tick.
    pub fn step(&mut self) {
        let snapshot = self.birds.clone();
        let nudge = if self.cfg.wall_nudge { WALL_NUDGE } else { 0.0 };

        for i in 0..snapshot.len() {
            let mut vel = snapshot[i].vel;

            if self.cfg.jitter {
                let j = self.cfg.jitter_magnitude;
                vel.x += self.rng.random_range(-j..=j);
                vel.y += self.rng.random_range(-j..=j);
            }

            // The leader wanders on jitter alone; everyone else steers.
            if self.leader != Some(i) {
                vel += self.steering(i, vel, &snapshot);
            }

            vel = self.clamp_speed(vel);

            let mut pos = snapshot[i].pos + vel;
            reflect_axis(&mut pos.x, &mut vel.x, self.bounds.x, nudge);
            reflect_axis(&mut pos.y, &mut vel.y, self.bounds.y, nudge);

            self.birds[i] = Bird { pos, vel };
        }
    }

    /// Sum of the steering forces on bird `idx`, computed against the
    /// pre-tick snapshot of the flock. `vel` is the bird's own velocity
    /// after jitter.
    fn steering(&self, idx: usize, vel: Vec2, flock: &[Bird]) -> Vec2 {
        let this = &flock[idx];

        let mut center = Vec2::ZERO;
        let mut heading = Vec2::ZERO;
        let mut push = Vec2::ZERO;
        let mut n_neighbors = 0;

        for (other_idx, other) in flock.iter().enumerate() {
            if other_idx == idx {
                continue;
            }
            let dist = this.pos.distance(other.pos);
            if dist >= self.cfg.visual_range {
                continue;
            }
            n_neighbors += 1;
            center += other.pos;
            heading += other.vel;
            // Repel harder the closer the neighbor; coincident neighbors
            // are skipped to avoid dividing by zero.
            if dist < self.cfg.min_separation && dist > 0.0 {
                push += (this.pos - other.pos) / dist;
            }
        }

        let mut force = Vec2::ZERO;
        if n_neighbors > 0 {
            let n = n_neighbors as f64;
            force += (center / n - this.pos) * self.cfg.cohesion_weight;
            force += (heading / n - vel) * self.cfg.alignment_weight;
            force += push * self.cfg.separation_weight;
        }

        // Leader attraction is not limited by the visual range.
        if let Some(leader_idx) = self.leader {
            force += (flock[leader_idx].pos - this.pos) * self.cfg.leader_follow_weight;
        }

        force
    }

    /// Clamp speed to `[min_speed, max_speed]`, preserving direction.
    ///
    /// A bird with exactly zero velocity has no direction to preserve and
    /// gets a fresh random heading at `min_speed` instead of staying
    /// stalled forever.
    fn clamp_speed(&mut self, vel: Vec2) -> Vec2 {
        let speed = vel.length();
        if speed > self.cfg.max_speed {
            vel.scaled_to(self.cfg.max_speed)
        } else if speed < self.cfg.min_speed {
            if speed > 0.0 {
                vel.scaled_to(self.cfg.min_speed)
            } else {
                let angle = self.rng.random_range(0.0..TAU);
                Vec2::new(angle.cos(), angle.sin()) * self.cfg.min_speed
            }
        } else {
            vel
        }
    }
}

/// Reflect one axis off the walls at `0` and `size`.
///
/// Evaluated against the post-integration position; afterwards the position
/// always lies in `[0, size - 1]`. A nonzero `nudge` pushes the reflected
/// velocity slightly away from the wall.
fn reflect_axis(pos: &mut f64, vel: &mut f64, size: f64, nudge: f64) {
    if *pos < 0.0 {
        *pos = 0.0;
        *vel = -*vel + nudge;
    } else if *pos >= size {
        *pos = size - 1.0;
        *vel = -*vel - nudge;
    }
}

impl Simulation for Flock {
    fn advance(&mut self) {
        self.step();
    }

    fn frame(&self, frame: &mut Vec<(u32, u32)>) {
        frame.clear();
        frame.extend(
            self.birds
                .iter()
                .map(|bird| (bird.pos.x as u32, bird.pos.y as u32)),
        );
    }
}
