use crate::config::{DisplayConfig, FireflyConfig};
use crate::runner::Simulation;
use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};

/// One wandering, stochastically blinking point.
#[derive(Debug, Clone, Copy)]
pub struct Firefly {
    pub x: i32,
    pub y: i32,
    pub lit: bool,
    /// Ticks of light remaining; at least 1 whenever `lit`.
    pub timer: u32,
}

/// Firefly engine.
///
/// Each firefly takes an independent integer random walk, hard-clamped to
/// the display, and blinks on for a fixed number of ticks with a fixed
/// per-tick probability. There is no interaction between fireflies.
pub struct Swarm {
    cfg: FireflyConfig,
    width: i32,
    height: i32,
    flies: Vec<Firefly>,
    blink_dist: Bernoulli,
    rng: ChaCha12Rng,
}

impl Swarm {
    /// Create a new `Swarm` of unlit fireflies at random positions.
    pub fn new(cfg: FireflyConfig, display: &DisplayConfig, mut rng: ChaCha12Rng) -> Result<Self> {
        let width = display.width as i32;
        let height = display.height as i32;

        let x_dist = Uniform::new(0, width)?;
        let y_dist = Uniform::new(0, height)?;
        let blink_dist = Bernoulli::new(cfg.blink_chance)?;

        let mut flies = Vec::with_capacity(cfg.n_fireflies);
        for _ in 0..cfg.n_fireflies {
            flies.push(Firefly {
                x: x_dist.sample(&mut rng),
                y: y_dist.sample(&mut rng),
                lit: false,
                timer: 0,
            });
        }

        Ok(Self {
            cfg,
            width,
            height,
            flies,
            blink_dist,
            rng,
        })
    }

    pub fn flies(&self) -> &[Firefly] {
        &self.flies
    }

    /// Advance every firefly by one tick.
    pub fn step(&mut self) {
        let move_speed = self.cfg.move_speed as i32;
        let blink_duration = self.cfg.blink_duration;
        let rng = &mut self.rng;

        for fly in self.flies.iter_mut() {
            fly.x = (fly.x + rng.random_range(-move_speed..=move_speed)).clamp(0, self.width - 1);
            fly.y = (fly.y + rng.random_range(-move_speed..=move_speed)).clamp(0, self.height - 1);

            if fly.lit {
                // A firefly that goes dark this tick does not get a fresh
                // blink draw until the next one.
                fly.timer = fly.timer.saturating_sub(1);
                if fly.timer == 0 {
                    fly.lit = false;
                }
            } else if self.blink_dist.sample(rng) {
                fly.lit = true;
                fly.timer = blink_duration;
            }
        }
    }
}

impl Simulation for Swarm {
    fn advance(&mut self) {
        self.step();
    }

    fn frame(&self, frame: &mut Vec<(u32, u32)>) {
        frame.clear();
        frame.extend(
            self.flies
                .iter()
                .filter(|fly| fly.lit)
                .map(|fly| (fly.x as u32, fly.y as u32)),
        );
    }
}
