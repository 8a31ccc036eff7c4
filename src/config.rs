use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use; every field has a
/// default, so a partial (or absent) file is fine.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub flock: FlockConfig,
    pub firefly: FireflyConfig,
}

/// Output surface dimensions and frame pacing.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width of the display in pixels.
    pub width: u32,
    /// Height of the display in pixels.
    pub height: u32,
    /// Delay between frames in milliseconds.
    pub frame_delay_ms: u64,
}

/// Flocking rule weights, speed limits and variant flags.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// Number of birds in the flock.
    pub n_birds: usize,

    /// How far a bird can see other birds.
    pub visual_range: f64,
    /// Distance below which neighbors repel each other.
    pub min_separation: f64,

    pub cohesion_weight: f64,
    pub alignment_weight: f64,
    pub separation_weight: f64,
    pub leader_follow_weight: f64,
    /// Half-width of the uniform random force applied each tick.
    pub jitter_magnitude: f64,

    pub max_speed: f64,
    pub min_speed: f64,

    /// Designate the first bird as a leader the rest steer toward.
    pub leader_follow: bool,
    /// Apply random jitter to every bird each tick.
    pub jitter: bool,
    /// Push reflected birds slightly off the wall so they cannot stick.
    pub wall_nudge: bool,
}

/// Firefly wander and blink parameters.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct FireflyConfig {
    /// Number of fireflies.
    pub n_fireflies: usize,
    /// Max pixels a firefly moves per tick on each axis.
    pub move_speed: u32,
    /// Probability of an unlit firefly blinking on in a given tick.
    pub blink_chance: f64,
    /// Number of ticks a firefly stays lit once it blinks on.
    pub blink_duration: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            frame_delay_ms: 50,
        }
    }
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            n_birds: 30,
            visual_range: 20.0,
            min_separation: 5.0,
            cohesion_weight: 0.001,
            alignment_weight: 0.05,
            separation_weight: 0.05,
            leader_follow_weight: 0.01,
            jitter_magnitude: 0.05,
            max_speed: 2.0,
            min_speed: 0.5,
            leader_follow: true,
            jitter: true,
            wall_nudge: true,
        }
    }
}

impl Default for FireflyConfig {
    fn default() -> Self {
        Self {
            n_fireflies: 15,
            move_speed: 1,
            blink_chance: 0.05,
            blink_duration: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            flock: FlockConfig::default(),
            firefly: FireflyConfig::default(),
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Missing fields fall back to their defaults. Performs validation on
    /// all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_num(self.display.width, 1..=1024).context("invalid display width")?;
        check_num(self.display.height, 1..=1024).context("invalid display height")?;
        check_num(self.display.frame_delay_ms, 1..10_000).context("invalid frame delay")?;

        let flock = &self.flock;
        check_num(flock.n_birds, 1..10_000).context("invalid number of birds")?;
        check_num(flock.visual_range, 0.0..1.0e6).context("invalid visual range")?;
        check_num(flock.min_separation, 0.0..1.0e6).context("invalid min separation")?;
        check_num(flock.cohesion_weight, 0.0..=1.0).context("invalid cohesion weight")?;
        check_num(flock.alignment_weight, 0.0..=1.0).context("invalid alignment weight")?;
        check_num(flock.separation_weight, 0.0..=1.0).context("invalid separation weight")?;
        check_num(flock.leader_follow_weight, 0.0..=1.0)
            .context("invalid leader follow weight")?;
        check_num(flock.jitter_magnitude, 0.0..=1.0).context("invalid jitter magnitude")?;
        check_num(flock.min_speed, 0.0..1.0e3).context("invalid min speed")?;
        check_num(flock.max_speed, 0.0..1.0e3).context("invalid max speed")?;
        if flock.min_speed <= 0.0 {
            bail!("min speed must be positive");
        }
        if flock.min_speed >= flock.max_speed {
            bail!(
                "min speed ({}) must be less than max speed ({})",
                flock.min_speed,
                flock.max_speed
            );
        }

        let firefly = &self.firefly;
        check_num(firefly.n_fireflies, 1..10_000).context("invalid number of fireflies")?;
        check_num(firefly.move_speed, 0..=64).context("invalid move speed")?;
        check_num(firefly.blink_chance, 0.0..=1.0).context("invalid blink chance")?;
        check_num(firefly.blink_duration, 1..10_000).context("invalid blink duration")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
