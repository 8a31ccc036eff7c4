use crate::display::Sink;
use anyhow::{Context, Result};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

/// A tickable simulation that can describe its current frame as a set of
/// lit pixel coordinates.
pub trait Simulation {
    fn advance(&mut self);
    fn frame(&self, frame: &mut Vec<(u32, u32)>);
}

/// Drives a [`Simulation`] against a [`Sink`] at a fixed frame period.
///
/// The loop is single-threaded and cooperative: the interrupt flag is
/// checked between ticks, and whichever way the loop ends the display is
/// cleared before `run` returns.
pub struct Runner<S: Sink> {
    sink: S,
    frame_delay: Duration,
    max_frames: Option<u64>,
    interrupted: Arc<AtomicBool>,
}

impl<S: Sink> Runner<S> {
    pub fn new(
        sink: S,
        frame_delay: Duration,
        max_frames: Option<u64>,
        interrupted: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sink,
            frame_delay,
            max_frames,
            interrupted,
        }
    }

    pub fn run(&mut self, sim: &mut dyn Simulation) -> Result<()> {
        let mut frame = Vec::new();
        let mut n_frames: u64 = 0;

        let outcome = loop {
            if self.interrupted.load(Ordering::Relaxed) {
                break "interrupted";
            }
            if self.max_frames.is_some_and(|max| n_frames >= max) {
                break "finished";
            }

            sim.advance();
            sim.frame(&mut frame);

            self.sink
                .render(&frame)
                .context("failed to render frame")?;
            self.sink.flush().context("failed to flush frame")?;
            n_frames += 1;

            thread::sleep(self.frame_delay);
        };

        log::info!("{outcome} after {n_frames} frames");

        // The display must go dark on every exit path, interrupt included.
        self.sink.clear().context("failed to clear display")?;
        self.sink.flush().context("failed to flush display")?;

        Ok(())
    }
}
