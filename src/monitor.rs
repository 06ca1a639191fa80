//! The tick loop: fetch, sort, render, write, sleep.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::collector::StatsBackend;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::provider::SampleProvider;
use crate::render::{OutputKind, Renderer, render_tick};

/// Granularity at which the sleep between ticks checks the running flag.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Why the loop ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The running flag was cleared.
    Interrupted,
    /// The configured number of ticks was reached.
    IterationsDone,
    /// The backend has no more snapshots.
    EndOfData,
}

pub struct Monitor<B: StatsBackend, W: Write> {
    provider: SampleProvider<B>,
    out: W,
    config: MonitorConfig,
    /// Builds the renderer for each tick.
    make_renderer: fn(OutputKind) -> Box<dyn Renderer>,
    ticks: u64,
}

impl<B: StatsBackend, W: Write> Monitor<B, W> {
    pub fn new(backend: B, out: W, config: MonitorConfig) -> Self {
        Self {
            provider: SampleProvider::new(backend),
            out,
            config,
            make_renderer: OutputKind::renderer,
            ticks: 0,
        }
    }

    /// Runs until the running flag is cleared, the iteration count is
    /// reached, or the backend is exhausted. The backend is shut down on
    /// every exit path.
    ///
    /// The flag is checked between ticks only, so a tick's output is never
    /// cut short.
    pub fn run(&mut self, running: &AtomicBool) -> Result<StopReason, MonitorError> {
        let result = self.run_ticks(running);
        self.provider.shutdown();
        match &result {
            Ok(reason) => info!(ticks = self.ticks, ?reason, "monitor stopped"),
            Err(e) => error!(ticks = self.ticks, error = %e, "monitor failed"),
        }
        result
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn backend(&self) -> &B {
        self.provider.backend()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn run_ticks(&mut self, running: &AtomicBool) -> Result<StopReason, MonitorError> {
        loop {
            if !running.load(Ordering::SeqCst) {
                return Ok(StopReason::Interrupted);
            }

            let frame = match self.provider.advance(Utc::now()) {
                Ok(frame) => frame,
                Err(e) if e.is_exhausted() => return Ok(StopReason::EndOfData),
                Err(e) => return Err(e.into()),
            };

            let mut renderer = (self.make_renderer)(self.config.output);
            match render_tick(
                renderer.as_mut(),
                frame.current,
                frame.previous,
                self.config.ident,
                &self.config.display,
            ) {
                Ok(record) => {
                    self.out.write_all(record.as_bytes())?;
                    self.out.flush()?;
                }
                Err(e) => error!(tick = self.ticks + 1, error = %e, "failed to render tick"),
            }

            self.ticks += 1;
            debug!(tick = self.ticks, "tick complete");

            if !self.config.is_unbounded() && self.ticks >= self.config.iterations {
                return Ok(StopReason::IterationsDone);
            }

            sleep_while_running(self.config.interval, running);
        }
    }
}

/// Sleeps for `interval`, returning early once `running` is cleared.
fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let mut remaining = interval;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let sleep_time = remaining.min(SLEEP_SLICE);
        std::thread::sleep(sleep_time);
        remaining = remaining.saturating_sub(sleep_time);
    }
}
