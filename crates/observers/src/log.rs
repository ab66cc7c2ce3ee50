//! A plain-text event log.
//!
//! [`EventLog`] writes one line per event to any [`io::Write`]. Step events
//! can be thinned out with [`EventLog::every`]; coil transitions, payload
//! release, and batch progress are always written.
//!
//! ```text
//! run 0 started: 500 V, turns actual, drag actual
//! run 0 t=0.000000 s coil 1 energized
//! run 0 t=0.009000 s step 10: x=0.014351 m v=1.853120 m/s net=148.331 N current=81.322 A
//! run 0 finished: ReachedEnd
//! ```

use std::{
    fmt,
    io::{self, Write},
};

use coilgun_core::Observer;
use coilgun_launch::{Transition, launch};
use coilgun_sweep::batch;
use uom::si::{
    electric_current::ampere, electric_potential::volt, f64::Time, force::newton, length::meter,
    time::second, velocity::meter_per_second,
};

/// Writes events as text lines.
///
/// Write errors do not interrupt the run. The first one is kept and returned
/// by [`EventLog::finish`], and nothing more is written after it.
#[derive(Debug)]
pub struct EventLog<W: Write> {
    writer: W,
    every: usize,
    error: Option<io::Error>,
}

impl<W: Write> EventLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            every: 1,
            error: None,
        }
    }

    /// Only writes every `steps`-th step event.
    #[must_use]
    pub fn every(mut self, steps: usize) -> Self {
        self.every = steps.max(1);
        self
    }

    /// Flushes the writer and returns it.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while writing or flushing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{args}") {
            self.error = Some(err);
        }
    }

    fn launch_event(&mut self, run: Option<usize>, event: &launch::Event) {
        if let launch::Event::Step { step, .. } = event
            && step % self.every != 0
        {
            return;
        }

        let prefix = run.map(|index| format!("run {index} ")).unwrap_or_default();
        let t = seconds(event.time());
        match event {
            launch::Event::Transition { transition, .. } => {
                let coil = transition.coil();
                match transition {
                    Transition::Armed(_) => {
                        self.line(format_args!("{prefix}t={t:.6} s {coil} armed"));
                    }
                    Transition::Activated { .. } => {
                        self.line(format_args!("{prefix}t={t:.6} s {coil} energized"));
                    }
                    Transition::ShutDown { pulse, .. } => {
                        let duration = seconds(pulse.duration());
                        self.line(format_args!(
                            "{prefix}t={t:.6} s {coil} shut down after {duration:.6} s"
                        ));
                    }
                    Transition::Discarded(_) => {
                        self.line(format_args!("{prefix}t={t:.6} s {coil} discarded"));
                    }
                }
            }
            launch::Event::PayloadReleased { position, .. } => {
                let x = position.get::<meter>();
                self.line(format_args!("{prefix}t={t:.6} s payload released at x={x:.6} m"));
            }
            launch::Event::Step {
                step,
                sample,
                forces,
            } => {
                let x = sample.position.get::<meter>();
                let v = sample.velocity.get::<meter_per_second>();
                let net = forces.net.get::<newton>();
                let current = sample.current.get::<ampere>();
                self.line(format_args!(
                    "{prefix}t={t:.6} s step {step}: x={x:.6} m v={v:.6} m/s net={net:.3} N current={current:.3} A"
                ));
            }
        }
    }
}

fn seconds(time: Time) -> f64 {
    time.get::<second>()
}

impl<W: Write, A> Observer<launch::Event, A> for EventLog<W> {
    fn observe(&mut self, event: &launch::Event) -> Option<A> {
        self.launch_event(None, event);
        None
    }
}

impl<W: Write, A> Observer<batch::Event, A> for EventLog<W> {
    fn observe(&mut self, event: &batch::Event) -> Option<A> {
        match event {
            batch::Event::Started { combination } => {
                let volts = combination.voltage.get::<volt>();
                self.line(format_args!(
                    "run {} started: {volts} V, turns {}, drag {}",
                    combination.index, combination.turns, combination.drag
                ));
            }
            batch::Event::Launch { index, event } => self.launch_event(Some(*index), event),
            batch::Event::Finished { index, status } => {
                self.line(format_args!("run {index} finished: {status:?}"));
            }
        }
        None
    }
}
