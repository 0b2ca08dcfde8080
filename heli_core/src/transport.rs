//! Telemetry transport: owns the link (serial or simulated), runs one
//! background worker that feeds decoded events into a FIFO queue, and
//! exposes a non-blocking drain plus a synchronous command write.
//!
//! Concurrency contract: the worker is the only producer, the caller the
//! only consumer. Cancellation is cooperative; the worker checks the stop
//! flag once per loop iteration, so stop latency is bounded by one read
//! timeout. The mirror is the single lockable unit shared between the
//! worker's decode path and the caller's `set_pidf`/`set_reference`.

use crate::codec::{self, DataFrame, OutboundCommand, TelemetryEvent};
use crate::error::{CommandError, Result};
use crate::filter::Mirror;
use crate::sim::{SimCfg, StepResponseSim};
use crate::synth::{DiscreteCoefficients, PidfGains};
use crossbeam_channel as xch;
use heli_traits::clock::{Clock, MonotonicClock};
use heli_traits::{LinePort, PortOpener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Backend {
    Port(Box<dyn PortOpener>),
    Simulated(SimCfg),
}

pub struct Transport {
    backend: Backend,
    events_tx: xch::Sender<TelemetryEvent>,
    events_rx: xch::Receiver<TelemetryEvent>,
    mirror: Arc<Mutex<Mirror>>,
    port: Option<Arc<Mutex<Box<dyn LinePort>>>>,
    stop: Arc<AtomicBool>,
    /// True while the worker loop runs; cleared by the worker on exit.
    alive: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
    poll: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Transport {
    /// Transport over a real line port; the opener runs on every `start()`.
    pub fn over_port(opener: impl PortOpener + 'static, coeffs: DiscreteCoefficients) -> Self {
        Self::new(Backend::Port(Box::new(opener)), coeffs)
    }

    /// Offline transport producing synthetic telemetry frames.
    pub fn simulated(sim: SimCfg, coeffs: DiscreteCoefficients) -> Self {
        Self::new(Backend::Simulated(sim), coeffs)
    }

    fn new(backend: Backend, coeffs: DiscreteCoefficients) -> Self {
        let (events_tx, events_rx) = xch::unbounded();
        Self {
            backend,
            events_tx,
            events_rx,
            mirror: Arc::new(Mutex::new(Mirror::new(coeffs))),
            port: None,
            stop: Arc::new(AtomicBool::new(false)),
            alive: Arc::new(AtomicBool::new(false)),
            worker: None,
            poll: Duration::from_millis(1),
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    /// Idle back-off between polls when the port has nothing pending.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Provide a custom clock; defaults to MonotonicClock.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Arc::from(clock);
        self
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Start the background worker.
    ///
    /// Calling while already running is a warned no-op: the existing worker
    /// and its queue are left untouched. In real mode a failed open is
    /// fatal to this attempt only; it surfaces as one `TransportError`
    /// event and the transport stays stopped so the caller may retry.
    pub fn start(&mut self) {
        if self.alive.load(Ordering::SeqCst) {
            tracing::warn!("telemetry worker already running; start ignored");
            return;
        }
        // Reap a worker that exited on its own (read fault, consumer gone).
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.port = None;
        self.stop.store(false, Ordering::SeqCst);

        match &mut self.backend {
            Backend::Port(opener) => match opener.open() {
                Ok(port) => {
                    let port = Arc::new(Mutex::new(port));
                    self.port = Some(Arc::clone(&port));
                    self.alive.store(true, Ordering::SeqCst);
                    let (mirror, tx) = (Arc::clone(&self.mirror), self.events_tx.clone());
                    let (stop, alive) = (Arc::clone(&self.stop), Arc::clone(&self.alive));
                    let (poll, clock) = (self.poll, Arc::clone(&self.clock));
                    self.worker = Some(std::thread::spawn(move || {
                        read_loop(port, mirror, tx, stop, alive, poll, clock);
                    }));
                }
                Err(e) => {
                    tracing::error!(error = %e, "serial open failed");
                    let _ = self
                        .events_tx
                        .send(TelemetryEvent::TransportError(format!("open failed: {e}")));
                }
            },
            Backend::Simulated(cfg) => {
                let cfg = *cfg;
                self.alive.store(true, Ordering::SeqCst);
                let (mirror, tx) = (Arc::clone(&self.mirror), self.events_tx.clone());
                let (stop, alive) = (Arc::clone(&self.stop), Arc::clone(&self.alive));
                let clock = Arc::clone(&self.clock);
                self.worker = Some(std::thread::spawn(move || {
                    sim_loop(cfg, mirror, tx, stop, alive, clock);
                }));
            }
        }
    }

    /// Stop the worker and close the link. Safe to call repeatedly; join
    /// latency is bounded by one read timeout.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("telemetry worker joined"),
                Err(e) => tracing::warn!(?e, "telemetry worker panicked during shutdown"),
            }
        }
        self.alive.store(false, Ordering::SeqCst);
        // Last reference to the device handle; dropping it closes the port.
        self.port = None;
    }

    /// Pop up to `max` queued events without blocking, in arrival order.
    pub fn drain(&self, max: usize) -> Vec<TelemetryEvent> {
        self.events_rx.try_iter().take(max).collect()
    }

    /// Encode and write one command as a single operation. A no-op in
    /// simulated mode; failures are reported to the caller and never
    /// retried — there is no acknowledgement protocol at this layer.
    pub fn send_command(&self, cmd: &OutboundCommand) -> Result<()> {
        if matches!(self.backend, Backend::Simulated(_)) {
            tracing::debug!("simulated link; command not sent");
            return Ok(());
        }
        let Some(port) = &self.port else {
            return Err(eyre::Report::new(CommandError::NotConnected));
        };
        let line = codec::encode_command(cmd);
        let Ok(mut guard) = port.lock() else {
            return Err(eyre::Report::new(CommandError::Write(
                "serial port lock poisoned".into(),
            )));
        };
        guard
            .write_line(&line)
            .map_err(|e| eyre::Report::new(map_link_error(&*e)))
    }

    /// Recompute the mirror's coefficients from fresh gains. Domain errors
    /// (N = 0, Ts <= 0) surface here synchronously; the mirror keeps its
    /// previous coefficients in that case. Filter history resets on every
    /// successful call.
    pub fn set_pidf(&self, gains: &PidfGains, pwm_eq: f64) -> Result<()> {
        let coeffs = crate::synth::discretize(gains, pwm_eq)?;
        let Ok(mut mirror) = self.mirror.lock() else {
            eyre::bail!("mirror lock poisoned");
        };
        mirror.set_coeffs(coeffs);
        Ok(())
    }

    /// Update the reference angle used by the mirror's error computation.
    pub fn set_reference_deg(&self, angle_deg: f64) {
        if let Ok(mut mirror) = self.mirror.lock() {
            mirror.set_reference_deg(angle_deg);
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map a boxed link error to the typed command failure, with precise
/// downcasting when the hardware crate is in the build.
fn map_link_error(e: &(dyn std::error::Error + 'static)) -> CommandError {
    #[cfg(feature = "hardware-errors")]
    if let Some(link) = e.downcast_ref::<heli_hardware::error::LinkError>() {
        return match link {
            heli_hardware::error::LinkError::Timeout => CommandError::Timeout,
            other => CommandError::Write(other.to_string()),
        };
    }
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        CommandError::Timeout
    } else {
        CommandError::Write(s)
    }
}

fn read_loop(
    port: Arc<Mutex<Box<dyn LinePort>>>,
    mirror: Arc<Mutex<Mirror>>,
    tx: xch::Sender<TelemetryEvent>,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    poll: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
) {
    let mut lines = codec::LineBuffer::new();
    let mut chunk: Vec<u8> = Vec::with_capacity(256);

    'outer: loop {
        if stop.load(Ordering::Relaxed) {
            tracing::debug!("telemetry worker received stop signal");
            break;
        }

        chunk.clear();
        let read = match port.lock() {
            Ok(mut p) => p.read_available(&mut chunk),
            Err(_) => {
                let _ = tx.send(TelemetryEvent::TransportError(
                    "serial port lock poisoned".into(),
                ));
                break;
            }
        };

        match read {
            Ok(0) => clock.sleep(poll),
            Ok(_) => {
                lines.push(&chunk);
                while let Some(line) = lines.next_line() {
                    let event = match mirror.lock() {
                        Ok(mut m) => codec::decode_line(&line, &mut m),
                        Err(_) => None,
                    };
                    if let Some(ev) = event
                        && tx.send(ev).is_err()
                    {
                        tracing::debug!("telemetry consumer disconnected, exiting worker");
                        break 'outer;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "serial read failed");
                let _ = tx.send(TelemetryEvent::TransportError(format!("read failed: {e}")));
                break;
            }
        }
    }

    alive.store(false, Ordering::SeqCst);
    tracing::trace!("telemetry worker exiting cleanly");
}

fn sim_loop(
    cfg: SimCfg,
    mirror: Arc<Mutex<Mirror>>,
    tx: xch::Sender<TelemetryEvent>,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    clock: Arc<dyn Clock + Send + Sync>,
) {
    let mut sim = StepResponseSim::new(&cfg);
    let period = sim.period();

    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::debug!("simulated telemetry worker received stop signal");
            break;
        }

        let sample = sim.next_sample();
        let pwm_sw = match mirror.lock() {
            Ok(mut m) => m.observe(sample.angle_deg),
            Err(_) => break,
        };
        let frame = DataFrame {
            angle_deg: sample.angle_deg,
            error_deg: sample.error_deg,
            pwm_hw: sample.pwm,
            pwm_sw,
        };
        if tx.send(TelemetryEvent::Data(frame)).is_err() {
            tracing::debug!("telemetry consumer disconnected, exiting sim worker");
            break;
        }
        clock.sleep(period);
    }

    alive.store(false, Ordering::SeqCst);
    tracing::trace!("simulated telemetry worker exiting cleanly");
}
