use std::sync::Arc;

use arq_lab_abstract::{ArqConfig, ConfigError, Frame, TraceEvent};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, warn};

use crate::channel::{Delivery, ImpairedChannel};
use crate::error::EngineError;
use crate::timers::RetransmitTimers;
use crate::trace::{SimulationReport, TraceRecorder};
use crate::window::{AckOutcome, SlidingWindow};

/// Reports from delivery and timer tasks back to the orchestrator.
#[derive(Debug)]
enum Signal {
    AckDelivered(u32),
    AckFault(EngineError),
    TimerExpired { seq: u32, generation: u64 },
}

/// The shared window core. Ack recording, timer cancellation, and the
/// expiry validity check all run under this one lock, which is what makes
/// ack delivery and timer expiry mutually exclusive per seq.
#[derive(Debug)]
struct ArqState {
    window: SlidingWindow,
    timers: RetransmitTimers,
    duplicate_acks: u32,
}

/// Selective-repeat ARQ run over a simulated lossy channel.
///
/// The orchestrator admits frames as the window allows and reacts to
/// signals from its worker tasks: one sleeping task per in-flight
/// delivery, one per armed retransmit timer. All tasks live in a
/// `JoinSet` that is aborted and drained when the run terminates, so
/// nothing outlives the terminal state.
pub struct Simulator {
    config: ArqConfig,
    channel: ImpairedChannel,
    state: Arc<Mutex<ArqState>>,
    trace: Arc<TraceRecorder>,
}

impl Simulator {
    /// Build a simulator, rejecting an invalid configuration before any
    /// simulation state exists.
    pub fn new(config: ArqConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ArqState {
            window: SlidingWindow::new(config.total_frames, config.window_size),
            timers: RetransmitTimers::new(),
            duplicate_acks: 0,
        };
        Ok(Self {
            channel: ImpairedChannel::new(&config),
            state: Arc::new(Mutex::new(state)),
            trace: Arc::new(TraceRecorder::new()),
            config,
        })
    }

    /// Deterministic fault: drop the next channel attempt carrying `seq`.
    pub fn script_drop(&mut self, seq: u32) {
        self.channel.script_drop(seq);
    }

    /// Drive the run to its terminal state: either every frame is
    /// acknowledged, or the run fails with a protocol violation or the
    /// retry bound.
    pub async fn run(mut self) -> Result<SimulationReport, EngineError> {
        let started = Instant::now();
        info!(
            "starting selective-repeat run: {} frames, window {}",
            self.config.total_frames, self.config.window_size
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        let mut outcome = Ok(());
        let mut done = self.admit_and_check(&tx, &mut tasks).await;
        while !done {
            // The orchestrator holds a sender, so the channel cannot close
            // while this loop runs.
            let Some(signal) = rx.recv().await else { break };
            match signal {
                Signal::AckDelivered(seq) => {
                    debug!("window advanced by ack for frame {seq}");
                    done = self.admit_and_check(&tx, &mut tasks).await;
                }
                Signal::AckFault(err) => {
                    outcome = Err(err);
                    break;
                }
                Signal::TimerExpired { seq, generation } => {
                    if let Err(err) = self
                        .handle_expiry(seq, generation, &tx, &mut tasks)
                        .await
                    {
                        outcome = Err(err);
                        break;
                    }
                }
            }
        }

        // No delivery or timer task survives the terminal state.
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        if let Err(err) = outcome {
            warn!("terminating run: {err}");
            return Err(err);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.trace.record(TraceEvent::Completed { elapsed_ms });
        info!(
            "all {} frames acknowledged in {} ms",
            self.config.total_frames, elapsed_ms
        );
        Ok(self.build_report(elapsed_ms).await)
    }

    /// Admit frames while the window has room, dispatching each through
    /// the channel. Returns true once every frame is acknowledged.
    async fn admit_and_check(
        &mut self,
        tx: &UnboundedSender<Signal>,
        tasks: &mut JoinSet<()>,
    ) -> bool {
        loop {
            let admitted = {
                let mut state = self.state.lock().await;
                match state.window.admit() {
                    Some(seq) => Some((seq, state.window.note_attempt(seq))),
                    None => {
                        if state.window.is_complete() {
                            return true;
                        }
                        None
                    }
                }
            };
            let Some((seq, attempt)) = admitted else {
                return false;
            };
            self.dispatch(Frame::simulated(seq), attempt, tx, tasks).await;
        }
    }

    /// One send attempt: decide the channel's fate for it, spawn the
    /// delivery task if it survives, and arm the retransmit timer either
    /// way.
    async fn dispatch(
        &mut self,
        frame: Frame,
        attempt: u32,
        tx: &UnboundedSender<Signal>,
        tasks: &mut JoinSet<()>,
    ) {
        let seq = frame.seq;
        self.trace.record(TraceEvent::Send { seq, attempt });
        if attempt == 1 {
            info!("[SEND] frame {} sent ({} bytes)", seq, frame.len());
        } else {
            info!("[SEND] frame {} retransmitted (attempt {})", seq, attempt);
        }

        match self.channel.plan_attempt(seq) {
            Delivery::Dropped => {
                self.trace.record(TraceEvent::Loss { seq, attempt });
                info!("[LOSS] frame {} lost in transit", seq);
            }
            Delivery::Delivered {
                delay_ms,
                reorder_extra_ms,
            } => {
                if let Some(extra) = reorder_extra_ms {
                    self.trace.record(TraceEvent::Reorder {
                        seq,
                        extra_delay_ms: extra,
                    });
                    info!("[REORDER] frame {} reordered (+{} ms)", seq, extra);
                }
                let total_delay = delay_ms + reorder_extra_ms.unwrap_or(0);
                let state = Arc::clone(&self.state);
                let trace = Arc::clone(&self.trace);
                let tx = tx.clone();
                tasks.spawn(async move {
                    sleep(Duration::from_millis(total_delay)).await;
                    deliver_ack(seq, &state, &trace, &tx).await;
                });
            }
        }

        let generation = self.state.lock().await.timers.arm(seq);
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let tx = tx.clone();
        tasks.spawn(async move {
            sleep(timeout).await;
            let _ = tx.send(Signal::TimerExpired { seq, generation });
        });
    }

    /// A retransmit timer fired. Under the window lock, discard it if it
    /// was cancelled or the frame has since been acknowledged; otherwise
    /// count the attempt and retransmit.
    async fn handle_expiry(
        &mut self,
        seq: u32,
        generation: u64,
        tx: &UnboundedSender<Signal>,
        tasks: &mut JoinSet<()>,
    ) -> Result<(), EngineError> {
        let attempt = {
            let mut state = self.state.lock().await;
            if !state.timers.is_current(seq, generation) || state.window.is_acked(seq) {
                debug!("stale timer for frame {} ignored", seq);
                return Ok(());
            }
            state.window.note_attempt(seq)
        };

        if attempt > self.config.max_attempts {
            return Err(EngineError::RetriesExhausted {
                seq,
                attempts: attempt - 1,
            });
        }

        self.trace.record(TraceEvent::Timeout { seq });
        info!("[TIMEOUT] frame {} timed out, retransmitting", seq);
        self.dispatch(Frame::simulated(seq), attempt, tx, tasks).await;
        Ok(())
    }

    async fn build_report(&self, elapsed_ms: u64) -> SimulationReport {
        let duplicate_acks = self.state.lock().await.duplicate_acks;
        let events = self.trace.snapshot();
        let total_sends = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Send { .. }))
            .count() as u32;
        let retransmissions = events.iter().filter(|e| e.is_retransmission()).count() as u32;
        SimulationReport {
            config: self.config.clone(),
            elapsed_ms,
            total_sends,
            retransmissions,
            duplicate_acks,
            events,
        }
    }
}

/// The window core's acknowledgment-delivery entry point, invoked by
/// delivery tasks once the channel delay has elapsed. Recording the ack
/// and cancelling the frame's timer happen in one critical section, so an
/// expiry can never observe a half-applied acknowledgment.
async fn deliver_ack(
    seq: u32,
    state: &Mutex<ArqState>,
    trace: &TraceRecorder,
    tx: &UnboundedSender<Signal>,
) {
    let outcome = {
        let mut state = state.lock().await;
        match state.window.record_ack(seq) {
            Ok(AckOutcome::First) => {
                state.timers.cancel(seq);
                Ok(AckOutcome::First)
            }
            Ok(AckOutcome::Duplicate) => {
                state.duplicate_acks += 1;
                Ok(AckOutcome::Duplicate)
            }
            Err(err) => Err(err),
        }
    };

    match outcome {
        Ok(AckOutcome::First) => {
            trace.record(TraceEvent::Ack { seq });
            info!("[ACK] frame {} acknowledged", seq);
            let _ = tx.send(Signal::AckDelivered(seq));
        }
        Ok(AckOutcome::Duplicate) => {
            // Idempotence: duplicates are silent.
            debug!("duplicate ack for frame {} ignored", seq);
        }
        Err(err) => {
            let _ = tx.send(Signal::AckFault(err));
        }
    }
}
