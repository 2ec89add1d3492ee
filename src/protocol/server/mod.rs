//! Request dispatcher: waits for PGN 0xFF14 requests, solves Kepler's
//! equation and broadcasts the PGN 0xFF15 reply.
//!
//! One frame is processed at a time. The solver is bounded, so a
//! pathological request cannot stall the loop; the loop itself only ends
//! on the shutdown signal or on a transport failure.
use crate::{
    error::{ExtractionError, ServerError},
    infra::codec::traits::{FromPayload, PgnMessage, ToPayload},
    kepler::solver::{self, Solution, SolverConfig},
    protocol::{
        messages::{KeplerRequest, KeplerResult},
        transport::{
            can_frame::{CanFrame, CAN_MAX_DLC},
            can_id::{CanId, J1939Id, GLOBAL_ADDRESS},
            traits::{can_bus::CanBus, korri_timer::KorriTimer},
            IDLE_POLL_DELAY_MS,
        },
    },
};
use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embassy_time::Duration;
use futures_util::future::{select, Either};
use futures_util::pin_mut;

/// Source address of the server node.
pub const SERVER_ADDRESS: u8 = 0;
/// Priority of reply frames.
pub const REPLY_PRIORITY: u8 = 6;

//==================================================================================CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// What to do with a solve that did not reach the tolerance.
pub enum NonConvergencePolicy {
    /// Send the best estimate anyway; the miss is logged.
    #[default]
    Reply,
    /// Drop the request without answering.
    Suppress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Dispatcher settings. Defaults carry the node's protocol constants.
pub struct ServerConfig {
    /// Source address stamped on replies.
    pub source_address: u8,
    /// Priority of reply frames (3 bits).
    pub priority: u8,
    /// PGN recognized as a request.
    pub request_pgn: u32,
    /// PGN used for replies.
    pub result_pgn: u32,
    /// Back-off after an empty read.
    pub idle_delay: Duration,
    pub solver: SolverConfig,
    pub on_non_convergence: NonConvergencePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            source_address: SERVER_ADDRESS,
            priority: REPLY_PRIORITY,
            request_pgn: KeplerRequest::PGN,
            result_pgn: KeplerResult::PGN,
            idle_delay: Duration::from_millis(IDLE_POLL_DELAY_MS),
            solver: SolverConfig::default(),
            on_non_convergence: NonConvergencePolicy::Reply,
        }
    }
}

//==================================================================================OUTCOME
#[derive(Clone, Debug, PartialEq)]
/// Result of processing a single received frame.
pub enum FrameOutcome {
    /// Not a request; dropped without invoking the solver.
    Ignored { pgn: u32 },
    /// Request payload too short to decode.
    Rejected(ExtractionError),
    /// Solved and answered with `reply`.
    Replied { solution: Solution, reply: CanFrame },
    /// Solved, but the estimate was not put on the wire.
    Suppressed { solution: Solution },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Frame counters accumulated by [`KeplerServer::run`].
pub struct ServerStats {
    pub received: u32,
    pub ignored: u32,
    pub rejected: u32,
    pub replied: u32,
    pub suppressed: u32,
}

impl ServerStats {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.received = self.received.saturating_add(1);
        let counter = match outcome {
            FrameOutcome::Ignored { .. } => &mut self.ignored,
            FrameOutcome::Rejected(_) => &mut self.rejected,
            FrameOutcome::Replied { .. } => &mut self.replied,
            FrameOutcome::Suppressed { .. } => &mut self.suppressed,
        };
        *counter = counter.saturating_add(1);
    }
}

//==================================================================================SERVER
/// J1939 node answering eccentric-anomaly requests.
pub struct KeplerServer<C: CanBus, T: KorriTimer> {
    can_bus: C,
    timer: T,
    config: ServerConfig,
}

impl<C: CanBus, T: KorriTimer> KeplerServer<C, T> {
    pub fn new(can_bus: C, timer: T, config: ServerConfig) -> Self {
        Self {
            can_bus,
            timer,
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Give back the bus and timer.
    pub fn into_inner(self) -> (C, T) {
        (self.can_bus, self.timer)
    }

    /// Decide what a received frame calls for, without touching the bus.
    pub fn handle_frame(&self, frame: &CanFrame) -> FrameOutcome {
        let id = J1939Id::from(frame.id);
        let pgn = id.pgn;
        log_trace!(
            "Frame received: PGN {:#X} from SA {} ({} bytes)",
            pgn,
            id.source_address,
            frame.len
        );

        if pgn != self.config.request_pgn {
            return FrameOutcome::Ignored { pgn };
        }

        let request = match KeplerRequest::from_payload(frame.payload()) {
            Ok(request) => request,
            Err(err) => {
                let err = ExtractionError::from(err);
                log_warn!(
                    "Dropping request from SA {}: {:?}",
                    id.source_address,
                    err
                );
                return FrameOutcome::Rejected(err);
            }
        };
        log_debug!(
            "Request from SA {}: M={} deg, e={}",
            id.source_address,
            request.mean_anomaly,
            request.eccentricity
        );

        let mean_anomaly = request.mean_anomaly_rad();
        let solution = solver::solve_with(
            &self.config.solver,
            mean_anomaly,
            request.eccentricity,
            mean_anomaly,
        );

        if !solution.eccentric_anomaly.is_finite() {
            log_error!(
                "Solver produced a non-finite estimate after {} iterations, no reply",
                solution.iterations
            );
            return FrameOutcome::Suppressed { solution };
        }
        if !solution.converged() && self.config.on_non_convergence == NonConvergencePolicy::Suppress
        {
            log_warn!(
                "Suppressing reply: {:?} after {} iterations (residual {})",
                solution.status,
                solution.iterations,
                solution.residual
            );
            return FrameOutcome::Suppressed { solution };
        }

        match self.build_reply(&solution) {
            Some(reply) => FrameOutcome::Replied { solution, reply },
            None => FrameOutcome::Suppressed { solution },
        }
    }

    fn build_reply(&self, solution: &Solution) -> Option<CanFrame> {
        let result = KeplerResult::from_radians(solution.eccentric_anomaly);
        let mut data = [0u8; CAN_MAX_DLC];
        let size = result.payload_len().min(CAN_MAX_DLC);
        let len = match result.to_payload(&mut data[..size]) {
            Ok(len) => len,
            Err(_err) => {
                log_error!("Unable to encode reply payload");
                return None;
            }
        };
        log_debug!(
            "E={} deg (residual {}, {} iterations, converged: {})",
            result.eccentric_anomaly,
            solution.residual,
            solution.iterations,
            solution.converged()
        );

        let id = CanId::builder(self.config.result_pgn, self.config.source_address)
            .with_priority(self.config.priority)
            .to_destination(GLOBAL_ADDRESS)
            .build();
        Some(CanFrame::new(id, &data[..len]))
    }

    /// Run a single iteration: read, then either back off or handle and reply.
    ///
    /// Returns `Ok(None)` when the read yielded no frame.
    pub async fn poll_once(&mut self) -> Result<Option<FrameOutcome>, ServerError<C::Error>> {
        match self.can_bus.recv().await.map_err(ServerError::Receive)? {
            None => {
                self.idle().await;
                Ok(None)
            }
            Some(frame) => self.dispatch(&frame).await.map(Some),
        }
    }

    /// Serve requests until `shutdown` is signaled.
    ///
    /// The signal is checked before every read and raced against the pending
    /// read, so a quiet bus does not delay shutdown.
    pub async fn run<M: RawMutex>(
        &mut self,
        shutdown: &Signal<M, ()>,
    ) -> Result<ServerStats, ServerError<C::Error>> {
        log_info!(
            "Kepler server up: SA {}, requests PGN {:#X}, replies PGN {:#X}",
            self.config.source_address,
            self.config.request_pgn,
            self.config.result_pgn
        );
        let mut stats = ServerStats::default();

        loop {
            if shutdown.signaled() {
                break;
            }

            let received = {
                let recv = self.can_bus.recv();
                let stop = shutdown.wait();
                pin_mut!(recv);
                pin_mut!(stop);

                match select(recv, stop).await {
                    Either::Left((result, _)) => result.map_err(ServerError::Receive)?,
                    Either::Right(_) => break,
                }
            };

            match received {
                None => self.idle().await,
                Some(frame) => {
                    let outcome = self.dispatch(&frame).await?;
                    stats.record(&outcome);
                }
            }
        }

        log_info!(
            "Kepler server stopped: {} frames, {} replied, {} ignored, {} rejected, {} suppressed",
            stats.received,
            stats.replied,
            stats.ignored,
            stats.rejected,
            stats.suppressed
        );
        Ok(stats)
    }

    async fn dispatch(&mut self, frame: &CanFrame) -> Result<FrameOutcome, ServerError<C::Error>> {
        let outcome = self.handle_frame(frame);
        if let FrameOutcome::Replied { reply, .. } = &outcome {
            if let Err(err) = self.can_bus.send(reply).await {
                log_error!("Failed to send reply frame");
                return Err(ServerError::Send(err));
            }
            log_debug!("Reply sent with id {:#X}", reply.id.0);
        }
        Ok(outcome)
    }

    async fn idle(&mut self) {
        let millis = u32::try_from(self.config.idle_delay.as_millis()).unwrap_or(u32::MAX);
        self.timer.delay_ms(millis).await;
    }
}
