//! Session state machine: connection lifecycle, outbound message building,
//! inbound message dispatch into [`WorldView`], RTT tracking, and the
//! decode-failure burst escalation of spec §7.
//!
//! This module stays synchronous and transport-agnostic, mirroring the
//! server's split between session state (`net/game_session.rs`-style) and
//! the async I/O loop that drives it (`net/transport.rs`-style, implemented
//! for this crate in [`crate::net::transport`]).

use std::collections::VecDeque;

use thiserror::Error;

use crate::codec::CodecError;
use crate::constants::error_budget;
use crate::predictor::PredictedKinematics;
use crate::protocol::{ClientMessage, GameEvent, MatchPhase, PlayerId, PlayerInput, ServerMessage, Tick};
use crate::util::vec2::Vec2;
use crate::world_view::{LocalPlayerStats, WorldView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("join rejected: {reason}")]
    JoinRejected { reason: String },
    #[error("kicked: {reason}")]
    Kicked { reason: String },
    #[error("protocol mismatch: {count} decode failures within {window_ms}ms")]
    ProtocolMismatch { count: u32, window_ms: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    AwaitingJoinResponse,
    Connected { player_id: PlayerId, is_spectator: bool },
    Disconnecting { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectatorState {
    pub is_spectator: bool,
    pub target: Option<PlayerId>,
}

/// Everything a HUD layer needs to paint on top of the 3D/2D scene.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub phase: MatchPhase,
    pub match_time: f32,
    pub countdown: f32,
    pub rtt_ms: Option<f64>,
    pub local_stats: Option<LocalPlayerStats>,
    pub spectator: SpectatorState,
}

/// Consumes a finished [`crate::world_view::RenderFrame`] plus HUD state.
/// Implemented by whatever windowing/rendering layer hosts the crate; the
/// core never touches a GPU or window handle.
pub trait Renderer {
    fn present(&mut self, frame: &crate::world_view::RenderFrame, hud: &HudState);
}

/// Polled once per outgoing input tick. Implemented by the platform's input
/// layer (keyboard/mouse, gamepad, touch).
pub trait InputSource {
    fn poll(&mut self) -> RawInput;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawInput {
    pub thrust: Vec2,
    pub aim: Vec2,
    pub boost: bool,
    pub fire: bool,
    pub fire_released: bool,
}

pub struct SessionController {
    phase: ConnectionPhase,
    world: WorldView,
    spectator: SpectatorState,
    rtt_ms: Option<f64>,
    pending_ping: Option<(u64, f64)>,
    decode_failure_timestamps: VecDeque<f64>,
    next_input_sequence: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            phase: ConnectionPhase::Disconnected,
            world: WorldView::new(),
            spectator: SpectatorState::default(),
            rtt_ms: None,
            pending_ping: None,
            decode_failure_timestamps: VecDeque::new(),
            next_input_sequence: 0,
        }
    }

    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    pub fn world(&self) -> &WorldView {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldView {
        &mut self.world
    }

    pub fn rtt_ms(&self) -> Option<f64> {
        self.rtt_ms
    }

    pub fn spectator(&self) -> SpectatorState {
        self.spectator
    }

    /// Build the join request and move into `AwaitingJoinResponse`.
    pub fn begin_join(&mut self, name: String, color_index: u8, is_spectator: bool) -> ClientMessage {
        self.phase = ConnectionPhase::AwaitingJoinResponse;
        ClientMessage::JoinRequest { name, color_index, is_spectator }
    }

    /// Build a ping message, recording the send time so the matching Pong
    /// can be turned into an RTT sample.
    pub fn build_ping(&mut self, wall_clock_timestamp: u64, now_ms: f64) -> ClientMessage {
        self.pending_ping = Some((wall_clock_timestamp, now_ms));
        ClientMessage::Ping { timestamp: wall_clock_timestamp }
    }

    /// Build and record a player input, advancing local prediction.
    pub fn build_input(&mut self, tick: Tick, client_time: u64, raw: RawInput) -> PlayerInput {
        let sequence = self.next_input_sequence;
        self.next_input_sequence += 1;
        let input = PlayerInput {
            sequence,
            tick,
            client_time,
            thrust: raw.thrust,
            aim: raw.aim,
            boost: raw.boost,
            fire: raw.fire,
            fire_released: raw.fire_released,
        };
        self.world.record_local_input(input, || PredictedKinematics {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
        });
        input
    }

    /// Decode and dispatch one inbound frame. Returns `Ok(None)` for
    /// messages handled internally (snapshots, deltas, pongs), or
    /// `Ok(Some(event))` when the caller should react (e.g. a kick).
    ///
    /// A decode failure is recorded, not immediately fatal: only a burst of
    /// `error_budget::MAX_DECODE_ERRORS` within `error_budget::DECODE_ERROR_WINDOW_MS`
    /// escalates to `SessionError::ProtocolMismatch` (spec §7).
    pub fn handle_frame(&mut self, bytes: &[u8], now_ms: f64) -> Result<Option<GameEvent>, SessionError> {
        let message = match crate::codec::decode_server_message(bytes) {
            Ok(m) => m,
            Err(e) => {
                self.record_decode_failure(now_ms)?;
                return Err(SessionError::Codec(e));
            }
        };
        Ok(self.dispatch(message, now_ms))
    }

    fn record_decode_failure(&mut self, now_ms: f64) -> Result<(), SessionError> {
        self.decode_failure_timestamps.push_back(now_ms);
        while let Some(&oldest) = self.decode_failure_timestamps.front() {
            if now_ms - oldest > error_budget::DECODE_ERROR_WINDOW_MS {
                self.decode_failure_timestamps.pop_front();
            } else {
                break;
            }
        }
        let count = self.decode_failure_timestamps.len() as u32;
        if count > error_budget::MAX_DECODE_ERRORS {
            self.phase = ConnectionPhase::Disconnecting { reason: "protocol mismatch".into() };
            return Err(SessionError::ProtocolMismatch { count, window_ms: error_budget::DECODE_ERROR_WINDOW_MS });
        }
        Ok(())
    }

    fn dispatch(&mut self, message: ServerMessage, now_ms: f64) -> Option<GameEvent> {
        match message {
            ServerMessage::JoinAccepted { player_id, is_spectator, .. } => {
                self.phase = ConnectionPhase::Connected { player_id, is_spectator };
                self.spectator.is_spectator = is_spectator;
                self.world.set_local_player(player_id);
                None
            }
            ServerMessage::JoinRejected { reason } => {
                self.phase = ConnectionPhase::Disconnected;
                tracing::warn!(reason = %reason, "join rejected");
                None
            }
            ServerMessage::Snapshot(snapshot) => {
                self.world.ingest_snapshot(snapshot, now_ms);
                None
            }
            ServerMessage::Delta(delta) => {
                if !self.world.ingest_delta(delta, now_ms) {
                    tracing::debug!("dropped delta with unknown base tick");
                }
                None
            }
            ServerMessage::Event(event) => {
                self.world.ingest_event(event.clone(), now_ms);
                Some(event)
            }
            ServerMessage::Pong { client_timestamp, .. } => {
                if let Some((sent_timestamp, sent_at)) = self.pending_ping {
                    if sent_timestamp == client_timestamp {
                        self.rtt_ms = Some(now_ms - sent_at);
                        self.pending_ping = None;
                    }
                }
                None
            }
            ServerMessage::Kicked { reason } => {
                self.phase = ConnectionPhase::Disconnecting { reason: reason.clone() };
                None
            }
            ServerMessage::PhaseChange { .. } => None,
            ServerMessage::SpectatorModeChanged(is_spectator) => {
                self.spectator.is_spectator = is_spectator;
                None
            }
        }
    }

    pub fn hud_state(&self) -> HudState {
        let latest = self.world.local_player_stats();
        HudState {
            phase: MatchPhase::default(),
            match_time: 0.0,
            countdown: 0.0,
            rtt_ms: self.rtt_ms,
            local_stats: latest,
            spectator: self.spectator,
        }
    }

    /// Build the `Leave` message and move into `Disconnecting`. The caller
    /// still owns sending the bytes and tearing down the transport.
    pub fn disconnect(&mut self, reason: impl Into<String>) -> ClientMessage {
        self.phase = ConnectionPhase::Disconnecting { reason: reason.into() };
        self.world.reset();
        ClientMessage::Leave
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_server_message;
    use uuid::Uuid;

    #[test]
    fn join_accepted_transitions_to_connected_and_sets_local_player() {
        let mut session = SessionController::new();
        session.begin_join("Nova".into(), 2, false);
        let id = Uuid::new_v4();
        let bytes = encode_server_message(&ServerMessage::JoinAccepted {
            player_id: id,
            session_token: vec![1, 2, 3],
            is_spectator: false,
        });
        session.handle_frame(&bytes, 0.0).unwrap();
        assert_eq!(
            session.phase(),
            &ConnectionPhase::Connected { player_id: id, is_spectator: false }
        );
        assert_eq!(session.world().local_player_id(), Some(id));
    }

    #[test]
    fn pong_with_matching_timestamp_computes_rtt() {
        let mut session = SessionController::new();
        session.build_ping(1000, 0.0);
        let bytes = encode_server_message(&ServerMessage::Pong { client_timestamp: 1000, server_timestamp: 1005 });
        session.handle_frame(&bytes, 42.0).unwrap();
        assert_eq!(session.rtt_ms(), Some(42.0));
    }

    #[test]
    fn mismatched_pong_timestamp_does_not_set_rtt() {
        let mut session = SessionController::new();
        session.build_ping(1000, 0.0);
        let bytes = encode_server_message(&ServerMessage::Pong { client_timestamp: 999, server_timestamp: 1005 });
        session.handle_frame(&bytes, 42.0).unwrap();
        assert_eq!(session.rtt_ms(), None);
    }

    #[test]
    fn sustained_decode_failures_escalate_to_protocol_mismatch() {
        let mut session = SessionController::new();
        let garbage = [0xffu8; 2];
        let mut last = Ok(None);
        for i in 0..(error_budget::MAX_DECODE_ERRORS + 1) {
            last = session.handle_frame(&garbage, i as f64);
        }
        assert!(matches!(last, Err(SessionError::ProtocolMismatch { .. })));
        assert!(matches!(session.phase(), ConnectionPhase::Disconnecting { .. }));
    }

    #[test]
    fn decode_failures_outside_window_do_not_accumulate() {
        let mut session = SessionController::new();
        let garbage = [0xffu8; 2];
        for i in 0..(error_budget::MAX_DECODE_ERRORS) {
            let now = i as f64 * (error_budget::DECODE_ERROR_WINDOW_MS + 1.0);
            let result = session.handle_frame(&garbage, now);
            assert!(result.is_err());
        }
        assert!(!matches!(session.phase(), ConnectionPhase::Disconnecting { .. }));
    }

    #[test]
    fn kicked_moves_to_disconnecting() {
        let mut session = SessionController::new();
        let bytes = encode_server_message(&ServerMessage::Kicked { reason: "idle timeout".into() });
        session.handle_frame(&bytes, 0.0).unwrap();
        assert!(matches!(session.phase(), ConnectionPhase::Disconnecting { .. }));
    }

    #[test]
    fn disconnect_resets_world_and_returns_leave_message() {
        let mut session = SessionController::new();
        let msg = session.disconnect("user quit");
        assert_eq!(msg, ClientMessage::Leave);
        assert!(matches!(session.phase(), ConnectionPhase::Disconnecting { .. }));
    }
}
