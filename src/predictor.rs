//! Client-side prediction and server reconciliation (spec §4.5).
//!
//! [`simulate_input`] is a deterministic mini-simulation of one input tick.
//! It MUST match the server's `apply_thrust`/`physics::update` step
//! (drag, clamp, integrate, in that order) byte-for-byte, or predicted and
//! reconciled state drift apart every tick instead of just at reconcile
//! boundaries.

use std::collections::VecDeque;

use crate::constants::{buffers::INPUT_BUFFER_SIZE, mass_to_thrust_multiplier, physics};
use crate::protocol::{PlayerInput, Tick};
use crate::util::vec2::Vec2;

/// The part of player state the mini-simulation evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedKinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
}

/// Advance `state` by one input tick. Mirrors the server's order of
/// operations exactly: drag, velocity clamp, position integration, then
/// thrust is folded into next tick's velocity (the server applies thrust
/// before drag within the same tick, so thrust is added first here too).
pub fn simulate_input(state: PredictedKinematics, mass: f32, input: &PlayerInput) -> PredictedKinematics {
    let mut velocity = state.velocity;
    let mut rotation = state.rotation;

    if input.boost && input.thrust.length_sq() > physics::INPUT_DEADZONE_SQ {
        let thrust_dir = input.thrust.normalize();
        let thrust_force = mass_to_thrust_multiplier(mass) * crate::constants::boost::BASE_THRUST;
        velocity += thrust_dir * thrust_force * physics::DT;
        rotation = thrust_dir.angle();
    } else if input.aim.length_sq() > physics::INPUT_DEADZONE_SQ {
        rotation = input.aim.normalize().angle();
    }

    velocity *= 1.0 - physics::DRAG;
    velocity = velocity.clamp_length(physics::MAX_VELOCITY);
    let position = state.position + velocity * physics::DT;

    PredictedKinematics { position, velocity, rotation }
}

/// Local prediction of the controlled player's kinematics, replayed
/// forward from the last server-acknowledged input after each reconcile.
pub struct Predictor {
    state: PredictedKinematics,
    pending_inputs: VecDeque<PlayerInput>,
}

impl Predictor {
    pub fn new(initial: PredictedKinematics) -> Self {
        Self {
            state: initial,
            pending_inputs: VecDeque::new(),
        }
    }

    pub fn predicted(&self) -> PredictedKinematics {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        self.pending_inputs.len()
    }

    /// Apply `input` to the predicted state immediately and remember it
    /// until the server acknowledges it. Oldest unacked inputs are dropped
    /// once the buffer exceeds capacity — a sustained connection stall
    /// degrades prediction fidelity rather than growing unbounded.
    pub fn record_input(&mut self, input: PlayerInput, mass: f32) {
        self.state = simulate_input(self.state, mass, &input);
        self.pending_inputs.push_back(input);
        while self.pending_inputs.len() > INPUT_BUFFER_SIZE {
            self.pending_inputs.pop_front();
        }
    }

    /// Reconcile against an authoritative server state as of `server_tick`:
    /// snap to the server's kinematics, drop every input at or before that
    /// tick, then replay whatever's left so the predicted state reflects
    /// inputs the server hasn't simulated yet.
    pub fn reconcile(&mut self, server_state: PredictedKinematics, mass: f32, server_tick: Tick) {
        self.pending_inputs.retain(|input| input.tick > server_tick);

        let mut state = server_state;
        for input in &self.pending_inputs {
            state = simulate_input(state, mass, input);
        }
        self.state = state;
    }
}
