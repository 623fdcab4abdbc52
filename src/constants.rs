//! Core tuning constants.
//!
//! The `physics` and `boost` values MUST byte-for-byte match the server's
//! constants of the same name or client-side prediction drifts from the
//! authoritative simulation (spec §4.5, "Determinism requirement").

/// Mini-simulation constants shared with the server's mover.
pub mod physics {
    /// Drag coefficient (exponential decay per tick), applied as
    /// `velocity *= (1.0 - DRAG)`. Deliberately small, NOT 0.98.
    pub const DRAG: f32 = 0.002;
    /// Maximum velocity magnitude.
    pub const MAX_VELOCITY: f32 = 500.0;
    /// Server tick rate in Hz.
    pub const TICK_RATE: u32 = 30;
    /// Delta time per tick in seconds.
    pub const DT: f32 = 1.0 / 30.0;
    /// Minimum squared input magnitude before thrust/aim is applied (deadzone).
    pub const INPUT_DEADZONE_SQ: f32 = 0.01;
}

/// Boost/thrust constants.
pub mod boost {
    /// Base thrust force.
    pub const BASE_THRUST: f32 = 200.0;
    /// Reference mass for speed scaling (at this mass, thrust multiplier = 1.0).
    pub const SPEED_REFERENCE_MASS: f32 = 100.0;
    /// Minimum thrust multiplier (prevents huge players from being immobile).
    pub const SPEED_MIN_MULTIPLIER: f32 = 0.25;
    /// Maximum thrust multiplier (prevents tiny players from being too fast).
    pub const SPEED_MAX_MULTIPLIER: f32 = 3.5;
}

/// Floor under `mass_to_thrust_multiplier`'s denominator, shared with the
/// server's minimum-mass constant so the curve matches exactly at the edge.
pub const MINIMUM_MASS: f32 = 10.0;

/// Mass -> thrust multiplier curve. 1.0 at `boost::SPEED_REFERENCE_MASS`,
/// higher for smaller mass (faster), lower for larger mass (slower).
/// `multiplier = sqrt(reference_mass / mass)`, clamped to the server's range.
#[inline]
pub fn mass_to_thrust_multiplier(mass: f32) -> f32 {
    let ratio = boost::SPEED_REFERENCE_MASS / mass.max(MINIMUM_MASS);
    ratio.sqrt().clamp(boost::SPEED_MIN_MULTIPLIER, boost::SPEED_MAX_MULTIPLIER)
}

/// Buffer and timing defaults (spec §3 invariants, §4.4).
pub mod buffers {
    /// Maximum retained snapshots in the `SnapshotStore` ring.
    pub const SNAPSHOT_BUFFER_SIZE: usize = 32;
    /// Maximum retained unacknowledged inputs in the `Predictor`.
    pub const INPUT_BUFFER_SIZE: usize = 256;
    /// Fixed lag at which the client renders the past.
    pub const INTERPOLATION_DELAY_MS: f64 = 100.0;
}

/// Minable threshold for the codec-error burst escalation of spec §7.
pub mod error_budget {
    /// Number of decode failures tolerated...
    pub const MAX_DECODE_ERRORS: u32 = 5;
    /// ...within this rolling window before escalating to `ProtocolMismatch`.
    pub const DECODE_ERROR_WINDOW_MS: f64 = 1000.0;
}

/// Wire-level limits shared with the server's framing layer.
pub mod net {
    /// Largest single framed message accepted on the reliable stream.
    pub const MAX_MESSAGE_SIZE: usize = 65536;
    /// Largest single unreliable datagram accepted.
    pub const MAX_DATAGRAM_SIZE: usize = 1200;
    /// Rate at which the server pushes authoritative snapshots, in Hz.
    pub const SNAPSHOT_RATE: u32 = 20;
}

/// Transient world-effect bookkeeping (spec §4.6).
pub mod effects {
    /// Hard cap on concurrently tracked transient effects; oldest is
    /// evicted on overflow regardless of remaining TTL.
    pub const MAX_CONCURRENT: usize = 16;

    pub const PLAYER_KILLED_TTL_MS: f64 = 3000.0;
    pub const PLAYER_DEFLECTION_TTL_MS: f64 = 1500.0;
    pub const GRAVITY_WELL_CHARGING_TTL_MS: f64 = 2000.0;
    pub const GRAVITY_WAVE_EXPLOSION_TTL_MS: f64 = 2000.0;
    pub const GRAVITY_WELL_DESTROYED_TTL_MS: f64 = 1500.0;
    pub const ZONE_COLLAPSE_TTL_MS: f64 = 4000.0;
}
