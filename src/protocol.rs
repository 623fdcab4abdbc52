//! Wire data model: client/server message variants, snapshots and deltas,
//! and the game events broadcast between them. Field names, order, and
//! types mirror the wire layout normatively defined by the codec (spec §4.2)
//! — this module only describes *what* is on the wire, `codec` describes
//! *how* it is packed into bytes.

use uuid::Uuid;

use crate::util::vec2::Vec2;

pub type PlayerId = Uuid;
pub type ProjectileId = u64;
pub type DebrisId = u64;
pub type WellId = u32;
pub type Tick = u64;

/// Match lifecycle phase. Unknown wire values decode to `Waiting` rather
/// than failing, so a server that adds a phase later doesn't break old
/// clients (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    #[default]
    Waiting,
    Countdown,
    Playing,
    Ended,
}

impl MatchPhase {
    pub fn to_wire(self) -> u32 {
        match self {
            MatchPhase::Waiting => 0,
            MatchPhase::Countdown => 1,
            MatchPhase::Playing => 2,
            MatchPhase::Ended => 3,
        }
    }

    pub fn from_wire(value: u32) -> Self {
        match value {
            1 => MatchPhase::Countdown,
            2 => MatchPhase::Playing,
            3 => MatchPhase::Ended,
            _ => MatchPhase::Waiting,
        }
    }
}

/// Bitflags packed into one byte on the wire: bit0=alive, bit1=spawnProtection, bit2=isBot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerFlags {
    pub alive: bool,
    pub spawn_protection: bool,
    pub is_bot: bool,
}

impl PlayerFlags {
    pub fn to_byte(self) -> u8 {
        (self.alive as u8) | ((self.spawn_protection as u8) << 1) | ((self.is_bot as u8) << 2)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            alive: byte & 0b001 != 0,
            spawn_protection: byte & 0b010 != 0,
            is_bot: byte & 0b100 != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub mass: f32,
    pub flags: PlayerFlags,
    pub kills: u32,
    pub deaths: u32,
    pub color_index: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
}

/// Debris size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebrisSize {
    Small,
    Medium,
    Large,
}

impl DebrisSize {
    pub fn to_byte(self) -> u8 {
        match self {
            DebrisSize::Small => 0,
            DebrisSize::Medium => 1,
            DebrisSize::Large => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => DebrisSize::Medium,
            2 => DebrisSize::Large,
            _ => DebrisSize::Small,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebrisSnapshot {
    pub id: DebrisId,
    pub position: Vec2,
    pub size: DebrisSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GravityWellSnapshot {
    pub id: WellId,
    pub position: Vec2,
    pub mass: f32,
    pub core_radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotablePlayer {
    pub id: PlayerId,
    pub position: Vec2,
    pub mass: f32,
    pub color_index: u8,
}

pub const DENSITY_GRID_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub tick: Tick,
    pub match_phase: MatchPhase,
    pub match_time: f32,
    pub countdown: f32,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub debris: Vec<DebrisSnapshot>,
    pub arena_collapse_phase: u8,
    pub arena_safe_radius: f32,
    pub arena_scale: f32,
    pub gravity_wells: Vec<GravityWellSnapshot>,
    pub total_players: u32,
    pub total_alive: u32,
    /// Row-major 16x16 density grid, each cell a saturating player count.
    pub density_grid: Vec<u8>,
    pub notable_players: Vec<NotablePlayer>,
    pub echo_client_time: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerDelta {
    pub id: PlayerId,
    pub position: Option<Vec2>,
    pub velocity: Option<Vec2>,
    pub rotation: Option<f32>,
    pub mass: Option<f32>,
    pub alive: Option<bool>,
    pub kills: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileDelta {
    pub id: ProjectileId,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaUpdate {
    pub tick: Tick,
    pub base_tick: Tick,
    pub player_updates: Vec<PlayerDelta>,
    pub projectile_updates: Vec<ProjectileDelta>,
    pub removed_projectiles: Vec<ProjectileId>,
    pub debris: Vec<DebrisSnapshot>,
}

/// Input state for one tick, issued by the input collector, recorded by
/// `Predictor`, and encoded on the unreliable channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    pub sequence: u64,
    pub tick: Tick,
    pub client_time: u64,
    pub thrust: Vec2,
    pub aim: Vec2,
    pub boost: bool,
    pub fire: bool,
    pub fire_released: bool,
}

/// Client -> server message variants (tag, then body; spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    JoinRequest {
        name: String,
        color_index: u8,
        is_spectator: bool,
    },
    Input(PlayerInput),
    Leave,
    Ping { timestamp: u64 },
    SnapshotAck { tick: Tick },
    SpectateTarget(Option<PlayerId>),
    SwitchToPlayer { color_index: u8 },
    ViewportInfo { zoom: f32 },
}

/// Game events that clients should be notified about (spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerKilled {
        killer_id: PlayerId,
        victim_id: PlayerId,
        killer_name: String,
        victim_name: String,
    },
    PlayerJoined {
        player_id: PlayerId,
        name: String,
    },
    PlayerLeft {
        player_id: PlayerId,
        name: String,
    },
    MatchStarted,
    MatchEnded {
        winner: Option<(PlayerId, String)>,
    },
    ZoneCollapse {
        phase: u8,
        new_safe_radius: f32,
    },
    PlayerDeflection {
        player_a: PlayerId,
        player_b: PlayerId,
        position: Vec2,
        intensity: f32,
    },
    GravityWellCharging {
        well_id: WellId,
        position: Vec2,
    },
    GravityWaveExplosion {
        well_id: WellId,
        position: Vec2,
        strength: f32,
    },
    GravityWellDestroyed {
        well_id: WellId,
        position: Vec2,
    },
}

/// Server -> client message variants (tag, then body; spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    JoinAccepted {
        player_id: PlayerId,
        session_token: Vec<u8>,
        is_spectator: bool,
    },
    JoinRejected {
        reason: String,
    },
    Snapshot(GameSnapshot),
    Delta(DeltaUpdate),
    Event(GameEvent),
    Pong {
        client_timestamp: u64,
        server_timestamp: u64,
    },
    Kicked {
        reason: String,
    },
    PhaseChange {
        phase: MatchPhase,
        countdown: f32,
    },
    SpectatorModeChanged(bool),
}
