//! Encodes outgoing client messages and decodes incoming server frames.
//!
//! Stateless and reentrant: every function takes a message and returns
//! bytes, or takes bytes and returns a message. A partial or invalid frame
//! always raises a single [`CodecError`] — bytes are never silently
//! swallowed (spec §4.2).

pub mod cursor;

use crate::protocol::*;
use cursor::{BinaryReader, BinaryWriter, CursorError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("truncated frame: needed {needed} more byte(s) at offset {offset}, had {available}")]
    TruncatedFrame {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("invalid UUID length {length} at offset {offset}: expected 16")]
    InvalidUuidLength { offset: usize, length: u64 },
    #[error("unknown {kind} variant tag {tag}")]
    UnknownVariant { kind: &'static str, tag: u32 },
}

impl From<CursorError> for CodecError {
    fn from(e: CursorError) -> Self {
        match e {
            CursorError::TruncatedFrame { offset, needed, available } => {
                CodecError::TruncatedFrame { offset, needed, available }
            }
            CursorError::InvalidUtf8 { offset } => CodecError::InvalidUtf8 { offset },
            CursorError::InvalidUuidLength { offset, length } => {
                CodecError::InvalidUuidLength { offset, length }
            }
        }
    }
}

// ---------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------

const TAG_JOIN_REQUEST: u32 = 0;
const TAG_INPUT: u32 = 1;
const TAG_LEAVE: u32 = 2;
const TAG_PING: u32 = 3;
const TAG_SNAPSHOT_ACK: u32 = 4;
const TAG_SPECTATE_TARGET: u32 = 5;
const TAG_SWITCH_TO_PLAYER: u32 = 6;
const TAG_VIEWPORT_INFO: u32 = 7;

pub fn encode_client_message(msg: &ClientMessage) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    match msg {
        ClientMessage::JoinRequest { name, color_index, is_spectator } => {
            w.write_u32(TAG_JOIN_REQUEST);
            w.write_string(name);
            w.write_u8(*color_index);
            w.write_bool(*is_spectator);
        }
        ClientMessage::Input(input) => {
            w.write_u32(TAG_INPUT);
            write_player_input(&mut w, input);
        }
        ClientMessage::Leave => {
            w.write_u32(TAG_LEAVE);
        }
        ClientMessage::Ping { timestamp } => {
            w.write_u32(TAG_PING);
            w.write_u64(*timestamp);
        }
        ClientMessage::SnapshotAck { tick } => {
            w.write_u32(TAG_SNAPSHOT_ACK);
            w.write_u64(*tick);
        }
        ClientMessage::SpectateTarget(target) => {
            w.write_u32(TAG_SPECTATE_TARGET);
            w.write_option(*target, |w, id| w.write_uuid(id));
        }
        ClientMessage::SwitchToPlayer { color_index } => {
            w.write_u32(TAG_SWITCH_TO_PLAYER);
            w.write_u8(*color_index);
        }
        ClientMessage::ViewportInfo { zoom } => {
            w.write_u32(TAG_VIEWPORT_INFO);
            w.write_f32(*zoom);
        }
    }
    w.into_bytes()
}

pub fn decode_client_message(bytes: &[u8]) -> Result<ClientMessage, CodecError> {
    let mut r = BinaryReader::new(bytes);
    let tag = r.read_u32()?;
    Ok(match tag {
        TAG_JOIN_REQUEST => ClientMessage::JoinRequest {
            name: r.read_string()?,
            color_index: r.read_u8()?,
            is_spectator: r.read_bool()?,
        },
        TAG_INPUT => ClientMessage::Input(read_player_input(&mut r)?),
        TAG_LEAVE => ClientMessage::Leave,
        TAG_PING => ClientMessage::Ping { timestamp: r.read_u64()? },
        TAG_SNAPSHOT_ACK => ClientMessage::SnapshotAck { tick: r.read_u64()? },
        TAG_SPECTATE_TARGET => {
            ClientMessage::SpectateTarget(r.read_option(|r| r.read_uuid())?)
        }
        TAG_SWITCH_TO_PLAYER => ClientMessage::SwitchToPlayer { color_index: r.read_u8()? },
        TAG_VIEWPORT_INFO => ClientMessage::ViewportInfo { zoom: r.read_f32()? },
        other => return Err(CodecError::UnknownVariant { kind: "ClientMessage", tag: other }),
    })
}

fn write_player_input(w: &mut BinaryWriter, input: &PlayerInput) {
    w.write_u64(input.sequence);
    w.write_u64(input.tick);
    w.write_u64(input.client_time);
    w.write_vec2(input.thrust);
    w.write_vec2(input.aim);
    w.write_bool(input.boost);
    w.write_bool(input.fire);
    w.write_bool(input.fire_released);
}

fn read_player_input(r: &mut BinaryReader) -> Result<PlayerInput, CodecError> {
    Ok(PlayerInput {
        sequence: r.read_u64()?,
        tick: r.read_u64()?,
        client_time: r.read_u64()?,
        thrust: r.read_vec2()?,
        aim: r.read_vec2()?,
        boost: r.read_bool()?,
        fire: r.read_bool()?,
        fire_released: r.read_bool()?,
    })
}

// ---------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------

const TAG_JOIN_ACCEPTED: u32 = 0;
const TAG_JOIN_REJECTED: u32 = 1;
const TAG_SNAPSHOT: u32 = 2;
const TAG_DELTA: u32 = 3;
const TAG_EVENT: u32 = 4;
const TAG_PONG: u32 = 5;
const TAG_KICKED: u32 = 6;
const TAG_PHASE_CHANGE: u32 = 7;
const TAG_SPECTATOR_MODE_CHANGED: u32 = 8;

pub fn encode_server_message(msg: &ServerMessage) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    match msg {
        ServerMessage::JoinAccepted { player_id, session_token, is_spectator } => {
            w.write_u32(TAG_JOIN_ACCEPTED);
            w.write_uuid(*player_id);
            w.write_byte_array(session_token);
            w.write_bool(*is_spectator);
        }
        ServerMessage::JoinRejected { reason } => {
            w.write_u32(TAG_JOIN_REJECTED);
            w.write_string(reason);
        }
        ServerMessage::Snapshot(snapshot) => {
            w.write_u32(TAG_SNAPSHOT);
            write_game_snapshot(&mut w, snapshot);
        }
        ServerMessage::Delta(delta) => {
            w.write_u32(TAG_DELTA);
            write_delta_update(&mut w, delta);
        }
        ServerMessage::Event(event) => {
            w.write_u32(TAG_EVENT);
            write_game_event(&mut w, event);
        }
        ServerMessage::Pong { client_timestamp, server_timestamp } => {
            w.write_u32(TAG_PONG);
            w.write_u64(*client_timestamp);
            w.write_u64(*server_timestamp);
        }
        ServerMessage::Kicked { reason } => {
            w.write_u32(TAG_KICKED);
            w.write_string(reason);
        }
        ServerMessage::PhaseChange { phase, countdown } => {
            w.write_u32(TAG_PHASE_CHANGE);
            w.write_u32(phase.to_wire());
            w.write_f32(*countdown);
        }
        ServerMessage::SpectatorModeChanged(active) => {
            w.write_u32(TAG_SPECTATOR_MODE_CHANGED);
            w.write_bool(*active);
        }
    }
    w.into_bytes()
}

pub fn decode_server_message(bytes: &[u8]) -> Result<ServerMessage, CodecError> {
    let mut r = BinaryReader::new(bytes);
    let tag = r.read_u32()?;
    Ok(match tag {
        TAG_JOIN_ACCEPTED => ServerMessage::JoinAccepted {
            player_id: r.read_uuid()?,
            session_token: r.read_byte_array()?,
            is_spectator: r.read_bool()?,
        },
        TAG_JOIN_REJECTED => ServerMessage::JoinRejected { reason: r.read_string()? },
        TAG_SNAPSHOT => ServerMessage::Snapshot(read_game_snapshot(&mut r)?),
        TAG_DELTA => ServerMessage::Delta(read_delta_update(&mut r)?),
        TAG_EVENT => ServerMessage::Event(read_game_event(&mut r)?),
        TAG_PONG => ServerMessage::Pong {
            client_timestamp: r.read_u64()?,
            server_timestamp: r.read_u64()?,
        },
        TAG_KICKED => ServerMessage::Kicked { reason: r.read_string()? },
        TAG_PHASE_CHANGE => ServerMessage::PhaseChange {
            phase: MatchPhase::from_wire(r.read_u32()?),
            countdown: r.read_f32()?,
        },
        TAG_SPECTATOR_MODE_CHANGED => ServerMessage::SpectatorModeChanged(r.read_bool()?),
        other => return Err(CodecError::UnknownVariant { kind: "ServerMessage", tag: other }),
    })
}

// ---------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------

const EVT_PLAYER_KILLED: u32 = 0;
const EVT_PLAYER_JOINED: u32 = 1;
const EVT_PLAYER_LEFT: u32 = 2;
const EVT_MATCH_STARTED: u32 = 3;
const EVT_MATCH_ENDED: u32 = 4;
const EVT_ZONE_COLLAPSE: u32 = 5;
const EVT_PLAYER_DEFLECTION: u32 = 6;
const EVT_GRAVITY_WELL_CHARGING: u32 = 7;
const EVT_GRAVITY_WAVE_EXPLOSION: u32 = 8;
const EVT_GRAVITY_WELL_DESTROYED: u32 = 9;

fn write_game_event(w: &mut BinaryWriter, event: &GameEvent) {
    match event {
        GameEvent::PlayerKilled { killer_id, victim_id, killer_name, victim_name } => {
            w.write_u32(EVT_PLAYER_KILLED);
            w.write_uuid(*killer_id);
            w.write_uuid(*victim_id);
            w.write_string(killer_name);
            w.write_string(victim_name);
        }
        GameEvent::PlayerJoined { player_id, name } => {
            w.write_u32(EVT_PLAYER_JOINED);
            w.write_uuid(*player_id);
            w.write_string(name);
        }
        GameEvent::PlayerLeft { player_id, name } => {
            w.write_u32(EVT_PLAYER_LEFT);
            w.write_uuid(*player_id);
            w.write_string(name);
        }
        GameEvent::MatchStarted => {
            w.write_u32(EVT_MATCH_STARTED);
        }
        GameEvent::MatchEnded { winner } => {
            w.write_u32(EVT_MATCH_ENDED);
            w.write_bool(winner.is_some());
            w.write_option(winner.clone(), |w, (id, name)| {
                w.write_uuid(id);
                w.write_string(&name);
            });
        }
        GameEvent::ZoneCollapse { phase, new_safe_radius } => {
            w.write_u32(EVT_ZONE_COLLAPSE);
            w.write_u8(*phase);
            w.write_f32(*new_safe_radius);
        }
        GameEvent::PlayerDeflection { player_a, player_b, position, intensity } => {
            w.write_u32(EVT_PLAYER_DEFLECTION);
            w.write_uuid(*player_a);
            w.write_uuid(*player_b);
            w.write_f32(position.x);
            w.write_f32(position.y);
            w.write_f32(*intensity);
        }
        GameEvent::GravityWellCharging { well_id, position } => {
            w.write_u32(EVT_GRAVITY_WELL_CHARGING);
            w.write_u32(*well_id);
            w.write_f32(position.x);
            w.write_f32(position.y);
        }
        GameEvent::GravityWaveExplosion { well_id, position, strength } => {
            w.write_u32(EVT_GRAVITY_WAVE_EXPLOSION);
            w.write_u32(*well_id);
            w.write_f32(position.x);
            w.write_f32(position.y);
            w.write_f32(*strength);
        }
        GameEvent::GravityWellDestroyed { well_id, position } => {
            w.write_u32(EVT_GRAVITY_WELL_DESTROYED);
            w.write_u32(*well_id);
            w.write_f32(position.x);
            w.write_f32(position.y);
        }
    }
}

fn read_game_event(r: &mut BinaryReader) -> Result<GameEvent, CodecError> {
    let tag = r.read_u32()?;
    Ok(match tag {
        EVT_PLAYER_KILLED => GameEvent::PlayerKilled {
            killer_id: r.read_uuid()?,
            victim_id: r.read_uuid()?,
            killer_name: r.read_string()?,
            victim_name: r.read_string()?,
        },
        EVT_PLAYER_JOINED => GameEvent::PlayerJoined {
            player_id: r.read_uuid()?,
            name: r.read_string()?,
        },
        EVT_PLAYER_LEFT => GameEvent::PlayerLeft {
            player_id: r.read_uuid()?,
            name: r.read_string()?,
        },
        EVT_MATCH_STARTED => GameEvent::MatchStarted,
        EVT_MATCH_ENDED => {
            let _has_winner = r.read_bool()?;
            let winner = r.read_option(|r| Ok((r.read_uuid()?, r.read_string()?)))?;
            GameEvent::MatchEnded { winner }
        }
        EVT_ZONE_COLLAPSE => GameEvent::ZoneCollapse {
            phase: r.read_u8()?,
            new_safe_radius: r.read_f32()?,
        },
        EVT_PLAYER_DEFLECTION => GameEvent::PlayerDeflection {
            player_a: r.read_uuid()?,
            player_b: r.read_uuid()?,
            position: r.read_vec2()?,
            intensity: r.read_f32()?,
        },
        EVT_GRAVITY_WELL_CHARGING => GameEvent::GravityWellCharging {
            well_id: r.read_u32()?,
            position: r.read_vec2()?,
        },
        EVT_GRAVITY_WAVE_EXPLOSION => GameEvent::GravityWaveExplosion {
            well_id: r.read_u32()?,
            position: r.read_vec2()?,
            strength: r.read_f32()?,
        },
        EVT_GRAVITY_WELL_DESTROYED => GameEvent::GravityWellDestroyed {
            well_id: r.read_u32()?,
            position: r.read_vec2()?,
        },
        other => return Err(CodecError::UnknownVariant { kind: "GameEvent", tag: other }),
    })
}

// ---------------------------------------------------------------------
// GameSnapshot / entities
// ---------------------------------------------------------------------

fn write_player_snapshot(w: &mut BinaryWriter, p: &PlayerSnapshot) {
    w.write_uuid(p.id);
    w.write_string(&p.name);
    w.write_vec2(p.position);
    w.write_vec2(p.velocity);
    w.write_f32(p.rotation);
    w.write_f32(p.mass);
    w.write_u8(p.flags.to_byte());
    w.write_u32(p.kills);
    w.write_u32(p.deaths);
    w.write_u8(p.color_index);
}

fn read_player_snapshot(r: &mut BinaryReader) -> Result<PlayerSnapshot, CodecError> {
    Ok(PlayerSnapshot {
        id: r.read_uuid()?,
        name: r.read_string()?,
        position: r.read_vec2()?,
        velocity: r.read_vec2()?,
        rotation: r.read_f32()?,
        mass: r.read_f32()?,
        flags: PlayerFlags::from_byte(r.read_u8()?),
        kills: r.read_u32()?,
        deaths: r.read_u32()?,
        color_index: r.read_u8()?,
    })
}

fn write_projectile_snapshot(w: &mut BinaryWriter, p: &ProjectileSnapshot) {
    w.write_u64(p.id);
    w.write_uuid(p.owner_id);
    w.write_vec2(p.position);
    w.write_vec2(p.velocity);
    w.write_f32(p.mass);
}

fn read_projectile_snapshot(r: &mut BinaryReader) -> Result<ProjectileSnapshot, CodecError> {
    Ok(ProjectileSnapshot {
        id: r.read_u64()?,
        owner_id: r.read_uuid()?,
        position: r.read_vec2()?,
        velocity: r.read_vec2()?,
        mass: r.read_f32()?,
    })
}

fn write_debris_snapshot(w: &mut BinaryWriter, d: &DebrisSnapshot) {
    w.write_u64(d.id);
    w.write_vec2(d.position);
    w.write_u8(d.size.to_byte());
}

fn read_debris_snapshot(r: &mut BinaryReader) -> Result<DebrisSnapshot, CodecError> {
    Ok(DebrisSnapshot {
        id: r.read_u64()?,
        position: r.read_vec2()?,
        size: DebrisSize::from_byte(r.read_u8()?),
    })
}

fn write_gravity_well_snapshot(w: &mut BinaryWriter, g: &GravityWellSnapshot) {
    w.write_u32(g.id);
    w.write_vec2(g.position);
    w.write_f32(g.mass);
    w.write_f32(g.core_radius);
}

fn read_gravity_well_snapshot(r: &mut BinaryReader) -> Result<GravityWellSnapshot, CodecError> {
    Ok(GravityWellSnapshot {
        id: r.read_u32()?,
        position: r.read_vec2()?,
        mass: r.read_f32()?,
        core_radius: r.read_f32()?,
    })
}

fn write_notable_player(w: &mut BinaryWriter, n: &NotablePlayer) {
    w.write_uuid(n.id);
    w.write_vec2(n.position);
    w.write_f32(n.mass);
    w.write_u8(n.color_index);
}

fn read_notable_player(r: &mut BinaryReader) -> Result<NotablePlayer, CodecError> {
    Ok(NotablePlayer {
        id: r.read_uuid()?,
        position: r.read_vec2()?,
        mass: r.read_f32()?,
        color_index: r.read_u8()?,
    })
}

fn write_vec<T>(w: &mut BinaryWriter, items: &[T], write_item: impl Fn(&mut BinaryWriter, &T)) {
    w.write_u64(items.len() as u64);
    for item in items {
        write_item(w, item);
    }
}

fn read_vec<T>(
    r: &mut BinaryReader,
    read_item: impl Fn(&mut BinaryReader) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    let count = r.read_u64()? as usize;
    let mut out = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        out.push(read_item(r)?);
    }
    Ok(out)
}

fn write_game_snapshot(w: &mut BinaryWriter, s: &GameSnapshot) {
    w.write_u64(s.tick);
    w.write_u32(s.match_phase.to_wire());
    w.write_f32(s.match_time);
    w.write_f32(s.countdown);
    write_vec(w, &s.players, write_player_snapshot);
    write_vec(w, &s.projectiles, write_projectile_snapshot);
    write_vec(w, &s.debris, write_debris_snapshot);
    w.write_u8(s.arena_collapse_phase);
    w.write_f32(s.arena_safe_radius);
    w.write_f32(s.arena_scale);
    write_vec(w, &s.gravity_wells, write_gravity_well_snapshot);
    w.write_u32(s.total_players);
    w.write_u32(s.total_alive);
    write_vec(w, &s.density_grid, |w, b| w.write_u8(*b));
    write_vec(w, &s.notable_players, write_notable_player);
    w.write_u64(s.echo_client_time);
}

fn read_game_snapshot(r: &mut BinaryReader) -> Result<GameSnapshot, CodecError> {
    Ok(GameSnapshot {
        tick: r.read_u64()?,
        match_phase: MatchPhase::from_wire(r.read_u32()?),
        match_time: r.read_f32()?,
        countdown: r.read_f32()?,
        players: read_vec(r, read_player_snapshot)?,
        projectiles: read_vec(r, read_projectile_snapshot)?,
        debris: read_vec(r, read_debris_snapshot)?,
        arena_collapse_phase: r.read_u8()?,
        arena_safe_radius: r.read_f32()?,
        arena_scale: r.read_f32()?,
        gravity_wells: read_vec(r, read_gravity_well_snapshot)?,
        total_players: r.read_u32()?,
        total_alive: r.read_u32()?,
        density_grid: read_vec(r, |r| r.read_u8().map_err(CodecError::from))?,
        notable_players: read_vec(r, read_notable_player)?,
        echo_client_time: r.read_u64()?,
    })
}

fn write_player_delta(w: &mut BinaryWriter, d: &PlayerDelta) {
    w.write_uuid(d.id);
    // Every presence byte is written, even when an earlier field was
    // absent (spec §9, "Open question" — the order is normative).
    w.write_option(d.position, |w, v| w.write_vec2(v));
    w.write_option(d.velocity, |w, v| w.write_vec2(v));
    w.write_option(d.rotation, |w, v| w.write_f32(v));
    w.write_option(d.mass, |w, v| w.write_f32(v));
    w.write_option(d.alive, |w, v| w.write_bool(v));
    w.write_option(d.kills, |w, v| w.write_u32(v));
}

fn read_player_delta(r: &mut BinaryReader) -> Result<PlayerDelta, CodecError> {
    Ok(PlayerDelta {
        id: r.read_uuid()?,
        position: r.read_option(|r| r.read_vec2())?,
        velocity: r.read_option(|r| r.read_vec2())?,
        rotation: r.read_option(|r| r.read_f32())?,
        mass: r.read_option(|r| r.read_f32())?,
        alive: r.read_option(|r| r.read_bool())?,
        kills: r.read_option(|r| r.read_u32())?,
    })
}

fn write_projectile_delta(w: &mut BinaryWriter, d: &ProjectileDelta) {
    w.write_u64(d.id);
    w.write_vec2(d.position);
    w.write_vec2(d.velocity);
}

fn read_projectile_delta(r: &mut BinaryReader) -> Result<ProjectileDelta, CodecError> {
    Ok(ProjectileDelta {
        id: r.read_u64()?,
        position: r.read_vec2()?,
        velocity: r.read_vec2()?,
    })
}

fn write_delta_update(w: &mut BinaryWriter, d: &DeltaUpdate) {
    w.write_u64(d.tick);
    w.write_u64(d.base_tick);
    write_vec(w, &d.player_updates, write_player_delta);
    write_vec(w, &d.projectile_updates, write_projectile_delta);
    write_vec(w, &d.removed_projectiles, |w, id| w.write_u64(*id));
    write_vec(w, &d.debris, write_debris_snapshot);
}

fn read_delta_update(r: &mut BinaryReader) -> Result<DeltaUpdate, CodecError> {
    Ok(DeltaUpdate {
        tick: r.read_u64()?,
        base_tick: r.read_u64()?,
        player_updates: read_vec(r, read_player_delta)?,
        projectile_updates: read_vec(r, read_projectile_delta)?,
        removed_projectiles: read_vec(r, |r| r.read_u64().map_err(CodecError::from))?,
        debris: read_vec(r, read_debris_snapshot)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec2::Vec2;
    use uuid::Uuid;

    fn sample_input() -> PlayerInput {
        PlayerInput {
            sequence: 42,
            tick: 100,
            client_time: 12345,
            thrust: Vec2::new(0.5, -0.3),
            aim: Vec2::new(1.0, 0.0),
            boost: true,
            fire: false,
            fire_released: true,
        }
    }

    #[test]
    fn client_messages_round_trip() {
        let messages = vec![
            ClientMessage::JoinRequest { name: "Alice".into(), color_index: 3, is_spectator: false },
            ClientMessage::Input(sample_input()),
            ClientMessage::Leave,
            ClientMessage::Ping { timestamp: 999 },
            ClientMessage::SnapshotAck { tick: 55 },
            ClientMessage::SpectateTarget(None),
            ClientMessage::SpectateTarget(Some(Uuid::new_v4())),
            ClientMessage::SwitchToPlayer { color_index: 1 },
            ClientMessage::ViewportInfo { zoom: 1.25 },
        ];
        for msg in messages {
            let encoded = encode_client_message(&msg);
            let decoded = decode_client_message(&encoded).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn framing_lengths_match_spec() {
        assert_eq!(encode_client_message(&ClientMessage::Leave).len(), 4);
        assert_eq!(encode_client_message(&ClientMessage::Ping { timestamp: 1 }).len(), 12);
        assert_eq!(encode_client_message(&ClientMessage::SnapshotAck { tick: 1 }).len(), 12);
        assert_eq!(encode_client_message(&ClientMessage::SpectateTarget(None)).len(), 5);
        assert_eq!(
            encode_client_message(&ClientMessage::SpectateTarget(Some(Uuid::nil()))).len(),
            29
        );
        assert_eq!(
            encode_client_message(&ClientMessage::SwitchToPlayer { color_index: 0 }).len(),
            5
        );
    }

    #[test]
    fn server_messages_round_trip() {
        let snapshot = sample_snapshot();
        let messages = vec![
            ServerMessage::JoinAccepted {
                player_id: Uuid::new_v4(),
                session_token: vec![1, 2, 3, 4],
                is_spectator: false,
            },
            ServerMessage::JoinRejected { reason: "full".into() },
            ServerMessage::Snapshot(snapshot.clone()),
            ServerMessage::Pong { client_timestamp: 1, server_timestamp: 2 },
            ServerMessage::Kicked { reason: "afk".into() },
            ServerMessage::PhaseChange { phase: MatchPhase::Countdown, countdown: 2.5 },
            ServerMessage::SpectatorModeChanged(true),
        ];
        for msg in messages {
            let encoded = encode_server_message(&msg);
            let decoded = decode_server_message(&encoded).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    fn sample_snapshot() -> GameSnapshot {
        GameSnapshot {
            tick: 1000,
            match_phase: MatchPhase::Playing,
            match_time: 45.5,
            countdown: 0.0,
            players: vec![PlayerSnapshot {
                id: Uuid::new_v4(),
                name: "TestPlayer".into(),
                position: Vec2::new(100.0, 200.0),
                velocity: Vec2::new(10.0, -5.0),
                rotation: 1.5,
                mass: 150.0,
                flags: PlayerFlags { alive: true, spawn_protection: false, is_bot: false },
                kills: 3,
                deaths: 1,
                color_index: 2,
            }],
            projectiles: vec![],
            debris: vec![DebrisSnapshot { id: 1, position: Vec2::new(50.0, 50.0), size: DebrisSize::Small }],
            arena_collapse_phase: 2,
            arena_safe_radius: 600.0,
            arena_scale: 1.0,
            gravity_wells: vec![GravityWellSnapshot {
                id: 0,
                position: Vec2::ZERO,
                mass: 10000.0,
                core_radius: 50.0,
            }],
            total_players: 1,
            total_alive: 1,
            density_grid: vec![0; 64],
            notable_players: vec![],
            echo_client_time: 7,
        }
    }

    #[test]
    fn delta_update_round_trips() {
        let delta = DeltaUpdate {
            tick: 500,
            base_tick: 490,
            player_updates: vec![PlayerDelta {
                id: Uuid::new_v4(),
                position: Some(Vec2::new(50.0, 60.0)),
                velocity: None,
                rotation: Some(2.0),
                mass: None,
                alive: None,
                kills: Some(1),
            }],
            projectile_updates: vec![ProjectileDelta {
                id: 9,
                position: Vec2::new(1.0, 2.0),
                velocity: Vec2::new(3.0, 4.0),
            }],
            removed_projectiles: vec![1, 2, 3],
            debris: vec![],
        };
        let encoded = encode_server_message(&ServerMessage::Delta(delta.clone()));
        let decoded = decode_server_message(&encoded).unwrap();
        assert_eq!(decoded, ServerMessage::Delta(delta));
    }

    #[test]
    fn game_events_round_trip() {
        let events = vec![
            GameEvent::PlayerKilled {
                killer_id: Uuid::new_v4(),
                victim_id: Uuid::new_v4(),
                killer_name: "Alice".into(),
                victim_name: "Bob".into(),
            },
            GameEvent::PlayerJoined { player_id: Uuid::new_v4(), name: "Carl".into() },
            GameEvent::PlayerLeft { player_id: Uuid::new_v4(), name: "Dana".into() },
            GameEvent::MatchStarted,
            GameEvent::MatchEnded { winner: None },
            GameEvent::MatchEnded { winner: Some((Uuid::new_v4(), "Eve".into())) },
            GameEvent::ZoneCollapse { phase: 3, new_safe_radius: 400.0 },
            GameEvent::PlayerDeflection {
                player_a: Uuid::new_v4(),
                player_b: Uuid::new_v4(),
                position: Vec2::new(1.0, 2.0),
                intensity: 0.8,
            },
            GameEvent::GravityWellCharging { well_id: 7, position: Vec2::new(10.0, 20.0) },
            GameEvent::GravityWaveExplosion {
                well_id: 7,
                position: Vec2::new(10.0, 20.0),
                strength: 0.9,
            },
            GameEvent::GravityWellDestroyed { well_id: 7, position: Vec2::new(10.0, 20.0) },
        ];
        for event in events {
            let msg = ServerMessage::Event(event.clone());
            let encoded = encode_server_message(&msg);
            let decoded = decode_server_message(&encoded).unwrap();
            assert_eq!(decoded, ServerMessage::Event(event));
        }
    }

    #[test]
    fn unknown_top_level_tag_fails_with_unknown_variant() {
        let mut w = BinaryWriter::new();
        w.write_u32(999);
        let bytes = w.into_bytes();
        assert_eq!(
            decode_server_message(&bytes),
            Err(CodecError::UnknownVariant { kind: "ServerMessage", tag: 999 })
        );
        assert_eq!(
            decode_client_message(&bytes),
            Err(CodecError::UnknownVariant { kind: "ClientMessage", tag: 999 })
        );
    }

    #[test]
    fn unknown_nested_event_tag_fails_with_unknown_variant() {
        let mut w = BinaryWriter::new();
        w.write_u32(TAG_EVENT);
        w.write_u32(999);
        let bytes = w.into_bytes();
        assert_eq!(
            decode_server_message(&bytes),
            Err(CodecError::UnknownVariant { kind: "GameEvent", tag: 999 })
        );
    }

    #[test]
    fn uuid_encoding_is_idempotent_across_two_round_trips() {
        let id = Uuid::new_v4();
        let msg = ServerMessage::JoinAccepted {
            player_id: id,
            session_token: vec![],
            is_spectator: false,
        };
        let once = decode_server_message(&encode_server_message(&msg)).unwrap();
        let twice = decode_server_message(&encode_server_message(&once)).unwrap();
        assert_eq!(once, twice);
        match twice {
            ServerMessage::JoinAccepted { player_id, .. } => assert_eq!(player_id, id),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn truncated_frame_does_not_panic() {
        let bytes = vec![0u8, 1, 2];
        assert!(decode_server_message(&bytes).is_err());
        assert!(decode_client_message(&bytes).is_err());
    }
}
