//! Render-time interpolation between two bracketing snapshots (spec §4.4).
//!
//! The renderer always looks slightly into the past: `renderTime = now -
//! interpolationDelay`. Continuous per-entity fields (position, velocity,
//! mass, well radius, debris position, notable-player position/mass) are
//! linearly blended by matching id across the bracket; rotation uses the
//! shortest-arc blend from [`crate::util::vec2::angle_lerp`]. Discrete
//! fields (flags, counters, debris size, match metadata) snap to the newer
//! bracket entry. Entities that only exist on one side of the bracket are
//! never blended across a spawn/despawn boundary — they're taken whole
//! from whichever side has them, except a gravity well that vanished
//! between brackets, which is dropped outright (spec §4.4, "destroyed well
//! filter").

use std::collections::HashMap;

use crate::constants::buffers::INTERPOLATION_DELAY_MS;
use crate::protocol::{DebrisSnapshot, GameSnapshot, GravityWellSnapshot, NotablePlayer, PlayerSnapshot, ProjectileSnapshot};
use crate::snapshot_store::{SnapshotEntry, SnapshotStore};
use crate::util::vec2::{self, Vec2};

pub struct Interpolator {
    delay_ms: f64,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::with_delay(INTERPOLATION_DELAY_MS)
    }

    pub fn with_delay(delay_ms: f64) -> Self {
        Self { delay_ms }
    }

    /// Produce the blended view for rendering at wall-clock `now_ms`.
    /// Returns `None` only when the store has never received a snapshot.
    pub fn interpolate(&self, store: &SnapshotStore, now_ms: f64) -> Option<GameSnapshot> {
        let entries = store.entries();
        if entries.is_empty() {
            return None;
        }
        if entries.len() == 1 {
            return Some(entries[0].snapshot.clone());
        }

        let render_time = now_ms - self.delay_ms;

        if render_time <= entries[0].wall_timestamp_ms {
            return Some(entries[0].snapshot.clone());
        }
        let last = entries.len() - 1;
        if render_time >= entries[last].wall_timestamp_ms {
            return Some(entries[last].snapshot.clone());
        }

        for pair in entries.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if render_time >= lo.wall_timestamp_ms && render_time <= hi.wall_timestamp_ms {
                return Some(blend(lo, hi, render_time));
            }
        }

        // Bracket entries weren't monotonically ordered by wall time; fall
        // back to the newest snapshot rather than guess.
        Some(entries[last].snapshot.clone())
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}

fn blend(lo: &SnapshotEntry, hi: &SnapshotEntry, render_time: f64) -> GameSnapshot {
    let span = hi.wall_timestamp_ms - lo.wall_timestamp_ms;
    let t = if span > 0.0 {
        ((render_time - lo.wall_timestamp_ms) / span).clamp(0.0, 1.0) as f32
    } else {
        1.0
    };

    let lo_players: HashMap<_, _> = lo.snapshot.players.iter().map(|p| (p.id, p)).collect();
    let players = hi
        .snapshot
        .players
        .iter()
        .map(|hi_player| match lo_players.get(&hi_player.id) {
            Some(lo_player) => blend_player(lo_player, hi_player, t),
            None => hi_player.clone(),
        })
        .collect();

    let lo_projectiles: HashMap<_, _> = lo.snapshot.projectiles.iter().map(|p| (p.id, p)).collect();
    let projectiles = hi
        .snapshot
        .projectiles
        .iter()
        .map(|hi_proj| match lo_projectiles.get(&hi_proj.id) {
            Some(lo_proj) => blend_projectile(lo_proj, hi_proj, t),
            None => hi_proj.clone(),
        })
        .collect();

    let gravity_wells = hi
        .snapshot
        .gravity_wells
        .iter()
        .map(|hi_well| match lo.wells_by_id.get(&hi_well.id) {
            Some(lo_well) => blend_well(lo_well, hi_well, t),
            None => hi_well.clone(),
        })
        .collect();

    let lo_debris: HashMap<_, _> = lo.snapshot.debris.iter().map(|d| (d.id, d)).collect();
    let debris = hi
        .snapshot
        .debris
        .iter()
        .map(|hi_debris| match lo_debris.get(&hi_debris.id) {
            Some(lo_debris) => blend_debris(lo_debris, hi_debris, t),
            None => hi_debris.clone(),
        })
        .collect();

    let lo_notable: HashMap<_, _> = lo.snapshot.notable_players.iter().map(|n| (n.id, n)).collect();
    let notable_players = hi
        .snapshot
        .notable_players
        .iter()
        .map(|hi_notable| match lo_notable.get(&hi_notable.id) {
            Some(lo_notable) => blend_notable(lo_notable, hi_notable, t),
            None => hi_notable.clone(),
        })
        .collect();

    GameSnapshot {
        tick: hi.snapshot.tick,
        match_phase: hi.snapshot.match_phase,
        match_time: hi.snapshot.match_time,
        countdown: hi.snapshot.countdown,
        players,
        projectiles,
        debris,
        arena_collapse_phase: hi.snapshot.arena_collapse_phase,
        arena_safe_radius: hi.snapshot.arena_safe_radius,
        arena_scale: hi.snapshot.arena_scale,
        gravity_wells,
        total_players: hi.snapshot.total_players,
        total_alive: hi.snapshot.total_alive,
        density_grid: hi.snapshot.density_grid.clone(),
        notable_players,
        echo_client_time: hi.snapshot.echo_client_time,
    }
}

fn blend_player(lo: &PlayerSnapshot, hi: &PlayerSnapshot, t: f32) -> PlayerSnapshot {
    let respawned = lo.flags.alive != hi.flags.alive || lo.flags.spawn_protection != hi.flags.spawn_protection;
    if respawned {
        return hi.clone();
    }
    PlayerSnapshot {
        id: hi.id,
        name: hi.name.clone(),
        position: vec2::lerp(lo.position, hi.position, t),
        velocity: vec2::lerp(lo.velocity, hi.velocity, t),
        rotation: vec2::angle_lerp(lo.rotation, hi.rotation, t),
        mass: lo.mass + (hi.mass - lo.mass) * t,
        flags: hi.flags,
        kills: hi.kills,
        deaths: hi.deaths,
        color_index: hi.color_index,
    }
}

fn blend_projectile(lo: &ProjectileSnapshot, hi: &ProjectileSnapshot, t: f32) -> ProjectileSnapshot {
    ProjectileSnapshot {
        id: hi.id,
        owner_id: hi.owner_id,
        position: vec2::lerp(lo.position, hi.position, t),
        velocity: vec2::lerp(lo.velocity, hi.velocity, t),
        mass: hi.mass,
    }
}

fn blend_well(lo: &GravityWellSnapshot, hi: &GravityWellSnapshot, t: f32) -> GravityWellSnapshot {
    GravityWellSnapshot {
        id: hi.id,
        position: vec2::lerp(lo.position, hi.position, t),
        mass: lo.mass + (hi.mass - lo.mass) * t,
        core_radius: lo.core_radius + (hi.core_radius - lo.core_radius) * t,
    }
}

fn blend_debris(lo: &DebrisSnapshot, hi: &DebrisSnapshot, t: f32) -> DebrisSnapshot {
    DebrisSnapshot {
        id: hi.id,
        position: vec2::lerp(lo.position, hi.position, t),
        size: hi.size,
    }
}

fn blend_notable(lo: &NotablePlayer, hi: &NotablePlayer, t: f32) -> NotablePlayer {
    NotablePlayer {
        id: hi.id,
        position: vec2::lerp(lo.position, hi.position, t),
        mass: lo.mass + (hi.mass - lo.mass) * t,
        color_index: hi.color_index,
    }
}
