//! Timestamped ring of authoritative snapshots and the delta-against-base
//! reconstruction pathway (spec §4.3).
//!
//! Entries are immutable once pushed — the delta pathway always
//! synthesizes a fresh [`protocol::GameSnapshot`] rather than mutating a
//! stored one (spec §9, "Shared mutable state").

use std::collections::HashMap;

use crate::constants::buffers::SNAPSHOT_BUFFER_SIZE;
use crate::protocol::{DeltaUpdate, GameSnapshot, GravityWellSnapshot, ProjectileSnapshot, Tick, WellId};

/// One retained snapshot plus the wall-clock time it was pushed and a
/// precomputed well lookup used by the interpolator.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub tick: Tick,
    pub wall_timestamp_ms: f64,
    pub snapshot: GameSnapshot,
    pub wells_by_id: HashMap<WellId, GravityWellSnapshot>,
}

impl SnapshotEntry {
    fn new(snapshot: GameSnapshot, wall_timestamp_ms: f64) -> Self {
        let wells_by_id = snapshot
            .gravity_wells
            .iter()
            .map(|w| (w.id, w.clone()))
            .collect();
        Self {
            tick: snapshot.tick,
            wall_timestamp_ms,
            snapshot,
            wells_by_id,
        }
    }
}

/// Ring buffer of authoritative snapshots, ordered by ascending
/// `wall_timestamp_ms`, capped at `capacity` entries.
pub struct SnapshotStore {
    entries: Vec<SnapshotEntry>,
    capacity: usize,
    current_tick: Tick,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::with_capacity(SNAPSHOT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            current_tick: 0,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&SnapshotEntry> {
        self.entries.last()
    }

    /// Push a freshly-received (or delta-synthesized) snapshot. Late
    /// snapshots whose tick is below `current_tick` are still stored — they
    /// may become valid delta bases later — but never rewind `current_tick`.
    pub fn push(&mut self, snapshot: GameSnapshot, now_ms: f64) {
        if snapshot.tick > self.current_tick {
            self.current_tick = snapshot.tick;
        }
        self.entries.push(SnapshotEntry::new(snapshot, now_ms));
        while self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    fn find_by_tick(&self, tick: Tick) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.tick == tick)
    }

    /// Reconstruct a full snapshot from a delta against its named base.
    /// Returns `true` if a base was found and the synthesized snapshot was
    /// pushed; `false` if the base is unknown, in which case the delta is
    /// discarded silently (spec §4.3, §7 `MissingBase`).
    pub fn apply_delta(&mut self, delta: &DeltaUpdate, now_ms: f64) -> bool {
        let Some(base) = self.find_by_tick(delta.base_tick) else {
            return false;
        };

        let mut synthesized = base.snapshot.clone();
        synthesized.tick = delta.tick;

        for player_delta in &delta.player_updates {
            if let Some(player) = synthesized.players.iter_mut().find(|p| p.id == player_delta.id) {
                if let Some(position) = player_delta.position {
                    player.position = position;
                }
                if let Some(velocity) = player_delta.velocity {
                    player.velocity = velocity;
                }
                if let Some(rotation) = player_delta.rotation {
                    player.rotation = rotation;
                }
                if let Some(mass) = player_delta.mass {
                    player.mass = mass;
                }
                if let Some(alive) = player_delta.alive {
                    player.flags.alive = alive;
                }
                if let Some(kills) = player_delta.kills {
                    player.kills = kills;
                }
            }
        }

        for projectile_delta in &delta.projectile_updates {
            match synthesized.projectiles.iter_mut().find(|p| p.id == projectile_delta.id) {
                Some(projectile) => {
                    projectile.position = projectile_delta.position;
                    projectile.velocity = projectile_delta.velocity;
                }
                None => {
                    // A projectile the base snapshot hadn't seen yet; the
                    // delta only carries position/velocity, so owner/mass
                    // are unknown until the next full snapshot re-grounds us.
                    synthesized.projectiles.push(ProjectileSnapshot {
                        id: projectile_delta.id,
                        owner_id: uuid::Uuid::nil(),
                        position: projectile_delta.position,
                        velocity: projectile_delta.velocity,
                        mass: 0.0,
                    });
                }
            }
        }

        if !delta.removed_projectiles.is_empty() {
            synthesized
                .projectiles
                .retain(|p| !delta.removed_projectiles.contains(&p.id));
        }

        synthesized.debris = delta.debris.clone();

        self.push(synthesized, now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.current_tick = 0;
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MatchPhase, PlayerFlags, PlayerSnapshot};
    use crate::util::vec2::Vec2;
    use uuid::Uuid;

    fn empty_snapshot(tick: Tick) -> GameSnapshot {
        GameSnapshot {
            tick,
            match_phase: MatchPhase::Playing,
            match_time: 0.0,
            countdown: 0.0,
            players: vec![],
            projectiles: vec![],
            debris: vec![],
            arena_collapse_phase: 0,
            arena_safe_radius: 500.0,
            arena_scale: 1.0,
            gravity_wells: vec![],
            total_players: 0,
            total_alive: 0,
            density_grid: vec![],
            notable_players: vec![],
            echo_client_time: 0,
        }
    }

    fn player(id: Uuid, mass: f32, kills: u32) -> PlayerSnapshot {
        PlayerSnapshot {
            id,
            name: "P".into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            mass,
            flags: PlayerFlags { alive: true, spawn_protection: false, is_bot: false },
            kills,
            deaths: 0,
            color_index: 0,
        }
    }

    #[test]
    fn push_bumps_current_tick_monotonically() {
        let mut store = SnapshotStore::new();
        store.push(empty_snapshot(5), 0.0);
        assert_eq!(store.current_tick(), 5);
        store.push(empty_snapshot(3), 10.0); // late arrival, still stored
        assert_eq!(store.current_tick(), 5);
        assert_eq!(store.len(), 2);
        store.push(empty_snapshot(8), 20.0);
        assert_eq!(store.current_tick(), 8);
    }

    #[test]
    fn push_trims_oldest_beyond_capacity() {
        let mut store = SnapshotStore::with_capacity(3);
        for tick in 0..10 {
            store.push(empty_snapshot(tick), tick as f64);
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.entries()[0].tick, 7);
        assert_eq!(store.latest().unwrap().tick, 9);
    }

    #[test]
    fn delta_missing_base_is_discarded_silently() {
        let mut store = SnapshotStore::new();
        store.push(empty_snapshot(100), 0.0);
        let delta = DeltaUpdate {
            tick: 101,
            base_tick: 99,
            player_updates: vec![],
            projectile_updates: vec![],
            removed_projectiles: vec![],
            debris: vec![],
        };
        assert!(!store.apply_delta(&delta, 10.0));
        assert_eq!(store.current_tick(), 100);
        store.push(empty_snapshot(101), 20.0);
        assert_eq!(store.current_tick(), 101);
    }

    #[test]
    fn delta_updates_only_provided_player_fields() {
        let id = Uuid::new_v4();
        let mut base = empty_snapshot(100);
        let mut p = player(id, 100.0, 0);
        p.position = Vec2::new(1.0, 2.0);
        p.velocity = Vec2::new(3.0, 4.0);
        p.rotation = 0.75;
        base.players.push(p);

        let mut store = SnapshotStore::new();
        store.push(base, 0.0);

        let delta = DeltaUpdate {
            tick: 101,
            base_tick: 100,
            player_updates: vec![crate::protocol::PlayerDelta {
                id,
                position: None,
                velocity: None,
                rotation: None,
                mass: Some(175.0),
                alive: None,
                kills: Some(5),
            }],
            projectile_updates: vec![],
            removed_projectiles: vec![],
            debris: vec![],
        };
        assert!(store.apply_delta(&delta, 10.0));

        let latest = store.latest().unwrap();
        let updated = &latest.snapshot.players[0];
        assert_eq!(updated.mass, 175.0);
        assert_eq!(updated.kills, 5);
        assert_eq!(updated.position, Vec2::new(1.0, 2.0));
        assert_eq!(updated.velocity, Vec2::new(3.0, 4.0));
        assert_eq!(updated.rotation, 0.75);
    }

    #[test]
    fn delta_drops_removed_projectiles_and_replaces_debris() {
        let mut base = empty_snapshot(10);
        base.projectiles.push(ProjectileSnapshot {
            id: 1,
            owner_id: Uuid::new_v4(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 5.0,
        });
        base.projectiles.push(ProjectileSnapshot {
            id: 2,
            owner_id: Uuid::new_v4(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 5.0,
        });

        let mut store = SnapshotStore::new();
        store.push(base, 0.0);

        let delta = DeltaUpdate {
            tick: 11,
            base_tick: 10,
            player_updates: vec![],
            projectile_updates: vec![],
            removed_projectiles: vec![1],
            debris: vec![crate::protocol::DebrisSnapshot {
                id: 99,
                position: Vec2::new(5.0, 5.0),
                size: crate::protocol::DebrisSize::Large,
            }],
        };
        store.apply_delta(&delta, 10.0);

        let latest = store.latest().unwrap();
        assert_eq!(latest.snapshot.projectiles.len(), 1);
        assert_eq!(latest.snapshot.projectiles[0].id, 2);
        assert_eq!(latest.snapshot.debris.len(), 1);
        assert_eq!(latest.snapshot.debris[0].id, 99);
    }

    #[test]
    fn reset_clears_entries_and_tick() {
        let mut store = SnapshotStore::new();
        store.push(empty_snapshot(50), 0.0);
        store.reset();
        assert_eq!(store.len(), 0);
        assert_eq!(store.current_tick(), 0);
    }

    #[test]
    fn monotonicity_holds_across_mixed_snapshots_and_deltas() {
        let mut store = SnapshotStore::with_capacity(4);
        store.push(empty_snapshot(100), 0.0);
        let delta_bad = DeltaUpdate {
            tick: 101,
            base_tick: 99,
            player_updates: vec![],
            projectile_updates: vec![],
            removed_projectiles: vec![],
            debris: vec![],
        };
        store.apply_delta(&delta_bad, 5.0);
        store.push(empty_snapshot(101), 10.0);
        assert_eq!(store.current_tick(), 101);
        assert!(store.len() <= 4);
    }
}
