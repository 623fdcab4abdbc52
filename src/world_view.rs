//! The client's merged picture of the match: authoritative snapshots plus
//! interpolation, local prediction overlay, a name cache that survives
//! delta-only updates, and time-boxed transient effects derived from
//! [`GameEvent`]s (spec §4.6).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::constants::effects;
use crate::interpolator::Interpolator;
use crate::predictor::{PredictedKinematics, Predictor};
use crate::protocol::{
    DeltaUpdate, GameEvent, GameSnapshot, GravityWellSnapshot, PlayerId, PlayerInput, PlayerSnapshot, Tick, WellId,
};
use crate::snapshot_store::SnapshotStore;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    PlayerKilled { killer_name: String, victim_name: String },
    PlayerDeflection { position: Vec2, intensity: f32 },
    GravityWellCharging { well_id: WellId, position: Vec2 },
    GravityWaveExplosion { well_id: WellId, position: Vec2, strength: f32 },
    GravityWellDestroyed { well_id: WellId, position: Vec2 },
    ZoneCollapse { phase: u8, new_safe_radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransientEffect {
    pub kind: EffectKind,
    pub created_at_ms: f64,
    pub ttl_ms: f64,
}

impl TransientEffect {
    fn expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at_ms >= self.ttl_ms
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlayerStats {
    pub mass: f32,
    pub kills: u32,
    pub deaths: u32,
    pub alive: bool,
    pub placement: Option<u32>,
}

/// A fully interpolated snapshot with the local player's predicted
/// kinematics spliced in over whatever the interpolator produced for them.
pub struct RenderFrame {
    pub snapshot: GameSnapshot,
    pub active_effects: Vec<TransientEffect>,
}

pub struct WorldView {
    store: SnapshotStore,
    interpolator: Interpolator,
    predictor: Option<Predictor>,
    local_player_id: Option<PlayerId>,
    local_mass: f32,
    name_cache: HashMap<PlayerId, String>,
    destroyed_wells: HashSet<WellId>,
    well_born_times: HashMap<WellId, f64>,
    effects: VecDeque<TransientEffect>,
}

impl WorldView {
    pub fn new() -> Self {
        Self {
            store: SnapshotStore::new(),
            interpolator: Interpolator::new(),
            predictor: None,
            local_player_id: None,
            local_mass: crate::constants::boost::SPEED_REFERENCE_MASS,
            name_cache: HashMap::new(),
            destroyed_wells: HashSet::new(),
            well_born_times: HashMap::new(),
            effects: VecDeque::new(),
        }
    }

    pub fn set_local_player(&mut self, id: PlayerId) {
        self.local_player_id = Some(id);
    }

    pub fn local_player_id(&self) -> Option<PlayerId> {
        self.local_player_id
    }

    pub fn name_for(&self, id: PlayerId) -> Option<&str> {
        self.name_cache.get(&id).map(String::as_str)
    }

    fn refresh_name_cache(&mut self, players: &[PlayerSnapshot]) {
        for p in players {
            self.name_cache.insert(p.id, p.name.clone());
        }
    }

    fn track_local_mass(&mut self, players: &[PlayerSnapshot]) {
        if let Some(id) = self.local_player_id {
            if let Some(p) = players.iter().find(|p| p.id == id) {
                self.local_mass = p.mass;
            }
        }
    }

    /// Wall-clock time a well was first observed: `0.0` if it was already
    /// present in the very first snapshot ever ingested, else the `now_ms`
    /// of whichever later snapshot introduced it (spec §2, §3).
    pub fn well_born_time(&self, id: WellId) -> Option<f64> {
        self.well_born_times.get(&id).copied()
    }

    fn track_well_born_times(&mut self, wells: &[GravityWellSnapshot], now_ms: f64, is_first_snapshot: bool) {
        for well in wells {
            self.well_born_times
                .entry(well.id)
                .or_insert(if is_first_snapshot { 0.0 } else { now_ms });
        }
    }

    /// Once the server stops advertising a destroyed well's id, drop it from
    /// the filter set and forget its born time, so if the id is later
    /// re-registered it's treated as a fresh observation (spec §4.6).
    fn age_out_destroyed_wells(&mut self, wells: &[GravityWellSnapshot]) {
        let present: HashSet<WellId> = wells.iter().map(|w| w.id).collect();
        let aged_out: Vec<WellId> = self.destroyed_wells.iter().copied().filter(|id| !present.contains(id)).collect();
        self.destroyed_wells.retain(|id| present.contains(id));
        for id in aged_out {
            self.well_born_times.remove(&id);
        }
    }

    pub fn ingest_snapshot(&mut self, snapshot: GameSnapshot, now_ms: f64) {
        let is_first_snapshot = self.store.is_empty();
        self.refresh_name_cache(&snapshot.players);
        self.track_local_mass(&snapshot.players);
        self.track_well_born_times(&snapshot.gravity_wells, now_ms, is_first_snapshot);
        self.age_out_destroyed_wells(&snapshot.gravity_wells);

        let local_player = self
            .local_player_id
            .and_then(|id| snapshot.players.iter().find(|p| p.id == id))
            .map(|p| (snapshot.tick, p.position, p.velocity, p.rotation));

        self.store.push(snapshot, now_ms);

        if let Some((tick, position, velocity, rotation)) = local_player {
            self.reconcile_local_player(PredictedKinematics { position, velocity, rotation }, tick);
        }
    }

    /// Applies a delta against its base tick. Returns `false` (and
    /// discards it) if the base is no longer retained.
    pub fn ingest_delta(&mut self, delta: DeltaUpdate, now_ms: f64) -> bool {
        let applied = self.store.apply_delta(&delta, now_ms);
        if applied {
            if let Some(latest) = self.store.latest() {
                let players = latest.snapshot.players.clone();
                self.track_local_mass(&players);
            }
        }
        applied
    }

    pub fn ingest_event(&mut self, event: GameEvent, now_ms: f64) {
        let effect = match event {
            GameEvent::PlayerKilled { killer_name, victim_name, .. } => Some(TransientEffect {
                kind: EffectKind::PlayerKilled { killer_name, victim_name },
                created_at_ms: now_ms,
                ttl_ms: effects::PLAYER_KILLED_TTL_MS,
            }),
            GameEvent::PlayerJoined { player_id, name } => {
                self.name_cache.insert(player_id, name);
                None
            }
            GameEvent::PlayerLeft { .. } => None,
            GameEvent::MatchStarted => None,
            GameEvent::MatchEnded { .. } => None,
            GameEvent::ZoneCollapse { phase, new_safe_radius } => Some(TransientEffect {
                kind: EffectKind::ZoneCollapse { phase, new_safe_radius },
                created_at_ms: now_ms,
                ttl_ms: effects::ZONE_COLLAPSE_TTL_MS,
            }),
            GameEvent::PlayerDeflection { position, intensity, .. } => Some(TransientEffect {
                kind: EffectKind::PlayerDeflection { position, intensity },
                created_at_ms: now_ms,
                ttl_ms: effects::PLAYER_DEFLECTION_TTL_MS,
            }),
            GameEvent::GravityWellCharging { well_id, position } => Some(TransientEffect {
                kind: EffectKind::GravityWellCharging { well_id, position },
                created_at_ms: now_ms,
                ttl_ms: effects::GRAVITY_WELL_CHARGING_TTL_MS,
            }),
            GameEvent::GravityWaveExplosion { well_id, position, strength } => Some(TransientEffect {
                kind: EffectKind::GravityWaveExplosion { well_id, position, strength },
                created_at_ms: now_ms,
                ttl_ms: effects::GRAVITY_WAVE_EXPLOSION_TTL_MS,
            }),
            GameEvent::GravityWellDestroyed { well_id, position } => {
                self.destroyed_wells.insert(well_id);
                Some(TransientEffect {
                    kind: EffectKind::GravityWellDestroyed { well_id, position },
                    created_at_ms: now_ms,
                    ttl_ms: effects::GRAVITY_WELL_DESTROYED_TTL_MS,
                })
            }
        };

        if let Some(effect) = effect {
            self.effects.push_back(effect);
            while self.effects.len() > effects::MAX_CONCURRENT {
                self.effects.pop_front();
            }
        }
    }

    pub fn record_local_input(&mut self, input: PlayerInput, initial_kinematics: impl FnOnce() -> PredictedKinematics) {
        let predictor = self
            .predictor
            .get_or_insert_with(|| Predictor::new(initial_kinematics()));
        predictor.record_input(input, self.local_mass);
    }

    pub fn reconcile_local_player(&mut self, server_state: PredictedKinematics, server_tick: Tick) {
        if let Some(predictor) = &mut self.predictor {
            predictor.reconcile(server_state, self.local_mass, server_tick);
        } else {
            self.predictor = Some(Predictor::new(server_state));
        }
    }

    pub fn predicted_local_kinematics(&self) -> Option<PredictedKinematics> {
        self.predictor.as_ref().map(Predictor::predicted)
    }

    /// Produce the renderable frame for wall-clock `now_ms`: the
    /// interpolated snapshot with the local player's entry overridden by
    /// the predictor's latest output, destroyed wells filtered out, and
    /// unexpired transient effects.
    pub fn render(&self, now_ms: f64) -> Option<RenderFrame> {
        let mut snapshot = self.interpolator.interpolate(&self.store, now_ms)?;

        snapshot.gravity_wells.retain(|w| !self.destroyed_wells.contains(&w.id));

        if let (Some(local_id), Some(predicted)) = (self.local_player_id, self.predicted_local_kinematics()) {
            if let Some(player) = snapshot.players.iter_mut().find(|p| p.id == local_id) {
                player.position = predicted.position;
                player.velocity = predicted.velocity;
                player.rotation = predicted.rotation;
            }
        }

        let active_effects = self
            .effects
            .iter()
            .filter(|e| !e.expired(now_ms))
            .cloned()
            .collect();

        Some(RenderFrame { snapshot, active_effects })
    }

    /// Players ranked by mass, descending; ties broken by kills.
    pub fn leaderboard(&self, top_n: usize) -> Vec<(PlayerId, String, f32, u32)> {
        let Some(latest) = self.store.latest() else {
            return Vec::new();
        };
        let mut ranked: Vec<_> = latest
            .snapshot
            .players
            .iter()
            .map(|p| (p.id, p.name.clone(), p.mass, p.kills))
            .collect();
        ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal).then(b.3.cmp(&a.3)));
        ranked.truncate(top_n);
        ranked
    }

    pub fn local_player_stats(&self) -> Option<LocalPlayerStats> {
        let id = self.local_player_id?;
        let latest = self.store.latest()?;
        let player = latest.snapshot.players.iter().find(|p| p.id == id)?;

        let mut by_mass: Vec<_> = latest.snapshot.players.iter().collect();
        by_mass.sort_by(|a, b| b.mass.partial_cmp(&a.mass).unwrap_or(std::cmp::Ordering::Equal));
        let placement = by_mass.iter().position(|p| p.id == id).map(|idx| idx as u32 + 1);

        Some(LocalPlayerStats {
            mass: player.mass,
            kills: player.kills,
            deaths: player.deaths,
            alive: player.flags.alive,
            placement,
        })
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.predictor = None;
        self.destroyed_wells.clear();
        self.well_born_times.clear();
        self.effects.clear();
    }
}

impl Default for WorldView {
    fn default() -> Self {
        Self::new()
    }
}
