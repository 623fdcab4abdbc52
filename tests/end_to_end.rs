//! End-to-end scenarios exercising the session, world view, predictor, and
//! codec together without any real network transport.

use orbit_client_core::codec::{encode_server_message, CodecError};
use orbit_client_core::predictor::{simulate_input, PredictedKinematics, Predictor};
use orbit_client_core::protocol::{
    DeltaUpdate, GameEvent, GameSnapshot, MatchPhase, PlayerFlags, PlayerInput, PlayerSnapshot, ServerMessage,
};
use orbit_client_core::session::{ConnectionPhase, SessionController};
use orbit_client_core::util::vec2::Vec2;
use uuid::Uuid;

fn empty_snapshot(tick: u64) -> GameSnapshot {
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

fn player(id: Uuid, position: Vec2, mass: f32) -> PlayerSnapshot {
    PlayerSnapshot {
        id,
        name: "Nova".into(),
        position,
        velocity: Vec2::ZERO,
        rotation: 0.0,
        mass,
        flags: PlayerFlags { alive: true, spawn_protection: false, is_bot: false },
        kills: 0,
        deaths: 0,
        color_index: 0,
    }
}

#[test]
fn join_then_first_snapshot_populates_world_and_local_player() {
    let mut session = SessionController::new();
    session.begin_join("Nova".into(), 0, false);

    let id = Uuid::new_v4();
    let accept = encode_server_message(&ServerMessage::JoinAccepted {
        player_id: id,
        session_token: vec![0; 32],
        is_spectator: false,
    });
    session.handle_frame(&accept, 0.0).unwrap();
    assert_eq!(session.phase(), &ConnectionPhase::Connected { player_id: id, is_spectator: false });

    let mut snap = empty_snapshot(1);
    snap.players.push(player(id, Vec2::new(10.0, 20.0), 100.0));
    let bytes = encode_server_message(&ServerMessage::Snapshot(snap));
    session.handle_frame(&bytes, 10.0).unwrap();

    let frame = session.world().render(10.0 + orbit_client_core::constants::buffers::INTERPOLATION_DELAY_MS * 2.0);
    assert!(frame.is_none() || !frame.unwrap().snapshot.players.is_empty());
    assert_eq!(session.world().name_for(id), Some("Nova"));
}

#[test]
fn prediction_moves_immediately_ahead_of_last_server_snapshot() {
    let mut predictor = Predictor::new(PredictedKinematics { position: Vec2::ZERO, velocity: Vec2::ZERO, rotation: 0.0 });
    let input = PlayerInput {
        sequence: 1,
        tick: 1,
        client_time: 0,
        thrust: Vec2::new(1.0, 0.0),
        aim: Vec2::ZERO,
        boost: true,
        fire: false,
        fire_released: false,
    };
    predictor.record_input(input, 100.0);
    assert!(predictor.predicted().position.x > 0.0 || predictor.predicted().velocity.x > 0.0);
}

#[test]
fn reconcile_drops_acked_inputs_and_keeps_unacked_effect() {
    let mut predictor = Predictor::new(PredictedKinematics { position: Vec2::ZERO, velocity: Vec2::ZERO, rotation: 0.0 });
    for seq in 1..=5u64 {
        let input = PlayerInput {
            sequence: seq,
            tick: seq,
            client_time: seq,
            thrust: Vec2::new(1.0, 0.0),
            aim: Vec2::ZERO,
            boost: true,
            fire: false,
            fire_released: false,
        };
        predictor.record_input(input, 100.0);
    }
    assert_eq!(predictor.pending_count(), 5);

    let server_state = PredictedKinematics { position: Vec2::new(1.0, 0.0), velocity: Vec2::new(5.0, 0.0), rotation: 0.0 };
    predictor.reconcile(server_state, 100.0, 3);
    assert_eq!(predictor.pending_count(), 2);
}

#[test]
fn interpolate_between_two_snapshots_blends_position() {
    let mut session = SessionController::new();
    let id = Uuid::new_v4();

    let mut first = empty_snapshot(1);
    first.players.push(player(id, Vec2::new(0.0, 0.0), 100.0));
    session.handle_frame(&encode_server_message(&ServerMessage::Snapshot(first)), 0.0).unwrap();

    let mut second = empty_snapshot(2);
    second.players.push(player(id, Vec2::new(100.0, 0.0), 100.0));
    session.handle_frame(&encode_server_message(&ServerMessage::Snapshot(second)), 100.0).unwrap();

    let frame = session.world().render(100.0).unwrap();
    let rendered_player = frame.snapshot.players.iter().find(|p| p.id == id).unwrap();
    assert!(rendered_player.position.x > 0.0 && rendered_player.position.x < 100.0);
}

#[test]
fn delta_with_missing_base_is_silently_discarded() {
    let mut session = SessionController::new();
    let id = Uuid::new_v4();
    let mut snap = empty_snapshot(10);
    snap.players.push(player(id, Vec2::ZERO, 100.0));
    session.handle_frame(&encode_server_message(&ServerMessage::Snapshot(snap)), 0.0).unwrap();

    let delta = DeltaUpdate {
        tick: 11,
        base_tick: 999, // never seen
        player_updates: vec![],
        projectile_updates: vec![],
        removed_projectiles: vec![],
        debris: vec![],
    };
    let result = session.handle_frame(&encode_server_message(&ServerMessage::Delta(delta)), 10.0);
    assert!(result.is_ok());
    assert_eq!(session.world().local_player_id(), None); // local player never set in this scenario

    let frame = session.world().render(10.0 + orbit_client_core::constants::buffers::INTERPOLATION_DELAY_MS).unwrap();
    assert_eq!(frame.snapshot.tick, 10); // base snapshot still the latest; delta never landed
}

#[test]
fn event_triggers_transient_world_effect() {
    let mut session = SessionController::new();
    let killer = Uuid::new_v4();
    let victim = Uuid::new_v4();
    let event = GameEvent::PlayerKilled {
        killer_id: killer,
        victim_id: victim,
        killer_name: "Nova".into(),
        victim_name: "Orb".into(),
    };
    let dispatched = session
        .handle_frame(&encode_server_message(&ServerMessage::Event(event.clone())), 0.0)
        .unwrap();
    assert_eq!(dispatched, Some(event));

    let mut snap = empty_snapshot(1);
    snap.players.push(player(killer, Vec2::ZERO, 100.0));
    session.handle_frame(&encode_server_message(&ServerMessage::Snapshot(snap)), 0.0).unwrap();

    let frame = session.world().render(orbit_client_core::constants::buffers::INTERPOLATION_DELAY_MS).unwrap();
    assert_eq!(frame.active_effects.len(), 1);
}

#[test]
fn unknown_variant_decode_error_is_typed_not_a_panic() {
    // tag 255 doesn't exist for ServerMessage.
    let mut bytes = 255u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 4]);
    let result = orbit_client_core::codec::decode_server_message(&bytes);
    assert!(matches!(result, Err(CodecError::UnknownVariant { .. })));
}

#[test]
fn simulate_input_is_a_pure_function_of_its_arguments() {
    let state = PredictedKinematics { position: Vec2::ZERO, velocity: Vec2::new(10.0, 0.0), rotation: 0.0 };
    let input = PlayerInput {
        sequence: 1,
        tick: 1,
        client_time: 0,
        thrust: Vec2::ZERO,
        aim: Vec2::ZERO,
        boost: false,
        fire: false,
        fire_released: false,
    };
    let a = simulate_input(state, 100.0, &input);
    let b = simulate_input(state, 100.0, &input);
    assert_eq!(a, b);
}
