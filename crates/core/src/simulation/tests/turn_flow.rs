//! Tests for phase alternation, action point refills and condition expiry.

use super::support::*;

#[test]
fn opponent_phase_hands_the_turn_back() {
    let (mut sim, _, _) = corner_duel(11);
    assert_eq!(sim.phase(), Phase::Player);
    assert_eq!(sim.turn(), 1);

    sim.end_turn().expect("end turn");
    assert_eq!(sim.phase(), Phase::Opponent);
    assert_eq!(sim.opponent_state(), OpponentState::StartingPhase);

    finish_opponent_phase(&mut sim);
    assert_eq!(sim.phase(), Phase::Player);
    assert_eq!(sim.turn(), 3);
    assert_eq!(sim.opponent_state(), OpponentState::WaitingForTurn);

    let turn_changes = sim
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, SimEvent::TurnChanged { .. }))
        .count();
    assert_eq!(turn_changes, 2);
}

#[test]
fn points_refill_only_on_own_phase_entry() {
    let (mut sim, player, opponent) = corner_duel(12);
    play(&mut sim, player, ActionKind::Dodge, GridPos::new(0, 0));
    assert_eq!(sim.unit(player).map(|unit| unit.action_points), Some(2));

    sim.end_turn().expect("end turn");
    assert_eq!(sim.unit(player).map(|unit| unit.action_points), Some(2));
    assert_eq!(sim.unit(opponent).map(|unit| unit.action_points), Some(3));

    finish_opponent_phase(&mut sim);
    assert_eq!(sim.unit(player).map(|unit| unit.action_points), Some(3));
    assert_eq!(sim.unit(opponent).map(|unit| unit.action_points), Some(0));
}

#[test]
fn turn_change_is_emitted_after_resets() {
    let (mut sim, _, opponent) = corner_duel(13);
    sim.drain_events();
    sim.end_turn().expect("end turn");
    let events = sim.drain_events();

    let refill = events
        .iter()
        .position(|event| *event == SimEvent::ActionPointsChanged { unit: opponent })
        .expect("opponent refill event");
    let changed = events
        .iter()
        .position(|event| matches!(event, SimEvent::TurnChanged { turn: 2, phase: Phase::Opponent }))
        .expect("turn change event");
    assert!(refill < changed);
}

#[test]
fn dodge_lasts_through_the_opposing_phase() {
    let mut config = TacticsConfig::default();
    config.dodge.evade_percent = 100;
    let (mut sim, ids) = sim_with(
        config,
        &[],
        vec![
            UnitSpec::new("A", Faction::Player, GridPos::new(0, 0)),
            UnitSpec::new("B", Faction::Opponent, GridPos::new(4, 4)),
        ],
        14,
    );
    let player = ids[0];
    play(&mut sim, player, ActionKind::Dodge, GridPos::new(0, 0));
    let dodging = |sim: &Simulation| {
        sim.unit(player).is_some_and(|unit| unit.has_condition(UnitCondition::Dodging))
    };
    assert!(dodging(&sim));

    sim.end_turn().expect("end turn");
    sim.tick(DT);
    assert!(dodging(&sim), "still dodging during the opposing phase");

    finish_opponent_phase(&mut sim);
    assert!(!dodging(&sim), "cleared when the unit's own phase starts");
    assert_eq!(sim.unit(player).map(|unit| unit.health.current()), Some(100));
}

#[test]
fn end_turn_is_rejected_outside_an_idle_player_phase() {
    let (mut sim, player, _) = corner_duel(15);
    sim.select_unit(player).expect("select");
    sim.select_action(ActionKind::Move).expect("action");
    sim.commit_action(GridPos::new(2, 2)).expect("commit");
    assert_eq!(sim.end_turn(), Err(SimError::Busy));

    while sim.is_busy() {
        sim.tick(DT);
    }
    sim.end_turn().expect("end turn");
    assert_eq!(sim.end_turn(), Err(SimError::WrongPhase { unit: None, phase: Phase::Opponent }));
}

#[test]
fn empty_opponent_roster_advances_immediately() {
    let (mut sim, _) = sim_with(
        TacticsConfig::default(),
        &[],
        vec![UnitSpec::new("A", Faction::Player, GridPos::new(0, 0))],
        16,
    );
    sim.end_turn().expect("end turn");
    sim.tick(DT);
    assert_eq!(sim.phase(), Phase::Player);
    assert_eq!(sim.turn(), 3);
}
