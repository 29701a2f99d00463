use tactics_core::{Archetype, CellCoord, Command, Event, MatchConfig, Team, UnitId};
use tactics_system_ai::AiPolicy;
use tactics_world::{self as world, grid::Grid, query, Deployment, World};

fn deploy(team: Team, archetype: Archetype, column: u32, row: u32) -> Deployment {
    Deployment {
        team,
        archetype,
        cell: CellCoord::new(column, row),
    }
}

/// Starts a match where the AI moves first, so its turn is already scheduled.
fn ai_moves_first(grid: Grid, units: &[Deployment]) -> World {
    let config = MatchConfig {
        seed: Some(17),
        first_team: Some(Team::Ai),
        ..MatchConfig::default()
    };
    let mut events = Vec::new();
    World::with_deployment(grid, &config, units, &mut events).expect("deployment fits")
}

/// Resumes the scheduled AI turn and lets the policy play it out.
fn play_ai_turn(world: &mut World, policy: &mut AiPolicy) -> (Vec<Command>, Vec<Event>) {
    let mut issued = Vec::new();
    let mut log = Vec::new();
    let mut events = Vec::new();
    world::apply(world, Command::Resume, &mut events);

    for _ in 0..32 {
        log.extend(events.iter().cloned());
        let mut commands = Vec::new();
        policy.handle(
            &events,
            &query::unit_view(world),
            query::grid(world),
            &mut commands,
        );
        if commands.is_empty() {
            break;
        }
        events.clear();
        for command in commands {
            issued.push(command.clone());
            world::apply(world, command, &mut events);
        }
    }

    (issued, log)
}

#[test]
fn ai_attacks_in_range_then_closes_in_and_strikes() {
    let mut world = ai_moves_first(
        Grid::open(8, 8),
        &[
            deploy(Team::Ai, Archetype::Sniper, 0, 0),
            deploy(Team::Ai, Archetype::Brawler, 7, 7),
            deploy(Team::Player, Archetype::Sniper, 0, 6),
            deploy(Team::Player, Archetype::Brawler, 4, 7),
        ],
    );
    let mut policy = AiPolicy::new();

    let (issued, log) = play_ai_turn(&mut world, &mut policy);

    assert_eq!(
        issued,
        vec![
            Command::Attack {
                attacker: UnitId::new(0),
                target: UnitId::new(2),
            },
            Command::MoveUnit {
                unit: UnitId::new(1),
                destination: CellCoord::new(5, 7),
            },
            Command::Attack {
                attacker: UnitId::new(1),
                target: UnitId::new(3),
            },
            Command::FinishAiTurn,
        ]
    );
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
    assert!(log.contains(&Event::TurnStarted { team: Team::Player }));
    assert!(!policy.is_active());
    assert_eq!(query::active_team(&world), Some(Team::Player));
}

#[test]
fn boxed_in_unit_without_targets_passes() {
    let grid = Grid::with_obstacles(4, 4, &[CellCoord::new(1, 0), CellCoord::new(0, 1)]);
    let mut world = ai_moves_first(
        grid,
        &[
            deploy(Team::Ai, Archetype::Brawler, 0, 0),
            deploy(Team::Player, Archetype::Brawler, 3, 3),
        ],
    );
    let mut policy = AiPolicy::new();

    let (issued, log) = play_ai_turn(&mut world, &mut policy);

    assert_eq!(
        issued,
        vec![
            Command::Pass {
                unit: UnitId::new(0)
            },
            Command::FinishAiTurn,
        ]
    );
    assert!(log.contains(&Event::UnitPassed {
        unit: UnitId::new(0)
    }));
}

#[test]
fn unit_that_moves_out_of_reach_does_not_attack() {
    let mut world = ai_moves_first(
        Grid::open(12, 1),
        &[
            deploy(Team::Ai, Archetype::Brawler, 0, 0),
            deploy(Team::Player, Archetype::Brawler, 11, 0),
        ],
    );
    let mut policy = AiPolicy::new();

    let (issued, _) = play_ai_turn(&mut world, &mut policy);

    assert_eq!(
        issued,
        vec![
            Command::MoveUnit {
                unit: UnitId::new(0),
                destination: CellCoord::new(6, 0),
            },
            Command::FinishAiTurn,
        ]
    );
    let brawler = query::unit(&world, UnitId::new(0)).expect("brawler alive");
    assert_eq!(brawler.cell, CellCoord::new(6, 0));
    assert!(!brawler.has_attacked);
}
