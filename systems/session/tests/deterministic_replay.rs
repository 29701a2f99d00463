use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use tactics_core::{Archetype, CellCoord, Command, CounterTiming, Event, MatchConfig, Team};
use tactics_system_session::Session;
use tactics_world::{grid::Grid, query, Deployment};

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    for timing in [CounterTiming::Immediate, CounterTiming::Deferred] {
        let first = replay(timing, scripted_commands());
        let second = replay(timing, scripted_commands());

        assert_eq!(first, second, "replay diverged between runs");
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert!(first
            .events
            .iter()
            .any(|record| record.starts_with("AttackResolved")));
    }
}

fn replay(counter_timing: CounterTiming, commands: Vec<Command>) -> ReplayOutcome {
    let config = MatchConfig {
        seed: Some(0x5eed),
        first_team: Some(Team::Player),
        counter_timing,
        ..MatchConfig::default()
    };
    let grid = Grid::with_obstacles(6, 6, &[CellCoord::new(2, 2), CellCoord::new(3, 3)]);
    let deployment = [
        deploy(Team::Player, Archetype::Sniper, 0, 0),
        deploy(Team::Player, Archetype::Brawler, 0, 5),
        deploy(Team::Ai, Archetype::Sniper, 5, 5),
        deploy(Team::Ai, Archetype::Brawler, 5, 0),
    ];

    let mut events = Vec::new();
    let mut session =
        Session::with_deployment(grid, &config, &deployment, &mut events).expect("deployment fits");
    for command in commands {
        session.submit(command, &mut events);
    }

    let units = query::unit_view(session.world())
        .into_vec()
        .into_iter()
        .map(|unit| UnitState {
            cell: unit.cell,
            health: unit.health,
            has_moved: unit.has_moved,
            has_attacked: unit.has_attacked,
        })
        .collect();

    ReplayOutcome {
        units,
        events: events.iter().map(|event| format!("{event:?}")).collect(),
    }
}

fn deploy(team: Team, archetype: Archetype, column: u32, row: u32) -> Deployment {
    Deployment {
        team,
        archetype,
        cell: CellCoord::new(column, row),
    }
}

fn click(column: u32, row: u32) -> Command {
    Command::ClickCell {
        cell: CellCoord::new(column, row),
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for _ in 0..3 {
        commands.extend([
            click(0, 0),
            click(5, 5),
            click(0, 5),
            click(1, 5),
            click(0, 5),
            Command::EndTurn,
        ]);
    }
    commands
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct UnitState {
    cell: CellCoord,
    health: i32,
    has_moved: bool,
    has_attacked: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    units: Vec<UnitState>,
    events: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.units.hash(&mut hasher);
        self.events.hash(&mut hasher);
        hasher.finish()
    }
}
