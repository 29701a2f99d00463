#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drives a match by pumping commands between the world and the AI policy.
//!
//! Adapters hand human input to [`Session::submit`]. The session applies it,
//! lets the AI policy react, fires scheduled continuations, and keeps going
//! until the world waits for the human again. Every event produced along the
//! way is appended to the caller's buffer in order.

use tactics_core::{Command, Event, MatchConfig, Rejection};
use tactics_system_ai::AiPolicy;
use tactics_world::{self as world, grid::Grid, query, Deployment, World};
use tracing::{trace, warn};

/// Upper bound on world round trips per submission.
const MAX_ROUNDS: usize = 256;

/// A running match together with the AI playing against the human.
#[derive(Debug)]
pub struct Session {
    world: World,
    ai: AiPolicy,
}

impl Session {
    /// Starts a match on a freshly generated grid.
    #[must_use]
    pub fn new(config: &MatchConfig, out_events: &mut Vec<Event>) -> Self {
        let mut opening = Vec::new();
        let world = World::new(config, &mut opening);
        Self::start(world, opening, out_events)
    }

    /// Starts a match on a prepared grid, beginning with unit placement.
    #[must_use]
    pub fn with_grid(grid: Grid, config: &MatchConfig, out_events: &mut Vec<Event>) -> Self {
        let mut opening = Vec::new();
        let world = World::with_grid(grid, config, &mut opening);
        Self::start(world, opening, out_events)
    }

    /// Starts a match on a prepared grid with every unit already deployed.
    pub fn with_deployment(
        grid: Grid,
        config: &MatchConfig,
        deployment: &[Deployment],
        out_events: &mut Vec<Event>,
    ) -> Result<Self, Rejection> {
        let mut opening = Vec::new();
        let world = World::with_deployment(grid, config, deployment, &mut opening)?;
        Ok(Self::start(world, opening, out_events))
    }

    fn start(world: World, opening: Vec<Event>, out_events: &mut Vec<Event>) -> Self {
        let mut session = Self {
            world,
            ai: AiPolicy::new(),
        };
        out_events.extend(opening.iter().cloned());
        session.settle(opening, out_events);
        session
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a human command and everything it sets in motion.
    pub fn submit(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let mut batch = Vec::new();
        world::apply(&mut self.world, command, &mut batch);
        out_events.extend(batch.iter().cloned());
        self.settle(batch, out_events);
    }

    fn settle(&mut self, mut batch: Vec<Event>, out_events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        for round in 0..MAX_ROUNDS {
            commands.clear();
            let units = query::unit_view(&self.world);
            self.ai
                .handle(&batch, &units, query::grid(&self.world), &mut commands);

            if commands.is_empty() {
                if query::pending_continuation(&self.world).is_none() {
                    return;
                }
                commands.push(Command::Resume);
            }

            trace!(round, ?commands, "session round");
            batch.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut batch);
            }
            out_events.extend(batch.iter().cloned());
        }

        warn!(rounds = MAX_ROUNDS, "session stopped before the world settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{PlacementPhase, Team};

    fn small(first_team: Team) -> MatchConfig {
        MatchConfig {
            rows: 6,
            columns: 6,
            obstacle_percentage: 10,
            seed: Some(21),
            first_team: Some(first_team),
            ..MatchConfig::default()
        }
    }

    #[test]
    fn ai_first_match_waits_for_the_player_sniper() {
        let mut events = Vec::new();
        let session = Session::new(&small(Team::Ai), &mut events);

        assert_eq!(
            query::placement_phase(session.world()),
            PlacementPhase::PlayerSniper
        );
        assert_eq!(query::pending_continuation(session.world()), None);
        assert_eq!(query::unit_view(session.world()).team(Team::Ai).count(), 1);
    }

    #[test]
    fn player_first_match_waits_for_a_click() {
        let mut events = Vec::new();
        let session = Session::new(&small(Team::Player), &mut events);

        assert_eq!(
            query::placement_phase(session.world()),
            PlacementPhase::PlayerSniper
        );
        assert!(query::unit_view(session.world()).iter().next().is_none());
        assert!(matches!(events.first(), Some(Event::MatchStarted { .. })));
    }
}
