#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that plays the AI side of a match.
//!
//! The policy wakes up when the world announces the AI turn, walks the AI
//! units in identifier order, and answers every batch of world events with
//! at most one command. Each unit attacks the first player unit in range;
//! otherwise it closes in on the nearest player unit and checks its range
//! once more. A unit that can do neither passes. Once every unit is done the
//! policy hands the turn back with [`Command::FinishAiTurn`].

use std::collections::VecDeque;

use tactics_core::{CellCoord, Command, Event, Team, UnitId};
use tactics_world::{
    grid::Grid,
    pathfinding::reachable_cells,
    query::{UnitSnapshot, UnitView},
};
use tracing::{debug, warn};

/// What the unit at the head of the queue does next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// Attack, move, or pass.
    Decide,
    /// The unit just moved and may still attack.
    Recheck,
    /// The unit issued its last command and leaves the queue once the world answers.
    Finished,
}

/// AI policy that issues one command per batch of world events.
#[derive(Debug)]
pub struct AiPolicy {
    queue: VecDeque<UnitId>,
    step: Step,
    active: bool,
}

impl Default for AiPolicy {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            step: Step::Decide,
            active: false,
        }
    }
}

impl AiPolicy {
    /// Creates an idle policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the policy is currently playing a turn.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Consumes world events and immutable views to emit the next AI command.
    pub fn handle(&mut self, events: &[Event], units: &UnitView, grid: &Grid, out: &mut Vec<Command>) {
        if events.is_empty() {
            return;
        }

        for event in events {
            match event {
                Event::TurnStarted { team: Team::Ai } => self.begin_turn(units),
                Event::TurnStarted { team: Team::Player } | Event::GameOver { .. } => {
                    self.end_turn();
                }
                Event::UnitEliminated { unit, .. } => {
                    if self.queue.front() == Some(unit) {
                        self.step = Step::Decide;
                    }
                    self.queue.retain(|queued| queued != unit);
                }
                Event::CommandRejected { reason } if self.active => {
                    if self.step == Step::Decide {
                        debug!(%reason, "rejection without a pending AI command");
                    } else {
                        warn!(%reason, "AI command rejected, skipping unit");
                        self.advance();
                    }
                }
                _ => {}
            }
        }

        if !self.active {
            return;
        }
        if self.step == Step::Finished {
            self.advance();
        }

        while let Some(&current) = self.queue.front() {
            let Some(unit) = find(units, current) else {
                self.advance();
                continue;
            };

            match self.step {
                Step::Decide => {
                    if let Some(target) = choose_target(unit, units) {
                        debug!(unit = %current, %target, "AI attacks");
                        out.push(Command::Attack {
                            attacker: current,
                            target,
                        });
                        self.step = Step::Finished;
                    } else if let Some(destination) = choose_destination(unit, units, grid) {
                        debug!(unit = %current, %destination, "AI moves");
                        out.push(Command::MoveUnit {
                            unit: current,
                            destination,
                        });
                        self.step = Step::Recheck;
                    } else {
                        debug!(unit = %current, "AI passes");
                        out.push(Command::Pass { unit: current });
                        self.step = Step::Finished;
                    }
                    return;
                }
                Step::Recheck => {
                    if let Some(target) = choose_target(unit, units) {
                        debug!(unit = %current, %target, "AI attacks after moving");
                        out.push(Command::Attack {
                            attacker: current,
                            target,
                        });
                        self.step = Step::Finished;
                        return;
                    }
                    self.advance();
                }
                Step::Finished => self.advance(),
            }
        }

        self.active = false;
        out.push(Command::FinishAiTurn);
    }

    fn begin_turn(&mut self, units: &UnitView) {
        self.queue = units.team(Team::Ai).map(|unit| unit.id).collect();
        self.step = Step::Decide;
        self.active = true;
    }

    fn end_turn(&mut self) {
        self.queue.clear();
        self.step = Step::Decide;
        self.active = false;
    }

    fn advance(&mut self) {
        let _ = self.queue.pop_front();
        self.step = Step::Decide;
    }
}

fn find(units: &UnitView, id: UnitId) -> Option<&UnitSnapshot> {
    units.iter().find(|unit| unit.id == id)
}

/// First enemy unit, in identifier order, that `attacker` can hit from where it stands.
#[must_use]
pub fn choose_target(attacker: &UnitSnapshot, units: &UnitView) -> Option<UnitId> {
    units
        .team(attacker.team.opponent())
        .filter(|enemy| enemy.health > 0)
        .find(|enemy| {
            attacker
                .stats
                .reaches(attacker.cell.manhattan_distance(enemy.cell))
        })
        .map(|enemy| enemy.id)
}

/// Reachable cell that brings `unit` closest to the nearest enemy.
///
/// The nearest enemy is measured by Manhattan distance from the unit's
/// current cell; ties go to the enemy with the lower identifier and to the
/// cell discovered first by the reachability search.
#[must_use]
pub fn choose_destination(unit: &UnitSnapshot, units: &UnitView, grid: &Grid) -> Option<CellCoord> {
    let nearest = units
        .team(unit.team.opponent())
        .filter(|enemy| enemy.health > 0)
        .min_by_key(|enemy| unit.cell.manhattan_distance(enemy.cell))?;

    reachable_cells(grid, unit.cell, unit.stats.movement_range)
        .into_iter()
        .min_by_key(|cell| cell.manhattan_distance(nearest.cell))
}
