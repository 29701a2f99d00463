#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Tactics.
//!
//! The world owns the grid, the unit roster, and the single seeded random
//! source of a match. Adapters and systems never mutate it directly; they
//! submit [`Command`] values through [`apply`] and observe the resulting
//! [`Event`] stream together with the read-only [`query`] functions.

mod combat;
pub mod grid;
pub mod pathfinding;
mod units;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tactics_core::{
    Archetype, AttackKind, CellCoord, Command, Continuation, CounterTiming, Event, MatchConfig,
    PlacementPhase, Rejection, Team, UnitId, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

use crate::{
    grid::{Cell, Grid},
    pathfinding::{attack_cells, reachable_cells, shortest_path},
    units::{Unit, UnitRoster},
};

/// Cells highlighted for the selected unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Highlights {
    movement: Vec<CellCoord>,
    attack: Vec<CellCoord>,
}

/// A unit to put on the board when a match starts from a prepared position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Owning team.
    pub team: Team,
    /// Archetype of the unit.
    pub archetype: Archetype,
    /// Cell the unit starts on.
    pub cell: CellCoord,
}

/// Represents the authoritative Grid Tactics world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    seed: u64,
    grid: Grid,
    units: UnitRoster,
    rng: ChaCha8Rng,
    counter_timing: CounterTiming,
    first_team: Team,
    placement: PlacementPhase,
    turn: Team,
    selected: Option<UnitId>,
    highlights: Highlights,
    preview: Option<CellCoord>,
    pending: Option<Continuation>,
    winner: Option<Team>,
}

impl World {
    /// Creates a new match, generating the grid from the configuration.
    ///
    /// The opening events (match start, first placement step, and a
    /// scheduled AI placement when the AI goes first) are appended to
    /// `out_events`.
    #[must_use]
    pub fn new(config: &MatchConfig, out_events: &mut Vec<Event>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::generate(config.columns, config.rows, config.obstacle_percentage, &mut rng);
        let mut world = Self::assemble(grid, rng, seed, config);
        world.open_placement(out_events);
        world
    }

    /// Creates a new match on a prepared grid.
    ///
    /// Only the obstacle layout of `grid` is kept; any occupancy it carries
    /// is discarded. Grid dimensions in `config` are ignored.
    #[must_use]
    pub fn with_grid(mut grid: Grid, config: &MatchConfig, out_events: &mut Vec<Event>) -> Self {
        grid.clear_occupancy();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut world = Self::assemble(grid, ChaCha8Rng::seed_from_u64(seed), seed, config);
        world.open_placement(out_events);
        world
    }

    /// Creates a match on a prepared grid with every unit already deployed.
    ///
    /// Units are placed in slice order, so identifiers follow it, and the
    /// match starts directly in the movement phase with the configured (or
    /// randomly drawn) first team. Fails on the first deployment that does
    /// not land on a free cell.
    pub fn with_deployment(
        mut grid: Grid,
        config: &MatchConfig,
        deployment: &[Deployment],
        out_events: &mut Vec<Event>,
    ) -> Result<Self, Rejection> {
        grid.clear_occupancy();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut world = Self::assemble(grid, ChaCha8Rng::seed_from_u64(seed), seed, config);
        world.announce(out_events);

        for unit in deployment {
            world.ensure_free(unit.cell)?;
            world.place(unit.team, unit.archetype, unit.cell, out_events);
        }
        world.placement = PlacementPhase::Completed;
        out_events.push(Event::PlacementPhaseChanged {
            phase: PlacementPhase::Completed,
        });
        world.start_movement_phase(out_events);
        Ok(world)
    }

    fn assemble(grid: Grid, mut rng: ChaCha8Rng, seed: u64, config: &MatchConfig) -> Self {
        let first_team = config.first_team.unwrap_or_else(|| {
            if rng.gen_bool(0.5) {
                Team::Player
            } else {
                Team::Ai
            }
        });

        Self {
            banner: WELCOME_BANNER,
            seed,
            grid,
            units: UnitRoster::new(),
            rng,
            counter_timing: config.counter_timing,
            first_team,
            placement: PlacementPhase::opening(first_team),
            turn: first_team,
            selected: None,
            highlights: Highlights::default(),
            preview: None,
            pending: None,
            winner: None,
        }
    }

    fn announce(&self, out_events: &mut Vec<Event>) {
        let obstacles = u32::try_from(self.grid.obstacle_count()).unwrap_or(u32::MAX);
        info!(
            seed = self.seed,
            rows = self.grid.rows(),
            columns = self.grid.columns(),
            obstacles,
            first_team = ?self.first_team,
            "match started"
        );
        out_events.push(Event::MatchStarted {
            rows: self.grid.rows(),
            columns: self.grid.columns(),
            obstacles,
            first_team: self.first_team,
        });
    }

    fn open_placement(&mut self, out_events: &mut Vec<Event>) {
        self.announce(out_events);
        out_events.push(Event::PlacementPhaseChanged {
            phase: self.placement,
        });
        if self.first_team == Team::Ai {
            self.schedule(Continuation::AiPlacement, out_events);
        }
    }

    fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        if self.winner.is_some() {
            return Err(Rejection::GameOver);
        }

        match command {
            Command::ClickCell { cell } => self.click(cell, out_events),
            Command::HoverBegin { cell } => {
                self.hover(cell, out_events);
                Ok(())
            }
            Command::HoverEnd { cell } => {
                if self.preview == Some(cell) {
                    self.clear_preview(out_events);
                }
                Ok(())
            }
            Command::EndTurn => self.end_player_turn(out_events),
            Command::Resume => self.resume(out_events),
            Command::Attack { attacker, target } => {
                self.ensure_ai_unit(attacker)?;
                self.validate_attack(attacker, target)?;
                combat::resolve_attack(self, attacker, target, out_events)
            }
            Command::MoveUnit { unit, destination } => {
                self.ensure_ai_unit(unit)?;
                let path = self.validate_move(unit, destination)?;
                self.apply_move(unit, path, out_events);
                Ok(())
            }
            Command::Pass { unit } => {
                self.ensure_ai_unit(unit)?;
                if let Some(unit) = self.units.get_mut(unit) {
                    unit.has_moved = true;
                }
                out_events.push(Event::UnitPassed { unit });
                Ok(())
            }
            Command::FinishAiTurn => {
                if !self.ai_may_act() {
                    return Err(Rejection::WrongPhase);
                }
                self.hand_over(Team::Player, out_events);
                Ok(())
            }
        }
    }

    fn click(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        if !self.grid.contains(cell) {
            return Err(Rejection::OutOfBounds(cell));
        }
        if self.placement != PlacementPhase::Completed {
            return self.place_player_unit(cell, out_events);
        }
        if self.turn != Team::Player {
            return Err(Rejection::WrongPhase);
        }

        let occupant = self.grid.cell(cell).and_then(Cell::occupant);
        let Some(selected) = self.selected else {
            if let Some(unit) = occupant.filter(|unit| self.is_on_team(*unit, Team::Player)) {
                self.select(unit, out_events);
            }
            return Ok(());
        };

        if self.units.get(selected).map(|unit| unit.cell) == Some(cell) {
            self.clear_selection(out_events);
            return Ok(());
        }

        match occupant.and_then(|unit| self.units.get(unit)).map(|unit| (unit.id, unit.team)) {
            Some((unit, Team::Player)) => {
                self.select(unit, out_events);
                Ok(())
            }
            Some((enemy, Team::Ai)) => {
                self.validate_attack(selected, enemy)?;
                combat::resolve_attack(self, selected, enemy, out_events)?;
                self.clear_selection(out_events);
                Ok(())
            }
            None => {
                let path = self.validate_move(selected, cell)?;
                self.apply_move(selected, path, out_events);
                self.refresh_highlights(out_events);
                Ok(())
            }
        }
    }

    fn hover(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some((Team::Player, archetype)) = self.placement.placing() else {
            return;
        };
        if !self.grid.cell(cell).map_or(false, Cell::is_free) {
            return;
        }
        if self.preview.is_some() {
            self.clear_preview(out_events);
        }
        self.preview = Some(cell);
        out_events.push(Event::PlacementPreview { cell, archetype });
    }

    fn clear_preview(&mut self, out_events: &mut Vec<Event>) {
        if self.preview.take().is_some() {
            out_events.push(Event::PreviewCleared);
        }
    }

    fn place_player_unit(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        let Some((Team::Player, archetype)) = self.placement.placing() else {
            return Err(Rejection::WrongPhase);
        };
        self.ensure_free(cell)?;
        self.clear_preview(out_events);
        self.place(Team::Player, archetype, cell, out_events);
        self.advance_placement(out_events);
        Ok(())
    }

    fn place_ai_unit(&mut self, out_events: &mut Vec<Event>) {
        let Some((Team::Ai, archetype)) = self.placement.placing() else {
            return;
        };
        let free = self.grid.free_cells();
        match free.choose(&mut self.rng) {
            Some(&cell) => self.place(Team::Ai, archetype, cell, out_events),
            None => warn!(?archetype, "no free cell left for AI placement"),
        }
        self.advance_placement(out_events);
    }

    fn place(
        &mut self,
        team: Team,
        archetype: Archetype,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let unit = self.units.spawn(team, archetype, cell);
        self.grid.set_occupant(cell, Some(unit));
        let max = archetype.stats().max_health;

        info!(%unit, ?team, ?archetype, %cell, "unit placed");
        out_events.push(Event::UnitPlaced {
            unit,
            team,
            archetype,
            cell,
        });
        out_events.push(Event::HealthChanged {
            unit,
            current: max,
            max,
        });
        out_events.push(Event::MoveLogged {
            actor: log_tag(team, archetype),
            action: String::from("Place"),
            target: cell.label(),
        });
    }

    fn advance_placement(&mut self, out_events: &mut Vec<Event>) {
        self.placement = self.placement.next(self.first_team);
        out_events.push(Event::PlacementPhaseChanged {
            phase: self.placement,
        });

        match self.placement.placing() {
            Some((Team::Ai, _)) => self.schedule(Continuation::AiPlacement, out_events),
            Some((Team::Player, _)) => {}
            None => self.start_movement_phase(out_events),
        }
    }

    fn start_movement_phase(&mut self, out_events: &mut Vec<Event>) {
        for unit in self.units.iter_mut() {
            unit.reset_turn();
        }
        self.clear_selection(out_events);

        info!(first_team = ?self.first_team, "movement phase started");
        out_events.push(Event::MovementPhaseStarted {
            first_team: self.first_team,
        });
        self.hand_over(self.first_team, out_events);
    }

    fn hand_over(&mut self, team: Team, out_events: &mut Vec<Event>) {
        self.turn = team;
        match team {
            Team::Player => self.start_turn(Team::Player, out_events),
            Team::Ai => self.schedule(Continuation::AiTurn, out_events),
        }
    }

    fn start_turn(&mut self, team: Team, out_events: &mut Vec<Event>) {
        for unit in self.units.iter_mut().filter(|unit| unit.team == team) {
            unit.reset_turn();
        }

        debug!(?team, "turn started");
        out_events.push(Event::TurnStarted { team });
        if team == Team::Ai {
            combat::settle_counter_debts(self, out_events);
        }
    }

    fn end_player_turn(&mut self, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        if self.placement != PlacementPhase::Completed || self.turn != Team::Player {
            return Err(Rejection::WrongPhase);
        }
        if self.units.team(Team::Player).any(|unit| !unit.has_acted()) {
            return Err(Rejection::UnitsStillReady);
        }

        self.clear_selection(out_events);
        self.hand_over(Team::Ai, out_events);
        Ok(())
    }

    fn schedule(&mut self, continuation: Continuation, out_events: &mut Vec<Event>) {
        self.pending = Some(continuation);
        out_events.push(Event::ContinuationScheduled { continuation });
    }

    fn resume(&mut self, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        let Some(continuation) = self.pending.take() else {
            return Err(Rejection::NothingScheduled);
        };

        match continuation {
            Continuation::AiPlacement => self.place_ai_unit(out_events),
            Continuation::AiTurn => self.start_turn(Team::Ai, out_events),
        }
        Ok(())
    }

    fn ai_may_act(&self) -> bool {
        self.placement == PlacementPhase::Completed
            && self.turn == Team::Ai
            && self.pending.is_none()
    }

    fn ensure_ai_unit(&self, unit: UnitId) -> Result<(), Rejection> {
        if !self.ai_may_act() {
            return Err(Rejection::WrongPhase);
        }
        match self.units.get(unit) {
            None => Err(Rejection::MissingUnit(unit)),
            Some(found) if found.team != Team::Ai => Err(Rejection::WrongTeam(unit)),
            Some(_) => Ok(()),
        }
    }

    fn ensure_free(&self, cell: CellCoord) -> Result<(), Rejection> {
        let found = self.grid.cell(cell).ok_or(Rejection::OutOfBounds(cell))?;
        if found.is_obstacle() {
            return Err(Rejection::Obstacle(cell));
        }
        if found.is_occupied() {
            return Err(Rejection::Occupied(cell));
        }
        Ok(())
    }

    fn is_on_team(&self, unit: UnitId, team: Team) -> bool {
        self.units.get(unit).map_or(false, |found| found.team == team)
    }

    fn validate_attack(&self, attacker: UnitId, target: UnitId) -> Result<(), Rejection> {
        let striking = self
            .units
            .get(attacker)
            .ok_or(Rejection::MissingUnit(attacker))?;
        if striking.has_attacked {
            return Err(Rejection::AlreadyAttacked(attacker));
        }
        let struck = self
            .units
            .get(target)
            .filter(|unit| unit.is_alive())
            .ok_or(Rejection::MissingUnit(target))?;
        if struck.team == striking.team {
            return Err(Rejection::FriendlyTarget(target));
        }
        if !striking
            .stats
            .reaches(striking.cell.manhattan_distance(struck.cell))
        {
            return Err(Rejection::OutOfRange { attacker, target });
        }
        Ok(())
    }

    fn validate_move(
        &self,
        unit: UnitId,
        destination: CellCoord,
    ) -> Result<Vec<CellCoord>, Rejection> {
        let moving = self.units.get(unit).ok_or(Rejection::MissingUnit(unit))?;
        if moving.has_moved {
            return Err(Rejection::AlreadyMoved(unit));
        }
        if moving.has_attacked {
            return Err(Rejection::AlreadyAttacked(unit));
        }
        self.ensure_free(destination)?;

        let reachable = reachable_cells(&self.grid, moving.cell, moving.stats.movement_range);
        if !reachable.contains(&destination) {
            return Err(Rejection::Unreachable(destination));
        }
        let path = shortest_path(&self.grid, moving.cell, destination);
        if path.is_empty() {
            return Err(Rejection::NoPath(destination));
        }
        Ok(path)
    }

    fn apply_move(&mut self, unit_id: UnitId, path: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let Some(&to) = path.last() else {
            return;
        };
        let Some(unit) = self.units.get_mut(unit_id) else {
            return;
        };
        let from = unit.cell;
        unit.cell = to;
        unit.has_moved = true;
        let actor = format!("{} {}", log_tag(unit.team, unit.archetype), from.label());

        self.grid.set_occupant(from, None);
        self.grid.set_occupant(to, Some(unit_id));

        debug!(%unit_id, %from, %to, steps = path.len() - 1, "unit moved");
        out_events.push(Event::UnitMoved {
            unit: unit_id,
            from,
            to,
            path,
        });
        out_events.push(Event::MoveLogged {
            actor,
            action: String::from("->"),
            target: to.label(),
        });
    }

    fn select(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        self.selected = Some(unit);
        out_events.push(Event::UnitSelected { unit });
        self.refresh_highlights(out_events);
    }

    fn clear_selection(&mut self, out_events: &mut Vec<Event>) {
        if self.selected.take().is_some() {
            out_events.push(Event::SelectionCleared);
        }
        self.set_highlights(Highlights::default(), out_events);
    }

    fn refresh_highlights(&mut self, out_events: &mut Vec<Event>) {
        let highlights = self
            .selected
            .and_then(|unit| self.units.get(unit))
            .map(|unit| highlights_for(&self.grid, unit))
            .unwrap_or_default();
        self.set_highlights(highlights, out_events);
    }

    fn set_highlights(&mut self, highlights: Highlights, out_events: &mut Vec<Event>) {
        if highlights == self.highlights {
            return;
        }
        self.highlights = highlights;
        out_events.push(Event::HighlightsChanged {
            movement: self.highlights.movement.clone(),
            attack: self.highlights.attack.clone(),
        });
    }

    /// Removes a unit from the board and checks whether its team is wiped out.
    fn eliminate(&mut self, unit_id: UnitId, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.remove(unit_id) else {
            return;
        };
        self.grid.set_occupant(unit.cell, None);
        if self.selected == Some(unit_id) {
            self.clear_selection(out_events);
        }

        info!(%unit_id, team = ?unit.team, cell = %unit.cell, "unit eliminated");
        out_events.push(Event::UnitEliminated {
            unit: unit_id,
            team: unit.team,
            cell: unit.cell,
        });
        self.check_victory(out_events);
    }

    fn check_victory(&mut self, out_events: &mut Vec<Event>) {
        if self.winner.is_some() {
            return;
        }
        let winner = if !self.units.has_survivors(Team::Ai) {
            Team::Player
        } else if !self.units.has_survivors(Team::Player) {
            Team::Ai
        } else {
            return;
        };

        self.winner = Some(winner);
        self.clear_selection(out_events);
        if let Some(continuation) = self.pending.take() {
            out_events.push(Event::ContinuationCancelled { continuation });
        }
        info!(?winner, "game over");
        out_events.push(Event::GameOver { winner });
    }
}

/// Applies the provided command to the world.
///
/// Illegal commands leave the world untouched and are reported through a
/// single [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let description = format!("{command:?}");
    if let Err(reason) = world.execute(command, out_events) {
        warn!(command = %description, %reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }
}

/// Move log tag of a unit, e.g. `HP: S`.
pub(crate) fn log_tag(team: Team, archetype: Archetype) -> String {
    format!("{}: {}", team.tag(), archetype.initial())
}

fn highlights_for(grid: &Grid, unit: &Unit) -> Highlights {
    if unit.has_attacked {
        return Highlights::default();
    }

    let movement = if unit.has_moved {
        Vec::new()
    } else {
        reachable_cells(grid, unit.cell, unit.stats.movement_range)
    };
    let mut attack = attack_cells(grid, unit.cell, &unit.stats);
    if unit.stats.attack_kind == AttackKind::Ranged {
        attack.retain(|cell| !movement.contains(cell));
    }
    Highlights { movement, attack }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tactics_core::{
        Archetype, CellCoord, Continuation, PlacementPhase, Team, UnitId, UnitStats,
    };

    use super::{Grid, Unit, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Seed of the match's random source.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Provides read-only access to the battlefield grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Team that placed first and takes the first movement turn.
    #[must_use]
    pub fn first_team(world: &World) -> Team {
        world.first_team
    }

    /// Current placement step.
    #[must_use]
    pub fn placement_phase(world: &World) -> PlacementPhase {
        world.placement
    }

    /// Team whose movement turn is active, if placement is over and the game is not.
    #[must_use]
    pub fn active_team(world: &World) -> Option<Team> {
        if world.placement != PlacementPhase::Completed || world.winner.is_some() {
            return None;
        }
        Some(world.turn)
    }

    /// Continuation awaiting a resume, if any.
    #[must_use]
    pub fn pending_continuation(world: &World) -> Option<Continuation> {
        world.pending
    }

    /// Unit currently selected by the human.
    #[must_use]
    pub fn selected_unit(world: &World) -> Option<UnitId> {
        world.selected
    }

    /// Cells the selected unit may move to.
    #[must_use]
    pub fn movement_highlights(world: &World) -> &[CellCoord] {
        &world.highlights.movement
    }

    /// Cells the selected unit threatens.
    #[must_use]
    pub fn attack_highlights(world: &World) -> &[CellCoord] {
        &world.highlights.attack
    }

    /// Cell showing the placement ghost, if any.
    #[must_use]
    pub fn placement_preview(world: &World) -> Option<CellCoord> {
        world.preview
    }

    /// Winner of the match once it is over.
    #[must_use]
    pub fn winner(world: &World) -> Option<Team> {
        world.winner
    }

    /// Captures a read-only view of every unit on the board.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView {
            snapshots: world.units.iter().map(snapshot).collect(),
        }
    }

    /// Snapshot of a single unit, if it is still on the board.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world.units.get(id).map(snapshot)
    }

    /// Reports whether every unit and every occupied cell point at each other.
    #[must_use]
    pub fn occupancy_is_consistent(world: &World) -> bool {
        let units_agree = world.units.iter().all(|unit| {
            world.grid.cell(unit.cell).and_then(|cell| cell.occupant()) == Some(unit.id)
        });
        let cells_agree = world.grid.cells().all(|cell| match cell.occupant() {
            None => true,
            Some(id) => world
                .units
                .get(id)
                .map_or(false, |unit| unit.cell == cell.coord() && unit.is_alive()),
        });
        units_agree && cells_agree
    }

    fn snapshot(unit: &Unit) -> UnitSnapshot {
        UnitSnapshot {
            id: unit.id,
            team: unit.team,
            archetype: unit.archetype,
            stats: unit.stats,
            cell: unit.cell,
            health: unit.health,
            has_moved: unit.has_moved,
            has_attacked: unit.has_attacked,
            counter_debt: unit.counter_debt,
        }
    }

    /// Read-only snapshot describing all units on the board.
    #[derive(Clone, Debug)]
    pub struct UnitView {
        snapshots: Vec<UnitSnapshot>,
    }

    impl UnitView {
        /// Iterator over the captured unit snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter()
        }

        /// Snapshots belonging to the provided team, in identifier order.
        pub fn team(&self, team: Team) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter().filter(move |unit| unit.team == team)
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<UnitSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single unit used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UnitSnapshot {
        /// Unique identifier assigned at placement.
        pub id: UnitId,
        /// Owning team.
        pub team: Team,
        /// Archetype of the unit.
        pub archetype: Archetype,
        /// Statistics derived from the archetype.
        pub stats: UnitStats,
        /// Cell the unit stands on.
        pub cell: CellCoord,
        /// Remaining health.
        pub health: i32,
        /// Whether the unit moved this turn.
        pub has_moved: bool,
        /// Whether the unit attacked this turn.
        pub has_attacked: bool,
        /// Counterattack damage the unit still owes.
        pub counter_debt: u32,
    }
}
