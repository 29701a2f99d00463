#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Tactics engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intent, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation sinks to react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Tactics.";

/// Number of rows generated when no configuration overrides it.
pub const DEFAULT_GRID_ROWS: u32 = 25;

/// Number of columns generated when no configuration overrides it.
pub const DEFAULT_GRID_COLUMNS: u32 = 25;

/// Share of cells, in percent, the generator attempts to turn into obstacles.
pub const DEFAULT_OBSTACLE_PERCENTAGE: u32 = 20;

/// Widest grid whose columns can still be labelled `A` to `Z`.
pub const MAX_GRID_COLUMNS: u32 = 26;

/// Inclusive bounds of the damage dealt by a counterattack.
pub const COUNTER_DAMAGE: (u32, u32) = (1, 3);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A human clicked the provided grid cell.
    ClickCell {
        /// Cell that received the click.
        cell: CellCoord,
    },
    /// The pointer started hovering the provided cell.
    HoverBegin {
        /// Cell under the pointer.
        cell: CellCoord,
    },
    /// The pointer stopped hovering the provided cell.
    HoverEnd {
        /// Cell the pointer left.
        cell: CellCoord,
    },
    /// The human asks to hand the turn over to the AI.
    EndTurn,
    /// Fires the continuation the world scheduled for itself, if any.
    Resume,
    /// An AI unit attacks an enemy unit.
    Attack {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Unit receiving the attack.
        target: UnitId,
    },
    /// An AI unit moves to a reachable cell.
    MoveUnit {
        /// Unit being moved.
        unit: UnitId,
        /// Cell the unit should end on.
        destination: CellCoord,
    },
    /// An AI unit gives up the rest of its turn.
    Pass {
        /// Unit passing its turn.
        unit: UnitId,
    },
    /// Every AI unit acted and control returns to the human.
    FinishAiTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A fresh match was generated and placement is about to begin.
    MatchStarted {
        /// Number of rows in the generated grid.
        rows: u32,
        /// Number of columns in the generated grid.
        columns: u32,
        /// Number of cells that became obstacles.
        obstacles: u32,
        /// Team that places, and later moves, first.
        first_team: Team,
    },
    /// Placement advanced to a new step.
    PlacementPhaseChanged {
        /// Step that became active.
        phase: PlacementPhase,
    },
    /// A unit joined the board.
    UnitPlaced {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Team owning the unit.
        team: Team,
        /// Archetype of the unit.
        archetype: Archetype,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// A ghost of the unit about to be placed should be drawn.
    PlacementPreview {
        /// Hovered cell.
        cell: CellCoord,
        /// Archetype the next click places.
        archetype: Archetype,
    },
    /// The placement ghost should be removed.
    PreviewCleared,
    /// Placement finished and movement turns begin.
    MovementPhaseStarted {
        /// Team taking the first movement turn.
        first_team: Team,
    },
    /// A team's movement turn started and its per-turn flags were reset.
    TurnStarted {
        /// Team whose turn started.
        team: Team,
    },
    /// The world stored a step it will perform on the next [`Command::Resume`].
    ContinuationScheduled {
        /// Step awaiting a resume.
        continuation: Continuation,
    },
    /// A pending continuation was dropped.
    ContinuationCancelled {
        /// Step that will no longer run.
        continuation: Continuation,
    },
    /// A player unit became the current selection.
    UnitSelected {
        /// Selected unit.
        unit: UnitId,
    },
    /// The selection was cleared.
    SelectionCleared,
    /// The set of highlighted cells changed. Two empty lists clear all highlights.
    HighlightsChanged {
        /// Cells the selected unit may move to.
        movement: Vec<CellCoord>,
        /// Cells the selected unit threatens.
        attack: Vec<CellCoord>,
    },
    /// A unit finished moving.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: CellCoord,
        /// Cell the unit occupies now.
        to: CellCoord,
        /// Full path travelled, start and destination included.
        path: Vec<CellCoord>,
    },
    /// A unit ended its turn without acting.
    UnitPassed {
        /// Unit that passed.
        unit: UnitId,
    },
    /// An attack landed.
    AttackResolved {
        /// Attacking unit.
        attacker: UnitId,
        /// Damaged unit.
        target: UnitId,
        /// Damage rolled for the hit.
        damage: u32,
    },
    /// The target of an attack struck back.
    CounterAttack {
        /// Unit returning fire.
        striker: UnitId,
        /// Unit that initiated the attack.
        victim: UnitId,
        /// Damage rolled for the counter.
        damage: u32,
        /// Whether the damage was recorded as debt instead of applied.
        deferred: bool,
    },
    /// Outstanding counterattack debt was paid at the start of the AI turn.
    CounterDebtResolved {
        /// Unit that took the damage.
        unit: UnitId,
        /// Damage applied.
        damage: u32,
    },
    /// A unit's health changed.
    HealthChanged {
        /// Unit whose health changed.
        unit: UnitId,
        /// Health after the change. May be negative.
        current: i32,
        /// Health the unit started with.
        max: i32,
    },
    /// A unit reached zero health and left the board.
    UnitEliminated {
        /// Removed unit.
        unit: UnitId,
        /// Team that lost the unit.
        team: Team,
        /// Cell the unit vacated.
        cell: CellCoord,
    },
    /// An entry for the human-readable move log.
    MoveLogged {
        /// Unit label such as `HP: S`, optionally followed by context.
        actor: String,
        /// Action keyword such as `Place` or `->`.
        action: String,
        /// Target of the action.
        target: String,
    },
    /// One team has no units left. No further command is accepted.
    GameOver {
        /// Team with surviving units.
        winner: Team,
    },
    /// A command was refused and the world did not change.
    CommandRejected {
        /// Why the command was refused.
        reason: Rejection,
    },
}

/// Steps the world performs on its own once resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continuation {
    /// The AI places the unit required by the current placement step.
    AiPlacement,
    /// The AI takes its movement turn.
    AiTurn,
}

/// Reasons the world refuses a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// The match already ended.
    #[error("the game is over")]
    GameOver,
    /// The cell lies outside the grid.
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellCoord),
    /// The cell is an obstacle.
    #[error("cell {0} is blocked by an obstacle")]
    Obstacle(CellCoord),
    /// The cell already holds a unit.
    #[error("cell {0} is already occupied")]
    Occupied(CellCoord),
    /// No path leads to the cell.
    #[error("no path leads to {0}")]
    NoPath(CellCoord),
    /// The cell lies beyond the unit's movement range.
    #[error("cell {0} is out of movement range")]
    Unreachable(CellCoord),
    /// The target is outside the attacker's range.
    #[error("unit {target} is out of range of unit {attacker}")]
    OutOfRange {
        /// Attacking unit.
        attacker: UnitId,
        /// Intended target.
        target: UnitId,
    },
    /// The unit already attacked this turn.
    #[error("unit {0} already attacked this turn")]
    AlreadyAttacked(UnitId),
    /// The unit already moved this turn.
    #[error("unit {0} already moved this turn")]
    AlreadyMoved(UnitId),
    /// The unit does not exist or was eliminated.
    #[error("unit {0} is not on the board")]
    MissingUnit(UnitId),
    /// The unit belongs to the wrong team for this command.
    #[error("unit {0} cannot act right now")]
    WrongTeam(UnitId),
    /// Both units belong to the same team.
    #[error("unit {0} is an ally")]
    FriendlyTarget(UnitId),
    /// The command requires a different phase of the match.
    #[error("the command is not valid in the current phase")]
    WrongPhase,
    /// Some player unit has neither moved nor attacked.
    #[error("every unit must move or attack before the turn ends")]
    UnitsStillReady,
    /// Resume was requested with nothing scheduled.
    #[error("no continuation is scheduled")]
    NothingScheduled,
}

/// Sides taking part in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The human player.
    Player,
    /// The computer opponent.
    Ai,
}

impl Team {
    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }

    /// Short tag used in unit descriptions and the move log.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Player => "HP",
            Self::Ai => "AI",
        }
    }
}

/// Unit archetypes available to both teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Long range, low health.
    Sniper,
    /// Close quarters, high health.
    Brawler,
}

impl Archetype {
    /// Returns the fixed statistics for the archetype.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            Self::Sniper => UnitStats {
                movement_range: 3,
                attack_kind: AttackKind::Ranged,
                attack_range: 10,
                min_damage: 4,
                max_damage: 8,
                max_health: 20,
            },
            Self::Brawler => UnitStats {
                movement_range: 6,
                attack_kind: AttackKind::Melee,
                attack_range: 1,
                min_damage: 1,
                max_damage: 6,
                max_health: 40,
            },
        }
    }

    /// Display name of the archetype.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sniper => "Sniper",
            Self::Brawler => "Brawler",
        }
    }

    /// Single letter used on boards and in the move log.
    #[must_use]
    pub const fn initial(self) -> char {
        match self {
            Self::Sniper => 'S',
            Self::Brawler => 'B',
        }
    }
}

/// How a unit delivers its attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Only orthogonally adjacent targets.
    Melee,
    /// Any target within Manhattan range.
    Ranged,
}

/// Immutable statistics attached to an archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Maximum number of orthogonal steps per move.
    pub movement_range: u32,
    /// How the unit attacks.
    pub attack_kind: AttackKind,
    /// Maximum Manhattan distance of an attack.
    pub attack_range: u32,
    /// Smallest damage roll, inclusive.
    pub min_damage: u32,
    /// Largest damage roll, inclusive.
    pub max_damage: u32,
    /// Health on placement.
    pub max_health: i32,
}

impl UnitStats {
    /// Reports whether a target at `distance` can be hit.
    #[must_use]
    pub const fn reaches(&self, distance: u32) -> bool {
        match self.attack_kind {
            AttackKind::Melee => distance == 1,
            AttackKind::Ranged => distance >= 1 && distance <= self.attack_range,
        }
    }
}

/// Formats the label shown for a unit, e.g. `HP Sniper`.
#[must_use]
pub fn describe_unit(team: Team, archetype: Archetype) -> String {
    format!("{} {}", team.tag(), archetype.name())
}

/// Steps of the placement phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementPhase {
    /// The human places their sniper.
    PlayerSniper,
    /// The human places their brawler.
    PlayerBrawler,
    /// The AI places its sniper.
    AiSniper,
    /// The AI places its brawler.
    AiBrawler,
    /// Every unit is on the board.
    Completed,
}

impl PlacementPhase {
    /// Step that opens placement when `first` places first.
    #[must_use]
    pub const fn opening(first: Team) -> Self {
        match first {
            Team::Player => Self::PlayerSniper,
            Team::Ai => Self::AiSniper,
        }
    }

    /// Step that follows `self` in the order decided by `first`.
    ///
    /// Snipers are placed before brawlers and the two teams alternate.
    /// `Completed` is absorbing.
    #[must_use]
    pub const fn next(self, first: Team) -> Self {
        match (first, self) {
            (Team::Player, Self::PlayerSniper) => Self::AiSniper,
            (Team::Player, Self::AiSniper) => Self::PlayerBrawler,
            (Team::Player, Self::PlayerBrawler) => Self::AiBrawler,
            (Team::Player, Self::AiBrawler) => Self::Completed,
            (Team::Ai, Self::AiSniper) => Self::PlayerSniper,
            (Team::Ai, Self::PlayerSniper) => Self::AiBrawler,
            (Team::Ai, Self::AiBrawler) => Self::PlayerBrawler,
            (Team::Ai, Self::PlayerBrawler) => Self::Completed,
            (_, _) => Self::Completed,
        }
    }

    /// Team and archetype placed during this step, if any.
    #[must_use]
    pub const fn placing(self) -> Option<(Team, Archetype)> {
        match self {
            Self::PlayerSniper => Some((Team::Player, Archetype::Sniper)),
            Self::PlayerBrawler => Some((Team::Player, Archetype::Brawler)),
            Self::AiSniper => Some((Team::Ai, Archetype::Sniper)),
            Self::AiBrawler => Some((Team::Ai, Archetype::Brawler)),
            Self::Completed => None,
        }
    }
}

/// Cosmetic variety of an obstacle cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Drawn as a tree.
    Tree,
    /// Drawn as a mountain.
    Mountain,
}

/// When counterattack damage reaches the attacker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterTiming {
    /// Damage is applied as soon as the counter is rolled.
    #[default]
    Immediate,
    /// Player attackers accrue the damage and pay it when the AI turn starts.
    Deferred,
}

/// Parameters used to set up a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Obstacle share in percent. Values above 100 are clamped.
    pub obstacle_percentage: u32,
    /// Seed of the match's random source. A fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Team placing first. Chosen at random when absent.
    pub first_team: Option<Team>,
    /// Counterattack timing rule.
    pub counter_timing: CounterTiming,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            columns: DEFAULT_GRID_COLUMNS,
            obstacle_percentage: DEFAULT_OBSTACLE_PERCENTAGE,
            seed: None,
            first_team: None,
            counter_timing: CounterTiming::Immediate,
        }
    }
}

/// Unique identifier assigned to a unit in placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Human readable identifier: a column letter followed by a one-based row.
    ///
    /// Columns past `Z` continue through the following code points, so very
    /// wide grids produce labels such as `[1`.
    #[must_use]
    pub fn label(&self) -> String {
        let letter = char::from_u32(u32::from(b'A') + self.column).unwrap_or('?');
        format!("{letter}{}", self.row + 1)
    }

    /// Parses a label produced by [`CellCoord::label`], ignoring letter case.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut chars = label.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let column = u32::from(letter).checked_sub(u32::from(b'A'))?;
        let row: u32 = chars.as_str().parse().ok()?;
        Some(Self::new(column, row.checked_sub(1)?))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
