#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Grid Tactics adapters.

use glam::Vec2;
use std::{
    collections::{BTreeMap, VecDeque},
    error::Error,
    fmt,
    time::Duration,
};
use tactics_core::{CellCoord, Event, Team, UnitId};

pub use tactics_core::describe_unit;

/// Delay between two rendered steps of a unit walking its path.
pub const STEP_DELAY: Duration = Duration::from_millis(200);

/// Receiver for the presentation-relevant parts of the world event stream.
pub trait PresentationSink {
    /// A unit's health changed; `current` may be zero or negative.
    fn health_changed(&mut self, unit: UnitId, current: i32, max: i32);

    /// A move was appended to the match log.
    fn move_logged(&mut self, actor: &str, action: &str, target: &str);

    /// The selected unit's movement and attack highlights were replaced.
    fn highlights_set(&mut self, movement: &[CellCoord], attack: &[CellCoord]);

    /// The match finished.
    fn game_over(&mut self, player_won: bool);
}

/// Forwards every presentation-relevant event to `sink`, in order.
pub fn dispatch<S>(events: &[Event], sink: &mut S)
where
    S: PresentationSink + ?Sized,
{
    for event in events {
        match event {
            Event::HealthChanged {
                unit,
                current,
                max,
            } => sink.health_changed(*unit, *current, *max),
            Event::MoveLogged {
                actor,
                action,
                target,
            } => sink.move_logged(actor, action, target),
            Event::HighlightsChanged { movement, attack } => sink.highlights_set(movement, attack),
            Event::GameOver { winner } => sink.game_over(*winner == Team::Player),
            _ => {}
        }
    }
}

/// Newest-first list of the most recent log lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveHistory {
    entries: VecDeque<String>,
}

impl MoveHistory {
    /// Number of lines kept before the oldest one is dropped.
    pub const CAPACITY: usize = 7;

    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats and records a log entry, evicting the oldest past capacity.
    pub fn record(&mut self, actor: &str, action: &str, target: &str) {
        self.entries.push_front(format_entry(actor, action, target));
        self.entries.truncate(Self::CAPACITY);
    }

    /// Recorded lines, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// Number of recorded lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders one log entry the way the move history shows it.
#[must_use]
pub fn format_entry(actor: &str, action: &str, target: &str) -> String {
    match action {
        "Place" => format!("{actor} place on {target}"),
        "->" => format!("{actor} --> {target}"),
        _ => format!("{actor} {action} {target}").trim_end().to_owned(),
    }
}

/// Health as last reported for a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthBar {
    /// Current health, possibly negative once the unit falls.
    pub current: i32,
    /// Health the unit started with.
    pub max: i32,
}

/// Heads-up display state assembled from the event stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    health: BTreeMap<UnitId, HealthBar>,
    history: MoveHistory,
    movement: Vec<CellCoord>,
    attack: Vec<CellCoord>,
    outcome: Option<bool>,
}

impl Hud {
    /// Creates an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported health of `unit`.
    #[must_use]
    pub fn health(&self, unit: UnitId) -> Option<HealthBar> {
        self.health.get(&unit).copied()
    }

    /// The move history panel.
    #[must_use]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Cells currently highlighted for movement.
    #[must_use]
    pub fn movement_highlights(&self) -> &[CellCoord] {
        &self.movement
    }

    /// Cells currently highlighted for attacks.
    #[must_use]
    pub fn attack_highlights(&self) -> &[CellCoord] {
        &self.attack
    }

    /// `Some(true)` once the player won, `Some(false)` once the player lost.
    #[must_use]
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    /// Banner shown when the match ends.
    #[must_use]
    pub fn outcome_banner(&self) -> Option<&'static str> {
        self.outcome
            .map(|won| if won { "You win!" } else { "You lose!" })
    }
}

impl PresentationSink for Hud {
    fn health_changed(&mut self, unit: UnitId, current: i32, max: i32) {
        let _ = self.health.insert(unit, HealthBar { current, max });
    }

    fn move_logged(&mut self, actor: &str, action: &str, target: &str) {
        self.history.record(actor, action, target);
    }

    fn highlights_set(&mut self, movement: &[CellCoord], attack: &[CellCoord]) {
        self.movement = movement.to_vec();
        self.attack = attack.to_vec();
    }

    fn game_over(&mut self, player_won: bool) {
        self.outcome = Some(player_won);
    }
}

/// Step-by-step walk of a unit along the path it already completed.
///
/// The world moves units atomically; this only paces how adapters draw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveAnimation {
    unit: UnitId,
    path: Vec<CellCoord>,
    step: Duration,
}

impl MoveAnimation {
    /// Creates an animation with the default [`STEP_DELAY`].
    pub fn new(unit: UnitId, path: Vec<CellCoord>) -> Result<Self, PresentationError> {
        Self::with_step(unit, path, STEP_DELAY)
    }

    /// Creates an animation that spends `step` on every cell transition.
    pub fn with_step(
        unit: UnitId,
        path: Vec<CellCoord>,
        step: Duration,
    ) -> Result<Self, PresentationError> {
        if path.is_empty() {
            return Err(PresentationError::EmptyPath { unit });
        }
        if step.is_zero() {
            return Err(PresentationError::ZeroStep);
        }
        Ok(Self { unit, path, step })
    }

    /// Builds the animation for a [`Event::UnitMoved`] event.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::UnitMoved { unit, path, .. } => Self::new(*unit, path.clone()).ok(),
            _ => None,
        }
    }

    /// Unit being animated.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// Time needed to walk the whole path.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        let transitions = u32::try_from(self.transitions()).unwrap_or(u32::MAX);
        self.step.saturating_mul(transitions)
    }

    /// Whether the unit reached its destination after `elapsed`.
    #[must_use]
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.total_duration()
    }

    /// Cell to draw the unit on after `elapsed`.
    #[must_use]
    pub fn cell_at(&self, elapsed: Duration) -> CellCoord {
        let index = self.completed_steps(elapsed);
        self.path[index]
    }

    /// Fraction of the walk completed after `elapsed`, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        let total = self.total_duration();
        if total.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Interpolated cell-space position of the unit's centre after `elapsed`.
    #[must_use]
    pub fn position_at(&self, elapsed: Duration) -> Vec2 {
        let index = self.completed_steps(elapsed);
        let from = cell_centre(self.path[index]);
        let Some(&next) = self.path.get(index + 1) else {
            return from;
        };
        let into_step = elapsed.saturating_sub(self.step.saturating_mul(index as u32));
        let fraction = (into_step.as_secs_f32() / self.step.as_secs_f32()).clamp(0.0, 1.0);
        from.lerp(cell_centre(next), fraction)
    }

    fn transitions(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn completed_steps(&self, elapsed: Duration) -> usize {
        let steps = elapsed.as_nanos() / self.step.as_nanos();
        usize::try_from(steps)
            .unwrap_or(usize::MAX)
            .min(self.transitions())
    }
}

fn cell_centre(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32 + 0.5, cell.row() as f32 + 0.5)
}

/// Errors that can occur when constructing presentation descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum PresentationError {
    /// A move animation needs at least the starting cell.
    EmptyPath {
        /// Unit whose animation was requested.
        unit: UnitId,
    },
    /// Steps must take time to avoid dividing by zero.
    ZeroStep,
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath { unit } => write!(f, "move animation for {unit} has an empty path"),
            Self::ZeroStep => write!(f, "move animation step delay must be positive"),
        }
    }
}

impl Error for PresentationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::Archetype;

    fn path(cells: &[(u32, u32)]) -> Vec<CellCoord> {
        cells
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect()
    }

    #[test]
    fn history_formats_each_kind_of_entry() {
        assert_eq!(format_entry("HP: S", "Place", "B3"), "HP: S place on B3");
        assert_eq!(format_entry("AI: B A1", "->", "A4"), "AI: B A1 --> A4");
        assert_eq!(format_entry("HP: B", "C7", "5"), "HP: B C7 5");
        assert_eq!(
            format_entry("HP: S D4 2", "Counterattack", ""),
            "HP: S D4 2 Counterattack"
        );
    }

    #[test]
    fn history_keeps_newest_seven_first() {
        let mut history = MoveHistory::new();
        for index in 1..=9 {
            history.record("HP: S", "Place", &format!("A{index}"));
        }

        assert_eq!(history.len(), MoveHistory::CAPACITY);
        let entries: Vec<&str> = history.entries().collect();
        assert_eq!(entries.first(), Some(&"HP: S place on A9"));
        assert_eq!(entries.last(), Some(&"HP: S place on A3"));
    }

    #[test]
    fn dispatch_feeds_the_hud() {
        let unit = UnitId::new(4);
        let events = vec![
            Event::HealthChanged {
                unit,
                current: 12,
                max: 20,
            },
            Event::SelectionCleared,
            Event::MoveLogged {
                actor: "AI: B".to_owned(),
                action: "C3".to_owned(),
                target: "8".to_owned(),
            },
            Event::HighlightsChanged {
                movement: path(&[(0, 1)]),
                attack: path(&[(1, 1), (2, 2)]),
            },
            Event::GameOver { winner: Team::Ai },
        ];
        let mut hud = Hud::new();

        dispatch(&events, &mut hud);

        assert_eq!(hud.health(unit), Some(HealthBar { current: 12, max: 20 }));
        assert_eq!(hud.history().entries().next(), Some("AI: B C3 8"));
        assert_eq!(hud.movement_highlights(), path(&[(0, 1)]).as_slice());
        assert_eq!(hud.attack_highlights().len(), 2);
        assert_eq!(hud.outcome(), Some(false));
        assert_eq!(hud.outcome_banner(), Some("You lose!"));
    }

    #[test]
    fn unit_descriptions_use_team_tags() {
        assert_eq!(describe_unit(Team::Ai, Archetype::Sniper), "AI Sniper");
    }

    #[test]
    fn animation_walks_one_cell_per_step() {
        let animation = MoveAnimation::new(UnitId::new(0), path(&[(0, 0), (1, 0), (1, 1)]))
            .expect("non-empty path");

        assert_eq!(animation.total_duration(), Duration::from_millis(400));
        assert_eq!(animation.cell_at(Duration::ZERO), CellCoord::new(0, 0));
        assert_eq!(animation.cell_at(Duration::from_millis(250)), CellCoord::new(1, 0));
        assert_eq!(animation.cell_at(Duration::from_secs(5)), CellCoord::new(1, 1));
        assert!(!animation.is_finished(Duration::from_millis(399)));
        assert!(animation.is_finished(Duration::from_millis(400)));
        assert!((animation.progress(Duration::from_millis(100)) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn animation_interpolates_between_cell_centres() {
        let animation = MoveAnimation::new(UnitId::new(0), path(&[(0, 0), (1, 0)]))
            .expect("non-empty path");

        let midway = animation.position_at(Duration::from_millis(100));
        assert!((midway - Vec2::new(1.0, 0.5)).length() < 1e-5);
        assert_eq!(animation.position_at(Duration::from_secs(1)), Vec2::new(1.5, 0.5));
    }

    #[test]
    fn single_cell_animation_is_already_finished() {
        let animation =
            MoveAnimation::new(UnitId::new(2), path(&[(3, 3)])).expect("non-empty path");

        assert!(animation.is_finished(Duration::ZERO));
        assert_eq!(animation.progress(Duration::ZERO), 1.0);
    }

    #[test]
    fn animation_rejects_degenerate_input() {
        assert_eq!(
            MoveAnimation::new(UnitId::new(1), Vec::new()),
            Err(PresentationError::EmptyPath {
                unit: UnitId::new(1)
            })
        );
        assert_eq!(
            MoveAnimation::with_step(UnitId::new(1), path(&[(0, 0)]), Duration::ZERO),
            Err(PresentationError::ZeroStep)
        );
    }

    #[test]
    fn animation_comes_from_move_events_only() {
        let moved = Event::UnitMoved {
            unit: UnitId::new(3),
            from: CellCoord::new(0, 0),
            to: CellCoord::new(0, 2),
            path: path(&[(0, 0), (0, 1), (0, 2)]),
        };

        let animation = MoveAnimation::from_event(&moved).expect("move event");
        assert_eq!(animation.unit(), UnitId::new(3));
        assert!(MoveAnimation::from_event(&Event::SelectionCleared).is_none());
    }
}
