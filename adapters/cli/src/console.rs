use std::{
    collections::BTreeMap,
    error::Error,
    fmt,
    io::{BufRead, Write},
};

use anyhow::{Context, Result};
use tactics_core::{CellCoord, Command, Event, ObstacleKind, Team, UnitId};
use tactics_presentation::{describe_unit, dispatch, Hud, MoveAnimation};
use tactics_system_session::Session;
use tactics_world::query;
use tracing::debug;

use crate::scenario_transfer::ScenarioSnapshot;

const HELP: &str = "commands: click <cell>, hover <cell>, unhover <cell>, end, board, export, help, quit";

/// A single line of console input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Click(CellCoord),
    Hover(CellCoord),
    Unhover(CellCoord),
    End,
    Board,
    Export,
    Help,
    Quit,
}

/// Reasons a console line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputError {
    /// The first word is not a known command.
    UnknownCommand(String),
    /// The command needs a cell label such as `B3`.
    MissingCell(&'static str),
    /// The cell label could not be parsed.
    InvalidCell(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(word) => write!(f, "unknown command '{word}'"),
            Self::MissingCell(command) => write!(f, "'{command}' needs a cell such as B3"),
            Self::InvalidCell(label) => write!(f, "'{label}' is not a cell label"),
        }
    }
}

impl Error for InputError {}

/// Parses one line; blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<Input>, InputError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "click" => Input::Click(cell_argument("click", words.next())?),
        "hover" => Input::Hover(cell_argument("hover", words.next())?),
        "unhover" => Input::Unhover(cell_argument("unhover", words.next())?),
        "end" => Input::End,
        "board" => Input::Board,
        "export" => Input::Export,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => return Err(InputError::UnknownCommand(command.to_owned())),
    };
    Ok(Some(input))
}

fn cell_argument(command: &'static str, word: Option<&str>) -> Result<CellCoord, InputError> {
    let word = word.ok_or(InputError::MissingCell(command))?;
    CellCoord::parse_label(word).ok_or_else(|| InputError::InvalidCell(word.to_owned()))
}

/// Whether the console keeps reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Text front end that feeds console input into a [`Session`].
#[derive(Debug)]
pub(crate) struct Console {
    session: Session,
    hud: Hud,
    names: BTreeMap<UnitId, String>,
}

impl Console {
    /// Wraps a session and reports the events it produced while starting.
    pub(crate) fn new<W: Write>(session: Session, opening: &[Event], out: &mut W) -> Result<Self> {
        let mut console = Self {
            session,
            hud: Hud::new(),
            names: BTreeMap::new(),
        };
        let world = console.session.world();
        writeln!(out, "{}", query::welcome_banner(world))?;
        writeln!(out, "seed {}", query::seed(world))?;
        console.report(opening, out)?;
        console.show_board(out)?;
        console.show_prompt(out)?;
        Ok(console)
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Processes every line of `input` until it ends or asks to quit.
    pub(crate) fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read console input")?;
            if self.handle_line(&line, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Processes one line of input.
    pub(crate) fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let input = match parse_line(line) {
            Ok(Some(input)) => input,
            Ok(None) => return Ok(Flow::Continue),
            Err(error) => {
                writeln!(out, "error: {error}")?;
                return Ok(Flow::Continue);
            }
        };
        debug!(?input, "console input");

        let command = match input {
            Input::Click(cell) => Command::ClickCell { cell },
            Input::Hover(cell) => Command::HoverBegin { cell },
            Input::Unhover(cell) => Command::HoverEnd { cell },
            Input::End => Command::EndTurn,
            Input::Board => {
                self.show_board(out)?;
                return Ok(Flow::Continue);
            }
            Input::Export => {
                let scenario = ScenarioSnapshot::capture(self.session.world())
                    .encode()
                    .context("failed to encode scenario")?;
                writeln!(out, "{scenario}")?;
                return Ok(Flow::Continue);
            }
            Input::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Input::Quit => return Ok(Flow::Quit),
        };

        let mut events = Vec::new();
        self.session.submit(command, &mut events);
        self.report(&events, out)?;
        if changes_board(&events) {
            self.show_board(out)?;
        }
        self.show_prompt(out)?;
        Ok(Flow::Continue)
    }

    fn report<W: Write>(&mut self, events: &[Event], out: &mut W) -> Result<()> {
        dispatch(events, &mut self.hud);
        for event in events {
            if let Event::UnitPlaced {
                unit,
                team,
                archetype,
                ..
            } = event
            {
                let _ = self
                    .names
                    .insert(*unit, format!("{} {unit}", describe_unit(*team, *archetype)));
            }
            if let Some(line) = self.narrate(event) {
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }

    fn name(&self, unit: UnitId) -> String {
        self.names
            .get(&unit)
            .cloned()
            .unwrap_or_else(|| unit.to_string())
    }

    fn narrate(&self, event: &Event) -> Option<String> {
        let line = match event {
            Event::MatchStarted {
                rows,
                columns,
                obstacles,
                first_team,
            } => format!(
                "{columns}x{rows} grid with {obstacles} obstacles, {} places first",
                side(*first_team)
            ),
            Event::UnitPlaced { unit, cell, .. } => {
                format!("{} placed on {cell}", self.name(*unit))
            }
            Event::TurnStarted { team } => format!("-- {} turn --", side(*team)),
            Event::UnitMoved {
                unit,
                from,
                to,
                path,
            } => {
                let animation = MoveAnimation::from_event(event)?;
                format!(
                    "{} moved {from} -> {to} in {} steps ({:.1} s)",
                    self.name(*unit),
                    path.len().saturating_sub(1),
                    animation.total_duration().as_secs_f32()
                )
            }
            Event::UnitPassed { unit } => format!("{} holds position", self.name(*unit)),
            Event::AttackResolved {
                attacker,
                target,
                damage,
            } => format!(
                "{} hits {} for {damage}",
                self.name(*attacker),
                self.name(*target)
            ),
            Event::CounterAttack {
                striker,
                victim,
                damage,
                deferred: false,
            } => format!(
                "{} counters {} for {damage}",
                self.name(*striker),
                self.name(*victim)
            ),
            Event::CounterAttack {
                striker,
                victim,
                damage,
                deferred: true,
            } => format!(
                "{} will counter {} for {damage} when the AI turn starts",
                self.name(*striker),
                self.name(*victim)
            ),
            Event::CounterDebtResolved { unit, damage } => {
                format!("{} takes {damage} delayed counter damage", self.name(*unit))
            }
            Event::UnitEliminated { unit, cell, .. } => {
                format!("{} eliminated on {cell}", self.name(*unit))
            }
            Event::GameOver { .. } => self.hud.outcome_banner()?.to_owned(),
            Event::CommandRejected { reason } => format!("rejected: {reason}"),
            _ => return None,
        };
        Some(line)
    }

    fn show_prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        let world = self.session.world();
        if query::winner(world).is_some() {
            return Ok(());
        }
        if let Some((Team::Player, archetype)) = query::placement_phase(world).placing() {
            writeln!(out, "place your {}: click a free cell", archetype.name())?;
        } else if query::active_team(world) == Some(Team::Player) {
            writeln!(
                out,
                "your turn: select a unit, click a cell to move or an enemy to attack, `end` once every unit acted"
            )?;
        }
        Ok(())
    }

    fn show_board<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", render_board(&self.session, &self.hud))?;
        for unit in query::unit_view(self.session.world()).iter() {
            let health = self
                .hud
                .health(unit.id)
                .map_or(unit.health, |bar| bar.current);
            writeln!(
                out,
                "  {} {} {health}/{}",
                self.name(unit.id),
                unit.cell,
                unit.stats.max_health
            )?;
        }
        if !self.hud.history().is_empty() {
            writeln!(out, "moves:")?;
            for entry in self.hud.history().entries() {
                writeln!(out, "  {entry}")?;
            }
        }
        Ok(())
    }
}

fn side(team: Team) -> &'static str {
    match team {
        Team::Player => "player",
        Team::Ai => "AI",
    }
}

fn changes_board(events: &[Event]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            Event::UnitPlaced { .. }
                | Event::UnitMoved { .. }
                | Event::UnitEliminated { .. }
                | Event::HighlightsChanged { .. }
                | Event::PlacementPreview { .. }
        )
    })
}

/// Draws the grid with column letters and row numbers.
///
/// Player units use upper-case initials and AI units lower-case ones.
/// Movement highlights show as `*`, threatened empty cells as `x`, and the
/// placement preview as `?`.
pub(crate) fn render_board(session: &Session, hud: &Hud) -> String {
    let world = session.world();
    let grid = query::grid(world);
    let units = query::unit_view(world);
    let preview = query::placement_preview(world);

    let mut board = String::from("   ");
    for column in 0..grid.columns() {
        board.push(' ');
        board.push(char::from_u32(u32::from(b'A') + column).unwrap_or('?'));
    }
    board.push('\n');

    for row in 0..grid.rows() {
        board.push_str(&format!("{:>3}", row + 1));
        for column in 0..grid.columns() {
            let coord = CellCoord::new(column, row);
            let unit = units.iter().find(|unit| unit.cell == coord);
            let symbol = match (grid.cell(coord), unit) {
                (_, Some(unit)) if unit.team == Team::Player => unit.archetype.initial(),
                (_, Some(unit)) => unit.archetype.initial().to_ascii_lowercase(),
                (Some(cell), None) => match cell.obstacle_kind() {
                    Some(ObstacleKind::Tree) => 'T',
                    Some(ObstacleKind::Mountain) => '^',
                    None if preview == Some(coord) => '?',
                    None if hud.movement_highlights().contains(&coord) => '*',
                    None if hud.attack_highlights().contains(&coord) => 'x',
                    None => '.',
                },
                (None, None) => ' ',
            };
            board.push(' ');
            board.push(symbol);
        }
        board.push('\n');
    }
    board
}
