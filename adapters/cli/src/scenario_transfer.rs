#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tactics_core::{Archetype, CellCoord, Team, MAX_GRID_COLUMNS};
use tactics_world::{grid::Grid, query, Deployment, World};

const SCENARIO_DOMAIN: &str = "tactics";
const SCENARIO_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SCENARIO_HEADER: &str = "tactics:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Board position that can be shared as a single line of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScenarioSnapshot {
    /// Number of columns contained in the grid.
    pub(crate) columns: u32,
    /// Number of rows contained in the grid.
    pub(crate) rows: u32,
    /// Cells blocked by obstacles.
    pub(crate) obstacles: Vec<CellCoord>,
    /// Units standing on the board, in identifier order.
    pub(crate) units: Vec<ScenarioUnit>,
}

impl ScenarioSnapshot {
    /// Captures the obstacles and live units of a running match.
    #[must_use]
    pub(crate) fn capture(world: &World) -> Self {
        let grid = query::grid(world);
        let obstacles = grid
            .cells()
            .filter(|cell| cell.is_obstacle())
            .map(|cell| cell.coord())
            .collect();
        let units = query::unit_view(world)
            .iter()
            .map(|unit| ScenarioUnit {
                team: unit.team,
                archetype: unit.archetype,
                cell: unit.cell,
            })
            .collect();

        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            obstacles,
            units,
        }
    }

    /// Encodes the scenario into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, ScenarioTransferError> {
        let payload = SerializableScenario {
            obstacles: self.obstacles.clone(),
            units: self.units.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(ScenarioTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SCENARIO_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a scenario from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ScenarioTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(ScenarioTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(ScenarioTransferError::MissingPayload)?;

        if domain != SCENARIO_DOMAIN {
            return Err(ScenarioTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SCENARIO_VERSION {
            return Err(ScenarioTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ScenarioTransferError::InvalidEncoding)?;
        let decoded: SerializableScenario =
            serde_json::from_slice(&bytes).map_err(ScenarioTransferError::InvalidPayload)?;

        let outside = decoded
            .obstacles
            .iter()
            .chain(decoded.units.iter().map(|unit| &unit.cell))
            .find(|cell| cell.column() >= columns || cell.row() >= rows);
        if let Some(&cell) = outside {
            return Err(ScenarioTransferError::CellOutOfBounds(cell));
        }

        Ok(Self {
            columns,
            rows,
            obstacles: decoded.obstacles,
            units: decoded.units,
        })
    }

    /// Builds the grid described by the scenario.
    pub(crate) fn grid(&self) -> Result<Grid, ScenarioTransferError> {
        let grid = Grid::with_obstacles(self.columns, self.rows, &self.obstacles);
        if !grid.is_connected() {
            return Err(ScenarioTransferError::Disconnected);
        }
        Ok(grid)
    }

    /// Units to deploy, in the order they were captured.
    #[must_use]
    pub(crate) fn deployment(&self) -> Vec<Deployment> {
        self.units
            .iter()
            .map(|unit| Deployment {
                team: unit.team,
                archetype: unit.archetype,
                cell: unit.cell,
            })
            .collect()
    }
}

/// Unit description captured within a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScenarioUnit {
    /// Side the unit fights for.
    pub(crate) team: Team,
    /// Archetype of the unit.
    pub(crate) archetype: Archetype,
    /// Cell the unit stands on.
    pub(crate) cell: CellCoord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializableScenario {
    obstacles: Vec<CellCoord>,
    units: Vec<ScenarioUnit>,
}

/// Errors that can occur while encoding or decoding scenario strings.
#[derive(Debug)]
pub(crate) enum ScenarioTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    MissingVersion,
    /// The encoded scenario did not include grid dimensions.
    MissingDimensions,
    /// The encoded scenario did not include the payload segment.
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded scenario.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// An obstacle or unit lies outside the grid.
    CellOutOfBounds(CellCoord),
    /// The obstacles split the free cells into several regions.
    Disconnected,
}

impl fmt::Display for ScenarioTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "scenario string was empty"),
            Self::MissingPrefix => write!(f, "scenario string is missing the prefix"),
            Self::MissingVersion => write!(f, "scenario string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "scenario string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "scenario string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "scenario prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "scenario version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode scenario payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse scenario payload: {error}")
            }
            Self::CellOutOfBounds(cell) => write!(f, "cell {cell} lies outside the grid"),
            Self::Disconnected => write!(f, "scenario obstacles disconnect the grid"),
        }
    }
}

impl Error for ScenarioTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ScenarioTransferError> {
    let invalid = || ScenarioTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 || columns > MAX_GRID_COLUMNS {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skirmish() -> ScenarioSnapshot {
        ScenarioSnapshot {
            columns: 6,
            rows: 5,
            obstacles: vec![CellCoord::new(2, 2), CellCoord::new(3, 2)],
            units: vec![
                ScenarioUnit {
                    team: Team::Player,
                    archetype: Archetype::Sniper,
                    cell: CellCoord::new(0, 0),
                },
                ScenarioUnit {
                    team: Team::Ai,
                    archetype: Archetype::Brawler,
                    cell: CellCoord::new(5, 4),
                },
            ],
        }
    }

    #[test]
    fn populated_scenario_survives_transfer() {
        let scenario = skirmish();

        let encoded = scenario.encode().expect("scenario encodes");
        assert!(encoded.starts_with(&format!("{SCENARIO_HEADER}:6x5:")));

        let decoded = ScenarioSnapshot::decode(&encoded).expect("scenario decodes");
        assert_eq!(scenario, decoded);
        assert_eq!(decoded.deployment()[1].archetype, Archetype::Brawler);
        assert_eq!(decoded.grid().expect("connected").obstacle_count(), 2);
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        let error = ScenarioSnapshot::decode("chess:v1:4x4:e30").expect_err("foreign prefix");
        assert!(matches!(error, ScenarioTransferError::InvalidPrefix(prefix) if prefix == "chess"));
    }

    #[test]
    fn truncated_string_reports_the_missing_segment() {
        let error = ScenarioSnapshot::decode("tactics:v1").expect_err("truncated");
        assert!(matches!(error, ScenarioTransferError::MissingDimensions));
    }

    #[test]
    fn units_outside_the_grid_are_rejected() {
        let mut scenario = skirmish();
        scenario.units[0].cell = CellCoord::new(6, 0);
        let encoded = scenario.encode().expect("scenario encodes");

        let error = ScenarioSnapshot::decode(&encoded).expect_err("unit outside grid");
        assert_eq!(error.to_string(), "cell G1 lies outside the grid");
    }

    #[test]
    fn disconnected_layout_is_refused() {
        let scenario = ScenarioSnapshot {
            columns: 3,
            rows: 1,
            obstacles: vec![CellCoord::new(1, 0)],
            units: Vec::new(),
        };

        assert!(matches!(
            scenario.grid(),
            Err(ScenarioTransferError::Disconnected)
        ));
    }
}
