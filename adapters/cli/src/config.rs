use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use tactics_core::{CounterTiming, MatchConfig, Team, MAX_GRID_COLUMNS};

/// Command-line values that take precedence over the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) rows: Option<u32>,
    pub(crate) columns: Option<u32>,
    pub(crate) obstacle_percentage: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) first_team: Option<Team>,
    pub(crate) counter_timing: Option<CounterTiming>,
}

/// Reads the match configuration from `path`, or starts from defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(contents: &str) -> Result<MatchConfig> {
    let config: MatchConfig = toml::from_str(contents)?;
    validate(&config)?;
    Ok(config)
}

/// Checks that the grid dimensions can be labelled and played on.
fn validate(config: &MatchConfig) -> Result<()> {
    if config.rows == 0 {
        bail!("rows must be at least 1");
    }
    if !(1..=MAX_GRID_COLUMNS).contains(&config.columns) {
        bail!(
            "columns must be between 1 and {MAX_GRID_COLUMNS}, got {}",
            config.columns
        );
    }
    Ok(())
}

/// Applies command-line overrides on top of a loaded configuration.
pub(crate) fn apply(mut config: MatchConfig, overrides: &Overrides) -> Result<MatchConfig> {
    if let Some(rows) = overrides.rows {
        config.rows = rows;
    }
    if let Some(columns) = overrides.columns {
        config.columns = columns;
    }
    if let Some(percentage) = overrides.obstacle_percentage {
        config.obstacle_percentage = percentage;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    if overrides.first_team.is_some() {
        config.first_team = overrides.first_team;
    }
    if let Some(timing) = overrides.counter_timing {
        config.counter_timing = timing;
    }
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = parse("rows = 12\nfirst_team = \"ai\"\ncounter_timing = \"deferred\"\n")
            .expect("valid toml");

        assert_eq!(config.rows, 12);
        assert_eq!(config.columns, MatchConfig::default().columns);
        assert_eq!(config.first_team, Some(Team::Ai));
        assert_eq!(config.counter_timing, CounterTiming::Deferred);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("tiles = 4\n").is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = MatchConfig {
            rows: 10,
            seed: Some(1),
            ..MatchConfig::default()
        };
        let overrides = Overrides {
            seed: Some(99),
            obstacle_percentage: Some(0),
            ..Overrides::default()
        };

        let config = apply(file, &overrides).expect("valid dimensions");

        assert_eq!(config.rows, 10);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.obstacle_percentage, 0);
    }

    #[test]
    fn grids_that_cannot_be_labelled_are_rejected() {
        let error = parse("columns = 27\n").expect_err("too wide");
        assert_eq!(error.to_string(), "columns must be between 1 and 26, got 27");
        assert!(parse("columns = 0\n").is_err());
        assert!(parse("rows = 0\n").is_err());
        assert_eq!(parse("columns = 26\n").expect("widest grid").columns, 26);
    }

    #[test]
    fn overrides_are_checked_after_merging() {
        let overrides = Overrides {
            rows: Some(0),
            ..Overrides::default()
        };
        assert!(apply(MatchConfig::default(), &overrides).is_err());

        let file = MatchConfig {
            columns: 40,
            ..MatchConfig::default()
        };
        let overrides = Overrides {
            columns: Some(12),
            ..Overrides::default()
        };
        assert_eq!(apply(file, &overrides).expect("narrowed").columns, 12);
    }

    #[test]
    fn missing_path_yields_defaults() {
        assert_eq!(load(None).expect("defaults"), MatchConfig::default());
    }
}
