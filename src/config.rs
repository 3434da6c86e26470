//! Application-level configuration loading: the course table and the seed roster of teams.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::course::{Course, Hole};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MERRY_MULLIGAN_CONFIG_PATH";

/// Team created by the seeding operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedTeam {
    pub name: String,
    /// CSS color used by the frontends.
    pub color: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    course: Course,
    seed_teams: Vec<SeedTeam>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to the built-in course and roster.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        course_par = config.course.total_par(),
                        seed_teams = config.seed_teams.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document. Missing sections keep their defaults; an invalid
    /// course is replaced by the built-in one.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        Ok(raw.into())
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn seed_teams(&self) -> &[SeedTeam] {
        &self.seed_teams
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            course: Course::default(),
            seed_teams: default_seed_teams(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    course: Option<Vec<RawHole>>,
    #[serde(default)]
    teams: Option<Vec<SeedTeam>>,
}

#[derive(Debug, Deserialize)]
struct RawHole {
    number: u8,
    par: u32,
    index: u8,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawHole> for Hole {
    fn from(value: RawHole) -> Self {
        Self {
            number: value.number,
            par: value.par,
            index: value.index,
            name: value.name,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let course = match value.course {
            Some(holes) => match Course::new(holes.into_iter().map(Into::into).collect()) {
                Ok(course) => course,
                Err(err) => {
                    warn!(error = %err, "invalid course in config; using built-in course");
                    Course::default()
                }
            },
            None => Course::default(),
        };
        let seed_teams = value.teams.unwrap_or_else(default_seed_teams);
        Self { course, seed_teams }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn default_seed_teams() -> Vec<SeedTeam> {
    [
        ("Sales Sleigh", "#d63384"),
        ("Marketing Elves", "#0f5132"),
        ("Engineering Reindeer", "#ffd700"),
        ("Support Snowmen", "#0dcaf0"),
        ("Leadership Legends", "#6f42c1"),
        ("Product Penguins", "#fd7e14"),
    ]
    .into_iter()
    .map(|(name, color)| SeedTeam {
        name: name.to_owned(),
        color: color.to_owned(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.course(), &Course::default());
        assert_eq!(config.seed_teams().len(), 6);
        assert_eq!(config.seed_teams()[0].name, "Sales Sleigh");
    }

    #[test]
    fn custom_roster_replaces_default_teams() {
        let config = AppConfig::from_json(
            r##"{"teams": [{"name": "Birdie Hunters", "color": "#00ff00"}]}"##,
        )
        .unwrap();
        assert_eq!(
            config.seed_teams(),
            [SeedTeam {
                name: "Birdie Hunters".into(),
                color: "#00ff00".into(),
            }]
        );
    }

    #[test]
    fn invalid_course_falls_back_to_built_in() {
        let config = AppConfig::from_json(r#"{"course": [{"number": 1, "par": 4, "index": 1}]}"#)
            .unwrap();
        assert_eq!(config.course(), &Course::default());
    }

    #[test]
    fn custom_course_is_used_when_valid() {
        let holes: Vec<String> = (1..=18)
            .map(|n| format!(r#"{{"number": {n}, "par": 3, "index": {}}}"#, 19 - n))
            .collect();
        let json = format!(r#"{{"course": [{}]}}"#, holes.join(","));
        let config = AppConfig::from_json(&json).unwrap();
        assert_eq!(config.course().total_par(), 54);
        assert_eq!(config.course().rating_for(18).index, 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("not json").is_err());
    }
}
