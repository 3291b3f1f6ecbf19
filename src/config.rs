//! Runtime settings: where documents live and which team is tracked.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, ScrimError};
use crate::store::JsonDirStore;
use crate::team::TeamDict;

pub const DATA_DIR_ENV: &str = "SCRIM_DATA_DIR";
pub const TEAM_ENV: &str = "TEAM_SCRIM_ID";
pub const ALLY_TAG_ENV: &str = "ALLY_TEAM_TAG";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Loads `.env.local` then `.env` into the process environment. Missing files are fine.
pub fn load_dotenv() {
    for file in [".env.local", ".env"] {
        if let Ok(path) = dotenvy::from_filename(file) {
            debug!("Loaded environment from {}", path.display());
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub team: TeamDict,
    pub enemy_team: Option<TeamDict>,
    pub ally_tag: Option<String>,
}

impl Settings {
    /// A team file wins over the inline JSON dictionary.
    pub fn resolve(
        data_dir: PathBuf,
        team_file: Option<&Path>,
        team_json: Option<&str>,
        enemy_team_file: Option<&Path>,
        ally_tag: Option<String>,
    ) -> Result<Self> {
        let team = match (team_file, team_json) {
            (Some(path), _) => TeamDict::from_file(path)?,
            (None, Some(raw)) if !raw.trim().is_empty() => TeamDict::from_json(raw)?,
            _ => {
                debug!("No team dictionary configured");
                TeamDict::default()
            }
        };
        let enemy_team = enemy_team_file.map(TeamDict::from_file).transpose()?;
        let ally_tag = ally_tag
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty());

        Ok(Self {
            data_dir,
            team,
            enemy_team,
            ally_tag,
        })
    }

    pub fn store(&self) -> JsonDirStore {
        JsonDirStore::new(self.data_dir.clone())
    }

    pub fn require_team(&self) -> Result<&TeamDict> {
        if self.team.is_empty() {
            return Err(ScrimError::Config {
                message: format!("no team dictionary: pass --team-file or set {}", TEAM_ENV),
            });
        }
        Ok(&self.team)
    }

    pub fn require_ally_tag(&self) -> Result<&str> {
        self.ally_tag.as_deref().ok_or_else(|| ScrimError::Config {
            message: format!("no ally team tag: pass --ally-tag or set {}", ALLY_TAG_ENV),
        })
    }
}
