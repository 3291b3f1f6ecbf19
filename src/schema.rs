//! Column names of the flattened frame and the fixed role/side vocabularies.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ScrimError;

pub const MATCH_ID: &str = "MATCH_ID";
pub const FILE_NAME: &str = "FILE_NAME";
pub const DATE: &str = "DATE";
pub const DURATION: &str = "DURATION";
pub const PATCH: &str = "PATCH";
pub const ENEMY_TEAM: &str = "ENEMY_TEAM";
pub const GAME_TYPE: &str = "GAME_TYPE";
pub const OFFICIAL_MATCH: &str = "OFFICIAL_MATCH";
pub const ROLE: &str = "ROLE";
pub const PUUID: &str = "PUUID";
pub const CHAMPION: &str = "CHAMPION";
pub const TEAM: &str = "TEAM";
pub const WIN: &str = "WIN";
pub const GOLD_EARNED: &str = "GOLD_EARNED";
pub const KILLS: &str = "KILLS";
pub const DEATHS: &str = "DEATHS";
pub const ASSISTS: &str = "ASSISTS";
pub const VISION_WARDS_BOUGHT: &str = "VISION_WARDS_BOUGHT";

pub const WIN_FLAG: &str = "Win";
pub const FAIL_FLAG: &str = "Fail";

pub const BLUE_TEAM_ID: i32 = 100;
pub const RED_TEAM_ID: i32 = 200;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Utility,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Top,
        Role::Jungle,
        Role::Middle,
        Role::Bottom,
        Role::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jungle => "JUNGLE",
            Role::Middle => "MIDDLE",
            Role::Bottom => "BOTTOM",
            Role::Utility => "UTILITY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ScrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TOP" => Ok(Role::Top),
            "JUNGLE" => Ok(Role::Jungle),
            "MIDDLE" | "MID" => Ok(Role::Middle),
            "BOTTOM" | "BOT" | "ADC" => Ok(Role::Bottom),
            "UTILITY" | "SUPPORT" => Ok(Role::Utility),
            _ => Err(ScrimError::UnknownRole {
                role: s.to_string(),
            }),
        }
    }
}

/// Map side. Blue is team 100, red is team 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn team_id(&self) -> i32 {
        match self {
            Side::Blue => BLUE_TEAM_ID,
            Side::Red => RED_TEAM_ID,
        }
    }

    pub fn from_team_id(team_id: i32) -> Option<Side> {
        match team_id {
            BLUE_TEAM_ID => Some(Side::Blue),
            RED_TEAM_ID => Some(Side::Red),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Blue => "Blue",
            Side::Red => "Red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Side {
    type Err = ScrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blue" | "100" => Ok(Side::Blue),
            "red" | "200" => Ok(Side::Red),
            _ => Err(ScrimError::UnknownSide {
                side: s.to_string(),
            }),
        }
    }
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}
