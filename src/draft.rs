//! Scraped draft records: parsing, ban views, and the join onto match rows.

use std::collections::HashSet;
use std::str::FromStr;

use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, ScrimError};
use crate::schema::{self, Side};

pub const DRAFT_DATE: &str = "DRAFT_DATE";
pub const LINK: &str = "LINK";
pub const BLUE_TEAM: &str = "BLUE_TEAM";
pub const RED_TEAM: &str = "RED_TEAM";
pub const BLUE_PICKS: &str = "BLUE_PICKS";
pub const BLUE_BANS: &str = "BLUE_BANS";
pub const RED_PICKS: &str = "RED_PICKS";
pub const RED_BANS: &str = "RED_BANS";

/// Placeholder the scraper writes for a skipped ban.
const NO_CHAMPION: &str = "None";

/// One side of a draft. Slots keep their draft order; empty slots are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftSide {
    #[serde(default)]
    pub team: String,
    #[serde(default, deserialize_with = "champion_slots")]
    pub picks: Vec<Option<String>>,
    #[serde(default, deserialize_with = "optional_champion_slots")]
    pub bans: Option<Vec<Option<String>>>,
}

impl DraftSide {
    pub fn is_team(&self, tag: &str) -> bool {
        self.team.trim() == tag.trim()
    }

    pub fn picked(&self) -> impl Iterator<Item = &str> {
        self.picks.iter().flatten().map(|s| s.as_str())
    }

    pub fn banned(&self) -> impl Iterator<Item = &str> {
        self.bans.iter().flatten().flatten().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    #[serde(default)]
    pub link: String,
    pub date: String,
    #[serde(default)]
    pub blue: DraftSide,
    #[serde(default)]
    pub red: DraftSide,
}

impl DraftRecord {
    /// The date token with whitespace removed, comparable to a match `FILE_NAME`.
    pub fn date_key(&self) -> String {
        self.date.chars().filter(|c| !c.is_whitespace()).collect()
    }

    pub fn side(&self, side: Side) -> &DraftSide {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }
}

fn slot(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != NO_CHAMPION)
}

fn champion_slots<'de, D>(deserializer: D) -> std::result::Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_champion_slots(deserializer)?.unwrap_or_default())
}

fn optional_champion_slots<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|slots| slots.into_iter().map(slot).collect()))
}

pub fn parse_drafts(documents: &[Value]) -> Result<Vec<DraftRecord>> {
    let drafts = documents
        .iter()
        .map(|doc| serde_json::from_value::<DraftRecord>(doc.clone()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("Parsed {} draft records", drafts.len());
    Ok(drafts)
}

fn slot_series(slots: &[Option<String>]) -> Series {
    Series::new("", slots.to_vec())
}

fn champion_list_dtype() -> DataType {
    DataType::List(Box::new(DataType::String))
}

/// One row per draft, picks and bans as list columns.
pub fn drafts_frame(drafts: &[DraftRecord]) -> Result<DataFrame> {
    let mut date: Vec<String> = Vec::new();
    let mut link: Vec<String> = Vec::new();
    let mut blue_team: Vec<String> = Vec::new();
    let mut red_team: Vec<String> = Vec::new();
    let mut blue_picks: Vec<Series> = Vec::new();
    let mut blue_bans: Vec<Option<Series>> = Vec::new();
    let mut red_picks: Vec<Series> = Vec::new();
    let mut red_bans: Vec<Option<Series>> = Vec::new();

    for draft in drafts {
        date.push(draft.date_key());
        link.push(draft.link.clone());
        blue_team.push(draft.blue.team.trim().to_string());
        red_team.push(draft.red.team.trim().to_string());
        blue_picks.push(slot_series(&draft.blue.picks));
        blue_bans.push(draft.blue.bans.as_deref().map(slot_series));
        red_picks.push(slot_series(&draft.red.picks));
        red_bans.push(draft.red.bans.as_deref().map(slot_series));
    }

    Ok(DataFrame::new(vec![
        Series::new(DRAFT_DATE, date),
        Series::new(LINK, link),
        Series::new(BLUE_TEAM, blue_team),
        Series::new(RED_TEAM, red_team),
        Series::new(BLUE_PICKS, blue_picks).cast(&champion_list_dtype())?,
        Series::new(BLUE_BANS, blue_bans).cast(&champion_list_dtype())?,
        Series::new(RED_PICKS, red_picks).cast(&champion_list_dtype())?,
        Series::new(RED_BANS, red_bans).cast(&champion_list_dtype())?,
    ])?)
}

/// Left-joins draft columns onto match rows by `FILE_NAME == DRAFT_DATE`.
/// Every match row is kept once; when several drafts share a date key the
/// first one wins.
pub fn merge_matches_with_drafts(matches: &DataFrame, drafts: &[DraftRecord]) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let unique: Vec<DraftRecord> = drafts
        .iter()
        .filter(|draft| seen.insert(draft.date_key()))
        .cloned()
        .collect();
    if unique.len() < drafts.len() {
        debug!(
            "Ignored {} drafts with duplicate date keys",
            drafts.len() - unique.len()
        );
    }

    let merged = matches
        .clone()
        .lazy()
        .join(
            drafts_frame(&unique)?.lazy(),
            [col(schema::FILE_NAME)],
            [col(DRAFT_DATE)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    Ok(merged)
}

/// Which bans of a draft list to look at, relative to the ally team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BanView {
    #[default]
    Both,
    EnemyBans,
    AllyBans,
}

impl FromStr for BanView {
    type Err = ScrimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(BanView::Both),
            "enemy" | "enemies" | "enemy-bans" | "enemies bans" => Ok(BanView::EnemyBans),
            "ally" | "allies" | "ally-bans" | "allies bans" => Ok(BanView::AllyBans),
            other => Err(ScrimError::InvalidArgument {
                message: format!("unknown ban view: {}", other),
            }),
        }
    }
}

/// Keeps the bans selected by `view` and blanks the others. Drafts with no
/// selected side are dropped.
pub fn filter_drafts(drafts: &[DraftRecord], ally_tag: &str, view: BanView) -> Vec<DraftRecord> {
    drafts
        .iter()
        .filter_map(|draft| {
            let (keep_blue, keep_red) = match view {
                BanView::Both => (true, true),
                BanView::EnemyBans => (
                    !draft.blue.is_team(ally_tag) && draft.red.is_team(ally_tag),
                    !draft.red.is_team(ally_tag) && draft.blue.is_team(ally_tag),
                ),
                BanView::AllyBans => (draft.blue.is_team(ally_tag), draft.red.is_team(ally_tag)),
            };
            if !keep_blue && !keep_red {
                return None;
            }

            let mut draft = draft.clone();
            if !keep_blue {
                draft.blue.bans = None;
            }
            if !keep_red {
                draft.red.bans = None;
            }
            Some(draft)
        })
        .collect()
}

/// Drafts where `team` played on `side`.
pub fn filter_by_team_and_side(drafts: &[DraftRecord], team: &str, side: Side) -> Vec<DraftRecord> {
    drafts
        .iter()
        .filter(|draft| draft.side(side).is_team(team))
        .cloned()
        .collect()
}
