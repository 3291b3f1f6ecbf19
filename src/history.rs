//! One row per match from the tracked team's point of view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::flatten::{ParticipantRow, rows_from_frame};
use crate::schema::{self, Role, Side};
use crate::team::{Allegiance, TeamDict, classify_row, detect_ally_side};

pub const WIN: &str = "Win";
pub const ALLY_TEAM: &str = "ALLY_TEAM__";
pub const ALLY_KILLS: &str = "ALLY_KILLS";
pub const ENEMY_KILLS: &str = "ENEMY_KILLS";
pub const DURATION_MIN: &str = "DURATION_MIN";

pub fn ally_column(role: Role) -> String {
    format!("ALLY_{}", role)
}

pub fn enemy_column(role: Role) -> String {
    format!("ENEMY_{}", role)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub match_id: String,
    pub date: NaiveDate,
    pub win: bool,
    pub ally_side: Side,
    pub ally_champions: BTreeMap<Role, String>,
    pub enemy_champions: BTreeMap<Role, String>,
    pub ally_kills: i64,
    pub enemy_kills: i64,
    pub duration_min: f64,
    pub patch: Option<String>,
    pub enemy_team: Option<String>,
}

/// Resolves one match. `None` when the tracked team's side cannot be found.
pub fn history_row(participants: &[&ParticipantRow], team: &TeamDict) -> Option<HistoryRow> {
    let first = participants.first()?;
    let ally_side = detect_ally_side(
        participants.iter().map(|p| (p.team_id, p.puuid.as_str())),
        team,
    )?;

    let mut row = HistoryRow {
        match_id: first.match_id.clone(),
        date: first.date,
        win: false,
        ally_side,
        ally_champions: BTreeMap::new(),
        enemy_champions: BTreeMap::new(),
        ally_kills: 0,
        enemy_kills: 0,
        duration_min: first.duration_secs as f64 / 60.0,
        patch: first.patch.clone(),
        enemy_team: first.enemy_team.clone(),
    };

    for p in participants {
        match classify_row(p.team_id, Some(ally_side)) {
            Allegiance::Ally => {
                row.win = p.win;
                row.ally_kills += p.kills;
                if team.players(p.role).contains(&p.puuid) {
                    row.ally_champions
                        .entry(p.role)
                        .or_insert_with(|| p.champion.clone());
                }
            }
            Allegiance::Enemy => {
                row.enemy_kills += p.kills;
                row.enemy_champions
                    .entry(p.role)
                    .or_insert_with(|| p.champion.clone());
            }
            Allegiance::Undetermined => {}
        }
    }
    Some(row)
}

/// Builds the match history table. Incomplete matches are dropped: no
/// detectable side, a dictionary role without a tracked champion, or an
/// opposing role without a champion.
pub fn build_history(df: &DataFrame, team: &TeamDict) -> Result<DataFrame> {
    let rows = rows_from_frame(df)?;

    let mut by_match: BTreeMap<(NaiveDate, &str), Vec<&ParticipantRow>> = BTreeMap::new();
    for row in &rows {
        by_match
            .entry((row.date, row.match_id.as_str()))
            .or_default()
            .push(row);
    }

    let tracked_roles: Vec<Role> = team
        .roles()
        .filter(|role| !team.players(*role).is_empty())
        .collect();

    let total = by_match.len();
    let history: Vec<HistoryRow> = by_match
        .values()
        .filter_map(|participants| history_row(participants, team))
        .filter(|row| {
            tracked_roles
                .iter()
                .all(|role| row.ally_champions.contains_key(role))
                && Role::ALL
                    .iter()
                    .all(|role| row.enemy_champions.contains_key(role))
        })
        .collect();

    debug!(
        "History kept {} of {} matches",
        history.len(),
        total
    );
    history_frame(&history, &tracked_roles)
}

fn history_frame(history: &[HistoryRow], tracked_roles: &[Role]) -> Result<DataFrame> {
    let mut columns = vec![
        Series::new(
            schema::MATCH_ID,
            history.iter().map(|h| h.match_id.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            schema::DATE,
            history
                .iter()
                .map(|h| schema::date_to_days(h.date))
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Date)?,
        Series::new(
            WIN,
            history
                .iter()
                .map(|h| if h.win { schema::WIN_FLAG } else { schema::FAIL_FLAG })
                .collect::<Vec<_>>(),
        ),
        Series::new(
            ALLY_TEAM,
            history
                .iter()
                .map(|h| h.ally_side.label())
                .collect::<Vec<_>>(),
        ),
    ];

    for role in tracked_roles {
        let champions: Vec<Option<&str>> = history
            .iter()
            .map(|h| h.ally_champions.get(role).map(|c| c.as_str()))
            .collect();
        columns.push(Series::new(&ally_column(*role), champions));
    }
    for role in Role::ALL {
        let champions: Vec<&str> = history
            .iter()
            .filter_map(|h| h.enemy_champions.get(&role).map(|c| c.as_str()))
            .collect();
        columns.push(Series::new(&enemy_column(role), champions));
    }

    columns.push(Series::new(
        ALLY_KILLS,
        history.iter().map(|h| h.ally_kills).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        ENEMY_KILLS,
        history.iter().map(|h| h.enemy_kills).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        DURATION_MIN,
        history.iter().map(|h| h.duration_min).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        schema::PATCH,
        history.iter().map(|h| h.patch.clone()).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        schema::ENEMY_TEAM,
        history.iter().map(|h| h.enemy_team.clone()).collect::<Vec<_>>(),
    ));

    Ok(DataFrame::new(columns)?)
}
