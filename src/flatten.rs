//! Turns nested match documents into one frame row per (match, participant).

use std::collections::HashMap;

use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;
use serde_json::Value;

use crate::error::{Result, ScrimError};
use crate::schema::{self, Role, Side};

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRow {
    pub match_id: String,
    pub file_name: String,
    pub date: NaiveDate,
    pub duration_secs: i64,
    pub patch: Option<String>,
    pub enemy_team: Option<String>,
    pub game_type: Option<String>,
    pub official_match: Option<i32>,
    pub role: Role,
    pub puuid: String,
    pub champion: String,
    pub team_id: i32,
    pub win: bool,
    pub gold_earned: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub vision_wards_bought: i64,
}

/// Role keys in lookup order; empty values fall through to the next key.
const POSITION_KEYS: [&str; 3] = ["TRUE_POSITION", "TEAM_POSITION", "INDIVIDUAL_POSITION"];

/// Flattens every document and builds the participant frame.
pub fn flatten_matches(documents: &[Value]) -> Result<DataFrame> {
    let mut rows: Vec<ParticipantRow> = Vec::new();
    for document in documents {
        rows.extend(flatten_document(document)?);
    }

    debug!(
        "Flattened {} match documents into {} participant rows",
        documents.len(),
        rows.len()
    );
    build_dataframe(rows)
}

pub fn flatten_document(document: &Value) -> Result<Vec<ParticipantRow>> {
    let match_id = document_id(document)?;

    let Some(file_name) = document.get("jsonFileName").and_then(|v| v.as_str()) else {
        return Err(missing(&match_id, "jsonFileName"));
    };
    let date = parse_date_token(file_name)?;

    let duration_secs = document
        .get("gameLength")
        .and_then(as_i64_lenient)
        .map(|ms| ms / 1000)
        .or_else(|| document.get("gameDuration").and_then(as_i64_lenient))
        .ok_or_else(|| missing(&match_id, "gameLength"))?;

    let patch = document
        .get("patch")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            document
                .get("gameVersion")
                .and_then(|v| v.as_str())
                .map(patch_from_version)
        });
    let enemy_team = optional_str(document, "enemyTeam");
    let game_type = optional_str(document, "gameType");
    let official_match = document
        .get("officialMatch")
        .and_then(as_i64_lenient)
        .map(|v| v as i32);

    let Some(participants) = document.get("participants").and_then(|p| p.as_array()) else {
        return Err(missing(&match_id, "participants"));
    };

    let mut rows = Vec::with_capacity(participants.len());
    for participant in participants {
        let role_raw = POSITION_KEYS
            .iter()
            .find_map(|key| {
                participant
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
            })
            .ok_or_else(|| missing(&match_id, "TRUE_POSITION"))?;
        let role: Role = role_raw.parse()?;

        let team_raw = participant
            .get("TEAM")
            .ok_or_else(|| missing(&match_id, "TEAM"))?;
        let team_id = as_i64_lenient(team_raw)
            .and_then(|id| Side::from_team_id(id as i32))
            .map(|side| side.team_id())
            .ok_or_else(|| ScrimError::UnknownSide {
                side: team_raw.to_string(),
            })?;

        let win = match required_str(participant, &match_id, "WIN")?.trim() {
            schema::WIN_FLAG => true,
            schema::FAIL_FLAG => false,
            other => {
                return Err(ScrimError::InvalidField {
                    match_id: match_id.clone(),
                    field: "WIN".to_string(),
                    value: other.to_string(),
                });
            }
        };

        rows.push(ParticipantRow {
            match_id: match_id.clone(),
            file_name: file_name.to_string(),
            date,
            duration_secs,
            patch: patch.clone(),
            enemy_team: enemy_team.clone(),
            game_type: game_type.clone(),
            official_match,
            role,
            puuid: required_str(participant, &match_id, "PUUID")?.to_string(),
            champion: required_str(participant, &match_id, "SKIN")?.to_string(),
            team_id,
            win,
            gold_earned: required_i64(participant, &match_id, "GOLD_EARNED")?,
            kills: required_i64(participant, &match_id, "CHAMPIONS_KILLED")?,
            deaths: required_i64(participant, &match_id, "NUM_DEATHS")?,
            assists: required_i64(participant, &match_id, "ASSISTS")?,
            vision_wards_bought: participant
                .get("VISION_WARDS_BOUGHT_IN_GAME")
                .and_then(as_i64_lenient)
                .unwrap_or_default(),
        });
    }

    check_outcomes(&match_id, &rows)?;
    Ok(rows)
}

/// `ddmmyyyy_<n>`: the first underscore-delimited segment is the day-month-year date.
pub fn parse_date_token(file_name: &str) -> Result<NaiveDate> {
    let token = file_name.trim().split('_').next().unwrap_or_default();
    NaiveDate::parse_from_str(token, "%d%m%Y").map_err(|_| ScrimError::DateToken {
        file_name: file_name.to_string(),
    })
}

fn patch_from_version(version: &str) -> String {
    version
        .trim()
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}

fn check_outcomes(match_id: &str, rows: &[ParticipantRow]) -> Result<()> {
    let mut by_side: HashMap<i32, bool> = HashMap::new();
    for row in rows {
        match by_side.get(&row.team_id) {
            Some(win) if *win != row.win => {
                return Err(ScrimError::InconsistentOutcome {
                    match_id: match_id.to_string(),
                });
            }
            Some(_) => {}
            None => {
                by_side.insert(row.team_id, row.win);
            }
        }
    }

    if let (Some(blue), Some(red)) = (
        by_side.get(&schema::BLUE_TEAM_ID),
        by_side.get(&schema::RED_TEAM_ID),
    ) {
        if blue == red {
            return Err(ScrimError::InconsistentOutcome {
                match_id: match_id.to_string(),
            });
        }
    }
    Ok(())
}

fn document_id(document: &Value) -> Result<String> {
    let id = document.get("_id").and_then(|id| {
        id.as_str()
            .map(|s| s.to_string())
            .or_else(|| id.get("$oid").and_then(|v| v.as_str()).map(|s| s.to_string()))
    });
    id.ok_or_else(|| missing("<unknown>", "_id"))
}

fn missing(match_id: &str, field: &str) -> ScrimError {
    ScrimError::MissingField {
        match_id: match_id.to_string(),
        field: field.to_string(),
    }
}

fn optional_str(container: &Value, key: &str) -> Option<String> {
    container
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_str<'a>(container: &'a Value, match_id: &str, key: &str) -> Result<&'a str> {
    container
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| missing(match_id, key))
}

fn required_i64(container: &Value, match_id: &str, key: &str) -> Result<i64> {
    let Some(value) = container.get(key) else {
        return Err(missing(match_id, key));
    };
    as_i64_lenient(value).ok_or_else(|| ScrimError::InvalidField {
        match_id: match_id.to_string(),
        field: key.to_string(),
        value: value.to_string(),
    })
}

/// Replay metadata stores numbers as strings; accept both encodings.
fn as_i64_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

pub fn build_dataframe(rows: Vec<ParticipantRow>) -> Result<DataFrame> {
    let mut match_id: Vec<String> = Vec::new();
    let mut file_name: Vec<String> = Vec::new();
    let mut date: Vec<i32> = Vec::new();
    let mut duration: Vec<i64> = Vec::new();
    let mut patch: Vec<Option<String>> = Vec::new();
    let mut enemy_team: Vec<Option<String>> = Vec::new();
    let mut game_type: Vec<Option<String>> = Vec::new();
    let mut official_match: Vec<Option<i32>> = Vec::new();
    let mut role: Vec<&'static str> = Vec::new();
    let mut puuid: Vec<String> = Vec::new();
    let mut champion: Vec<String> = Vec::new();
    let mut team: Vec<i32> = Vec::new();
    let mut win: Vec<&'static str> = Vec::new();
    let mut gold_earned: Vec<i64> = Vec::new();
    let mut kills: Vec<i64> = Vec::new();
    let mut deaths: Vec<i64> = Vec::new();
    let mut assists: Vec<i64> = Vec::new();
    let mut vision_wards_bought: Vec<i64> = Vec::new();

    for row in rows {
        match_id.push(row.match_id);
        file_name.push(row.file_name);
        date.push(schema::date_to_days(row.date));
        duration.push(row.duration_secs);
        patch.push(row.patch);
        enemy_team.push(row.enemy_team);
        game_type.push(row.game_type);
        official_match.push(row.official_match);
        role.push(row.role.as_str());
        puuid.push(row.puuid);
        champion.push(row.champion);
        team.push(row.team_id);
        win.push(if row.win {
            schema::WIN_FLAG
        } else {
            schema::FAIL_FLAG
        });
        gold_earned.push(row.gold_earned);
        kills.push(row.kills);
        deaths.push(row.deaths);
        assists.push(row.assists);
        vision_wards_bought.push(row.vision_wards_bought);
    }

    let df = DataFrame::new(vec![
        Series::new(schema::MATCH_ID, match_id),
        Series::new(schema::FILE_NAME, file_name),
        Series::new(schema::DATE, date).cast(&DataType::Date)?,
        Series::new(schema::DURATION, duration),
        Series::new(schema::PATCH, patch),
        Series::new(schema::ENEMY_TEAM, enemy_team),
        Series::new(schema::GAME_TYPE, game_type),
        Series::new(schema::OFFICIAL_MATCH, official_match),
        Series::new(schema::ROLE, role),
        Series::new(schema::PUUID, puuid),
        Series::new(schema::CHAMPION, champion),
        Series::new(schema::TEAM, team),
        Series::new(schema::WIN, win),
        Series::new(schema::GOLD_EARNED, gold_earned),
        Series::new(schema::KILLS, kills),
        Series::new(schema::DEATHS, deaths),
        Series::new(schema::ASSISTS, assists),
        Series::new(schema::VISION_WARDS_BOUGHT, vision_wards_bought),
    ])?;
    Ok(df)
}

/// Reads a participant frame back into typed rows. Extra columns are ignored.
pub fn rows_from_frame(df: &DataFrame) -> Result<Vec<ParticipantRow>> {
    let dates = df.column(schema::DATE)?.cast(&DataType::Int32)?;
    let dates = dates.i32()?;
    let official = df.column(schema::OFFICIAL_MATCH)?.cast(&DataType::Int32)?;
    let official = official.i32()?;
    let team = df.column(schema::TEAM)?.cast(&DataType::Int32)?;
    let team = team.i32()?;

    let match_id = df.column(schema::MATCH_ID)?.str()?;
    let file_name = df.column(schema::FILE_NAME)?.str()?;
    let duration = df.column(schema::DURATION)?.i64()?;
    let patch = df.column(schema::PATCH)?.str()?;
    let enemy_team = df.column(schema::ENEMY_TEAM)?.str()?;
    let game_type = df.column(schema::GAME_TYPE)?.str()?;
    let role = df.column(schema::ROLE)?.str()?;
    let puuid = df.column(schema::PUUID)?.str()?;
    let champion = df.column(schema::CHAMPION)?.str()?;
    let win = df.column(schema::WIN)?.str()?;
    let gold_earned = df.column(schema::GOLD_EARNED)?.i64()?;
    let kills = df.column(schema::KILLS)?.i64()?;
    let deaths = df.column(schema::DEATHS)?.i64()?;
    let assists = df.column(schema::ASSISTS)?.i64()?;
    let wards = df.column(schema::VISION_WARDS_BOUGHT)?.i64()?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let date = dates
            .get(idx)
            .and_then(schema::days_to_date)
            .ok_or_else(|| null_cell(schema::DATE, idx))?;
        rows.push(ParticipantRow {
            match_id: non_null(match_id.get(idx), schema::MATCH_ID, idx)?.to_string(),
            file_name: non_null(file_name.get(idx), schema::FILE_NAME, idx)?.to_string(),
            date,
            duration_secs: non_null(duration.get(idx), schema::DURATION, idx)?,
            patch: patch.get(idx).map(|s| s.to_string()),
            enemy_team: enemy_team.get(idx).map(|s| s.to_string()),
            game_type: game_type.get(idx).map(|s| s.to_string()),
            official_match: official.get(idx),
            role: non_null(role.get(idx), schema::ROLE, idx)?.parse()?,
            puuid: non_null(puuid.get(idx), schema::PUUID, idx)?.to_string(),
            champion: non_null(champion.get(idx), schema::CHAMPION, idx)?.to_string(),
            team_id: non_null(team.get(idx), schema::TEAM, idx)?,
            win: non_null(win.get(idx), schema::WIN, idx)? == schema::WIN_FLAG,
            gold_earned: non_null(gold_earned.get(idx), schema::GOLD_EARNED, idx)?,
            kills: non_null(kills.get(idx), schema::KILLS, idx)?,
            deaths: non_null(deaths.get(idx), schema::DEATHS, idx)?,
            assists: non_null(assists.get(idx), schema::ASSISTS, idx)?,
            vision_wards_bought: wards.get(idx).unwrap_or_default(),
        });
    }
    Ok(rows)
}

fn non_null<T>(value: Option<T>, column: &str, idx: usize) -> Result<T> {
    value.ok_or_else(|| null_cell(column, idx))
}

fn null_cell(column: &str, idx: usize) -> ScrimError {
    ScrimError::InvalidArgument {
        message: format!("unexpected null in column {} at row {}", column, idx),
    }
}
