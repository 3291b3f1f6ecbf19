//! Row filters over the participant frame.
//!
//! Every filter returns a frame with the input's columns, acts as the identity
//! when its criteria are empty, and only ever removes rows, so filters on
//! different columns compose in any order.

use chrono::NaiveDate;
use log::warn;
use polars::prelude::*;

use crate::error::{Result, ScrimError};
use crate::schema::{self, Role, Side};
use crate::team::TeamDict;

/// Inclusive date bounds; an unset bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }
}

/// Keeps rows whose player is in the team dictionary, or, with `enemies`,
/// the rows whose player is not.
pub fn try_filter_on_team(df: &DataFrame, team: &TeamDict, enemies: bool) -> Result<DataFrame> {
    if !df.get_column_names().contains(&schema::PUUID) {
        return Err(ScrimError::TeamSchema {
            column: schema::PUUID.to_string(),
        });
    }
    if team.is_empty() {
        return Ok(df.clone());
    }

    let membership = team.member_expr();
    let predicate = if enemies { membership.not() } else { membership };
    Ok(df.clone().lazy().filter(predicate).collect()?)
}

/// Like [`try_filter_on_team`], but a row-set that cannot be matched against
/// the dictionary degrades to an empty frame with a warning.
pub fn filter_on_team(df: &DataFrame, team: &TeamDict, enemies: bool) -> Result<DataFrame> {
    match try_filter_on_team(df, team, enemies) {
        Err(ScrimError::TeamSchema { column }) => {
            warn!(
                "Team filter skipped: row-set has no {} column, returning an empty frame",
                column
            );
            Ok(df.head(Some(0)))
        }
        other => other,
    }
}

pub fn filter_official_matches(df: &DataFrame, tags: &[i32]) -> Result<DataFrame> {
    filter_in(
        df,
        schema::OFFICIAL_MATCH,
        Series::new("official_tags", tags.to_vec()),
    )
}

pub fn filter_patches(df: &DataFrame, patches: &[String]) -> Result<DataFrame> {
    filter_in(df, schema::PATCH, Series::new("patches", patches.to_vec()))
}

pub fn filter_enemy_teams(df: &DataFrame, enemy_teams: &[String]) -> Result<DataFrame> {
    filter_in(
        df,
        schema::ENEMY_TEAM,
        Series::new("enemy_teams", enemy_teams.to_vec()),
    )
}

pub fn filter_game_types(df: &DataFrame, game_types: &[String]) -> Result<DataFrame> {
    filter_in(
        df,
        schema::GAME_TYPE,
        Series::new("game_types", game_types.to_vec()),
    )
}

pub fn filter_roles(df: &DataFrame, roles: &[Role]) -> Result<DataFrame> {
    let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
    filter_in(df, schema::ROLE, Series::new("roles", roles))
}

pub fn filter_date_range(df: &DataFrame, range: DateRange) -> Result<DataFrame> {
    let days = col(schema::DATE).cast(DataType::Int32);
    let lower = range
        .start
        .map(|start| days.clone().gt_eq(lit(schema::date_to_days(start))));
    let upper = range
        .end
        .map(|end| days.clone().lt_eq(lit(schema::date_to_days(end))));

    let predicate = match (lower, upper) {
        (Some(lower), Some(upper)) => lower.and(upper),
        (Some(bound), None) | (None, Some(bound)) => bound,
        (None, None) => return Ok(df.clone()),
    };
    Ok(df.clone().lazy().filter(predicate).collect()?)
}

/// Keeps every row of the matches where at least one tracked player sat on
/// one of `sides`.
pub fn filter_team_side(df: &DataFrame, team: &TeamDict, sides: &[Side]) -> Result<DataFrame> {
    if sides.is_empty() {
        return Ok(df.clone());
    }

    let side_ids: Vec<i32> = sides.iter().map(|side| side.team_id()).collect();
    let matches = df
        .clone()
        .lazy()
        .filter(
            team.member_expr()
                .and(col(schema::TEAM).is_in(lit(Series::new("sides", side_ids)))),
        )
        .select([col(schema::MATCH_ID)])
        .collect()?;
    let match_ids = matches.column(schema::MATCH_ID)?.clone();

    Ok(df
        .clone()
        .lazy()
        .filter(col(schema::MATCH_ID).is_in(lit(match_ids)))
        .collect()?)
}

/// Drops tracked junglers that are not in `allowed`. Enemy junglers and every
/// other role are kept.
pub fn filter_jungler(df: &DataFrame, team: &TeamDict, allowed: &[String]) -> Result<DataFrame> {
    if allowed.is_empty() {
        return Ok(df.clone());
    }

    let is_jungle = col(schema::ROLE).eq(lit(Role::Jungle.as_str()));
    let is_ally_jungler = team.role_member_expr(Role::Jungle);
    let is_allowed =
        col(schema::PUUID).is_in(lit(Series::new("allowed_junglers", allowed.to_vec())));

    Ok(df
        .clone()
        .lazy()
        .filter(is_jungle.not().or(is_ally_jungler.not()).or(is_allowed))
        .collect()?)
}

fn filter_in(df: &DataFrame, column: &str, values: Series) -> Result<DataFrame> {
    if values.is_empty() {
        return Ok(df.clone());
    }
    Ok(df
        .clone()
        .lazy()
        .filter(col(column).is_in(lit(values)))
        .collect()?)
}

/// The criteria a dashboard widget narrows its row-set with.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub official_matches: Vec<i32>,
    pub date_range: DateRange,
    pub patches: Vec<String>,
    pub enemy_teams: Vec<String>,
    pub game_types: Vec<String>,
    pub sides: Vec<Side>,
    pub allowed_junglers: Vec<String>,
    pub roles: Vec<Role>,
}

impl FilterSet {
    pub fn apply(&self, df: &DataFrame, team: &TeamDict) -> Result<DataFrame> {
        let df = filter_official_matches(df, &self.official_matches)?;
        let df = filter_date_range(&df, self.date_range)?;
        let df = filter_patches(&df, &self.patches)?;
        let df = filter_enemy_teams(&df, &self.enemy_teams)?;
        let df = filter_game_types(&df, &self.game_types)?;
        let df = filter_team_side(&df, team, &self.sides)?;
        let df = filter_jungler(&df, team, &self.allowed_junglers)?;
        filter_roles(&df, &self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten_matches;
    use crate::test_support::{ally_roster, ally_team, enemy_roster, match_doc, sample_frame};
    use serde_json::{Value, json};

    fn match_ids(df: &DataFrame) -> Vec<String> {
        let mut ids: Vec<String> = df
            .column(schema::MATCH_ID)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Four matches with varied opponents, game types and official tags;
    /// `m4` carries no official tag at all.
    fn tagged_frame() -> DataFrame {
        let enemies = enemy_roster("e", ["Gnar", "Vi", "Azir", "Xayah", "Rakan"]);
        let enemies: Vec<(&str, &str)> = enemies.iter().map(|(p, c)| (p.as_str(), *c)).collect();
        let ally = ally_roster(["Aatrox", "Sejuani", "Ahri", "Jinx", "Nautilus"]);

        let tags = [
            ("m1", "KC", "scrim", json!(0)),
            ("m2", "G2", "scrim", json!(1)),
            ("m3", "KC", "tournament", json!(1)),
            ("m4", "FNC", "flex", Value::Null),
        ];
        let docs: Vec<Value> = tags
            .into_iter()
            .enumerate()
            .map(|(idx, (id, enemy, game_type, official))| {
                let file_name = format!("0{}022025_1", idx + 1);
                let mut doc = match_doc(id, &file_name, "15.3", true, &ally, &enemies);
                doc["enemyTeam"] = json!(enemy);
                doc["gameType"] = json!(game_type);
                doc["officialMatch"] = official;
                doc
            })
            .collect();
        flatten_matches(&docs).unwrap()
    }

    #[test]
    fn test_official_matches_drop_untagged_rows() {
        let df = tagged_frame();
        let official = filter_official_matches(&df, &[1]).unwrap();
        assert_eq!(match_ids(&official), vec!["m2", "m3"]);

        let any_tag = filter_official_matches(&df, &[0, 1]).unwrap();
        assert_eq!(match_ids(&any_tag), vec!["m1", "m2", "m3"]);
        assert_eq!(any_tag.height(), 30);

        let twice = filter_official_matches(&official, &[1]).unwrap();
        assert!(official.equals_missing(&twice));
    }

    #[test]
    fn test_enemy_teams_filter() {
        let df = tagged_frame();
        let teams = vec!["KC".to_string(), "FNC".to_string()];
        let out = filter_enemy_teams(&df, &teams).unwrap();
        assert_eq!(match_ids(&out), vec!["m1", "m3", "m4"]);
        assert!(out.equals_missing(&filter_enemy_teams(&out, &teams).unwrap()));

        let unknown = filter_enemy_teams(&df, &["T1".to_string()]).unwrap();
        assert_eq!(unknown.height(), 0);
        assert_eq!(unknown.schema(), df.schema());
        assert!(filter_enemy_teams(&df, &[]).unwrap().equals_missing(&df));
    }

    #[test]
    fn test_game_types_filter() {
        let df = tagged_frame();
        let types = vec!["scrim".to_string()];
        let out = filter_game_types(&df, &types).unwrap();
        assert_eq!(match_ids(&out), vec!["m1", "m2"]);
        assert!(out.equals_missing(&filter_game_types(&out, &types).unwrap()));
        assert!(filter_game_types(&df, &[]).unwrap().equals_missing(&df));
    }

    #[test]
    fn test_roles_filter() {
        let df = tagged_frame();
        let roles = [Role::Top, Role::Utility];
        let out = filter_roles(&df, &roles).unwrap();
        // two roles per side in each of the four matches
        assert_eq!(out.height(), 16);
        assert!(out.equals_missing(&filter_roles(&out, &roles).unwrap()));
        assert!(filter_roles(&df, &[]).unwrap().equals_missing(&df));
    }

    #[test]
    fn test_filter_on_team_and_enemies_partition_rows() {
        let df = sample_frame();
        let team = ally_team();
        let allies = filter_on_team(&df, &team, false).unwrap();
        let enemies = filter_on_team(&df, &team, true).unwrap();
        assert_eq!(allies.height(), 15);
        assert_eq!(enemies.height(), 15);
        assert_eq!(allies.height() + enemies.height(), df.height());
    }

    #[test]
    fn test_filter_on_team_schema_mismatch_degrades_to_empty() {
        let df = sample_frame().drop(schema::PUUID).unwrap();
        let team = ally_team();

        let err = try_filter_on_team(&df, &team, false).unwrap_err();
        assert!(matches!(err, ScrimError::TeamSchema { .. }));

        let out = filter_on_team(&df, &team, false).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_empty_criteria_are_identity() {
        let df = sample_frame();
        let team = ally_team();
        assert!(filter_patches(&df, &[]).unwrap().equals_missing(&df));
        assert!(filter_official_matches(&df, &[]).unwrap().equals_missing(&df));
        assert!(filter_date_range(&df, DateRange::default()).unwrap().equals_missing(&df));
        assert!(filter_team_side(&df, &team, &[]).unwrap().equals_missing(&df));
        assert!(filter_jungler(&df, &team, &[]).unwrap().equals_missing(&df));
        assert!(filter_on_team(&df, &TeamDict::default(), false).unwrap().equals_missing(&df));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let df = sample_frame();
        let range = DateRange::new(Some(date(6, 1, 2025)), Some(date(14, 1, 2025)));
        let out = filter_date_range(&df, range).unwrap();
        assert_eq!(match_ids(&out), vec!["m1", "m2"]);
    }

    #[test]
    fn test_date_range_past_last_game_keeps_schema() {
        let df = sample_frame();
        let range = DateRange::new(Some(date(1, 1, 2030)), None);
        let out = filter_date_range(&df, range).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.schema(), df.schema());
    }

    #[test]
    fn test_filters_are_idempotent() {
        let df = sample_frame();
        let patches = vec!["15.1".to_string()];
        let once = filter_patches(&df, &patches).unwrap();
        let twice = filter_patches(&once, &patches).unwrap();
        assert!(once.equals_missing(&twice));
        assert_eq!(match_ids(&once), vec!["m1", "m2"]);
    }

    #[test]
    fn test_orthogonal_filters_commute() {
        let df = sample_frame();
        let patches = vec!["15.1".to_string()];
        let range = DateRange::new(Some(date(10, 1, 2025)), None);

        let a = filter_date_range(&filter_patches(&df, &patches).unwrap(), range).unwrap();
        let b = filter_patches(&filter_date_range(&df, range).unwrap(), &patches).unwrap();
        assert!(a.equals_missing(&b));
        assert_eq!(match_ids(&a), vec!["m2"]);
    }

    #[test]
    fn test_team_side_keeps_whole_matches() {
        let df = sample_frame();
        let team = ally_team();
        let red = filter_team_side(&df, &team, &[Side::Red]).unwrap();
        assert_eq!(match_ids(&red), vec!["m2"]);
        assert_eq!(red.height(), 10);

        let blue = filter_team_side(&df, &team, &[Side::Blue]).unwrap();
        assert_eq!(match_ids(&blue), vec!["m1", "m3"]);
    }

    #[test]
    fn test_jungler_substitution() {
        let df = sample_frame();
        let team = ally_team().with_role(Role::Jungle, &["a_jgl", "sub_jgl"]);
        let out = filter_jungler(&df, &team, &["sub_jgl".to_string()]).unwrap();

        // the three ally jungler rows go, enemy junglers stay
        assert_eq!(out.height(), df.height() - 3);
        let junglers = filter_roles(&out, &[Role::Jungle]).unwrap();
        assert_eq!(junglers.height(), 3);
    }

    #[test]
    fn test_filter_set_applies_all_criteria() {
        let df = sample_frame();
        let team = ally_team();
        let filters = FilterSet {
            patches: vec!["15.1".to_string()],
            sides: vec![Side::Blue],
            ..Default::default()
        };
        let out = filters.apply(&df, &team).unwrap();
        assert_eq!(match_ids(&out), vec!["m1"]);

        let filters = FilterSet {
            official_matches: vec![1],
            enemy_teams: vec!["KC".to_string()],
            roles: vec![Role::Jungle],
            ..Default::default()
        };
        let out = filters.apply(&tagged_frame(), &team).unwrap();
        assert_eq!(match_ids(&out), vec!["m3"]);
        assert_eq!(out.height(), 2);
    }
}
