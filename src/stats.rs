//! Aggregations over the participant frame: winrates, wards, gold, matchups, KDA.

use chrono::Datelike;
use polars::prelude::*;

use crate::error::{Result, ScrimError};
use crate::filters::filter_on_team;
use crate::schema::{self, Role};
use crate::team::TeamDict;

pub const GAMES: &str = "GAMES";
pub const WINS: &str = "WINS";
pub const WINRATE: &str = "WINRATE";
pub const BLUE_WINRATE: &str = "BLUE_WINRATE";
pub const RED_WINRATE: &str = "RED_WINRATE";
pub const YEAR: &str = "YEAR";
pub const WEEK: &str = "WEEK";
pub const MEDIAN_WARDS: &str = "MEDIAN_WARDS";
pub const SUM_GOLD: &str = "SUM_GOLD";
pub const ALLY: &str = "ALLY";
pub const ENEMY: &str = "ENEMY";
pub const KDA: &str = "KDA";
pub const RELATIVE_KDA: &str = "RELATIVE_KDA";
pub const ALLY_SIDE: &str = "ALLY_SIDE";

const ROLE_KDA: &str = "ROLE_KDA";
const ENEMY_SIDE: &str = "ENEMY_SIDE";

/// Winrate percentage per side; `None` when the side has no rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideWinrate {
    pub blue: Option<f64>,
    pub red: Option<f64>,
}

pub fn percentage(wins: i64, games: i64) -> Option<f64> {
    (games > 0).then(|| wins as f64 / games as f64 * 100.0)
}

fn is_win() -> Expr {
    col(schema::WIN).eq(lit(schema::WIN_FLAG))
}

fn role_is(role: Role) -> Expr {
    col(schema::ROLE).eq(lit(role.as_str()))
}

/// (kills + assists) / deaths, with zero deaths counted as one.
fn kda_expr() -> Expr {
    ((col(schema::KILLS) + col(schema::ASSISTS)).cast(DataType::Float64)
        / when(col(schema::DEATHS).eq(lit(0)))
            .then(lit(1))
            .otherwise(col(schema::DEATHS))
            .cast(DataType::Float64))
    .alias(KDA)
}

fn outcome_aggs() -> [Expr; 2] {
    [
        col(schema::WIN).count().cast(DataType::Int64).alias(GAMES),
        is_win().cast(DataType::Int64).sum().alias(WINS),
    ]
}

fn winrate_expr() -> Expr {
    (col(WINS).cast(DataType::Float64) / col(GAMES).cast(DataType::Float64) * lit(100.0))
        .alias(WINRATE)
}

/// Percentage of `wins` among `games` rows of a group, NaN on an empty group.
fn rate_expr(wins: Expr, games: Expr) -> Expr {
    let wins = wins.cast(DataType::Float64).sum();
    let games = games.cast(DataType::Float64).sum();
    when(games.clone().gt(lit(0.0)))
        .then(wins / games * lit(100.0))
        .otherwise(lit(f64::NAN))
}

/// One column per role holding `value` for that role's row of the group.
fn role_pivot(value: Expr, suffix: &str) -> Vec<Expr> {
    Role::ALL
        .iter()
        .map(|role| {
            value
                .clone()
                .filter(role_is(*role))
                .first()
                .alias(&format!("{}{}", role, suffix))
        })
        .collect()
}

fn role_columns(suffix: &str) -> Vec<Expr> {
    Role::ALL
        .iter()
        .map(|role| col(&format!("{}{}", role, suffix)))
        .collect()
}

fn sort_by(lf: LazyFrame, columns: &[&str], descending: &[bool]) -> LazyFrame {
    let exprs: Vec<Expr> = columns.iter().map(|c| col(c)).collect();
    lf.sort_by_exprs(exprs, descending.to_vec(), false, false)
}

fn scalar_i64(df: &DataFrame, name: &str) -> Result<i64> {
    Ok(df.column(name)?.i64()?.get(0).unwrap_or_default())
}

pub fn winrate_by_side(df: &DataFrame) -> Result<SideWinrate> {
    let blue = col(schema::TEAM).eq(lit(schema::BLUE_TEAM_ID));
    let red = col(schema::TEAM).eq(lit(schema::RED_TEAM_ID));

    let counts = df
        .clone()
        .lazy()
        .select([
            blue.clone().cast(DataType::Int64).sum().alias("blue_games"),
            blue.and(is_win())
                .cast(DataType::Int64)
                .sum()
                .alias("blue_wins"),
            red.clone().cast(DataType::Int64).sum().alias("red_games"),
            red.and(is_win()).cast(DataType::Int64).sum().alias("red_wins"),
        ])
        .collect()?;

    Ok(SideWinrate {
        blue: percentage(
            scalar_i64(&counts, "blue_wins")?,
            scalar_i64(&counts, "blue_games")?,
        ),
        red: percentage(
            scalar_i64(&counts, "red_wins")?,
            scalar_i64(&counts, "red_games")?,
        ),
    })
}

/// Odd ISO weeks are merged into the following even week.
pub fn paired_week(week: u32) -> u32 {
    if week % 2 == 0 { week } else { week + 1 }
}

/// Blue, red and overall winrate per paired-week bucket, oldest first.
pub fn winrate_by_side_over_time(df: &DataFrame) -> Result<DataFrame> {
    let days = df.column(schema::DATE)?.cast(&DataType::Int32)?;
    let (years, weeks): (Vec<Option<i32>>, Vec<Option<i32>>) = days
        .i32()?
        .into_iter()
        .map(|day| match day.and_then(schema::days_to_date) {
            Some(date) => {
                let iso = date.iso_week();
                (Some(iso.year()), Some(paired_week(iso.week()) as i32))
            }
            None => (None, None),
        })
        .unzip();

    let mut bucketed = df.clone();
    bucketed.with_column(Series::new(YEAR, years))?;
    bucketed.with_column(Series::new(WEEK, weeks))?;

    let blue = col(schema::TEAM).eq(lit(schema::BLUE_TEAM_ID));
    let red = col(schema::TEAM).eq(lit(schema::RED_TEAM_ID));

    let grouped = bucketed
        .lazy()
        .filter(col(YEAR).is_not_null())
        .group_by([col(YEAR), col(WEEK)])
        .agg([
            col(schema::MATCH_ID)
                .n_unique()
                .cast(DataType::Int64)
                .alias(GAMES),
            rate_expr(is_win().and(blue.clone()), blue).alias(BLUE_WINRATE),
            rate_expr(is_win().and(red.clone()), red).alias(RED_WINRATE),
            rate_expr(is_win(), col(schema::WIN).is_not_null()).alias(WINRATE),
        ]);

    Ok(sort_by(grouped, &[YEAR, WEEK], &[false, false]).collect()?)
}

/// Games, wins and winrate per champion, one table per role in TOP..UTILITY order.
pub fn winrate_by_champion(df: &DataFrame) -> Result<Vec<(Role, DataFrame)>> {
    let mut tables = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let grouped = df
            .clone()
            .lazy()
            .filter(role_is(role))
            .group_by([col(schema::CHAMPION)])
            .agg(outcome_aggs())
            .with_column(winrate_expr().round(2));
        let table = sort_by(grouped, &[GAMES, schema::CHAMPION], &[true, false]).collect()?;
        tables.push((role, table));
    }
    Ok(tables)
}

pub fn median_wards_by_role(df: &DataFrame) -> Result<DataFrame> {
    let mut roles: Vec<&str> = Vec::new();
    let mut medians: Vec<Option<f64>> = Vec::new();

    for role in Role::ALL {
        let median = df
            .clone()
            .lazy()
            .filter(role_is(role))
            .select([col(schema::VISION_WARDS_BOUGHT)
                .cast(DataType::Float64)
                .median()
                .alias(MEDIAN_WARDS)])
            .collect()?;
        roles.push(role.as_str());
        medians.push(median.column(MEDIAN_WARDS)?.f64()?.get(0));
    }

    Ok(DataFrame::new(vec![
        Series::new(schema::ROLE, roles),
        Series::new(MEDIAN_WARDS, medians),
    ])?)
}

/// Share of the team's gold earned by each role, per match. Expects one
/// team's rows (see [`filter_on_team`]); matches missing a role are dropped.
pub fn gold_share_by_role(df: &DataFrame) -> Result<DataFrame> {
    let mut aggs = role_pivot(col(schema::GOLD_EARNED).cast(DataType::Float64), "");
    aggs.push(col(schema::WIN).first().alias(schema::WIN));

    let total = role_columns("")
        .into_iter()
        .reduce(|acc, c| acc + c)
        .unwrap_or_else(|| lit(0.0));
    let shares: Vec<Expr> = Role::ALL
        .iter()
        .map(|role| (col(role.as_str()) / col(SUM_GOLD)).alias(role.as_str()))
        .collect();

    let mut columns = vec![col(schema::MATCH_ID)];
    columns.extend(role_columns(""));
    columns.push(col(SUM_GOLD));
    columns.push(col(schema::WIN));

    let shares = df
        .clone()
        .lazy()
        .group_by([col(schema::MATCH_ID)])
        .agg(aggs)
        .drop_nulls(None)
        .with_column(total.alias(SUM_GOLD))
        .with_columns(shares)
        .select(columns);

    Ok(sort_by(shares, &[schema::MATCH_ID], &[false]).collect()?)
}

/// Rows of matches where the tracked team's side is known, tagged with
/// `ALLY_SIDE`. Blue wins when tracked players appear on both sides.
fn with_ally_side(df: &DataFrame, team: &TeamDict) -> Result<LazyFrame> {
    let sides = filter_on_team(df, team, false)?
        .lazy()
        .group_by([col(schema::MATCH_ID)])
        .agg([col(schema::TEAM).min().alias(ALLY_SIDE)]);

    Ok(df.clone().lazy().join(
        sides,
        [col(schema::MATCH_ID)],
        [col(schema::MATCH_ID)],
        JoinArgs::new(JoinType::Inner),
    ))
}

/// Splits a frame into the tracked team's side and the opposing side, match by
/// match. Matches without any tracked player are left out of both.
pub fn split_by_allegiance(df: &DataFrame, team: &TeamDict) -> Result<(DataFrame, DataFrame)> {
    let tagged = with_ally_side(df, team)?;
    let allies = tagged
        .clone()
        .filter(col(schema::TEAM).eq(col(ALLY_SIDE)))
        .select([all().exclude([ALLY_SIDE])])
        .collect()?;
    let enemies = tagged
        .filter(col(schema::TEAM).neq(col(ALLY_SIDE)))
        .select([all().exclude([ALLY_SIDE])])
        .collect()?;
    Ok((allies, enemies))
}

/// Tracked role's gold minus the opposing role's gold, per match.
pub fn gold_diff_by_role(df: &DataFrame, team: &TeamDict) -> Result<DataFrame> {
    let (allies, enemies) = split_by_allegiance(df, team)?;

    let mut ally_aggs = role_pivot(col(schema::GOLD_EARNED), "_ALLY");
    ally_aggs.push(col(schema::WIN).first().alias(schema::WIN));
    let ally_gold = allies
        .lazy()
        .group_by([col(schema::MATCH_ID)])
        .agg(ally_aggs);
    let enemy_gold = enemies
        .lazy()
        .group_by([col(schema::MATCH_ID)])
        .agg(role_pivot(col(schema::GOLD_EARNED), "_ENEMY"));

    let mut columns = vec![col(schema::MATCH_ID)];
    columns.extend(Role::ALL.iter().map(|role| {
        (col(&format!("{}_ALLY", role)) - col(&format!("{}_ENEMY", role))).alias(role.as_str())
    }));
    columns.push(col(schema::WIN));

    let diffs = ally_gold
        .join(
            enemy_gold,
            [col(schema::MATCH_ID)],
            [col(schema::MATCH_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .select(columns)
        .drop_nulls(None);

    Ok(sort_by(diffs, &[schema::MATCH_ID], &[false]).collect()?)
}

/// Winrate of the tracked `role` player's champion against the champion facing
/// it in the same role. Opponents come from `enemy_team[role]` when given,
/// otherwise any player outside `team`. `position` additionally restricts the
/// tracked player to games played in that position.
pub fn matchup_winrate(
    df: &DataFrame,
    team: &TeamDict,
    role: Role,
    enemy_team: Option<&TeamDict>,
    position: Option<Role>,
) -> Result<DataFrame> {
    let mut ally_filter = team.role_member_expr(role);
    if let Some(position) = position {
        ally_filter = ally_filter.and(role_is(position));
    }
    let opponent_filter = role_is(role).and(match enemy_team {
        Some(enemies) => enemies.role_member_expr(role),
        None => team.member_expr().not(),
    });

    let allies = df.clone().lazy().filter(ally_filter).select([
        col(schema::MATCH_ID),
        col(schema::TEAM).alias(ALLY_SIDE),
        col(schema::CHAMPION).alias(ALLY),
        col(schema::WIN),
    ]);
    let opponents = df.clone().lazy().filter(opponent_filter).select([
        col(schema::MATCH_ID),
        col(schema::TEAM).alias(ENEMY_SIDE),
        col(schema::CHAMPION).alias(ENEMY),
    ]);

    let matchups = allies
        .join(
            opponents,
            [col(schema::MATCH_ID)],
            [col(schema::MATCH_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col(ALLY_SIDE).neq(col(ENEMY_SIDE)))
        .group_by([col(ALLY), col(ENEMY)])
        .agg(outcome_aggs())
        .with_column(winrate_expr());

    Ok(sort_by(matchups, &[GAMES, ALLY, ENEMY], &[true, false, false]).collect()?)
}

/// Winrate of champion pairs played together in two roles of the same team.
pub fn duo_winrate(df: &DataFrame, roles: (Role, Role)) -> Result<DataFrame> {
    let (first, second) = roles;
    if first == second {
        return Err(ScrimError::InvalidArgument {
            message: format!("duo roles must differ, got {} twice", first),
        });
    }

    let first_col = format!("{}_CHAMPION", first);
    let second_col = format!("{}_CHAMPION", second);

    let first_rows = df.clone().lazy().filter(role_is(first)).select([
        col(schema::MATCH_ID),
        col(schema::TEAM),
        col(schema::CHAMPION).alias(&first_col),
        col(schema::WIN),
    ]);
    let second_rows = df.clone().lazy().filter(role_is(second)).select([
        col(schema::MATCH_ID),
        col(schema::TEAM),
        col(schema::CHAMPION).alias(&second_col),
    ]);

    let duos = first_rows
        .join(
            second_rows,
            [col(schema::MATCH_ID), col(schema::TEAM)],
            [col(schema::MATCH_ID), col(schema::TEAM)],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([col(&first_col), col(&second_col)])
        .agg(outcome_aggs())
        .with_column(winrate_expr());

    Ok(sort_by(
        duos,
        &[GAMES, first_col.as_str(), second_col.as_str()],
        &[true, false, false],
    )
    .collect()?)
}

/// KDA of each role, one row per (match, side).
pub fn kda_by_game(df: &DataFrame) -> Result<DataFrame> {
    let pivot = df
        .clone()
        .lazy()
        .with_column(kda_expr())
        .group_by([col(schema::MATCH_ID), col(schema::TEAM)])
        .agg(role_pivot(col(KDA), ""));

    Ok(sort_by(pivot, &[schema::MATCH_ID, schema::TEAM], &[false, false]).collect()?)
}

/// Mean KDA per (role, champion) and its ratio to the role's mean KDA.
pub fn kda_by_champion(df: &DataFrame) -> Result<DataFrame> {
    let champions = df
        .clone()
        .lazy()
        .with_column(kda_expr())
        .with_column(col(KDA).mean().over([col(schema::ROLE)]).alias(ROLE_KDA))
        .group_by([col(schema::ROLE), col(schema::CHAMPION)])
        .agg([
            col(KDA).count().cast(DataType::Int64).alias(GAMES),
            col(KDA).mean().alias(KDA),
            col(ROLE_KDA).first().alias(ROLE_KDA),
        ])
        .with_column(
            when(col(ROLE_KDA).gt(lit(0.0)))
                .then(col(KDA) / col(ROLE_KDA))
                .otherwise(lit(f64::NAN))
                .alias(RELATIVE_KDA),
        )
        .select([
            col(schema::ROLE),
            col(schema::CHAMPION),
            col(GAMES),
            col(KDA),
            col(RELATIVE_KDA),
        ]);

    Ok(sort_by(
        champions,
        &[schema::ROLE, GAMES, schema::CHAMPION],
        &[false, true, false],
    )
    .collect()?)
}
