//! Gold feature table for the win classifier, and parquet export.

use std::fs::{self, File};
use std::path::Path;

use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::schema::{self, Role};
use crate::stats::{gold_diff_by_role, gold_share_by_role, split_by_allegiance};
use crate::team::TeamDict;

pub const WIN_ALLY: &str = "WIN_ALLY";
const SUM_DIFF: &str = "SUM_DIFF";

fn suffixed(role: Role, suffix: &str) -> String {
    format!("{}_{}", role, suffix)
}

/// Per match: ally and enemy gold shares per role, each role's share of the
/// absolute gold difference, and the ally outcome as 1/0. Only matches complete
/// on both sides are kept.
pub fn gold_features(df: &DataFrame, team: &TeamDict) -> Result<DataFrame> {
    let (allies, enemies) = split_by_allegiance(df, team)?;

    let mut ally_columns = vec![col(schema::MATCH_ID)];
    ally_columns.extend(
        Role::ALL
            .iter()
            .map(|role| col(role.as_str()).alias(&suffixed(*role, "ALLY"))),
    );
    ally_columns.push(
        when(col(schema::WIN).eq(lit(schema::WIN_FLAG)))
            .then(lit(1i32))
            .otherwise(lit(0i32))
            .alias(WIN_ALLY),
    );
    let ally_share = gold_share_by_role(&allies)?.lazy().select(ally_columns);

    let mut enemy_columns = vec![col(schema::MATCH_ID)];
    enemy_columns.extend(
        Role::ALL
            .iter()
            .map(|role| col(role.as_str()).alias(&suffixed(*role, "ENEMY"))),
    );
    let enemy_share = gold_share_by_role(&enemies)?.lazy().select(enemy_columns);

    let total_diff = Role::ALL
        .iter()
        .map(|role| col(role.as_str()).cast(DataType::Float64))
        .reduce(|acc, c| acc + c)
        .unwrap_or_else(|| lit(0.0));
    let mut diff_columns = vec![col(schema::MATCH_ID)];
    diff_columns.extend(Role::ALL.iter().map(|role| {
        when(col(SUM_DIFF).abs().gt(lit(0.0)))
            .then(col(role.as_str()).cast(DataType::Float64).abs() / col(SUM_DIFF).abs())
            .otherwise(lit(f64::NAN))
            .alias(&suffixed(*role, "DIFF"))
    }));
    let diff_ratio = gold_diff_by_role(df, team)?
        .lazy()
        .with_column(total_diff.alias(SUM_DIFF))
        .select(diff_columns);

    let mut order = vec![col(schema::MATCH_ID)];
    order.extend(feature_columns().iter().map(|name| col(name)));

    let features = ally_share
        .join(
            enemy_share,
            [col(schema::MATCH_ID)],
            [col(schema::MATCH_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            diff_ratio,
            [col(schema::MATCH_ID)],
            [col(schema::MATCH_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .select(order)
        .sort(schema::MATCH_ID, SortOptions::default())
        .collect()?;
    Ok(features)
}

/// Column names of [`gold_features`], without the match id.
pub fn feature_columns() -> Vec<String> {
    let mut columns: Vec<String> = ["ALLY", "ENEMY", "DIFF"]
        .iter()
        .flat_map(|suffix| Role::ALL.iter().map(move |role| suffixed(*role, suffix)))
        .collect();
    columns.push(WIN_ALLY.to_string());
    columns
}

pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file).finish(df)?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ally_team, sample_frame};
    use tempfile::TempDir;

    fn f64_at(df: &DataFrame, column: &str, idx: usize) -> f64 {
        df.column(column).unwrap().f64().unwrap().get(idx).unwrap()
    }

    #[test]
    fn test_gold_features_layout_and_values() {
        let features = gold_features(&sample_frame(), &ally_team()).unwrap();
        assert_eq!(features.height(), 3);

        let mut expected = vec![schema::MATCH_ID.to_string()];
        expected.extend(feature_columns());
        let names: Vec<String> = features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);

        // m1: ally blue 2000..6000, enemy red 1500..5500, 500 ahead everywhere
        assert!((f64_at(&features, "TOP_ALLY", 0) - 0.1).abs() < 1e-9);
        assert!((f64_at(&features, "TOP_ENEMY", 0) - 1500.0 / 17500.0).abs() < 1e-9);
        assert!((f64_at(&features, "MIDDLE_DIFF", 0) - 0.2).abs() < 1e-9);

        let wins = features.column(WIN_ALLY).unwrap().i32().unwrap();
        assert_eq!(wins.get(0), Some(1));
        assert_eq!(wins.get(1), Some(0));
    }

    #[test]
    fn test_write_parquet_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("features.parquet");
        let mut features = gold_features(&sample_frame(), &ally_team()).unwrap();
        write_parquet(&mut features, &path).unwrap();

        let read = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(read.shape(), features.shape());
    }
}
