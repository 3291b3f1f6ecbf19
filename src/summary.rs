//! Dataset overview printed by the `summary` command.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use polars::prelude::DataFrame;

use crate::error::Result;
use crate::flatten::rows_from_frame;

const TOP_CHAMPIONS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSummary {
    pub matches: usize,
    pub participants: usize,
    pub players: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Matches per patch, most played first.
    pub patches: Vec<(String, usize)>,
    /// Picks per champion, most picked first.
    pub top_champions: Vec<(String, usize)>,
}

fn ranked(counts: HashMap<String, usize>, limit: Option<usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
    let rows = rows_from_frame(df)?;

    let mut matches: HashSet<&str> = HashSet::new();
    let mut players: HashSet<&str> = HashSet::new();
    let mut patch_counts: HashMap<String, usize> = HashMap::new();
    let mut champion_counts: HashMap<String, usize> = HashMap::new();
    let mut first_date: Option<NaiveDate> = None;
    let mut last_date: Option<NaiveDate> = None;

    for row in &rows {
        if matches.insert(row.match_id.as_str()) {
            let patch = row.patch.clone().unwrap_or_else(|| "unknown".to_string());
            *patch_counts.entry(patch).or_insert(0) += 1;
        }
        players.insert(row.puuid.as_str());
        *champion_counts.entry(row.champion.clone()).or_insert(0) += 1;

        first_date = Some(first_date.map_or(row.date, |d| d.min(row.date)));
        last_date = Some(last_date.map_or(row.date, |d| d.max(row.date)));
    }

    Ok(DatasetSummary {
        matches: matches.len(),
        participants: rows.len(),
        players: players.len(),
        first_date,
        last_date,
        patches: ranked(patch_counts, None),
        top_champions: ranked(champion_counts, Some(TOP_CHAMPIONS)),
    })
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Scrim Summary ==")?;
        writeln!(
            f,
            "Matches / participants / players: {} / {} / {}",
            self.matches, self.participants, self.players
        )?;
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            writeln!(f, "Date range: {} -> {}", first, last)?;
        }
        if !self.patches.is_empty() {
            writeln!(f, "Patches:")?;
            for (patch, count) in &self.patches {
                writeln!(f, "  {:<10} {}", patch, count)?;
            }
        }
        if !self.top_champions.is_empty() {
            writeln!(f, "Top champions:")?;
            for (champion, count) in &self.top_champions {
                writeln!(f, "  {:<20} {}", champion, count)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_frame;

    #[test]
    fn test_summarize_sample() {
        let summary = summarize(&sample_frame()).unwrap();
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.participants, 30);
        assert_eq!(summary.players, 10);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2025, 1, 21));
        assert_eq!(
            summary.patches,
            vec![("15.1".to_string(), 2), ("15.2".to_string(), 1)]
        );
        assert_eq!(summary.top_champions.len(), 10);
        assert_eq!(summary.top_champions[0], ("Aatrox".to_string(), 3));
    }

    #[test]
    fn test_summarize_empty_frame() {
        let summary = summarize(&sample_frame().head(Some(0))).unwrap();
        assert_eq!(summary, DatasetSummary::default());
        assert!(summary.to_string().contains("0 / 0 / 0"));
    }
}
