//! Pick and ban counters over draft records.

use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;

use crate::draft::DraftRecord;
use crate::error::Result;
use crate::schema::Side;

pub const CHAMPION: &str = "Champion";
pub const PRESENCE: &str = "Presence";
pub const PICK_COUNT: &str = "Pick Count";
pub const BAN_COUNT: &str = "Ban Count";
pub const FREQUENCY: &str = "Frequency";
pub const TOTAL: &str = "Total";
pub const B1: &str = "B1";
pub const B2_B3: &str = "B2_B3";
pub const R1_R2: &str = "R1_R2";
pub const BLUE: &str = "Blue";
pub const RED: &str = "Red";

/// Optional inclusive bounds on the pick/ban table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickBanBounds {
    pub min_picks: Option<i64>,
    pub max_picks: Option<i64>,
    pub min_bans: Option<i64>,
    pub max_bans: Option<i64>,
    pub min_presence: Option<i64>,
    pub max_presence: Option<i64>,
}

impl PickBanBounds {
    pub fn contains(&self, picks: i64, bans: i64) -> bool {
        let within = |value: i64, min: Option<i64>, max: Option<i64>| {
            min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
        };
        within(picks, self.min_picks, self.max_picks)
            && within(bans, self.min_bans, self.max_bans)
            && within(picks + bans, self.min_presence, self.max_presence)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PickBan {
    picks: i64,
    bans: i64,
}

pub fn pick_ban_counts(drafts: &[DraftRecord], bounds: PickBanBounds) -> Result<DataFrame> {
    let mut counts: HashMap<&str, PickBan> = HashMap::new();
    for draft in drafts {
        for side in [&draft.blue, &draft.red] {
            for champion in side.picked() {
                counts.entry(champion).or_default().picks += 1;
            }
            for champion in side.banned() {
                counts.entry(champion).or_default().bans += 1;
            }
        }
    }

    let mut rows: Vec<(&str, PickBan)> = counts
        .into_iter()
        .filter(|(_, c)| bounds.contains(c.picks, c.bans))
        .collect();
    rows.sort_by(|(a_name, a), (b_name, b)| {
        (b.picks + b.bans)
            .cmp(&(a.picks + a.bans))
            .then(b.picks.cmp(&a.picks))
            .then(a_name.cmp(b_name))
    });

    let champions: Vec<&str> = rows.iter().map(|(name, _)| *name).collect();
    let presence: Vec<i64> = rows.iter().map(|(_, c)| c.picks + c.bans).collect();
    let picks: Vec<i64> = rows.iter().map(|(_, c)| c.picks).collect();
    let bans: Vec<i64> = rows.iter().map(|(_, c)| c.bans).collect();

    Ok(DataFrame::new(vec![
        Series::new(CHAMPION, champions),
        Series::new(PRESENCE, presence),
        Series::new(PICK_COUNT, picks),
        Series::new(BAN_COUNT, bans),
    ])?)
}

/// Early-pick counts for `team` on `side`: B1 and B2/B3 on blue, R1/R2 on red.
pub fn pick_priority(drafts: &[DraftRecord], team: &str, side: Side) -> Result<DataFrame> {
    // champion -> (first slot count, following slots count)
    let mut counts: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for draft in drafts.iter().filter(|d| d.side(side).is_team(team)) {
        let picks = &draft.side(side).picks;
        match side {
            Side::Blue => {
                if let Some(Some(first)) = picks.first() {
                    counts.entry(first).or_default().0 += 1;
                }
                for champion in picks.iter().skip(1).take(2).flatten() {
                    counts.entry(champion).or_default().1 += 1;
                }
            }
            Side::Red => {
                for champion in picks.iter().take(2).flatten() {
                    counts.entry(champion).or_default().0 += 1;
                }
            }
        }
    }

    let mut rows: Vec<(&str, i64, i64)> = counts
        .into_iter()
        .map(|(name, (first, rest))| (name, first, rest))
        .collect();
    rows.sort_by(|a, b| {
        (b.1 + b.2)
            .cmp(&(a.1 + a.2))
            .then(b.1.cmp(&a.1))
            .then(a.0.cmp(b.0))
    });

    let champions: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let first: Vec<i64> = rows.iter().map(|r| r.1).collect();
    let rest: Vec<i64> = rows.iter().map(|r| r.2).collect();
    let total: Vec<i64> = rows.iter().map(|r| r.1 + r.2).collect();

    let columns = match side {
        Side::Blue => vec![
            Series::new(CHAMPION, champions),
            Series::new(B1, first),
            Series::new(B2_B3, rest),
            Series::new(TOTAL, total),
        ],
        Side::Red => vec![
            Series::new(CHAMPION, champions),
            Series::new(R1_R2, first),
            Series::new(TOTAL, total),
        ],
    };
    Ok(DataFrame::new(columns)?)
}

/// The first three bans of `team` on `side`.
pub fn ban_priority_by_side(drafts: &[DraftRecord], team: &str, side: Side) -> Result<DataFrame> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for draft in drafts.iter().filter(|d| d.side(side).is_team(team)) {
        let Some(bans) = &draft.side(side).bans else {
            continue;
        };
        for champion in bans.iter().take(3).flatten() {
            *counts.entry(champion).or_default() += 1;
        }
    }

    let mut rows: Vec<(&str, i64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    Ok(DataFrame::new(vec![
        Series::new(CHAMPION, rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Series::new(FREQUENCY, rows.iter().map(|r| r.1).collect::<Vec<_>>()),
    ])?)
}

/// Ban counts per side. Drafts whose ban list is absent on a side add nothing there.
pub fn champion_bans(drafts: &[DraftRecord]) -> Result<DataFrame> {
    let mut counts: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for draft in drafts {
        for champion in draft.blue.banned() {
            counts.entry(champion).or_default().0 += 1;
        }
        for champion in draft.red.banned() {
            counts.entry(champion).or_default().1 += 1;
        }
    }

    let mut rows: Vec<(&str, i64, i64)> = counts
        .into_iter()
        .map(|(name, (blue, red))| (name, blue, red))
        .collect();
    rows.sort_by(|a, b| (b.1 + b.2).cmp(&(a.1 + a.2)).then(a.0.cmp(b.0)));

    Ok(DataFrame::new(vec![
        Series::new(CHAMPION, rows.iter().map(|r| r.0).collect::<Vec<_>>()),
        Series::new(BLUE, rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Series::new(RED, rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Series::new(TOTAL, rows.iter().map(|r| r.1 + r.2).collect::<Vec<_>>()),
    ])?)
}
