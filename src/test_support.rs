//! Document builders shared by the unit tests.

use polars::prelude::DataFrame;
use serde_json::{Value, json};

use crate::flatten::flatten_matches;
use crate::schema::Role;
use crate::team::TeamDict;

pub const ALLY_PLAYERS: [&str; 5] = ["a_top", "a_jgl", "a_mid", "a_bot", "a_sup"];

pub fn ally_team() -> TeamDict {
    Role::ALL
        .iter()
        .zip(ALLY_PLAYERS)
        .fold(TeamDict::default(), |team, (role, puuid)| {
            team.with_role(*role, &[puuid])
        })
}

/// One participant per entry, roles assigned in TOP..UTILITY order.
/// Gold is `2000 + 1000 * slot` on blue and `1500 + 1000 * slot` on red,
/// kills = slot, deaths = slot % 2, assists = 2 * slot, wards = slot.
pub fn match_doc(
    id: &str,
    file_name: &str,
    patch: &str,
    blue_wins: bool,
    blue: &[(&str, &str)],
    red: &[(&str, &str)],
) -> Value {
    let mut participants = Vec::new();
    for (team, roster, base_gold, wins) in [
        ("100", blue, 2000, blue_wins),
        ("200", red, 1500, !blue_wins),
    ] {
        for (slot, (puuid, champion)) in roster.iter().enumerate() {
            participants.push(json!({
                "PUUID": puuid,
                "SKIN": champion,
                "TEAM": team,
                "WIN": if wins { "Win" } else { "Fail" },
                "TRUE_POSITION": Role::ALL[slot].as_str(),
                "GOLD_EARNED": (base_gold + 1000 * slot as i64).to_string(),
                "CHAMPIONS_KILLED": slot.to_string(),
                "NUM_DEATHS": (slot % 2).to_string(),
                "ASSISTS": (2 * slot).to_string(),
                "VISION_WARDS_BOUGHT_IN_GAME": slot.to_string(),
            }));
        }
    }

    json!({
        "_id": id,
        "jsonFileName": file_name,
        "gameLength": 1_920_000,
        "patch": patch,
        "enemyTeam": "KC",
        "gameType": "scrim",
        "officialMatch": 0,
        "participants": participants
    })
}

pub fn ally_roster(champions: [&'static str; 5]) -> Vec<(&'static str, &'static str)> {
    ALLY_PLAYERS.iter().copied().zip(champions).collect()
}

pub fn enemy_roster(
    prefix: &'static str,
    champions: [&'static str; 5],
) -> Vec<(String, &'static str)> {
    ["top", "jgl", "mid", "bot", "sup"]
        .iter()
        .map(|slot| format!("{}_{}", prefix, slot))
        .zip(champions)
        .collect()
}

/// Three matches: ally blue win, ally red loss, ally blue loss (weeks apart).
pub fn sample_frame() -> DataFrame {
    let e1 = enemy_roster("e", ["Gnar", "Vi", "Azir", "Xayah", "Rakan"]);
    let e1: Vec<(&str, &str)> = e1.iter().map(|(p, c)| (p.as_str(), *c)).collect();
    let ally = ally_roster(["Aatrox", "Sejuani", "Ahri", "Jinx", "Nautilus"]);

    let docs = vec![
        match_doc("m1", "06012025_1", "15.1", true, &ally, &e1),
        match_doc("m2", "14012025_1", "15.1", true, &e1, &ally),
        match_doc(
            "m3",
            "21012025_2",
            "15.2",
            false,
            &ally_roster(["Aatrox", "Viego", "Orianna", "Jinx", "Leona"]),
            &e1,
        ),
    ];
    flatten_matches(&docs).expect("sample documents flatten")
}
