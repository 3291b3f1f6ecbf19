#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use scrim_stats::store::{DRAFTS_COLLECTION, MATCHES_COLLECTION};
use scrim_stats::{Role, TeamDict};

pub const ALLY: [&str; 5] = ["ally_top", "ally_jgl", "ally_mid", "ally_bot", "ally_sup"];
pub const ENEMY: [&str; 5] = ["foe_top", "foe_jgl", "foe_mid", "foe_bot", "foe_sup"];

pub fn team() -> TeamDict {
    Role::ALL
        .iter()
        .zip(ALLY)
        .fold(TeamDict::default(), |team, (role, puuid)| {
            team.with_role(*role, &[puuid])
        })
}

fn participants(
    players: &[&str],
    champions: &[&str],
    team: i64,
    win: bool,
    gold: i64,
) -> Vec<Value> {
    players
        .iter()
        .zip(champions)
        .enumerate()
        .map(|(slot, (puuid, champion))| {
            json!({
                "PUUID": puuid,
                "SKIN": champion,
                "TEAM": team,
                "WIN": if win { "Win" } else { "Fail" },
                "TRUE_POSITION": Role::ALL[slot].as_str(),
                "GOLD_EARNED": gold + 500 * slot as i64,
                "CHAMPIONS_KILLED": slot as i64 + 1,
                "NUM_DEATHS": 2,
                "ASSISTS": 3,
                "VISION_WARDS_BOUGHT_IN_GAME": 2 * slot as i64
            })
        })
        .collect()
}

/// A full 5v5 game. `ally_blue` puts the tracked team on side 100.
pub fn game(
    id: &str,
    file_name: &str,
    ally_blue: bool,
    ally_win: bool,
    ally: [&str; 5],
    enemy: [&str; 5],
) -> Value {
    let (blue_players, blue_champs, red_players, red_champs) = if ally_blue {
        (ALLY, ally, ENEMY, enemy)
    } else {
        (ENEMY, enemy, ALLY, ally)
    };
    let blue_win = ally_blue == ally_win;

    let mut all = participants(&blue_players, &blue_champs, 100, blue_win, 8000);
    all.extend(participants(&red_players, &red_champs, 200, !blue_win, 7000));

    json!({
        "_id": {"$oid": id},
        "jsonFileName": file_name,
        "gameDuration": 1800,
        "gameVersion": "15.4.662.1234",
        "enemyTeam": "KC",
        "gameType": "scrim",
        "officialMatch": 0,
        "participants": all
    })
}

pub fn draft(
    date: &str,
    blue: &str,
    red: &str,
    blue_picks: [&str; 5],
    red_picks: [&str; 5],
    blue_bans: Value,
    red_bans: Value,
) -> Value {
    json!({
        "link": format!("https://drafts.example/{}", date),
        "date": date,
        "blue": {"team": blue, "picks": blue_picks, "bans": blue_bans},
        "red": {"team": red, "picks": red_picks, "bans": red_bans}
    })
}

fn write_collection(root: &Path, collection: &str, documents: &[Value]) {
    let dir = root.join(collection);
    fs::create_dir_all(&dir).unwrap();
    for (idx, document) in documents.iter().enumerate() {
        fs::write(dir.join(format!("{:03}.json", idx)), document.to_string()).unwrap();
    }
}

/// Four games and three drafts written as one JSON file per document.
pub fn seeded_store() -> TempDir {
    let dir = TempDir::new().unwrap();
    let ally = ["Aatrox", "Sejuani", "Ahri", "Jinx", "Nautilus"];
    let enemy = ["Gnar", "Vi", "Azir", "Xayah", "Rakan"];

    let games = vec![
        game("g1", "03022025_1", true, true, ally, enemy),
        game("g2", "03022025_2", false, true, ally, enemy),
        game(
            "g3",
            "10022025_1",
            true,
            false,
            ["Aatrox", "Viego", "Orianna", "Jinx", "Leona"],
            enemy,
        ),
        game(
            "g4",
            "17022025_1",
            false,
            false,
            ally,
            ["Jax", "Vi", "Azir", "Xayah", "Rakan"],
        ),
    ];
    write_collection(dir.path(), MATCHES_COLLECTION, &games);

    let drafts = vec![
        draft(
            "03022025_1",
            "SCL",
            "KC",
            ally,
            enemy,
            json!(["Yone", "Kalista", "Zed"]),
            json!(["Ahri", "None", "Lux"]),
        ),
        draft(
            "03022025 _2",
            "KC",
            "SCL",
            enemy,
            ally,
            json!(["Ahri", "Yone"]),
            Value::Null,
        ),
        draft("24022025_1", "SCL", "G2", ally, enemy, json!(["Zed"]), json!(["Yone"])),
    ];
    write_collection(dir.path(), DRAFTS_COLLECTION, &drafts);
    dir
}
