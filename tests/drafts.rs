mod common;

use polars::prelude::*;

use scrim_stats::Side;
use scrim_stats::draft::{self, BanView, LINK};
use scrim_stats::draft_stats::{self, PickBanBounds};
use scrim_stats::flatten::flatten_matches;
use scrim_stats::store::{DRAFTS_COLLECTION, DocumentStore, JsonDirStore, MATCHES_COLLECTION};

fn load_drafts(store: &JsonDirStore) -> Vec<draft::DraftRecord> {
    draft::parse_drafts(&store.fetch_all(DRAFTS_COLLECTION).unwrap()).unwrap()
}

fn champions(df: &DataFrame) -> Vec<String> {
    df.column(draft_stats::CHAMPION)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_merge_keeps_unmatched_match_rows() {
    let dir = common::seeded_store();
    let store = JsonDirStore::new(dir.path());
    let matches = flatten_matches(&store.fetch_all(MATCHES_COLLECTION).unwrap()).unwrap();
    let drafts = load_drafts(&store);

    let merged = draft::merge_matches_with_drafts(&matches, &drafts).unwrap();
    assert_eq!(merged.height(), matches.height());
    // g3 and g4 have no scraped draft
    assert_eq!(merged.column(LINK).unwrap().null_count(), 20);
}

#[test]
fn test_presence_table() {
    let dir = common::seeded_store();
    let drafts = load_drafts(&JsonDirStore::new(dir.path()));

    let counts = draft_stats::pick_ban_counts(&drafts, PickBanBounds::default()).unwrap();
    assert_eq!(champions(&counts)[0], "Ahri");
    let presence = counts.column(draft_stats::PRESENCE).unwrap().i64().unwrap();
    assert_eq!(presence.get(0), Some(5));
    assert!(!champions(&counts).contains(&"None".to_string()));

    let bounded = draft_stats::pick_ban_counts(
        &drafts,
        PickBanBounds {
            min_bans: Some(3),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(champions(&bounded), vec!["Yone"]);
}

#[test]
fn test_ban_views_feed_champion_bans() {
    let dir = common::seeded_store();
    let drafts = load_drafts(&JsonDirStore::new(dir.path()));

    let ally = draft::filter_drafts(&drafts, "SCL", BanView::AllyBans);
    let ally = draft_stats::champion_bans(&ally).unwrap();
    assert_eq!(champions(&ally), vec!["Zed", "Kalista", "Yone"]);

    let enemy = draft::filter_drafts(&drafts, "SCL", BanView::EnemyBans);
    let enemy = draft_stats::champion_bans(&enemy).unwrap();
    assert_eq!(champions(&enemy), vec!["Ahri", "Yone", "Lux"]);
}

#[test]
fn test_priority_tables_for_team_side() {
    let dir = common::seeded_store();
    let drafts = load_drafts(&JsonDirStore::new(dir.path()));
    let blue = draft::filter_by_team_and_side(&drafts, "SCL", Side::Blue);
    assert_eq!(blue.len(), 2);

    let picks = draft_stats::pick_priority(&blue, "SCL", Side::Blue).unwrap();
    assert_eq!(champions(&picks), vec!["Aatrox", "Ahri", "Sejuani"]);

    let bans = draft_stats::ban_priority_by_side(&blue, "SCL", Side::Blue).unwrap();
    assert_eq!(champions(&bans), vec!["Zed", "Kalista", "Yone"]);
}
