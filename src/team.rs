//! Team dictionary (role -> tracked player ids) and per-match side resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use polars::prelude::*;

use crate::error::Result;
use crate::schema::{self, Role, Side};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamDict {
    roles: BTreeMap<Role, Vec<String>>,
}

impl TeamDict {
    /// Parses `{"TOP": ["puuid", ...], ...}`. Keys outside the five roles are rejected.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        let mut roles = BTreeMap::new();
        for (key, players) in parsed {
            let role: Role = key.parse()?;
            let players = players
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            roles.insert(role, players);
        }
        Ok(Self { roles })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn with_role(mut self, role: Role, players: &[&str]) -> Self {
        self.roles
            .insert(role, players.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.roles.values().all(|players| players.is_empty())
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.keys().copied()
    }

    pub fn players(&self, role: Role) -> &[String] {
        self.roles.get(&role).map(|p| p.as_slice()).unwrap_or(&[])
    }

    pub fn all_players(&self) -> Vec<String> {
        let unique: BTreeSet<&String> = self.roles.values().flatten().collect();
        unique.into_iter().cloned().collect()
    }

    pub fn contains(&self, puuid: &str) -> bool {
        self.roles
            .values()
            .any(|players| players.iter().any(|p| p == puuid))
    }

    /// Boolean expression: the row's player belongs to this dictionary.
    pub fn member_expr(&self) -> Expr {
        col(schema::PUUID).is_in(lit(Series::new("team_players", self.all_players())))
    }

    /// Boolean expression: the row's player is listed under `role`.
    pub fn role_member_expr(&self, role: Role) -> Expr {
        col(schema::PUUID).is_in(lit(Series::new("role_players", self.players(role).to_vec())))
    }
}

/// Where a participant row stands relative to the tracked team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allegiance {
    Ally,
    Enemy,
    Undetermined,
}

/// Finds the side the tracked team played on. Blue slots are scanned before
/// red ones; a match without any tracked player yields `None`.
pub fn detect_ally_side<'a, I>(slots: I, team: &TeamDict) -> Option<Side>
where
    I: IntoIterator<Item = (i32, &'a str)>,
{
    let ally_sides: Vec<i32> = slots
        .into_iter()
        .filter(|(_, puuid)| team.contains(puuid))
        .map(|(team_id, _)| team_id)
        .collect();

    [Side::Blue, Side::Red]
        .into_iter()
        .find(|side| ally_sides.contains(&side.team_id()))
}

pub fn classify_row(team_id: i32, ally_side: Option<Side>) -> Allegiance {
    match (ally_side, Side::from_team_id(team_id)) {
        (Some(ally), Some(side)) if ally == side => Allegiance::Ally,
        (Some(_), Some(_)) => Allegiance::Enemy,
        _ => Allegiance::Undetermined,
    }
}
