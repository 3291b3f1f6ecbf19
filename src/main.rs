use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use polars::prelude::DataFrame;

use scrim_stats::config::{self, Settings};
use scrim_stats::draft::{self, BanView, DraftRecord};
use scrim_stats::draft_stats::{self, PickBanBounds};
use scrim_stats::filters::{DateRange, FilterSet, filter_on_team};
use scrim_stats::store::{DRAFTS_COLLECTION, DocumentStore, MATCHES_COLLECTION};
use scrim_stats::{Role, Side, features, flatten, history, stats, summary};

#[derive(Parser, Debug)]
#[command(name = "scrim-stats", about = "Scrim match and draft statistics", version)]
struct Cli {
    /// Directory holding one sub-directory of JSON files per collection.
    #[arg(
        long,
        env = config::DATA_DIR_ENV,
        default_value = config::DEFAULT_DATA_DIR,
        global = true
    )]
    data_dir: PathBuf,

    /// Team dictionary file: {"TOP": ["puuid", ...], ...}
    #[arg(long, global = true)]
    team_file: Option<PathBuf>,

    /// Team dictionary as inline JSON.
    #[arg(long, env = config::TEAM_ENV, hide_env_values = true, global = true)]
    team_json: Option<String>,

    /// Enemy dictionary used to pick matchup opponents.
    #[arg(long, global = true)]
    enemy_team_file: Option<PathBuf>,

    /// Team tag as written in scraped drafts.
    #[arg(long, env = config::ALLY_TAG_ENV, global = true)]
    ally_tag: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Row filters shared by the match commands.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Official-match tag to keep (repeatable).
    #[arg(long = "official")]
    official: Vec<i32>,

    /// First day to keep, YYYY-MM-DD.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to keep, YYYY-MM-DD.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Patch to keep (repeatable), e.g. 15.1.
    #[arg(long = "patch")]
    patches: Vec<String>,

    /// Enemy team name to keep (repeatable).
    #[arg(long = "enemy-team")]
    enemy_teams: Vec<String>,

    /// Game type to keep (repeatable).
    #[arg(long = "game-type")]
    game_types: Vec<String>,

    /// Side the team played on (repeatable): blue or red.
    #[arg(long = "side")]
    sides: Vec<Side>,

    /// Tracked jungler allowed to appear (repeatable).
    #[arg(long = "jungler")]
    junglers: Vec<String>,

    /// Role to keep (repeatable): TOP, JUNGLE, MIDDLE, BOTTOM or UTILITY.
    #[arg(long = "role")]
    roles: Vec<Role>,
}

impl FilterArgs {
    fn filter_set(&self) -> FilterSet {
        FilterSet {
            official_matches: self.official.clone(),
            date_range: DateRange::new(self.from, self.to),
            patches: self.patches.clone(),
            enemy_teams: self.enemy_teams.clone(),
            game_types: self.game_types.clone(),
            sides: self.sides.clone(),
            allowed_junglers: self.junglers.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// Team and side a draft command looks at.
#[derive(Args, Debug)]
struct DraftTeamArgs {
    /// Team tag, defaults to --ally-tag.
    #[arg(long)]
    team: Option<String>,

    #[arg(long, default_value = "blue")]
    side: Side,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dataset overview.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Team winrate on each side.
    Winrate {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Side winrates per two-week bucket.
    Timeline {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Champion winrates per role.
    Champions {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Median control wards bought per role.
    Wards {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Gold share per role per match.
    GoldShare {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Gold difference against the opposing laner.
    GoldDiff {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Champion matchups for one role.
    Matchups {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        role: Role,

        /// Only count games the tracked player played in this position.
        #[arg(long)]
        position: Option<Role>,
    },
    /// Winrate of champion pairs in two roles.
    Duo {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value = "MIDDLE")]
        first: Role,

        #[arg(long, default_value = "JUNGLE")]
        second: Role,
    },
    /// KDA per game, or per champion with --by-champion.
    Kda {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        by_champion: bool,
    },
    /// One row per match with both compositions.
    History {
        #[command(flatten)]
        filters: FilterArgs,

        /// Write the table as parquet instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Gold feature table for the win classifier.
    Features {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Pick, ban and presence counts over drafts.
    PicksBans {
        /// Restrict to drafts of this team (requires --side).
        #[arg(long)]
        team: Option<String>,

        #[arg(long)]
        side: Option<Side>,

        #[arg(long)]
        min_picks: Option<i64>,
        #[arg(long)]
        max_picks: Option<i64>,
        #[arg(long)]
        min_bans: Option<i64>,
        #[arg(long)]
        max_bans: Option<i64>,
        #[arg(long)]
        min_presence: Option<i64>,
        #[arg(long)]
        max_presence: Option<i64>,
    },
    /// Early pick priority for a team on one side.
    PickPriority {
        #[command(flatten)]
        draft_team: DraftTeamArgs,
    },
    /// First-rotation ban priority for a team on one side.
    BanPriority {
        #[command(flatten)]
        draft_team: DraftTeamArgs,
    },
    /// Ban counts per side.
    Bans {
        /// both, ally or enemy.
        #[arg(long, default_value = "both")]
        view: BanView,
    },
    /// Match rows joined with their scraped drafts.
    MergeDrafts {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_matches(settings: &Settings, filters: &FilterArgs) -> Result<DataFrame> {
    let documents = settings
        .store()
        .fetch_all(MATCHES_COLLECTION)
        .context("Failed to read match documents")?;
    let df = flatten::flatten_matches(&documents).context("Failed to flatten match documents")?;
    let filtered = filters
        .filter_set()
        .apply(&df, &settings.team)
        .context("Failed to filter match rows")?;
    info!(
        "Loaded {} participant rows ({} after filters)",
        df.height(),
        filtered.height()
    );
    Ok(filtered)
}

fn load_team_rows(settings: &Settings, filters: &FilterArgs) -> Result<DataFrame> {
    let team = settings.require_team()?;
    let df = load_matches(settings, filters)?;
    Ok(filter_on_team(&df, team, false)?)
}

fn load_drafts(settings: &Settings) -> Result<Vec<DraftRecord>> {
    let documents = settings
        .store()
        .fetch_all(DRAFTS_COLLECTION)
        .context("Failed to read draft documents")?;
    Ok(draft::parse_drafts(&documents).context("Failed to parse draft documents")?)
}

fn draft_team(settings: &Settings, team: Option<String>) -> Result<String> {
    match team {
        Some(team) => Ok(team),
        None => Ok(settings.require_ally_tag()?.to_string()),
    }
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}%", r))
        .unwrap_or_else(|| "n/a".to_string())
}

fn emit(mut df: DataFrame, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => features::write_parquet(&mut df, path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", df),
    }
    Ok(())
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Summary { filters } => {
            let df = load_matches(settings, &filters)?;
            print!("{}", summary::summarize(&df)?);
        }
        Command::Winrate { filters } => {
            let df = load_team_rows(settings, &filters)?;
            let winrate = stats::winrate_by_side(&df)?;
            println!("Blue side: {}", format_rate(winrate.blue));
            println!("Red side:  {}", format_rate(winrate.red));
        }
        Command::Timeline { filters } => {
            let df = load_team_rows(settings, &filters)?;
            println!("{}", stats::winrate_by_side_over_time(&df)?);
        }
        Command::Champions { filters } => {
            let df = load_team_rows(settings, &filters)?;
            for (role, table) in stats::winrate_by_champion(&df)? {
                println!("== {} ==\n{}", role, table);
            }
        }
        Command::Wards { filters } => {
            let df = load_team_rows(settings, &filters)?;
            println!("{}", stats::median_wards_by_role(&df)?);
        }
        Command::GoldShare { filters } => {
            let df = load_team_rows(settings, &filters)?;
            println!("{}", stats::gold_share_by_role(&df)?);
        }
        Command::GoldDiff { filters } => {
            let team = settings.require_team()?;
            let df = load_matches(settings, &filters)?;
            println!("{}", stats::gold_diff_by_role(&df, team)?);
        }
        Command::Matchups {
            filters,
            role,
            position,
        } => {
            let team = settings.require_team()?;
            let df = load_matches(settings, &filters)?;
            let matchups = stats::matchup_winrate(
                &df,
                team,
                role,
                settings.enemy_team.as_ref(),
                position,
            )?;
            println!("{}", matchups);
        }
        Command::Duo {
            filters,
            first,
            second,
        } => {
            let df = load_team_rows(settings, &filters)?;
            println!("{}", stats::duo_winrate(&df, (first, second))?);
        }
        Command::Kda {
            filters,
            by_champion,
        } => {
            let df = load_team_rows(settings, &filters)?;
            let table = if by_champion {
                stats::kda_by_champion(&df)?
            } else {
                stats::kda_by_game(&df)?
            };
            println!("{}", table);
        }
        Command::History { filters, out } => {
            let team = settings.require_team()?;
            let df = load_matches(settings, &filters)?;
            emit(history::build_history(&df, team)?, out.as_deref())?;
        }
        Command::Features { filters, out } => {
            let team = settings.require_team()?;
            let df = load_matches(settings, &filters)?;
            emit(features::gold_features(&df, team)?, out.as_deref())?;
        }
        Command::PicksBans {
            team,
            side,
            min_picks,
            max_picks,
            min_bans,
            max_bans,
            min_presence,
            max_presence,
        } => {
            let mut drafts = load_drafts(settings)?;
            if let (Some(team), Some(side)) = (team.as_deref(), side) {
                drafts = draft::filter_by_team_and_side(&drafts, team, side);
            }
            let bounds = PickBanBounds {
                min_picks,
                max_picks,
                min_bans,
                max_bans,
                min_presence,
                max_presence,
            };
            println!("{}", draft_stats::pick_ban_counts(&drafts, bounds)?);
        }
        Command::PickPriority { draft_team: args } => {
            let team = draft_team(settings, args.team)?;
            let drafts = load_drafts(settings)?;
            println!(
                "{}",
                draft_stats::pick_priority(&drafts, &team, args.side)?
            );
        }
        Command::BanPriority { draft_team: args } => {
            let team = draft_team(settings, args.team)?;
            let drafts = load_drafts(settings)?;
            println!(
                "{}",
                draft_stats::ban_priority_by_side(&drafts, &team, args.side)?
            );
        }
        Command::Bans { view } => {
            let drafts = load_drafts(settings)?;
            let drafts = match view {
                BanView::Both => drafts,
                _ => draft::filter_drafts(&drafts, settings.require_ally_tag()?, view),
            };
            println!("{}", draft_stats::champion_bans(&drafts)?);
        }
        Command::MergeDrafts { filters, out } => {
            let df = load_matches(settings, &filters)?;
            let drafts = load_drafts(settings)?;
            emit(draft::merge_matches_with_drafts(&df, &drafts)?, out.as_deref())?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::resolve(
        cli.data_dir,
        cli.team_file.as_deref(),
        cli.team_json.as_deref(),
        cli.enemy_team_file.as_deref(),
        cli.ally_tag,
    )
    .context("Failed to load configuration")?;

    run(cli.command, &settings)
}
