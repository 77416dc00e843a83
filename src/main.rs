use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use litmus::config::Config;
use litmus::db::models::RawPost;
use litmus::db::traits::Database;
use litmus::gating::{validate_generation_request, AccountStatus, Archetype};
use litmus::nlp::extract_metrics;
use litmus::output::terminal;
use litmus::patterns::{PatternCategory, PenaltyPhrase, RuleSet};
use litmus::pipeline::{Analyzer, RunHandle, RunOptions};
use litmus::scoring::{score_post, CommunityAverages, ScoreRules};

/// Litmus: behavioral scoring and generation gating for community posts.
///
/// Analyzes collected community posts into sensitivity profiles, detects
/// forbidden patterns, and gates generation requests against community
/// and account risk.
#[derive(Parser)]
#[command(name = "litmus", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Analyze collected posts into community profiles
    Analyze {
        /// Path to a JSON array of collected posts
        #[arg(long)]
        input: String,
    },

    /// Show one community's profile
    Profile {
        /// The community to show (e.g. r-rust)
        community: String,
    },

    /// Compare all analyzed communities, most sensitive first
    Report,

    /// Gate a generation request against a community profile
    Gate {
        /// The target community
        #[arg(long)]
        community: String,

        /// Requested archetype: journey, problem-solution, or feedback
        #[arg(long, default_value = "feedback")]
        archetype: Archetype,

        /// Account status: new, warming-up, or established
        #[arg(long, default_value = "established")]
        account_status: AccountStatus,
    },

    /// Check a draft post for forbidden phrases and score it
    Check {
        /// The target community (for averages and its blacklist)
        #[arg(long)]
        community: String,

        /// Path to the draft text file
        #[arg(long)]
        file: String,
    },

    /// Manage the forbidden-pattern blacklist
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },

    /// Show system status (DB stats, profile freshness)
    Status,
}

#[derive(Subcommand)]
enum BlacklistAction {
    /// List blacklist entries
    List {
        /// Only entries visible to this community (its own + global)
        #[arg(long)]
        community: Option<String>,
    },

    /// Add a user-curated phrase (global unless --community is given)
    Add {
        /// Category: promotional, self-referential, link-patterns,
        /// low-effort, spam-indicators, or off-topic
        #[arg(long)]
        category: String,

        /// The literal phrase to forbid
        phrase: String,

        #[arg(long)]
        community: Option<String>,
    },

    /// Remove a user-added entry by id
    Remove { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("litmus=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing Litmus database...");
            let db = litmus::db::open(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nLitmus is ready. Next step: collect posts, then run:");
            println!("  litmus analyze --input posts.json");
        }

        Commands::Analyze { input } => {
            let db = litmus::db::open(&config.db_path)?;

            let raw = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read input file {input}"))?;
            let posts: Vec<RawPost> = serde_json::from_str(&raw)
                .with_context(|| format!("{input} is not a JSON array of posts"))?;
            println!("Loaded {} posts from {input}", posts.len());

            let analyzer = Analyzer::new()?;
            let options = RunOptions {
                batch_size: config.batch_size,
                top_hooks: config.top_hooks,
            };
            let handle = Arc::new(RunHandle::new());

            // Ctrl-C requests cooperative cancellation; the run stops at
            // the next between-post check.
            let cancel_handle = handle.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_handle.cancel();
                }
            });

            let pb = ProgressBar::new(posts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Scoring [{bar:30}] {pos}/{len} posts")
                    .unwrap(),
            );
            let progress_handle = handle.clone();
            let ticker_pb = pb.clone();
            let ticker = tokio::spawn(async move {
                loop {
                    let (processed, total) = progress_handle.progress();
                    ticker_pb.set_length(total as u64);
                    ticker_pb.set_position(processed as u64);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            });

            let result = analyzer.run(&db, posts, &options, &handle).await;
            ticker.abort();
            pb.finish_and_clear();
            let report = result?;

            println!(
                "\n{}",
                format!(
                    "Analyzed {} posts into {} profiles.",
                    report.posts_analyzed, report.profiles_created
                )
                .bold()
            );
            for (community, reason) in &report.errors {
                println!("  {} {community}: {reason}", "skipped".yellow());
            }
            println!("\nNext: litmus report");
        }

        Commands::Profile { community } => {
            let db = litmus::db::open(&config.db_path)?;
            match db.get_profile(&community).await? {
                Some(profile) => terminal::display_profile(&profile),
                None => println!(
                    "No profile for {community}. Run `litmus analyze --input posts.json` first."
                ),
            }
        }

        Commands::Report => {
            let db = litmus::db::open(&config.db_path)?;
            let profiles = db.list_profiles().await?;
            terminal::display_profile_list(&profiles);
        }

        Commands::Gate {
            community,
            archetype,
            account_status,
        } => {
            let db = litmus::db::open(&config.db_path)?;
            let profile = db.get_profile(&community).await?.with_context(|| {
                format!("No profile for {community}. Run `litmus analyze` first.")
            })?;

            println!(
                "Gating against {} (ISC {:.1}, {})",
                community,
                profile.sensitivity.score,
                profile.sensitivity.tier.as_str()
            );
            let constraint =
                validate_generation_request(profile.sensitivity.score, archetype, account_status);
            terminal::display_constraint(&constraint);
        }

        Commands::Check { community, file } => {
            let db = litmus::db::open(&config.db_path)?;
            let draft = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read draft file {file}"))?;

            let rules = RuleSet::compile()?;
            let mut phrases = rules.check_text(&draft);
            phrases.extend(blacklist_hits(&db, &community, &draft).await?);

            // Score against the community's stored averages when a profile
            // exists; otherwise only the text-local factors are meaningful.
            let averages = match db.get_profile(&community).await? {
                Some(profile) => CommunityAverages {
                    formality: profile.formality_level,
                    avg_sentence_length: profile.avg_sentence_length,
                    sentence_length_std: None,
                },
                None => {
                    println!(
                        "{}",
                        format!("No profile for {community}; rhythm and formality read neutral.")
                            .dimmed()
                    );
                    CommunityAverages::default()
                }
            };

            let score_rules = ScoreRules::compile()?;
            let metrics = extract_metrics(&draft);
            let score = score_post(&score_rules, &draft, &metrics, &averages);
            terminal::display_check(&phrases, &score);
        }

        Commands::Blacklist { action } => {
            let db = litmus::db::open(&config.db_path)?;
            match action {
                BlacklistAction::List { community } => {
                    let entries = db.list_patterns(community.as_deref()).await?;
                    terminal::display_blacklist(&entries);
                }
                BlacklistAction::Add {
                    category,
                    phrase,
                    community,
                } => {
                    let category = parse_category(&category)?;
                    let id = db
                        .add_user_pattern(community.as_deref(), category, &phrase)
                        .await?;
                    let scope = community.as_deref().unwrap_or("global");
                    println!("Added entry #{id} ({scope}): [{}] {phrase}", category.as_str());
                }
                BlacklistAction::Remove { id } => {
                    db.delete_user_pattern(id).await?;
                    println!("Removed entry #{id}");
                }
            }
        }

        Commands::Status => {
            let db = litmus::db::open(&config.db_path)?;
            let table_count = db.table_count().await?;
            let profiles = db.list_profiles().await?;
            let patterns = db.list_patterns(None).await?;

            println!("\n{}", "=== Litmus Status ===".bold());
            println!("  Database: {} ({table_count} tables)", config.db_path);
            println!("  Profiles: {}", profiles.len());
            println!("  Blacklist entries: {}", patterns.len());
            if let Some(latest) = profiles.iter().map(|p| p.analyzed_at.as_str()).max() {
                println!("  Last analysis: {latest}");
            }
            println!();
        }
    }

    Ok(())
}

/// Literal case-insensitive matches of the community's user-added
/// blacklist phrases in a draft. System entries describe rules, not
/// phrases, so only user entries are matched literally.
async fn blacklist_hits(
    db: &dyn Database,
    community: &str,
    draft: &str,
) -> Result<Vec<PenaltyPhrase>> {
    let lowered = draft.to_lowercase();
    let hits = db
        .list_patterns(Some(community))
        .await?
        .into_iter()
        .filter(|e| e.origin == litmus::db::models::PatternOrigin::User)
        .filter(|e| lowered.contains(&e.pattern_text.to_lowercase()))
        .map(|e| PenaltyPhrase {
            phrase: e.pattern_text,
            severity: e.category.base_severity(),
            category: e.category,
        })
        .collect();
    Ok(hits)
}

fn parse_category(s: &str) -> Result<PatternCategory> {
    let normalized = s.to_lowercase().replace(['-', '_', ' '], "");
    PatternCategory::ALL
        .iter()
        .find(|c| c.as_str().to_lowercase().replace(['-', ' '], "") == normalized)
        .copied()
        .with_context(|| {
            let names: Vec<String> = PatternCategory::ALL
                .iter()
                .map(|c| c.as_str().to_lowercase().replace(' ', "-"))
                .collect();
            format!("Unknown category {s:?}. One of: {}", names.join(", "))
        })
}
