//! Command line admin client
//!
//! `logbook-review approve <id>`, `reject <id>` and `stats` talk to a running
//! server; `migrate` and `rollback` operate on the configured database.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use logbook_admin::{
    client::{ClientError, ReviewActions, ReviewApi, ReviewClient, StatsQuery},
    config::Config,
    db::{self, migrations},
    logging,
    models::{Document, DocumentStatus},
};

#[derive(Parser, Debug)]
#[command(name = "logbook-review", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file
    #[arg(long, global = true, default_value = "config.yml")]
    config: PathBuf,

    /// Server base URL (overrides config)
    #[arg(long, global = true, env = "LOGBOOK_CLIENT_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Approve a pending document
    Approve {
        /// Document id
        id: String,
    },
    /// Reject a pending document
    Reject {
        /// Document id
        id: String,
    },
    /// Show document counts per review status
    Stats,
    /// Apply pending database migrations
    Migrate {
        /// Only report how many migrations are pending; exits non-zero if any are
        #[arg(long)]
        check: bool,
    },
    /// Revert the newest applied migration, or a specific version
    Rollback {
        #[arg(long)]
        version: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(logging::DEFAULT_CLI_FILTER);

    let cli = Cli::parse();
    let mut config = Config::load_with_env(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }

    match cli.command {
        Commands::Approve { id } => {
            let actions = review_actions(&config)?;
            report_review(actions.approve(&id).await)?;
        }
        Commands::Reject { id } => {
            let actions = review_actions(&config)?;
            report_review(actions.reject(&id).await)?;
        }
        Commands::Stats => {
            let api: Arc<dyn ReviewApi> = Arc::new(ReviewClient::from_config(&config.client)?);
            let stats = StatsQuery::new(api, config.client.stats_stale_time()).fetch().await?;
            println!("{:<10}{}", "total", stats.total);
            for status in DocumentStatus::ALL {
                println!("{:<10}{}", status.as_str(), stats.count(status));
            }
        }
        Commands::Migrate { check } => {
            let pool = db::create_pool(&config.database).await?;
            let result = if check {
                migrations::pending_count(&pool).await.map(|pending| {
                    println!("{} migration(s) pending", pending);
                    pending == 0
                })
            } else {
                migrations::run_migrations(&pool).await.map(|applied| {
                    println!("Applied {} migration(s)", applied);
                    true
                })
            };
            pool.close().await;
            if !result? {
                std::process::exit(1);
            }
        }
        Commands::Rollback { version } => {
            let pool = db::create_pool(&config.database).await?;
            match version {
                Some(v) => {
                    if migrations::revert_migration(&pool, v).await? {
                        println!("Reverted migration {}", v);
                    } else {
                        println!("Migration {} is not applied", v);
                    }
                }
                None => match migrations::rollback_last(&pool).await? {
                    Some(v) => println!("Reverted migration {}", v),
                    None => println!("No migrations to revert"),
                },
            }
            pool.close().await;
        }
    }

    Ok(())
}

/// Print the outcome of a review, naming the server's error code on rejection
fn report_review(result: Result<Document, ClientError>) -> Result<()> {
    match result {
        Ok(doc) => {
            println!("{} is now {}", doc.id, doc.status);
            Ok(())
        }
        Err(e) if e.is_timeout() => anyhow::bail!("The review server did not answer in time"),
        Err(e) => match e.code() {
            Some("CONFLICT") => anyhow::bail!("Document was already reviewed: {}", e),
            Some("NOT_FOUND") => anyhow::bail!("No such document: {}", e),
            _ => Err(e.into()),
        },
    }
}

fn review_actions(config: &Config) -> Result<ReviewActions> {
    let api: Arc<dyn ReviewApi> = Arc::new(ReviewClient::from_config(&config.client)?);
    let stats = Arc::new(StatsQuery::new(api.clone(), config.client.stats_stale_time()));
    Ok(ReviewActions::new(api, stats))
}
