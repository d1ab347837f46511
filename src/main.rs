use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quest_bot::db::{self, ProfileStore, SqliteProfileStore};
use quest_bot::{Config, Daemon};

/// Quest - tutoring bot that solves typed or photographed tasks
#[derive(Parser)]
#[command(name = "quest", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Delay after a failed poll, in milliseconds
    #[arg(long, env = "QUEST_POLL_INTERVAL_MS", default_value = "1000")]
    poll_interval_ms: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show a user's stored profile
    Profile {
        /// Telegram user ID
        #[arg(short, long)]
        user: i64,
    },
    /// Delete expired profiles and exit
    Purge,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = match cli.verbose {
        0 => "info,quest_bot=info",
        1 => "info,quest_bot=debug",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Profile { user } => show_profile(&config, user).await,
            Command::Purge => purge(&config),
        };
    }

    tracing::info!(
        poll_interval_ms = cli.poll_interval_ms,
        db = %config.profile_db_path.display(),
        "starting quest bot"
    );

    Daemon::new(config, Duration::from_millis(cli.poll_interval_ms))
        .run()
        .await?;

    Ok(())
}

async fn show_profile(config: &Config, user: i64) -> anyhow::Result<()> {
    let store = SqliteProfileStore::new(db::init(&config.profile_db_path)?);

    match store.get(user).await? {
        Some(profile) => {
            println!("name:     {}", profile.name);
            println!("language: {}", profile.language);
            println!("style:    {}", profile.style);
        }
        None => println!("No profile stored for user {user}"),
    }

    Ok(())
}

fn purge(config: &Config) -> anyhow::Result<()> {
    let store = SqliteProfileStore::new(db::init(&config.profile_db_path)?);
    let purged = store.purge_expired()?;
    println!("Removed {purged} expired profile(s)");
    Ok(())
}
