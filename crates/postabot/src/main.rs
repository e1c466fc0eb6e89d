use std::io::{self, Write};

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use postabot::cli::{Cli, Commands};
use postabot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use postacore::core::{config, init_logger};
use postacore::storage::Tariff;
use postacore::Database;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot().await,
        Some(Commands::Migrate) => migrate(),
        Some(Commands::Tariffs { json }) => print_tariffs(json),
    }
}

fn open_database() -> Result<Database> {
    Database::open(&config::DATABASE_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", config::DATABASE_PATH.as_str(), e))
}

fn migrate() -> Result<()> {
    let db = open_database()?;
    let tariffs = db.all_tariffs()?.len();
    log::info!("Database {} is up to date ({} tariffs)", config::DATABASE_PATH.as_str(), tariffs);
    db.close();
    Ok(())
}

fn format_tariff_table(tariffs: &[Tariff]) -> String {
    let mut out = format!(
        "{:<10} {:<12} {:>8} {:>10} {:>8} {:>8} {:<6}\n",
        "CODE", "NAME", "CHANNELS", "POSTS/DAY", "STARS", "CRYPTO", "ACTIVE"
    );
    for t in tariffs {
        let crypto = t.crypto_price.map(|p| format!("${}", p)).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<10} {:<12} {:>8} {:>10} {:>8} {:>8} {:<6}\n",
            t.code.as_str(),
            t.name,
            t.channels_limit,
            t.posts_per_day,
            t.stars_price,
            crypto,
            if t.is_active { "yes" } else { "no" }
        ));
    }
    out
}

/// Writes the tariff table (or its JSON form) and nothing else.
fn write_tariffs(out: &mut impl Write, tariffs: &[Tariff], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, tariffs)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", format_tariff_table(tariffs))?;
    }
    Ok(())
}

fn print_tariffs(json: bool) -> Result<()> {
    let db = open_database()?;
    let tariffs = db.all_tariffs()?;
    db.close();

    let mut stdout = io::stdout().lock();
    write_tariffs(&mut stdout, &tariffs, json)?;
    stdout.flush()?;
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let db = open_database()?;
    let bot = create_bot()?;

    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Bot API: {}", e))?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    setup_bot_commands(&bot).await?;

    let admin_ids = config::admin::ADMIN_IDS.clone();
    if admin_ids.is_empty() {
        log::warn!("ADMIN_IDS is empty; admin panel is unreachable");
    }
    let grant_days = *config::subscription::GRANT_DAYS;
    log::info!("Tariff grants last {} days, {} admin(s)", grant_days, admin_ids.len());

    let handler = schema(HandlerDeps::new(db.clone(), admin_ids, grant_days));

    log::info!("Starting bot in long polling mode");
    let listener = Polling::builder(bot.clone()).build();
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    db.close();
    Ok(())
}
