use miette::Result;
use spongebot::{
    config::{self, Config},
    corpus::ModelCache,
    discord::{self, BotContext},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();
    println!("Starting SpongeBot");

    // Load environment variables
    config::load_dotenv();

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    println!("Loaded configuration");

    // Resolve the configured guild before the gateway starts so a bad
    // name fails here instead of on first use
    let http = serenity::http::Http::new(&config.discord.token);
    let guild = discord::resolve_guild(&http, &config.discord.guild).await?;
    info!("Resolved guild '{}' (id: {})", guild.name, guild.id);

    let state = Arc::new(BotContext {
        guild,
        models: ModelCache::new(&config.corpus.path),
    });

    // Run Discord bot
    if let Err(why) = discord::run_bot(&config.discord, state).await {
        eprintln!("Discord bot error: {:?}", why);
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs").ok();

    // Create file appender
    let file_appender = tracing_appender::rolling::daily("logs", "spongebot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the entire program
    Box::leak(Box::new(_guard));

    // Set up subscribers
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spongebot=debug,serenity=info".into()),
        )
        .with(
            // Console output
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true),
        )
        .with(
            // File output
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .init();
}
