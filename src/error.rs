use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SpongeBot operations
#[derive(Error, Debug, Diagnostic)]
pub enum SpongeBotError {
    #[error("Configuration error")]
    #[diagnostic(help("Check your configuration file"))]
    Config(#[from] ConfigError),

    #[error("Discord error")]
    #[diagnostic(help("Check Discord bot token and permissions"))]
    Discord(#[from] DiscordError),

    #[error("Corpus error")]
    #[diagnostic(help("Check the corpus file path and permissions"))]
    Corpus(#[from] CorpusError),

    #[error("Text model error")]
    #[diagnostic(help("The corpus may be too sparse to generate from"))]
    Model(#[from] ModelError),
}

/// Configuration errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}")]
    #[diagnostic(
        code(spongebot::config::not_found),
        help("Create a config file or use environment variables")
    )]
    NotFound { path: String },

    #[error("Invalid configuration")]
    #[diagnostic(
        code(spongebot::config::invalid),
        help("Check configuration format and required fields")
    )]
    Invalid { field: String, reason: String },

    #[error("Failed to parse configuration")]
    #[diagnostic(
        code(spongebot::config::parse_failed),
        help("Check TOML syntax and field types")
    )]
    ParseFailed {
        #[source]
        source: toml::de::Error,
    },
}

/// Discord-specific errors
#[derive(Error, Debug, Diagnostic)]
pub enum DiscordError {
    #[error("Guild '{name}' not found among the bot's guilds (available: {})", .available.join(", "))]
    #[diagnostic(
        code(spongebot::discord::guild_not_found),
        help("Check DISCORD_GUILD matches the exact name of a guild the bot was invited to")
    )]
    GuildNotFound { name: String, available: Vec<String> },

    #[error("Failed to connect to Discord")]
    #[diagnostic(
        code(spongebot::discord::connection_failed),
        help("Check bot token and network connection")
    )]
    ConnectionFailed {
        #[source]
        source: serenity::Error,
    },

    #[error("Failed to send message to channel {channel_id}")]
    #[diagnostic(
        code(spongebot::discord::send_failed),
        help("Check bot permissions in the channel")
    )]
    SendFailed {
        channel_id: u64,
        #[source]
        source: serenity::Error,
    },

    #[error("Discord error: {0}")]
    #[diagnostic()]
    Other(#[from] serenity::Error),
}

/// Corpus file errors
#[derive(Error, Debug, Diagnostic)]
pub enum CorpusError {
    #[error("Failed to read corpus file {}", .path.display())]
    #[diagnostic(
        code(spongebot::corpus::unreadable),
        help("Ensure the corpus file exists and is readable")
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sentence generation errors
#[derive(Error, Debug, Diagnostic)]
pub enum ModelError {
    #[error("No sentence produced within {tries} attempts")]
    #[diagnostic(
        code(spongebot::model::exhausted),
        help("The corpus may be too small or too repetitive for the length constraint")
    )]
    Exhausted { tries: usize },
}

/// Type alias for Results in SpongeBot
pub type Result<T> = std::result::Result<T, SpongeBotError>;
