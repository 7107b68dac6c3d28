use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::{env, path::Path};

/// Main configuration for SpongeBot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot configuration
    pub discord: DiscordConfig,
    /// Corpus configuration (optional, uses defaults if absent)
    #[serde(default)]
    pub corpus: CorpusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,
    /// Exact name of the guild the bot announces itself in
    pub guild: String,
    /// Discord application ID (needed for slash commands)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Path to the corpus text file
    pub path: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: "SpongeBot.txt".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                token: String::new(),
                guild: String::new(),
                application_id: None,
            },
            corpus: CorpusConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.is_empty() {
            return Err(ConfigError::Invalid {
                field: "discord.token".to_string(),
                reason: "Discord token cannot be empty".to_string(),
            }
            .into());
        }

        if self.discord.guild.is_empty() {
            return Err(ConfigError::Invalid {
                field: "discord.guild".to_string(),
                reason: "Guild name cannot be empty".to_string(),
            }
            .into());
        }

        if self.corpus.path.is_empty() {
            return Err(ConfigError::Invalid {
                field: "corpus.path".to_string(),
                reason: "Corpus path cannot be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("SPONGEBOT_CONFIG").unwrap_or_else(|_| "spongebot.toml".to_string());

        if Path::new(&config_path).exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|_e| ConfigError::NotFound {
                    path: config_path.clone(),
                })?;
            let config: Config =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed { source: e })?;

            // Environment variables win over the file
            Ok(config.override_from_env())
        } else {
            Ok(Self::from_env())
        }
    }

    /// Create config from environment variables only
    pub fn from_env() -> Self {
        Self::default().override_from_env()
    }

    fn override_from_env(mut self) -> Self {
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            self.discord.token = token;
        }
        if let Ok(guild) = env::var("DISCORD_GUILD") {
            self.discord.guild = guild;
        }
        if let Ok(app_id) = env::var("DISCORD_APP_ID") {
            if let Ok(id) = app_id.parse() {
                self.discord.application_id = Some(id);
            }
        }
        if let Ok(path) = env::var("CORPUS_PATH") {
            self.corpus.path = path;
        }

        self
    }
}

/// Helper to load dotenv file if it exists
pub fn load_dotenv() {
    if let Ok(path) = env::var("DOTENV_PATH") {
        dotenvy::from_path(&path).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}
