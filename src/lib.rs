pub mod config;
pub mod corpus;
pub mod discord;
pub mod error;
pub mod markov;

// Re-export commonly used types
pub use config::Config;
pub use corpus::ModelCache;
pub use discord::{BotContext, GuildRef};
pub use error::{Result, SpongeBotError};
pub use markov::{SentenceOptions, TextModel};
