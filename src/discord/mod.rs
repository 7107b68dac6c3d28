use crate::config::DiscordConfig;
use crate::corpus::ModelCache;
use crate::error::{DiscordError, ModelError, Result};
use crate::markov;
use serenity::{
    all::{Command, CreateInteractionResponse, CreateInteractionResponseMessage},
    async_trait,
    builder::CreateCommand,
    client::{Context, EventHandler},
    http::Http,
    model::{
        application::Interaction,
        channel::Message,
        gateway::Ready,
        id::{ChannelId, GuildId},
    },
    prelude::*,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const COMMAND_PREFIX: &str = "!";
pub const TALK_COMMAND: &str = "talk";
pub const TALK_HELP: &str = "SpongeBot will say a line";

/// Upper bound on a generated line, in characters
pub const MAX_LINE_CHARS: usize = 100;

/// Minimal view of a guild the bot belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: GuildId,
    pub name: String,
}

/// Shared state handed to the event handler
#[derive(Debug)]
pub struct BotContext {
    pub guild: GuildRef,
    pub models: ModelCache,
}

/// Discord event handler for SpongeBot
pub struct SpongeBot {
    state: Arc<BotContext>,
}

impl SpongeBot {
    pub fn new(state: Arc<BotContext>) -> Self {
        Self { state }
    }

    async fn generate_line(&self) -> Result<String> {
        let model = self.state.models.model().await?;
        let mut rng = rand::thread_rng();
        model
            .make_short_sentence(MAX_LINE_CHARS, &mut rng)
            .ok_or_else(|| {
                ModelError::Exhausted {
                    tries: markov::DEFAULT_TRIES,
                }
                .into()
            })
    }

    async fn handle_talk(&self, ctx: &Context, channel_id: ChannelId) -> Result<()> {
        let line = self.generate_line().await?;
        channel_id
            .say(&ctx.http, line)
            .await
            .map_err(|source| DiscordError::SendFailed {
                channel_id: channel_id.get(),
                source,
            })?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for SpongeBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);

        let guild = &self.state.guild;
        println!(
            "{} is connected to the following guild:\n{}(id: {})\n",
            ready.user.name, guild.name, guild.id
        );

        match ctx.http.get_guild_members(guild.id, Some(1000), None).await {
            Ok(members) => {
                let names: Vec<&str> = members.iter().map(|m| m.user.name.as_str()).collect();
                println!("Guild Members:\n - {}", names.join("\n - "));
            }
            // Needs the privileged members intent; keep going without the list
            Err(why) => warn!("Cannot enumerate guild members: {:?}", why),
        }

        println!(
            "Hey there! My name is Spongebot Squarepants.\n\
             To make me to say something, type \"{}{}\"\n\
             Hope you have fun, cuz I'm ready!",
            COMMAND_PREFIX, TALK_COMMAND
        );

        let command = CreateCommand::new(TALK_COMMAND).description(TALK_HELP);
        if let Err(why) = Command::create_global_command(&ctx.http, command).await {
            error!("Cannot create slash command: {:?}", why);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bot's own messages
        if msg.author.bot {
            return;
        }

        let Some(command) = parse_command(&msg.content) else {
            return;
        };

        match command {
            BotCommand::Talk => {
                let typing = msg.channel_id.start_typing(&ctx.http);
                let result = self.handle_talk(&ctx, msg.channel_id).await;
                typing.stop();

                if let Err(e) = result {
                    // The failure only reaches the logs; the channel stays quiet
                    error!("talk command failed: {e}");
                }
            }
            BotCommand::Help => {
                if let Err(why) = msg.channel_id.say(&ctx.http, help_text()).await {
                    error!("Error sending help: {:?}", why);
                }
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            if command.data.name != TALK_COMMAND {
                warn!("Unknown command: {}", command.data.name);
                return;
            }

            let response = match self.generate_line().await {
                Ok(line) => CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content(line),
                ),
                Err(e) => {
                    error!("talk command failed: {e}");
                    // Interactions must be acknowledged, unlike prefix commands
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("I got nothing. Try again later.")
                            .ephemeral(true),
                    )
                }
            };

            if let Err(why) = command.create_response(&ctx.http, response).await {
                error!("Cannot respond to slash command: {:?}", why);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BotCommand {
    Talk,
    Help,
}

/// Exact-match prefix command parsing; commands take no arguments
fn parse_command(content: &str) -> Option<BotCommand> {
    let rest = content.trim().strip_prefix(COMMAND_PREFIX)?;
    match rest {
        TALK_COMMAND => Some(BotCommand::Talk),
        "help" => Some(BotCommand::Help),
        _ => None,
    }
}

fn help_text() -> String {
    format!("Commands:\n  {COMMAND_PREFIX}{TALK_COMMAND} - {TALK_HELP}")
}

/// Resolve the configured guild by exact name against the guilds the bot
/// belongs to. Runs before the gateway starts so a bad name fails fast.
pub async fn resolve_guild(http: &Http, wanted: &str) -> Result<GuildRef> {
    let guilds = http
        .get_guilds(None, None)
        .await
        .map_err(DiscordError::Other)?;
    let refs: Vec<GuildRef> = guilds
        .into_iter()
        .map(|g| GuildRef {
            id: g.id,
            name: g.name,
        })
        .collect();

    if let Some(guild) = find_guild(&refs, wanted) {
        return Ok(guild.clone());
    }

    Err(DiscordError::GuildNotFound {
        name: wanted.to_string(),
        available: refs.into_iter().map(|g| g.name).collect(),
    }
    .into())
}

fn find_guild<'a>(guilds: &'a [GuildRef], wanted: &str) -> Option<&'a GuildRef> {
    guilds.iter().find(|g| g.name == wanted)
}

/// Create the Discord client (without starting it)
pub async fn create_client(
    config: &DiscordConfig,
    state: Arc<BotContext>,
) -> Result<serenity::Client> {
    let handler = SpongeBot::new(state);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client_builder = Client::builder(&config.token, intents).event_handler(handler);

    if let Some(app_id) = config.application_id {
        client_builder = client_builder.application_id(app_id.into());
    }

    let client = client_builder
        .await
        .map_err(|source| DiscordError::ConnectionFailed { source })?;

    Ok(client)
}

/// Create and run the Discord bot
pub async fn run_bot(config: &DiscordConfig, state: Arc<BotContext>) -> Result<()> {
    let mut client = create_client(config, state).await?;

    info!("Starting Discord gateway");
    client
        .start()
        .await
        .map_err(|source| DiscordError::ConnectionFailed { source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_the_talk_command() {
        assert_eq!(parse_command("!talk"), Some(BotCommand::Talk));
        assert_eq!(parse_command("  !talk  "), Some(BotCommand::Talk));
        assert_eq!(parse_command("!help"), Some(BotCommand::Help));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_command("!talk now"), None);
        assert_eq!(parse_command("talk"), None);
        assert_eq!(parse_command("!Talk"), None);
        assert_eq!(parse_command("?talk"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("hello there"), None);
    }

    #[test]
    fn help_names_the_trigger_and_description() {
        let help = help_text();
        assert!(help.contains("!talk"));
        assert!(help.contains(TALK_HELP));
    }

    #[test]
    fn guild_match_is_exact() {
        let guilds = vec![
            GuildRef {
                id: GuildId::new(1),
                name: "Bikini Bottom".to_string(),
            },
            GuildRef {
                id: GuildId::new(2),
                name: "Rock Bottom".to_string(),
            },
        ];

        assert_eq!(
            find_guild(&guilds, "Bikini Bottom").map(|g| g.id),
            Some(GuildId::new(1))
        );
        assert_eq!(find_guild(&guilds, "bikini bottom"), None);
        assert_eq!(find_guild(&guilds, "Bikini"), None);
        assert_eq!(find_guild(&guilds, "Atlantis"), None);
    }

    #[test]
    fn guild_not_found_error_names_the_alternatives() {
        let err = DiscordError::GuildNotFound {
            name: "Atlantis".to_string(),
            available: vec!["Bikini Bottom".to_string(), "Rock Bottom".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("Atlantis"));
        assert!(message.contains("Bikini Bottom"));
        assert!(message.contains("Rock Bottom"));
    }
}
