//! Chat command routing
//!
//! Tokenizes message content on whitespace and matches the first token
//! (after the command prefix) against the fixed command table. Anything that
//! is not a recognized command in a channel with an active game is treated
//! as a candidate trivia answer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use trivia_cache::EntityCache;
use trivia_core::events::MessagePayload;
use trivia_core::{
    CustomScript, CustomScriptStore, MessageSender, QuestionStore, SandboxFactory, ScoreStore,
    ScriptSandbox, Snowflake,
};
use trivia_game::{GameOutcome, GameTick, TickSender, TriviaGame};

/// Routes chat messages to built-ins, the game engine, or the sandbox
pub struct CommandRouter {
    prefix: String,
    default_question_count: u32,
    default_hint_interval: Duration,
    /// Active games, keyed by channel; at most one per channel
    games: HashMap<Snowflake, TriviaGame>,
    /// One sandbox per guild, bound on the guild's first appearance
    sandboxes: HashMap<Snowflake, Box<dyn ScriptSandbox>>,
    /// Custom command table, loaded from the store at startup
    custom_commands: Vec<CustomScript>,
    tick_tx: TickSender,
    sender: Arc<dyn MessageSender>,
    questions: Arc<dyn QuestionStore>,
    scores: Arc<dyn ScoreStore>,
    scripts: Arc<dyn CustomScriptStore>,
    sandbox_factory: Arc<dyn SandboxFactory>,
}

impl CommandRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prefix: String,
        default_question_count: u32,
        default_hint_interval: Duration,
        tick_tx: TickSender,
        sender: Arc<dyn MessageSender>,
        questions: Arc<dyn QuestionStore>,
        scores: Arc<dyn ScoreStore>,
        scripts: Arc<dyn CustomScriptStore>,
        sandbox_factory: Arc<dyn SandboxFactory>,
    ) -> Self {
        Self {
            prefix,
            default_question_count,
            default_hint_interval,
            games: HashMap::new(),
            sandboxes: HashMap::new(),
            custom_commands: Vec::new(),
            tick_tx,
            sender,
            questions,
            scores,
            scripts,
            sandbox_factory,
        }
    }

    /// Populate the custom command table from the store
    pub async fn load_custom_commands(&mut self) {
        match self.scripts.load_all().await {
            Ok(commands) => {
                tracing::info!(count = commands.len(), "Custom commands loaded");
                self.custom_commands = commands;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load custom commands, table stays empty");
            }
        }
    }

    /// Create the per-guild sandbox binding if one does not exist
    pub fn bind_sandbox(&mut self, guild_id: Snowflake) {
        if !self.sandboxes.contains_key(&guild_id) {
            let sandbox = self.sandbox_factory.create(guild_id);
            self.sandboxes.insert(guild_id, sandbox);
        }
    }

    pub fn active_game_count(&self) -> usize {
        self.games.len()
    }

    pub fn has_game(&self, channel_id: Snowflake) -> bool {
        self.games.contains_key(&channel_id)
    }

    /// Route one inbound chat message
    pub async fn route(&mut self, cache: &EntityCache, msg: &MessagePayload) {
        // never react to our own messages
        if cache.current_user().is_some_and(|u| u.id == msg.author.id) {
            return;
        }

        let content = msg.content.trim();
        let handled = match content.strip_prefix(self.prefix.as_str()) {
            Some(stripped) => self.dispatch_command(cache, msg, stripped).await,
            None => false,
        };
        if handled {
            return;
        }

        // no command matched: candidate answer when a game is active here
        let finished = match self.games.get_mut(&msg.channel_id) {
            Some(game) => game.handle_answer(msg.author.id, content).await == GameOutcome::Finished,
            None => false,
        };
        if finished {
            self.games.remove(&msg.channel_id);
        }
    }

    /// Hint-timer wake-up, serialized with message handling
    pub async fn handle_tick(&mut self, tick: GameTick) {
        let finished = match self.games.get_mut(&tick.channel_id) {
            Some(game) => game.on_tick(tick.epoch).await == GameOutcome::Finished,
            None => false,
        };
        if finished {
            self.games.remove(&tick.channel_id);
        }
    }

    /// Returns whether the message was consumed as a command
    async fn dispatch_command(
        &mut self,
        cache: &EntityCache,
        msg: &MessagePayload,
        stripped: &str,
    ) -> bool {
        let mut tokens = stripped.split_whitespace();
        let Some(command) = tokens.next() else {
            return false;
        };
        let args: Vec<&str> = tokens.collect();

        match command {
            "trivia" | "t" => {
                self.trivia_command(msg.channel_id, &args).await;
                true
            }
            "stop" | "s" => {
                self.stop_game(msg.channel_id).await;
                true
            }
            "help" | "h" => {
                self.reply(msg.channel_id, self.help_text());
                true
            }
            "guilds" => {
                self.reply(msg.channel_id, guild_listing(cache));
                true
            }
            "channels" => {
                self.reply(msg.channel_id, channel_listing(cache));
                true
            }
            "info" => {
                self.reply(msg.channel_id, info_line(cache));
                true
            }
            "debug" => {
                self.debug_command(cache, msg, &args);
                true
            }
            other => self.run_custom_command(cache, msg, other, &args).await,
        }
    }

    /// `trivia [N] [delaySeconds]`, `trivia stop|s`, `trivia help|h`
    async fn trivia_command(&mut self, channel_id: Snowflake, args: &[&str]) {
        match args.first().copied() {
            Some("stop" | "s") => {
                self.stop_game(channel_id).await;
                return;
            }
            Some("help" | "h") => {
                self.reply(channel_id, self.help_text());
                return;
            }
            _ => {}
        }

        if args.len() > 2 {
            self.reply(channel_id, ":exclamation: Invalid arguments!".to_string());
            return;
        }

        let question_count = match args.first() {
            None => self.default_question_count,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    self.reply(channel_id, ":exclamation: Invalid arguments!".to_string());
                    return;
                }
            },
        };

        let hint_interval = match args.get(1) {
            None => self.default_hint_interval,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    self.reply(channel_id, ":exclamation: Invalid arguments!".to_string());
                    return;
                }
            },
        };

        self.start_game(channel_id, question_count, hint_interval).await;
    }

    async fn start_game(
        &mut self,
        channel_id: Snowflake,
        question_count: u32,
        hint_interval: Duration,
    ) {
        if self.games.contains_key(&channel_id) {
            self.reply(
                channel_id,
                ":exclamation: A game is already running in this channel!".to_string(),
            );
            return;
        }

        // the game is registered before its first timer is armed
        self.games.insert(
            channel_id,
            TriviaGame::new(
                channel_id,
                question_count,
                hint_interval,
                self.tick_tx.clone(),
                Arc::clone(&self.sender),
                Arc::clone(&self.questions),
                Arc::clone(&self.scores),
            ),
        );

        let started = match self.games.get_mut(&channel_id) {
            Some(game) => game.begin().await,
            None => return,
        };
        if let Err(e) = started {
            tracing::error!(channel_id = %channel_id, error = %e, "Game failed to start");
            self.games.remove(&channel_id);
            self.reply(
                channel_id,
                ":exclamation: Could not start a game right now.".to_string(),
            );
        }
    }

    async fn stop_game(&mut self, channel_id: Snowflake) {
        let stopped = match self.games.get_mut(&channel_id) {
            Some(game) => {
                game.stop().await;
                true
            }
            None => false,
        };
        if stopped {
            self.games.remove(&channel_id);
        } else {
            self.reply(
                channel_id,
                ":exclamation: No game is running in this channel.".to_string(),
            );
        }
    }

    /// `debug guild|channel|member|role <id or name>`
    fn debug_command(&self, cache: &EntityCache, msg: &MessagePayload, args: &[&str]) {
        const USAGE: &str = ":exclamation: Usage: debug guild|channel|member|role <id or name>";

        let Some((kind, rest)) = args.split_first() else {
            self.reply(msg.channel_id, USAGE.to_string());
            return;
        };
        let reference = rest.join(" ");
        if reference.is_empty() {
            self.reply(msg.channel_id, USAGE.to_string());
            return;
        }

        let dump = match *kind {
            "guild" => cache.guild_by_ref(&reference).map(|g| g.describe()),
            "channel" => cache.channel_by_ref(&reference).map(|c| c.describe()),
            "role" => cache.role_by_ref(&reference).map(|r| r.describe()),
            "member" => {
                // resolved within the guild this command was issued in
                let guild_id = cache.channel(msg.channel_id).map(|c| c.guild_id);
                guild_id
                    .and_then(|gid| cache.member_by_ref(gid, &reference))
                    .and_then(|m| cache.user(m.user_id).map(|u| m.describe(u)))
            }
            _ => {
                self.reply(msg.channel_id, USAGE.to_string());
                return;
            }
        };

        match dump {
            Some(text) => self.reply(msg.channel_id, text),
            None => self.reply(
                msg.channel_id,
                ":exclamation: Nothing found for that reference.".to_string(),
            ),
        }
    }

    /// Look up and execute a guild's custom command; false when none matches
    async fn run_custom_command(
        &self,
        cache: &EntityCache,
        msg: &MessagePayload,
        name: &str,
        args: &[&str],
    ) -> bool {
        let Some(channel) = cache.channel(msg.channel_id) else {
            return false;
        };
        let guild_id = channel.guild_id;

        let Some(script) = self
            .custom_commands
            .iter()
            .find(|c| c.guild_id == guild_id && c.command_name == name)
        else {
            return false;
        };

        let Some(sandbox) = self.sandboxes.get(&guild_id) else {
            tracing::warn!(guild_id = %guild_id, "Custom command without a sandbox binding");
            return true;
        };
        let Some(context) = crate::sandbox::build_context(
            cache,
            guild_id,
            msg.channel_id,
            msg.author.id,
            args.join(" "),
        ) else {
            tracing::warn!(
                guild_id = %guild_id,
                user_id = %msg.author.id,
                "Could not snapshot context for custom command"
            );
            return true;
        };

        match sandbox.execute(&script.script, context).await {
            Ok(replies) => {
                for reply in replies {
                    self.reply(msg.channel_id, reply);
                }
            }
            Err(e) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    command = name,
                    error = %e,
                    "Custom command failed"
                );
                self.reply(msg.channel_id, ":exclamation: Script failed.".to_string());
            }
        }
        true
    }

    fn help_text(&self) -> String {
        format!(
            "**Commands** (prefix `{p}`):\n\
             > {p}trivia [questions] [hintDelaySeconds] - start a trivia game\n\
             > {p}trivia stop (or {p}s) - stop the running game\n\
             > {p}guilds / {p}channels - list what the bot can see\n\
             > {p}info - bot status\n\
             > {p}debug guild|channel|member|role <id or name> - inspect the cache",
            p = self.prefix
        )
    }

    /// Send a reply without stalling the dispatch context
    fn reply(&self, channel_id: Snowflake, content: String) {
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            if let Err(e) = sender.send_message(channel_id, &content).await {
                tracing::warn!(channel_id = %channel_id, error = %e, "Reply delivery failed");
            }
        });
    }
}

fn guild_listing(cache: &EntityCache) -> String {
    let mut lines: Vec<String> = cache
        .iter_guilds()
        .map(|g| format!("> {} ({}) Channels: {}", g.name, g.id, g.channel_ids.len()))
        .collect();
    lines.sort();
    format!("Guild List:\n{}", lines.join("\n"))
}

fn channel_listing(cache: &EntityCache) -> String {
    let mut lines: Vec<String> = cache
        .iter_channels()
        .map(|c| {
            let guild_name = cache
                .guild(c.guild_id)
                .map_or("unknown", |g| g.name.as_str());
            format!(
                "> {} ({}) [{}] Guild: {} ({})",
                c.name,
                c.id,
                c.kind.name(),
                guild_name,
                c.guild_id
            )
        })
        .collect();
    lines.sort();
    format!("Channel List:\n{}", lines.join("\n"))
}

fn info_line(cache: &EntityCache) -> String {
    let identity = cache
        .current_user()
        .map_or_else(|| "(not signed on)".to_string(), |u| u.tag());
    format!(
        "{} v{} - {} guilds, {} channels, {} users cached",
        identity,
        env!("CARGO_PKG_VERSION"),
        cache.guild_count(),
        cache.channel_count(),
        cache.user_count()
    )
}
