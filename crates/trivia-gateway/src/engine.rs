//! The protocol engine
//!
//! Owns the connection state machine, the heartbeat task, and the dispatch
//! routing into the entity cache and command router. All inbound frames are
//! handled strictly sequentially by one task; the heartbeat task only ever
//! reads `last_seq` and writes to the outbound channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use trivia_cache::EntityCache;
use trivia_core::{GatewayEvent, Snowflake};
use trivia_game::GameTick;

use crate::commands::CommandRouter;
use crate::protocol::{
    GatewayMessage, IdentifyPayload, OpCode, ProtocolDecodeError, RequestGuildMembersPayload,
};

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Connected, waiting for the server's Hello
    AwaitingHello,
    /// Hello received, Identify sent, waiting for READY
    Identifying,
    /// Signed on and heartbeating
    Active,
    Reconnecting,
    Terminated,
}

/// The protocol engine driving one logical session
pub struct GatewayEngine {
    token: String,
    cache: EntityCache,
    router: CommandRouter,
    state: ConnectionState,
    /// Highest dispatch sequence seen; echoed verbatim in heartbeats
    last_seq: Arc<AtomicU64>,
    /// Sender into the current connection's writer task
    outbound: Option<mpsc::Sender<GatewayMessage>>,
    heartbeat: Option<JoinHandle<()>>,
    /// Whether the last heartbeat was acknowledged. Tracked and logged only;
    /// no timeout policy hangs off it.
    heartbeat_acked: bool,
    identified: bool,
}

impl GatewayEngine {
    pub fn new(token: String, router: CommandRouter) -> Self {
        Self {
            token,
            cache: EntityCache::new(),
            router,
            state: ConnectionState::Disconnected,
            last_seq: Arc::new(AtomicU64::new(0)),
            outbound: None,
            heartbeat: None,
            heartbeat_acked: true,
            identified: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "Connection state change");
            self.state = state;
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq.load(Ordering::SeqCst)
    }

    /// Wire a freshly opened connection's writer channel in
    pub fn attach_connection(&mut self, outbound: mpsc::Sender<GatewayMessage>) {
        self.outbound = Some(outbound);
        self.identified = false;
        self.heartbeat_acked = true;
        self.set_state(ConnectionState::AwaitingHello);
    }

    /// Tear down per-connection tasks after the transport drops
    pub fn detach_connection(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
        self.outbound = None;
        self.identified = false;
    }

    /// Handle one raw inbound frame
    ///
    /// A decode failure is returned for logging; it never tears the
    /// connection down.
    pub async fn handle_frame(&mut self, text: &str) -> Result<(), ProtocolDecodeError> {
        let message = GatewayMessage::from_json(text)?;

        match message.op {
            OpCode::Dispatch => self.on_dispatch(message).await?,
            OpCode::Heartbeat => {
                // client-originated op; should not appear inbound
                tracing::trace!("Ignoring inbound heartbeat op");
            }
            OpCode::Hello => self.on_hello(&message).await?,
            OpCode::HeartbeatAck => {
                self.heartbeat_acked = true;
                tracing::trace!("Heartbeat acknowledged");
            }
            other => {
                tracing::debug!(op = %other, "Unhandled op code, ignored");
            }
        }
        Ok(())
    }

    /// Handle a game-timer wake-up (serialized with frame handling)
    pub async fn handle_tick(&mut self, tick: GameTick) {
        self.router.handle_tick(tick).await;
    }

    /// Hello: start the heartbeat cadence, then identify
    async fn on_hello(&mut self, message: &GatewayMessage) -> Result<(), ProtocolDecodeError> {
        let hello = message.as_hello()?;
        tracing::info!(
            interval_ms = hello.heartbeat_interval,
            "Hello received, starting heartbeat"
        );

        self.start_heartbeat(hello.heartbeat_interval);
        self.send_identify().await;
        self.set_state(ConnectionState::Identifying);
        Ok(())
    }

    /// Exactly one heartbeat task runs per connection
    fn start_heartbeat(&mut self, interval_ms: u64) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
        let Some(outbound) = self.outbound.clone() else {
            tracing::warn!("Hello without an attached connection");
            return;
        };
        let last_seq = Arc::clone(&self.last_seq);

        self.heartbeat = Some(tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_millis(interval_ms.max(1)));
            // the first tick completes immediately; the cadence starts one
            // full interval after Hello
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let seq = last_seq.load(Ordering::SeqCst);
                if outbound.send(GatewayMessage::heartbeat(seq)).await.is_err() {
                    break;
                }
                tracing::trace!(seq, "Heartbeat sent");
            }
        }));
    }

    /// Identify is sent once per connection, immediately after Hello
    async fn send_identify(&mut self) {
        if self.identified {
            tracing::warn!("Identify already sent on this connection");
            return;
        }
        let payload = IdentifyPayload::new(self.token.clone());
        self.send(GatewayMessage::identify(&payload)).await;
        self.identified = true;
        tracing::debug!("Identify sent");
    }

    async fn request_guild_members(&mut self, guild_id: Snowflake) {
        let payload = RequestGuildMembersPayload::all(guild_id);
        self.send(GatewayMessage::request_guild_members(&payload)).await;
        tracing::debug!(guild_id = %guild_id, "Requested member chunks for large guild");
    }

    async fn send(&mut self, message: GatewayMessage) {
        match &self.outbound {
            Some(outbound) => {
                if outbound.send(message).await.is_err() {
                    tracing::warn!("Outbound channel closed, message dropped");
                }
            }
            None => tracing::warn!("No connection attached, message dropped"),
        }
    }

    /// Dispatch: bump `last_seq`, decode the event, route it
    async fn on_dispatch(&mut self, message: GatewayMessage) -> Result<(), ProtocolDecodeError> {
        let seq = message.s.ok_or(ProtocolDecodeError::MissingField("s"))?;
        self.last_seq.fetch_max(seq, Ordering::SeqCst);

        let name = message.t.ok_or(ProtocolDecodeError::MissingField("t"))?;
        let data = message.d.unwrap_or(serde_json::Value::Null);
        let event = GatewayEvent::decode(&name, data)?;

        tracing::debug!(event = %event.event_type(), seq, "Dispatch received");

        match event {
            GatewayEvent::Ready(payload) => {
                self.cache.apply_ready(payload);
                self.set_state(ConnectionState::Active);
            }
            GatewayEvent::GuildCreate(payload) => {
                let newly_seen = self.cache.apply_guild_create(&payload);
                if newly_seen {
                    self.router.bind_sandbox(payload.id);
                }
                if payload.large {
                    self.request_guild_members(payload.id).await;
                }
            }
            GatewayEvent::GuildUpdate(payload) => self.cache.apply_guild_update(&payload),
            GatewayEvent::GuildDelete(payload) => self.cache.apply_guild_delete(&payload),
            GatewayEvent::GuildMemberAdd(payload) => self.cache.apply_member_add(&payload),
            GatewayEvent::GuildMemberUpdate(payload) => self.cache.apply_member_update(&payload),
            GatewayEvent::GuildMemberRemove(payload) => self.cache.apply_member_remove(&payload),
            GatewayEvent::GuildRoleCreate(payload) => self.cache.apply_role_create(&payload),
            GatewayEvent::GuildRoleUpdate(payload) => self.cache.apply_role_update(&payload),
            GatewayEvent::GuildRoleDelete(payload) => self.cache.apply_role_delete(&payload),
            GatewayEvent::ChannelCreate(payload) => self.cache.apply_channel_create(&payload),
            GatewayEvent::ChannelUpdate(payload) => self.cache.apply_channel_update(&payload),
            GatewayEvent::ChannelDelete(payload) => self.cache.apply_channel_delete(&payload),
            GatewayEvent::MessageCreate(payload) => {
                let Self { cache, router, .. } = self;
                router.route(cache, &payload).await;
            }
            GatewayEvent::PresenceUpdate(payload) => self.cache.apply_presence_update(&payload),
            GatewayEvent::TypingStart => {}
            GatewayEvent::Unknown(name) => {
                tracing::debug!(event = %name, "Unconsumed dispatch event, ignored");
            }
        }
        Ok(())
    }
}
