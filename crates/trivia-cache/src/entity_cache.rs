//! The entity cache and its apply-functions
//!
//! Every apply-function tolerates partially-unknown parents (warn and skip,
//! never panic) and is safe to call twice with the same payload. Lookups are
//! O(1) by ID; the guild link lists are searched by ID equality.

use std::collections::HashMap;

use trivia_core::events::{
    ChannelPayload, GuildDeletePayload, GuildPayload, GuildRoleDeletePayload, GuildRolePayload,
    MemberPayload, MemberRemovePayload, PresencePayload, ReadyPayload, UserPayload,
};
use trivia_core::{Channel, Guild, GuildMember, Role, Snowflake, User};

/// In-memory mirror of every entity the gateway has told us about
///
/// Cross-references are stored as IDs and resolved through the maps, so a
/// deletion can never leave a dangling alias behind.
#[derive(Debug, Default)]
pub struct EntityCache {
    guilds: HashMap<Snowflake, Guild>,
    channels: HashMap<Snowflake, Channel>,
    roles: HashMap<Snowflake, Role>,
    users: HashMap<Snowflake, User>,
    members: HashMap<(Snowflake, Snowflake), GuildMember>,
    /// The bot's own identity, captured from READY
    current_user: Option<User>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Apply-functions
    // =========================================================================

    /// READY: capture the bot's own user object
    pub fn apply_ready(&mut self, payload: ReadyPayload) {
        let user = payload.user.into_user();
        tracing::info!(tag = %user.tag(), "Sign-on confirmed");
        self.current_user = Some(user);
    }

    /// GUILD_CREATE: upsert the guild and everything nested inside it
    ///
    /// Returns `true` when the guild was not previously cached (first sight),
    /// which is the moment a per-guild sandbox binding gets created.
    pub fn apply_guild_create(&mut self, payload: &GuildPayload) -> bool {
        let guild_id = payload.id;
        let newly_seen = !self.guilds.contains_key(&guild_id);

        // A re-create (e.g. after reconnect) replaces the guild wholesale;
        // drop the old children first so nothing stale survives unlinked.
        if !newly_seen {
            self.remove_guild_cascade(guild_id);
        }

        let mut guild = payload.to_guild();

        for channel_payload in &payload.channels {
            let channel = channel_payload.to_channel(guild_id);
            guild.link_channel(channel.id);
            self.channels.insert(channel.id, channel);
        }

        for role_payload in &payload.roles {
            let role = role_payload.to_role(guild_id);
            guild.link_role(role.id);
            self.roles.insert(role.id, role);
        }

        for member_payload in &payload.members {
            let user_id = self.upsert_user(&member_payload.user);
            self.attach_user_to_guild(user_id, guild_id);
            guild.link_member(user_id);
            let mut member = member_payload.to_member(guild_id);
            member.role_ids = self.known_roles(&member.role_ids);
            self.members.insert((guild_id, user_id), member);
        }

        self.guilds.insert(guild_id, guild);

        // Presences reference members inserted above
        for presence in &payload.presences {
            self.apply_presence_update(presence);
        }

        tracing::debug!(
            guild_id = %guild_id,
            channels = payload.channels.len(),
            members = payload.members.len(),
            "Guild cached"
        );
        newly_seen
    }

    /// GUILD_UPDATE: patch scalar fields, links stay as they are
    pub fn apply_guild_update(&mut self, payload: &GuildPayload) {
        match self.guilds.get_mut(&payload.id) {
            Some(guild) => payload.apply_to(guild),
            None => {
                tracing::warn!(guild_id = %payload.id, "GUILD_UPDATE for unknown guild, skipped");
            }
        }
    }

    /// GUILD_DELETE: remove the guild and cascade over all of its children
    pub fn apply_guild_delete(&mut self, payload: &GuildDeletePayload) {
        if self.guilds.contains_key(&payload.id) {
            self.remove_guild_cascade(payload.id);
            self.guilds.remove(&payload.id);
            tracing::debug!(guild_id = %payload.id, "Guild removed");
        } else {
            tracing::warn!(guild_id = %payload.id, "GUILD_DELETE for unknown guild, skipped");
        }
    }

    /// GUILD_MEMBER_ADD: upsert the user, link it, insert the membership
    pub fn apply_member_add(&mut self, payload: &MemberPayload) {
        let Some(guild_id) = payload.guild_id else {
            tracing::warn!("GUILD_MEMBER_ADD without guild_id, skipped");
            return;
        };
        if !self.guilds.contains_key(&guild_id) {
            tracing::warn!(guild_id = %guild_id, "GUILD_MEMBER_ADD for unknown guild, skipped");
            return;
        }

        let user_id = self.upsert_user(&payload.user);
        self.attach_user_to_guild(user_id, guild_id);
        let mut member = payload.to_member(guild_id);
        member.role_ids = self.known_roles(&member.role_ids);
        self.members.insert((guild_id, user_id), member);
        if let Some(guild) = self.guilds.get_mut(&guild_id) {
            guild.link_member(user_id);
        }
    }

    /// GUILD_MEMBER_UPDATE: nickname patch plus wholesale role-set relink
    pub fn apply_member_update(&mut self, payload: &MemberPayload) {
        let Some(guild_id) = payload.guild_id else {
            tracing::warn!("GUILD_MEMBER_UPDATE without guild_id, skipped");
            return;
        };

        let user_id = payload.user.id;
        let roles = self.known_roles(&payload.roles);
        match self.members.get_mut(&(guild_id, user_id)) {
            Some(member) => {
                member.nickname = payload.nick.clone();
                member.set_roles(roles);
            }
            None => {
                tracing::warn!(
                    guild_id = %guild_id,
                    user_id = %user_id,
                    "GUILD_MEMBER_UPDATE for unknown member, skipped"
                );
                return;
            }
        }

        // Identity fields ride along on member updates
        if let Some(user) = self.users.get_mut(&user_id) {
            payload.user.apply_to(user);
        }
    }

    /// GUILD_MEMBER_REMOVE: drop the membership; the user goes too when this
    /// was its last guild
    pub fn apply_member_remove(&mut self, payload: &MemberRemovePayload) {
        let guild_id = payload.guild_id;
        let user_id = payload.user.id;

        if self.members.remove(&(guild_id, user_id)).is_none() {
            tracing::warn!(
                guild_id = %guild_id,
                user_id = %user_id,
                "GUILD_MEMBER_REMOVE for unknown member, skipped"
            );
            return;
        }
        if let Some(guild) = self.guilds.get_mut(&guild_id) {
            guild.unlink_member(user_id);
        }
        self.detach_user_from_guild(user_id, guild_id);
    }

    /// GUILD_ROLE_CREATE: insert the role and link it into the guild
    pub fn apply_role_create(&mut self, payload: &GuildRolePayload) {
        let guild_id = payload.guild_id;
        let Some(guild) = self.guilds.get_mut(&guild_id) else {
            tracing::warn!(guild_id = %guild_id, "GUILD_ROLE_CREATE for unknown guild, skipped");
            return;
        };

        let role = payload.role.to_role(guild_id);
        guild.link_role(role.id);
        self.roles.insert(role.id, role);
    }

    /// GUILD_ROLE_UPDATE: patch in place, or create when the role is absent
    pub fn apply_role_update(&mut self, payload: &GuildRolePayload) {
        match self.roles.get_mut(&payload.role.id) {
            Some(role) => payload.role.apply_to(role),
            None => self.apply_role_create(payload),
        }
    }

    /// GUILD_ROLE_DELETE: unlink from the guild role list first, then remove;
    /// members of the guild drop the reference in the same step
    pub fn apply_role_delete(&mut self, payload: &GuildRoleDeletePayload) {
        let Some(guild) = self.guilds.get_mut(&payload.guild_id) else {
            tracing::warn!(
                guild_id = %payload.guild_id,
                "GUILD_ROLE_DELETE for unknown guild, skipped"
            );
            return;
        };

        guild.unlink_role(payload.role_id);
        for user_id in guild.member_ids.clone() {
            if let Some(member) = self.members.get_mut(&(payload.guild_id, user_id)) {
                member.role_ids.retain(|&id| id != payload.role_id);
            }
        }
        self.roles.remove(&payload.role_id);
    }

    /// CHANNEL_CREATE: insert the channel and link it into the guild
    pub fn apply_channel_create(&mut self, payload: &ChannelPayload) {
        let Some(guild_id) = payload.guild_id else {
            tracing::warn!(channel_id = %payload.id, "CHANNEL_CREATE without guild_id, skipped");
            return;
        };
        let Some(guild) = self.guilds.get_mut(&guild_id) else {
            tracing::warn!(guild_id = %guild_id, "CHANNEL_CREATE for unknown guild, skipped");
            return;
        };

        guild.link_channel(payload.id);
        self.channels.insert(payload.id, payload.to_channel(guild_id));
    }

    /// CHANNEL_UPDATE: patch in place, or create when the channel is absent
    pub fn apply_channel_update(&mut self, payload: &ChannelPayload) {
        match self.channels.get_mut(&payload.id) {
            Some(channel) => payload.apply_to(channel),
            None => self.apply_channel_create(payload),
        }
    }

    /// CHANNEL_DELETE: unlink from the guild, then remove
    pub fn apply_channel_delete(&mut self, payload: &ChannelPayload) {
        let Some(channel) = self.channels.remove(&payload.id) else {
            tracing::warn!(channel_id = %payload.id, "CHANNEL_DELETE for unknown channel, skipped");
            return;
        };
        if let Some(guild) = self.guilds.get_mut(&channel.guild_id) {
            guild.unlink_channel(payload.id);
        }
    }

    /// PRESENCE_UPDATE: patch status/activity on an existing user only
    pub fn apply_presence_update(&mut self, payload: &PresencePayload) {
        match self.users.get_mut(&payload.user.id) {
            Some(user) => {
                user.status = payload.status;
                user.activity = payload.activity_name().map(str::to_string);
            }
            None => {
                tracing::debug!(
                    user_id = %payload.user.id,
                    "PRESENCE_UPDATE for unknown user, dropped"
                );
            }
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn guild(&self, id: Snowflake) -> Option<&Guild> {
        self.guilds.get(&id)
    }

    pub fn channel(&self, id: Snowflake) -> Option<&Channel> {
        self.channels.get(&id)
    }

    pub fn role(&self, id: Snowflake) -> Option<&Role> {
        self.roles.get(&id)
    }

    pub fn user(&self, id: Snowflake) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<&GuildMember> {
        self.members.get(&(guild_id, user_id))
    }

    /// The bot's own user, once READY has been applied
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn iter_guilds(&self) -> impl Iterator<Item = &Guild> {
        self.guilds.values()
    }

    pub fn iter_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn iter_users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn iter_members(&self) -> impl Iterator<Item = &GuildMember> {
        self.members.values()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Resolve a guild by ID string or exact name
    pub fn guild_by_ref(&self, reference: &str) -> Option<&Guild> {
        if let Ok(id) = reference.parse::<Snowflake>() {
            if let Some(guild) = self.guilds.get(&id) {
                return Some(guild);
            }
        }
        self.guilds.values().find(|g| g.name == reference)
    }

    /// Resolve a channel by ID string or exact name
    pub fn channel_by_ref(&self, reference: &str) -> Option<&Channel> {
        if let Ok(id) = reference.parse::<Snowflake>() {
            if let Some(channel) = self.channels.get(&id) {
                return Some(channel);
            }
        }
        self.channels.values().find(|c| c.name == reference)
    }

    /// Resolve a role by ID string or exact name
    pub fn role_by_ref(&self, reference: &str) -> Option<&Role> {
        if let Ok(id) = reference.parse::<Snowflake>() {
            if let Some(role) = self.roles.get(&id) {
                return Some(role);
            }
        }
        self.roles.values().find(|r| r.name == reference)
    }

    /// Resolve a member within a guild by user ID string, username, or nickname
    pub fn member_by_ref(&self, guild_id: Snowflake, reference: &str) -> Option<&GuildMember> {
        if let Ok(id) = reference.parse::<Snowflake>() {
            if let Some(member) = self.members.get(&(guild_id, id)) {
                return Some(member);
            }
        }
        self.members
            .values()
            .filter(|m| m.guild_id == guild_id)
            .find(|m| {
                m.nickname.as_deref() == Some(reference)
                    || self
                        .users
                        .get(&m.user_id)
                        .is_some_and(|u| u.username == reference)
            })
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Role references a member may carry; anything the cache cannot resolve
    /// is dropped so no dangling role ID is ever stored
    fn known_roles(&self, role_ids: &[Snowflake]) -> Vec<Snowflake> {
        role_ids
            .iter()
            .copied()
            .filter(|id| self.roles.contains_key(id))
            .collect()
    }

    /// Insert a user or refresh its identity fields; returns the ID
    fn upsert_user(&mut self, payload: &UserPayload) -> Snowflake {
        match self.users.get_mut(&payload.id) {
            Some(user) => payload.apply_to(user),
            None => {
                self.users.insert(payload.id, payload.clone().into_user());
            }
        }
        payload.id
    }

    fn attach_user_to_guild(&mut self, user_id: Snowflake, guild_id: Snowflake) {
        if let Some(user) = self.users.get_mut(&user_id) {
            user.guild_ids.insert(guild_id);
        }
    }

    /// Drop one guild from a user's visibility set; a user with no remaining
    /// memberships leaves the cache entirely
    fn detach_user_from_guild(&mut self, user_id: Snowflake, guild_id: Snowflake) {
        let remove = match self.users.get_mut(&user_id) {
            Some(user) => {
                user.guild_ids.remove(&guild_id);
                user.guild_ids.is_empty()
            }
            None => false,
        };
        if remove {
            self.users.remove(&user_id);
        }
    }

    /// Remove every child of a guild: channels first, then roles, then
    /// memberships (pruning users), all in one logical step
    fn remove_guild_cascade(&mut self, guild_id: Snowflake) {
        let Some(guild) = self.guilds.get(&guild_id) else {
            return;
        };
        let channel_ids = guild.channel_ids.clone();
        let role_ids = guild.role_ids.clone();
        let member_ids = guild.member_ids.clone();

        for channel_id in channel_ids {
            self.channels.remove(&channel_id);
        }
        for role_id in role_ids {
            self.roles.remove(&role_id);
        }
        for user_id in member_ids {
            self.members.remove(&(guild_id, user_id));
            self.detach_user_from_guild(user_id, guild_id);
        }
    }
}
