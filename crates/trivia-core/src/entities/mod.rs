//! Domain entities mirrored from the gateway

mod channel;
mod guild;
mod member;
mod role;
mod user;

pub use channel::{Channel, ChannelKind};
pub use guild::Guild;
pub use member::GuildMember;
pub use role::Role;
pub use user::{PresenceStatus, User};
