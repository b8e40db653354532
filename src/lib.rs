//! officer-bouncer - membership gatekeeper for public-officer group chats.
//!
//! Joins to a managed chat are only allowed for users the officer directory
//! has verified. Moderated join requests get a short window for a human
//! moderator to decide before the bot applies the directory's answer;
//! members added directly are checked immediately and removed if unverified.

pub mod bouncer;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod registry;
pub mod telemetry;
pub mod transport;

pub use bouncer::{Bouncer, JoinOutcome, JoinRequest, MemberOutcome, NewMembersEvent, UserIdentity};
pub use error::{Action, BouncerError, BouncerResult};
