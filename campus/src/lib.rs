//! Client core of a campus community site.
//!
//! The pieces, wired together by [`Campus`]:
//! - [`gate::AdminGate`]: decides whether the signed-in user may perform
//!   privileged actions, with verdict caching, failed-attempt lockout and
//!   sliding-window rate limits;
//! - [`audit::AuditLog`]: fire-and-forget, redacted audit trail;
//! - [`batch::BatchWriter`]: atomic multi-document moderation writes;
//! - [`queries::CachedQueries`]: store reads cached by query fingerprint;
//! - [`moderation::Moderation`]: the privileged flow tying these together.
//!
//! Everything talks to a [`store::DocumentStore`] and an [`auth::AuthProvider`]
//! supplied by the embedding application.

pub mod audit;
pub mod auth;
pub mod batch;
pub mod config;
mod context;
pub mod error;
pub mod gate;
pub mod moderation;
pub mod queries;
pub mod store;

pub use audit::{AuditEntry, AuditFailure, AuditFailures, AuditLog, AuditStatus};
pub use auth::{AuthProvider, Session, SessionHandle};
pub use batch::{BatchOutcome, BatchWriter, ReviewStatus, StatusUpdate, UpdateOptions};
pub use config::Config;
pub use context::{Campus, CampusBuilder};
pub use error::{ConfigError, Error, StoreError};
pub use gate::{ActionDecision, AdminGate, DenyReason, RateDecision, Verdict, VerdictSource};
pub use moderation::{Moderation, ModerationOutcome};
pub use queries::{CachedQueries, QueryOutcome};
