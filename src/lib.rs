//! Titan - multi-tenant project tracking core.
//!
//! Organisations own teams and projects; projects carry an access control
//! list of `{team, role}` entries and contain task lists of tasks with an
//! append-only follow-up history. This crate is the core behind a thin web
//! layer: it owns the data model, the slug-scoped uniqueness rules, the
//! membership/role resolution and the persistence seam, and leaves HTTP,
//! templating and authentication to external collaborators.

pub mod authz;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod persist;
pub mod schema;
pub mod service;
pub mod slug;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{CoreError, CoreResult, StorageError};
pub use store::{create_db_pool, create_db_pool_with_url, DbPool, MemoryStore, PgStore, Store};
pub use telemetry::init_telemetry;
