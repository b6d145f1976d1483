//! Devotional content: data model, remote store client and resolver

pub mod api;
mod context;
pub mod models;
pub mod resolver;

pub use api::{ContentError, ContentStore, SupabaseClient};
pub use context::SessionContext;
pub use models::*;
pub use resolver::{ContentResolver, Direction, ResolveError, UnitAddress};
