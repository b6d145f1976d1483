//! Resolves one devotional unit from (category, language, ordinal).

use crate::content::api::{ContentError, ContentStore};
use crate::content::context::SessionContext;
use crate::content::models::{Category, DevotionalUnit, Ordinal, DECADES_PER_CATEGORY};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const LOG_TARGET: &str = "lectio_player::content::resolver";

/// Failures of a resolve call. "Not found" is not an error: it is `Ok(None)`.
#[derive(Debug)]
pub enum ResolveError {
    InvalidCategory(String),
    InvalidOrdinal(u32),
    /// Store or network failure; the caller decides whether to retry.
    Fetch(ContentError),
}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::Fetch(_))
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidCategory(msg) => write!(f, "Invalid category: {}", msg),
            ResolveError::InvalidOrdinal(n) => write!(
                f,
                "Invalid ordinal {}: expected a value between 1 and {}",
                n, DECADES_PER_CATEGORY
            ),
            ResolveError::Fetch(e) => write!(f, "Failed to fetch content: {}", e),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResolveError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ContentError> for ResolveError {
    fn from(err: ContentError) -> Self {
        ResolveError::Fetch(err)
    }
}

/// Direction for sequential navigation between decades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Validated navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitAddress {
    pub category: Category,
    pub ordinal: Ordinal,
}

impl UnitAddress {
    /// Checks raw navigation parameters; nothing is fetched here.
    pub fn parse(category: &str, ordinal: u32) -> Result<Self, ResolveError> {
        let category = category
            .parse::<Category>()
            .map_err(ResolveError::InvalidCategory)?;
        let ordinal = Ordinal::new(ordinal).ok_or(ResolveError::InvalidOrdinal(ordinal))?;
        Ok(Self { category, ordinal })
    }

    /// Neighbouring decade in the same category; no wraparound.
    pub fn adjacent(&self, direction: Direction) -> Option<Self> {
        let ordinal = match direction {
            Direction::Next => self.ordinal.next()?,
            Direction::Previous => self.ordinal.previous()?,
        };
        Some(Self { category: self.category, ordinal })
    }
}

/// Fetches exactly one published unit for a validated address.
#[derive(Clone)]
pub struct ContentResolver {
    store: Arc<dyn ContentStore>,
}

impl ContentResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Validates the raw parameters, then resolves. Invalid input never reaches the store.
    pub async fn resolve(
        &self,
        ctx: &SessionContext,
        category: &str,
        ordinal: u32,
    ) -> Result<Option<DevotionalUnit>, ResolveError> {
        let address = match UnitAddress::parse(category, ordinal) {
            Ok(address) => address,
            Err(e) => {
                warn!(target: LOG_TARGET, "Rejected navigation parameters: {}", e);
                return Err(e);
            }
        };
        self.resolve_address(ctx, address).await
    }

    /// The ordinal is a position in the published list ordered by `number`, not a `number` match:
    /// with decade 2 unpublished, ordinal 3 yields the row numbered 4.
    #[instrument(skip(self, ctx), fields(category = %address.category, ordinal = %address.ordinal, language = %ctx.language()))]
    pub async fn resolve_address(
        &self,
        ctx: &SessionContext,
        address: UnitAddress,
    ) -> Result<Option<DevotionalUnit>, ResolveError> {
        let units = match self
            .store
            .published_units(address.category, ctx.language(), ctx.access_token())
            .await
        {
            Ok(units) => units,
            Err(e) => {
                error!(target: LOG_TARGET, "Content fetch failed: {}", e);
                return Err(ResolveError::Fetch(e));
            }
        };
        debug!(target: LOG_TARGET, "Store returned {} published units", units.len());

        let unit = units.into_iter().nth(address.ordinal.index());
        match &unit {
            Some(unit) => info!(target: LOG_TARGET, unit_id = unit.id, "Resolved devotional unit"),
            None => info!(target: LOG_TARGET, "No published unit at this position"),
        }
        Ok(unit)
    }
}
