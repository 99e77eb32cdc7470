//! # Domain Entities
//!
//! Core entities for the licensing engine: products, whitelist entries,
//! usage records, and the derived verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name stored for a client instance before a real one has been observed.
pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Longer placeholder variant used by older clients.
const PLACEHOLDER_NAME_LONG: &str = "Unknown Game";

/// Identifier of an account that owns products.
pub type OwnerId = Uuid;

/// Opaque capability token identifying a licensable product.
///
/// The key is a shared secret transmitted in cleartext inside the reporting
/// payload. Compromise is a known limitation of the protocol, not something
/// this type attempts to mitigate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    /// Wrap an existing key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys are secrets; only a prefix ever reaches logs. Taken by
        // chars, since the key string is client-supplied.
        for c in self.0.chars().take(6) {
            write!(f, "{}", c)?;
        }
        write!(f, "…")
    }
}

/// Identifier of one running deployment of the protected script.
///
/// Clients self-report this value (a game/place identifier); it is opaque to
/// the server beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A licensable unit. Immutable once issued; deleting a product cascades to
/// its whitelist entries and usage records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Internal identifier.
    pub id: Uuid,
    /// Owning account.
    pub owner: OwnerId,
    /// Human-readable product name.
    pub name: String,
    /// The capability token clients present when reporting.
    pub product_key: ProductKey,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Register a new product with a generated key.
    pub fn register(owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            product_key: ProductKey::generate(),
            created_at: Utc::now(),
        }
    }
}

/// Whitelist review status for one `(product, place)` pair.
///
/// `Pending` is the fail-open default: unknown clients are authorized until
/// an owner has reviewed them. Denial is only ever reachable through an
/// explicit `Unwhitelisted` decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitelistStatus {
    /// Seen but not yet reviewed by the owner. Authorized.
    #[default]
    Pending,
    /// Explicitly approved. Authorized while active.
    Whitelisted,
    /// Explicitly revoked. Denied unconditionally.
    Unwhitelisted,
}

impl fmt::Display for WhitelistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WhitelistStatus::Pending => "pending",
            WhitelistStatus::Whitelisted => "whitelisted",
            WhitelistStatus::Unwhitelisted => "unwhitelisted",
        };
        write!(f, "{}", s)
    }
}

/// The authorization record for one `(product, place)` pair.
///
/// At most one entry exists per pair; the store enforces this uniqueness and
/// it is the sole concurrency-control mechanism for first-sight races.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Product this entry belongs to.
    pub product_id: Uuid,
    /// Client instance the entry gates.
    pub place_id: PlaceId,
    /// Display name of the client instance. Starts as a placeholder until a
    /// real name is observed.
    pub game_name: String,
    /// Review status.
    pub status: WhitelistStatus,
    /// Kill switch independent of status.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl WhitelistEntry {
    /// Entry created implicitly on first report from an unseen client.
    pub fn pending(product_id: Uuid, place_id: PlaceId, game_name: impl Into<String>) -> Self {
        Self {
            product_id,
            place_id,
            game_name: game_name.into(),
            status: WhitelistStatus::Pending,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Entry created explicitly by the owner.
    pub fn whitelisted(product_id: Uuid, place_id: PlaceId, game_name: impl Into<String>) -> Self {
        Self {
            product_id,
            place_id,
            game_name: game_name.into(),
            status: WhitelistStatus::Whitelisted,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Identity a client claims to act on behalf of.
///
/// Trust boundary: this value is client-supplied and accepted as-is when no
/// stronger proof accompanies the report. It decorates the usage ledger and
/// never influences the verdict. The two fields are recorded independently;
/// a report may carry either one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    /// Platform user identifier.
    pub user_id: Option<String>,
    /// Platform username at report time.
    pub username: Option<String>,
}

impl VerifiedUser {
    /// Build from the optional report fields; `None` when neither is set.
    pub fn from_claims(user_id: Option<String>, username: Option<String>) -> Option<Self> {
        match (user_id, username) {
            (None, None) => None,
            (user_id, username) => Some(Self { user_id, username }),
        }
    }
}

/// One reporting event, appended to the usage ledger.
///
/// Append-only: records are never updated or deduplicated at write time.
/// "Latest" views are computed by aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Product that was reported against.
    pub product_id: Uuid,
    /// Reporting client instance.
    pub place_id: PlaceId,
    /// Display name after enrichment (or fallback).
    pub game_name: String,
    /// Claimed identity, if any.
    pub verified_user: Option<VerifiedUser>,
    /// Origin network address as observed by the transport.
    pub ip_address: String,
    /// Reported User-Agent.
    pub user_agent: String,
    /// Server-side receive time.
    pub timestamp: DateTime<Utc>,
}

/// The authorization outcome for a client instance at a point in time.
///
/// Derived fresh per request from the current whitelist entry (or the
/// implicit pending default); never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the client may keep running.
    pub authorized: bool,
    /// Status the verdict was derived from.
    pub status: WhitelistStatus,
    /// Active flag the verdict was derived from.
    pub active: bool,
}

impl Verdict {
    /// The verdict an agent assumes before first contact: fail-open pending.
    pub fn fail_open_default() -> Self {
        Self {
            authorized: true,
            status: WhitelistStatus::Pending,
            active: true,
        }
    }
}

/// Whether a stored display name is still the placeholder sentinel.
///
/// Matched case-insensitively; both the short and long historical spellings
/// count.
pub fn is_placeholder_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(PLACEHOLDER_NAME) || name.eq_ignore_ascii_case(PLACEHOLDER_NAME_LONG)
}
