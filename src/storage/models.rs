use serde::{Deserialize, Serialize};

/// Authoritative record for one short link.
///
/// `clicks` is only ever mutated by the sync daemon's bulk merge; reads may
/// lag the fast-tier accumulator by up to one sync interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkRecord {
    pub short_id: String,
    pub long_url: String,
    pub owner: String,
    pub title: Option<String>,
    #[serde(default)]
    pub clicks: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a new short link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_id: String,
    pub long_url: String,
    pub owner: String,
    pub title: Option<String>,
}
