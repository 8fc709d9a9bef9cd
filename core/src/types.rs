//! Domain DTOs for the management API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined
//! independently; integration tests catch any drift between the two crates.
//! Response types keep fields the client does not model in `extra` so a
//! newer server never breaks deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One permission an API exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceServerScope {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resource server (an API registered with the tenant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceServer {
    pub id: String,
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ResourceServerScope>,
    #[serde(default)]
    pub signing_alg: Option<String>,
    #[serde(default)]
    pub token_lifetime: Option<u64>,
    #[serde(default)]
    pub allow_offline_access: Option<bool>,
    #[serde(default)]
    pub is_system: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for registering a resource server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateResourceServer {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<ResourceServerScope>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_lifetime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_offline_access: Option<bool>,
}

/// Partial update. Only the fields present in the JSON are applied; omitted
/// fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResourceServer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<ResourceServerScope>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_lifetime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_offline_access: Option<bool>,
}

/// Date range for daily stats, both ends in `YYYYMMDD` form. The server
/// interprets the format; nothing is checked locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStatsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl DailyStatsParams {
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }
}

/// Activity totals for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    pub date: String,
    #[serde(default)]
    pub logins: u64,
    #[serde(default)]
    pub signups: u64,
    #[serde(default)]
    pub leaked_passwords: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
