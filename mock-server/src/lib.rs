use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Scope {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResourceServer {
    pub id: String,
    pub identifier: String,
    pub name: Option<String>,
    pub scopes: Vec<Scope>,
    pub signing_alg: String,
    pub token_lifetime: u64,
    pub allow_offline_access: bool,
    pub is_system: bool,
}

#[derive(Deserialize)]
pub struct CreateResourceServer {
    pub identifier: String,
    pub name: Option<String>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    pub signing_alg: Option<String>,
    pub token_lifetime: Option<u64>,
    #[serde(default)]
    pub allow_offline_access: bool,
}

#[derive(Deserialize)]
pub struct UpdateResourceServer {
    pub name: Option<String>,
    pub scopes: Option<Vec<Scope>>,
    pub signing_alg: Option<String>,
    pub token_lifetime: Option<u64>,
    pub allow_offline_access: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    pub date: String,
    pub logins: u64,
    pub signups: u64,
    pub leaked_passwords: u64,
}

#[derive(Default)]
pub struct Store {
    pub servers: BTreeMap<String, ResourceServer>,
    pub daily: Vec<DailyStats>,
    pub active_users: u64,
}

pub type Db = Arc<RwLock<Store>>;

/// Five days of stats starting 2020-01-01 and 42 active users.
pub fn seeded_store() -> Store {
    let daily = (1..=5u64)
        .map(|day| DailyStats {
            date: format!("2020-01-{day:02}T00:00:00.000Z"),
            logins: day * 10,
            signups: day,
            leaked_passwords: 0,
        })
        .collect();
    Store {
        servers: BTreeMap::new(),
        daily,
        active_users: 42,
    }
}

pub fn app() -> Router {
    app_with(seeded_store())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route(
            "/resource-servers",
            get(list_resource_servers).post(create_resource_server),
        )
        .route(
            "/resource-servers/{id}",
            get(get_resource_server)
                .patch(update_resource_server)
                .delete(delete_resource_server),
        )
        .route("/stats/{kind}", get(get_stats))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "statusCode": status.as_u16(), "message": message })),
    )
        .into_response()
}

async fn list_resource_servers(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<ResourceServer>> {
    let store = db.read().await;
    let wanted: Option<Vec<&str>> = query
        .get("identifiers")
        .map(|list| list.split(',').collect());
    let servers = store
        .servers
        .values()
        .filter(|s| {
            wanted
                .as_ref()
                .map_or(true, |ids| ids.contains(&s.identifier.as_str()))
        })
        .cloned()
        .collect();
    Json(servers)
}

async fn create_resource_server(
    State(db): State<Db>,
    Json(input): Json<CreateResourceServer>,
) -> Response {
    let mut store = db.write().await;
    if store
        .servers
        .values()
        .any(|s| s.identifier == input.identifier)
    {
        return error(StatusCode::CONFLICT, "a resource server with this identifier already exists");
    }
    let server = ResourceServer {
        id: Uuid::new_v4().simple().to_string(),
        identifier: input.identifier,
        name: input.name,
        scopes: input.scopes,
        signing_alg: input.signing_alg.unwrap_or_else(|| "RS256".to_string()),
        token_lifetime: input.token_lifetime.unwrap_or(86_400),
        allow_offline_access: input.allow_offline_access,
        is_system: false,
    };
    store.servers.insert(server.id.clone(), server.clone());
    (StatusCode::CREATED, Json(server)).into_response()
}

async fn get_resource_server(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match store.servers.get(&id) {
        Some(server) => Json(server.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "resource server not found"),
    }
}

async fn update_resource_server(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateResourceServer>,
) -> Response {
    let mut store = db.write().await;
    let Some(server) = store.servers.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "resource server not found");
    };
    if let Some(name) = input.name {
        server.name = Some(name);
    }
    if let Some(scopes) = input.scopes {
        server.scopes = scopes;
    }
    if let Some(alg) = input.signing_alg {
        server.signing_alg = alg;
    }
    if let Some(lifetime) = input.token_lifetime {
        server.token_lifetime = lifetime;
    }
    if let Some(offline) = input.allow_offline_access {
        server.allow_offline_access = offline;
    }
    Json(server.clone()).into_response()
}

async fn delete_resource_server(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    match store.servers.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "resource server not found"),
    }
}

/// Turn a stored ISO date into `YYYYMMDD` for range comparison.
fn day_key(date: &str) -> String {
    date.chars().filter(char::is_ascii_digit).take(8).collect()
}

async fn get_stats(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    match kind.as_str() {
        "daily" => {
            let from = query.get("from").map(String::as_str).unwrap_or("00000000");
            let to = query.get("to").map(String::as_str).unwrap_or("99999999");
            let days: Vec<DailyStats> = store
                .daily
                .iter()
                .filter(|d| {
                    let key = day_key(&d.date);
                    key.as_str() >= from && key.as_str() <= to
                })
                .cloned()
                .collect();
            Json(days).into_response()
        }
        "active-users" => Json(store.active_users).into_response(),
        _ => error(StatusCode::NOT_FOUND, "unknown stats type"),
    }
}
