//! Full lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port on its own runtime thread, then
//! drives both managers over real HTTP through `UreqTransport`. Validates
//! that request building and response parsing agree with an actual server.

use std::sync::Arc;

use mgmt_core::{
    completion, ApiError, ConfigError, CreateResourceServer, DailyStatsParams, ManagerOptions,
    ResourceServerScope, ResourceServersManager, StatsManager, UpdateResourceServer,
    UreqTransport,
};
use serde_json::json;
use tokio::sync::oneshot;

fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn resource_servers_lifecycle() {
    let options = ManagerOptions::new(start_mock_server()).with_header("x-request-source", "tests");
    let servers = ResourceServersManager::with_ureq(&options).unwrap();

    // Step 1: list, should be empty.
    let all = servers.get_all(&Default::default()).await.unwrap();
    assert!(all.is_empty(), "expected empty list");

    // Step 2: create.
    let input = CreateResourceServer {
        identifier: "https://orders.example.com".to_string(),
        name: Some("Orders".to_string()),
        scopes: Some(vec![ResourceServerScope {
            value: "read:orders".to_string(),
            description: Some("Read orders".to_string()),
        }]),
        ..Default::default()
    };
    let created = servers.create(&input).await.unwrap();
    assert_eq!(created.identifier, "https://orders.example.com");
    assert_eq!(created.scopes.len(), 1);
    assert_eq!(created.signing_alg.as_deref(), Some("RS256"));
    let id = created.id.clone();

    // Step 3: creating the same identifier again is a server-side error.
    let err = servers.create(&input).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 409, .. }));

    // Step 4: get.
    let fetched = servers.get(&id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 5: partial update.
    let update = UpdateResourceServer {
        token_lifetime: Some(3600),
        ..Default::default()
    };
    let updated = servers.update(&id, &update).await.unwrap();
    assert_eq!(updated.token_lifetime, Some(3600));
    assert_eq!(updated.name.as_deref(), Some("Orders"));

    // Step 6: list filtered by identifiers, sent as one occurrence of the key.
    let mut filter = mgmt_core::Params::new();
    filter.insert(
        "identifiers".to_string(),
        json!(["https://orders.example.com", "https://other.example.com"]),
    );
    let matching = servers.get_all(&filter).await.unwrap();
    assert_eq!(matching.len(), 1);

    // Step 7: delete, then everything about it is gone.
    servers.delete(&id).await.unwrap();
    assert!(matches!(servers.get(&id).await, Err(ApiError::NotFound)));
    assert!(matches!(servers.delete(&id).await, Err(ApiError::NotFound)));
    assert!(servers.get_all(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_queries() {
    let options = ManagerOptions::new(start_mock_server());
    let stats = StatsManager::with_ureq(&options).unwrap();

    let days = stats
        .get_daily(DailyStatsParams::between("20200102", "20200103"))
        .await
        .unwrap();
    let logins: Vec<u64> = days.iter().map(|d| d.logins).collect();
    assert_eq!(logins, vec![20, 30]);

    let all_days = stats.get_daily(DailyStatsParams::default()).await.unwrap();
    assert_eq!(all_days.len(), 5);

    assert_eq!(stats.get_active_users_count().await.unwrap(), 42);

    // Same call, callback style.
    let (tx, rx) = oneshot::channel();
    let handle = stats.clone();
    completion::deliver(
        async move { handle.get_active_users_count().await },
        move |result| {
            let _ = tx.send(result);
        },
    );
    assert_eq!(rx.await.unwrap().unwrap(), 42);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_transport_error() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let options = ManagerOptions::new(format!("http://{addr}"));
    let stats = StatsManager::with_ureq(&options).unwrap();
    let err = stats.get_active_users_count().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[test]
fn construction_validates_before_any_request() {
    let transport = Arc::new(UreqTransport::new());
    for value in [
        json!(null),
        json!({}),
        json!({ "baseUrl": null }),
        json!({ "baseUrl": 1 }),
        json!({ "baseUrl": "" }),
    ] {
        let err = ManagerOptions::from_value(&value)
            .and_then(|options| ResourceServersManager::new(&options, Arc::clone(&transport)))
            .unwrap_err();
        assert!(
            matches!(
                err,
                ConfigError::MissingOptions | ConfigError::MissingBaseUrl | ConfigError::InvalidBaseUrl
            ),
            "{value}"
        );
    }
    assert!(StatsManager::new(&ManagerOptions::new(""), transport).is_err());
}
