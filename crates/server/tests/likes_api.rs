use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::likes::LikesService;
use service::storage::json_ledger::JsonLedger;
use service::test_support::MemoryObjectStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::AppState;

struct TestApp {
    base_url: String,
    store: Arc<MemoryObjectStore>,
    ledger_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.ledger_path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Use isolated temp files for the ledger per test run
    let ledger_path = std::env::temp_dir()
        .join(format!("likes_api_{}", Uuid::new_v4()))
        .join("article-likes.json");
    let store = Arc::new(MemoryObjectStore::new());
    let likes = Arc::new(LikesService::new(
        store.clone(),
        "metrics/article-likes",
        Arc::new(JsonLedger::new(&ledger_path)),
    ));

    let app = routes::build_router(AppState::new(likes), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, store, ledger_path })
}

#[tokio::test]
async fn health_ok() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unseen_article_has_zero_likes() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/api/news/fresh-1/likes", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"success": true, "newsId": "fresh-1", "likes": 0}));
    Ok(())
}

#[tokio::test]
async fn like_then_read_uses_sanitized_id() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    // "abc 123!" percent-encoded in the path
    let res = c.post(format!("{}/api/news/abc%20123%21/like", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"success": true, "newsId": "abc123", "likes": 1}));

    let res = c.get(format!("{}/api/news/abc123/likes", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?["likes"], 1);
    Ok(())
}

#[tokio::test]
async fn invalid_id_is_bad_request() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for url in [
        format!("{}/api/news/%21%21%21/likes", app.base_url),
        format!("{}/api/news/%20/like", app.base_url),
        // not valid UTF-8 once decoded
        format!("{}/api/news/%FF/likes", app.base_url),
        format!("{}/api/news/%FF/like", app.base_url),
    ] {
        let res = if url.ends_with("/like") { c.post(&url).send().await? } else { c.get(&url).send().await? };
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{url}");
        let body = res.json::<Value>().await?;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_are_all_counted() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let url = format!("{}/api/news/hot-story/like", app.base_url);

    let responses = join_all((0..25).map(|_| c.post(&url).send())).await;
    for res in responses {
        assert_eq!(res?.status(), HttpStatusCode::OK);
    }

    let res = c.get(format!("{}/api/news/hot-story/likes", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?["likes"], 25);
    Ok(())
}

#[tokio::test]
async fn remote_outage_degrades_to_ledger() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.store.fail_reads(true);
    app.store.fail_writes(true);
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/api/news/xyz/like", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["likes"], 1);

    let res = c.get(format!("{}/api/news/xyz/likes", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?["likes"], 1);

    let ledger: Value = serde_json::from_slice(&tokio::fs::read(&app.ledger_path).await?)?;
    assert_eq!(ledger, json!({"xyz": 1}));
    Ok(())
}

#[tokio::test]
async fn ledger_failure_during_outage_is_server_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.store.fail_reads(true);
    // a directory where the ledger file belongs makes every ledger access fail
    tokio::fs::create_dir_all(&app.ledger_path).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/news/xyz/like", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?["success"], false);
    Ok(())
}

#[tokio::test]
async fn metrics_exposes_likes_counters() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    c.post(format!("{}/api/news/m1/like", app.base_url)).send().await?;

    let text = c.get(format!("{}/metrics", app.base_url)).send().await?.text().await?;
    assert!(text.contains("news_likes_increments_total"));
    Ok(())
}
