#![cfg(feature = "gateway")]

use std::net::SocketAddr;
use std::path::PathBuf;

use gnosis_pay_client::gateway::{self, GatewayState, HostRouter};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION, ORIGIN};
use serde_json::json;
use url::Url;

struct Upstreams {
    api: MockServer,
    pse: MockServer,
    pse_public: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            api: MockServer::start_async().await,
            pse: MockServer::start_async().await,
            pse_public: MockServer::start_async().await,
        }
    }
}

fn url(server: &MockServer) -> Url {
    Url::parse(&server.base_url()).expect("mock server URL")
}

/// Serves the gateway on an ephemeral port and returns its base URL.
async fn spawn_gateway(upstreams: &Upstreams, static_root: PathBuf) -> anyhow::Result<String> {
    let routes = HostRouter::gnosis_pay(
        url(&upstreams.api),
        url(&upstreams.pse),
        url(&upstreams.pse_public),
    )?;
    let state = GatewayState::new(routes, gateway::upstream_client()?, static_root);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, gateway::router(state))
            .await
            .expect("gateway server");
    });

    Ok(format!("http://{addr}"))
}

fn header<'response>(response: &'response reqwest::Response, name: &str) -> Option<&'response str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Browser-like client that never follows redirects itself.
fn browser() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

#[tokio::test]
async fn pse_prefix_is_stripped_and_origin_dropped() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let mock = upstreams
        .pse
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/auth/token")
                .header("authorization", "Bearer tok_1")
                .header("x-app-id", "app_test")
                .header_missing("origin");
            then.status(200).json_body(json!({ "token": "app_tok" }));
        })
        .await;
    let gateway = spawn_gateway(&upstreams, PathBuf::from(".")).await?;

    let response = browser()?
        .post(format!("{gateway}/pse/api/v1/auth/token"))
        .header("authorization", "Bearer tok_1")
        .header("x-app-id", "app_test")
        .header(ORIGIN, "http://localhost:8080")
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>().await?, json!({ "token": "app_tok" }));

    Ok(())
}

#[tokio::test]
async fn pse_public_prefix_is_stripped_and_query_kept() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let mock = upstreams
        .pse_public
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/ephemeral-token")
                .query_param("a", "1");
            then.status(200).body("ok");
        })
        .await;
    let gateway = spawn_gateway(&upstreams, PathBuf::from(".")).await?;

    let response = browser()?
        .get(format!("{gateway}/pse-public/api/v1/ephemeral-token?a=1"))
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.text().await?, "ok");

    Ok(())
}

#[tokio::test]
async fn api_prefix_is_preserved_and_body_passed_through() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let body = r#"{"message":"m","signature":"0xsig","ttlInSeconds":36000}"#;
    let mock = upstreams
        .api
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/auth/challenge")
                .header("content-type", "application/json")
                .body(body);
            then.status(200)
                .header("x-upstream", "api")
                .body(r#"{"accessToken":"tok_1"}"#);
        })
        .await;
    let gateway = spawn_gateway(&upstreams, PathBuf::from(".")).await?;

    let response = browser()?
        .post(format!("{gateway}/api/v1/auth/challenge"))
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-upstream").map(|v| v.as_bytes()),
        Some(&b"api"[..])
    );
    assert_eq!(response.text().await?, r#"{"accessToken":"tok_1"}"#);

    Ok(())
}

#[tokio::test]
async fn chunked_request_body_is_relayed_intact() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let mock = upstreams
        .pse
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/upload")
                .body("first-second-third");
            then.status(201);
        })
        .await;
    let gateway = spawn_gateway(&upstreams, PathBuf::from(".")).await?;

    let chunks = ["first-", "second-", "third"].map(|c| Ok::<_, std::io::Error>(c.to_owned()));
    let response = browser()?
        .post(format!("{gateway}/pse/api/v1/upload"))
        .body(reqwest::Body::wrap_stream(futures::stream::iter(chunks)))
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn upstream_errors_and_redirects_are_relayed() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let missing = upstreams
        .api
        .mock_async(|when, then| {
            when.path("/api/v1/missing");
            then.status(404)
                .header("x-request-id", "req-404")
                .header("cache-control", "no-store")
                .body("no such thing");
        })
        .await;
    let moved = upstreams
        .api
        .mock_async(|when, then| {
            when.path("/api/v1/moved");
            then.status(302)
                .header("location", "https://elsewhere.example/")
                .header("x-request-id", "req-302")
                .header("set-cookie", "session=abc; Path=/");
        })
        .await;
    let gateway = spawn_gateway(&upstreams, PathBuf::from(".")).await?;
    let browser = browser()?;

    let response = browser
        .get(format!("{gateway}/api/v1/missing"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "x-request-id"), Some("req-404"));
    assert_eq!(header(&response, "cache-control"), Some("no-store"));
    assert_eq!(response.text().await?, "no such thing");

    let response = browser.get(format!("{gateway}/api/v1/moved")).send().await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(LOCATION).map(|v| v.as_bytes()),
        Some(&b"https://elsewhere.example/"[..])
    );
    assert_eq!(header(&response, "x-request-id"), Some("req-302"));
    assert_eq!(header(&response, "set-cookie"), Some("session=abc; Path=/"));

    missing.assert_async().await;
    moved.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn unmatched_path_is_served_statically() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let api = upstreams
        .api
        .mock_async(|when, then| {
            when.path_includes("/");
            then.status(200);
        })
        .await;

    let root = tempfile::tempdir()?;
    std::fs::write(root.path().join("index.html"), "<h1>demo</h1>")?;
    std::fs::write(root.path().join("app.js"), "console.log(1);")?;
    let gateway = spawn_gateway(&upstreams, root.path().to_path_buf()).await?;
    let browser = browser()?;

    let response = browser.get(format!("{gateway}/")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"text/html; charset=utf-8"[..])
    );
    assert_eq!(response.text().await?, "<h1>demo</h1>");

    let response = browser.get(format!("{gateway}/app.js")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "console.log(1);");

    // Looks like a prefix but lacks the trailing slash.
    let response = browser.get(format!("{gateway}/apix/thing")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await?, "Not found");

    assert_eq!(api.hits(), 0);

    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() -> anyhow::Result<()> {
    let upstreams = Upstreams::start().await;
    let routes = HostRouter::gnosis_pay(
        // Port 9 (discard) is not expected to accept HTTP connections.
        Url::parse("http://127.0.0.1:9")?,
        url(&upstreams.pse),
        url(&upstreams.pse_public),
    )?;
    let state = GatewayState::new(routes, gateway::upstream_client()?, PathBuf::from("."));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, gateway::router(state))
            .await
            .expect("gateway server");
    });

    let response = browser()?
        .get(format!("http://{addr}/api/v1/auth/nonce"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.bytes().await?.is_empty());

    Ok(())
}
