//! End-to-end tests for the GitHub relay (`/api/github/...`).

use axum::http::StatusCode;

use forwarding_gateway::config::{GatewayConfig, SecretToken};

mod common;

use common::{Canned, SpyUpstream};

const TOKEN: &str = "ghp_test_token_value";

fn relay_config(spy: &SpyUpstream, token: Option<&str>) -> GatewayConfig {
    let mut config = common::test_config();
    config.github.api_base = spy.url("");
    config.github.token = token.map(SecretToken::new);
    config
}

#[tokio::test]
async fn list_issues_forwards_filters_with_credential() {
    let spy = common::start_spy_upstream(Canned::json(200, r#"[{"number":1}]"#)).await;
    let gateway = common::start_gateway(relay_config(&spy, Some(TOKEN))).await;

    let res = common::client()
        .get(gateway.url("/api/github/repos/acme/widgets/issues?state=open&page=2"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let headers = format!("{:?}", res.headers());
    let body = res.text().await.unwrap();
    assert_eq!(body, r#"[{"number":1}]"#);
    assert!(!headers.contains(TOKEN));
    assert!(!body.contains(TOKEN));

    let seen = spy.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri.path(), "/repos/acme/widgets/issues");
    assert_eq!(seen.uri.query(), Some("state=open&page=2"));
    assert_eq!(seen.headers["authorization"], format!("Bearer {TOKEN}").as_str());
    assert_eq!(seen.headers["accept"], "application/vnd.github+json");
    assert_eq!(seen.headers["user-agent"], "forwarding-gateway");
}

#[tokio::test]
async fn duplicate_filters_keep_last_value() {
    let spy = common::start_spy_upstream(Canned::json(200, "[]")).await;
    let gateway = common::start_gateway(relay_config(&spy, Some(TOKEN))).await;

    common::client()
        .get(gateway.url("/api/github/repos/acme/widgets/issues?labels=bug&labels=ui&per_page=5"))
        .send()
        .await
        .unwrap();

    assert_eq!(spy.last().uri.query(), Some("labels=ui&per_page=5"));
}

#[tokio::test]
async fn create_issue_forwards_body_verbatim() {
    let spy = common::start_spy_upstream(Canned::json(201, r#"{"number":42}"#)).await;
    let gateway = common::start_gateway(relay_config(&spy, Some(TOKEN))).await;

    let payload = r#"{"title":"Broken widget","labels":["bug"]}"#;
    let res = common::client()
        .post(gateway.url("/api/github/repos/acme/widgets/issues"))
        .header("content-type", "application/json; charset=utf-8")
        .body(payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.text().await.unwrap(), r#"{"number":42}"#);

    let seen = spy.last();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.uri.path(), "/repos/acme/widgets/issues");
    assert_eq!(seen.headers["content-type"], "application/json; charset=utf-8");
    assert_eq!(seen.body.as_ref(), payload.as_bytes());
}

#[tokio::test]
async fn get_and_update_single_issue() {
    let spy = common::start_spy_upstream(Canned::json(200, r#"{"number":7}"#)).await;
    let gateway = common::start_gateway(relay_config(&spy, Some(TOKEN))).await;
    let client = common::client();

    let res = client
        .get(gateway.url("/api/github/repos/acme/widgets/issues/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let seen = spy.last();
    assert_eq!(seen.uri.path(), "/repos/acme/widgets/issues/7");
    assert!(seen.body.is_empty());

    let res = client
        .patch(gateway.url("/api/github/repos/acme/widgets/issues/7"))
        .header("content-type", "application/json")
        .body(r#"{"state":"closed"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let seen = spy.last();
    assert_eq!(seen.method, "PATCH");
    assert_eq!(seen.body.as_ref(), br#"{"state":"closed"}"#);
}

#[tokio::test]
async fn upstream_error_status_is_relayed() {
    let spy = common::start_spy_upstream(Canned {
        status: 404,
        headers: vec![("content-type", "application/json; charset=utf-8")],
        body: br#"{"message":"Not Found"}"#.to_vec(),
    })
    .await;
    let gateway = common::start_gateway(relay_config(&spy, Some(TOKEN))).await;

    let res = common::client()
        .get(gateway.url("/api/github/repos/acme/missing/issues/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["content-type"], "application/json; charset=utf-8");
    assert_eq!(res.text().await.unwrap(), r#"{"message":"Not Found"}"#);
}

#[tokio::test]
async fn missing_credential_is_502_without_network_call() {
    let spy = common::start_spy_upstream(Canned::json(200, "[]")).await;
    let gateway = common::start_gateway(relay_config(&spy, None)).await;
    let client = common::client();

    let res = client
        .get(gateway.url("/api/github/repos/acme/widgets/issues"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json["error"].as_str().is_some());

    let res = client
        .post(gateway.url("/api/github/repos/acme/widgets/issues"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    assert_eq!(spy.hits(), 0);

    // The generic forwarder keeps working without a token.
    let res = client
        .get(gateway.url(&format!("/api/external?target_url={}", common::enc(&spy.url("/ping")))))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(spy.hits(), 1);
}

#[tokio::test]
async fn unreachable_github_is_502() {
    let mut config = common::test_config();
    config.github.api_base = format!("http://{}", common::closed_port());
    config.github.token = Some(SecretToken::new(TOKEN));
    let gateway = common::start_gateway(config).await;

    let res = common::client()
        .get(gateway.url("/api/github/repos/acme/widgets/issues/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = res.json().await.unwrap();
    let error = json["error"].as_str().unwrap();
    assert!(!error.contains(TOKEN));
}
