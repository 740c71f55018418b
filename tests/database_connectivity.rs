mod common;

use std::time::Duration;

use pgpulse::db::{ConnectionStatus, DbHandle, PgConnector, RetryPolicy};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, Postgres, pool::PoolConnection};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use common::{TEST_QUERY_TIMEOUT, UnreachableDb, spawn_app};

const FAST_RETRY: RetryPolicy = RetryPolicy {
    max_attempts: 2,
    delay: Duration::from_millis(10),
};

#[tokio::test]
async fn answers_503_before_any_connection() {
    let address = spawn_app(DbHandle::new(TEST_QUERY_TIMEOUT)).await;

    let response = reqwest::Client::new()
        .get(format!("{address}/api/database-connectivity"))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("request should complete instead of hanging");

    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Database connection not established");
}

#[tokio::test]
async fn answers_503_after_retries_are_exhausted() {
    let db = DbHandle::new(TEST_QUERY_TIMEOUT);
    let _task = db.spawn_establish(UnreachableDb::default(), FAST_RETRY);
    assert_eq!(
        db.wait_settled().await,
        ConnectionStatus::Exhausted { attempts: 2 }
    );
    let address = spawn_app(db).await;

    let response = reqwest::Client::new()
        .get(format!("{address}/api/database-connectivity"))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("request should complete instead of hanging");

    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
}

#[sqlx::test]
async fn returns_database_time(conn: PoolConnection<Postgres>) {
    let conn: PgConnection = conn.detach();
    let address = spawn_app(DbHandle::with_connection(conn, TEST_QUERY_TIMEOUT)).await;

    let response = reqwest::get(format!("{address}/api/database-connectivity"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let object = body.as_object().expect("body should be a JSON object");
    assert_eq!(object.len(), 1);

    let now = body["now"].as_str().expect("`now` should be a string");
    let now = OffsetDateTime::parse(now, &Rfc3339).expect("`now` should be RFC 3339");
    let skew = (OffsetDateTime::now_utc() - now).abs();
    assert!(skew < time::Duration::minutes(5), "clock skew too large: {skew}");
}

#[sqlx::test]
async fn serves_queries_once_startup_task_connects(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let db = DbHandle::new(TEST_QUERY_TIMEOUT);
    let _task = db.spawn_establish(PgConnector::new(connect_options), FAST_RETRY);
    assert_eq!(db.wait_settled().await, ConnectionStatus::Connected);
    let address = spawn_app(db.clone()).await;
    let client = reqwest::Client::new();

    // The single connection is reused across requests.
    for _ in 0..3 {
        let response = client
            .get(format!("{address}/api/database-connectivity"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    db.close().await;

    let response = client
        .get(format!("{address}/api/database-connectivity"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
}

#[sqlx::test]
async fn answers_504_when_the_query_times_out(conn: PoolConnection<Postgres>) {
    let db = DbHandle::with_connection(conn.detach(), Duration::ZERO);
    let address = spawn_app(db).await;

    let response = reqwest::Client::new()
        .get(format!("{address}/api/database-connectivity"))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("request should complete instead of hanging");

    assert_eq!(response.status(), reqwest::StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Database query timed out");
}
