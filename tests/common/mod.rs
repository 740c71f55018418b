#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use pgpulse::db::{Connector, DbHandle};
use sqlx::PgConnection;
use tokio::net::TcpListener;
use tokio::time::Instant;

pub const TEST_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("pgpulse=debug")
            .with_test_writer()
            .init();
    });
}

fn refused() -> sqlx::Error {
    sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

/// A connector that fails a fixed number of times before succeeding, and
/// records when each attempt was made.
///
/// On success it yields the 1-based number of the successful attempt.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    /// `None` fails forever.
    failures_before_success: Option<usize>,
    attempts: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedConnector {
    pub fn always_failing() -> Self {
        Self::default()
    }

    pub fn succeeding_after(failures: usize) -> Self {
        Self {
            failures_before_success: Some(failures),
            ..Self::default()
        }
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Gaps between consecutive attempts
    pub fn gaps(&self) -> Vec<Duration> {
        self.attempt_times()
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    fn record(&self) -> usize {
        let mut attempts = self.attempts.lock().unwrap();
        attempts.push(Instant::now());
        attempts.len()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Conn = u32;

    async fn connect(&self) -> Result<u32, sqlx::Error> {
        let attempt = self.record();
        match self.failures_before_success {
            Some(failures) if attempt > failures => Ok(attempt as u32),
            _ => Err(refused()),
        }
    }
}

/// A PostgreSQL-typed connector that never manages to connect.
#[derive(Debug, Clone, Default)]
pub struct UnreachableDb {
    inner: ScriptedConnector,
}

impl UnreachableDb {
    pub fn attempt_count(&self) -> usize {
        self.inner.attempt_count()
    }

    pub fn gaps(&self) -> Vec<Duration> {
        self.inner.gaps()
    }
}

#[async_trait]
impl Connector for UnreachableDb {
    type Conn = PgConnection;

    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        self.inner.record();
        Err(refused())
    }
}

/// Spawns the application around `db` and returns its address.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app(db: DbHandle) -> String {
    init_tracing_once();

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, pgpulse::app(db)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client.get(format!("{address}/api")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    address
}
