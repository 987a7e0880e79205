use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use url::Url;

const DEFAULT_MAX_CONNS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
/// Lifetime for the sole in-memory connection. sqlx has no "forever" and
/// adds this to `Instant::now()`, so `Duration::MAX` is out.
const IN_MEMORY_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

/// Detect the backend from the URL scheme.
pub fn detect_backend(raw: &str) -> Result<Backend> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database URL '{}': {}", redact(raw), e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Mask the password part of a URL so it can be logged.
pub fn redact(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Open a pool for `cfg`; relative SQLite paths live under `base_dir`.
pub async fn connect(cfg: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_backend(&cfg.url)?;
    let url = cfg.resolved_url(base_dir, true)?;
    let opts = connect_options(cfg, backend, url.clone());

    tracing::info!("Connecting to database: {}", redact(&url));
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database {}", redact(&url)))?;
    tracing::info!("Connected DB backend: {:?}", backend);

    Ok(db)
}

fn connect_options(cfg: &DatabaseConfig, backend: Backend, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.acquire_timeout(ACQUIRE_TIMEOUT).sqlx_logging(false);

    if cfg.is_in_memory() {
        // Every connection to :memory: is a separate database; the pool
        // must never close or recycle its only one.
        opts.max_connections(1)
            .min_connections(1)
            .max_lifetime(IN_MEMORY_LIFETIME)
            .idle_timeout(IN_MEMORY_LIFETIME);
    } else {
        opts.max_connections(cfg.max_conns.unwrap_or(DEFAULT_MAX_CONNS));
    }

    if backend == Backend::Sqlite {
        let busy = cfg.busy_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)));
        opts.map_sqlx_sqlite_opts(move |o| {
            let o = o.create_if_missing(true);
            match busy {
                Some(timeout) => o.busy_timeout(timeout),
                None => o,
            }
        });
    }

    opts
}
