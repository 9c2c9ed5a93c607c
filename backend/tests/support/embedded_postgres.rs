//! Embedded PostgreSQL for adapter integration tests.
//!
//! One cluster is shared per test binary through `pg-embed-setup-unpriv`;
//! every test gets its own temporary database with the crate's embedded
//! migrations applied, so suites never see each other's rows.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where the cluster cannot
//! start (no network for the binary download, read-only `/var/tmp`, ...).

use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use rentals::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A migrated scratch database plus the runtime that drives its pool.
///
/// Fields drop in declaration order: the pool closes its connections and the
/// runtime stops before the temporary database is dropped.
pub struct PgDatabase {
    pub pool: DbPool,
    pub runtime: Runtime,
    _database: TemporaryDatabase,
}

impl PgDatabase {
    /// Run `future` to completion on the database's runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// `None` when skipping is requested; otherwise fail loudly so CI notices.
fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Keep the superuser password stable across binaries reusing a data dir.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library spawns threads, once per
        // process behind the shared cluster initialiser.
        unsafe {
            std::env::set_var("PG_PASSWORD", "rentals_embedded_test");
        }
    }
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

fn provision() -> Result<PgDatabase, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();

    let pool = runtime.block_on(async {
        run_pending_migrations(&url)
            .await
            .map_err(|err| err.to_string())?;
        let config = PoolConfig::new(&url).with_max_size(2).with_min_idle(Some(1));
        DbPool::new(config).await.map_err(|err| err.to_string())
    })?;

    Ok(PgDatabase {
        pool,
        runtime,
        _database: database,
    })
}

/// A fresh migrated database, or `None` when the cluster is skipped.
pub fn migrated_database() -> Option<PgDatabase> {
    match provision() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
