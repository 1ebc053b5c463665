//! Shared fixtures for database-backed tests.
//!
//! Tests run only when `DATABASE_URL` is set. Each test seeds companies `c1..c3`
//! and jobs `j1..j3` inside a transaction that is rolled back afterwards.

#![allow(dead_code)]

use jobly::{JoblyError, JoblyResult};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tokio_postgres::{Client, NoTls, Transaction};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

// Seeding deletes every row, so tests take turns.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub struct TestDb {
    pub client: Client,
    _guard: MutexGuard<'static, ()>,
}

/// Connect and migrate, or `None` when `DATABASE_URL` is unset.
pub async fn connect(test_name: &str) -> JoblyResult<Option<TestDb>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test_name}");
            return Ok(None);
        }
    };

    let guard = DB_LOCK.lock().await;
    let client = open(&database_url).await?;
    MIGRATED
        .get_or_try_init(|| async {
            let mut migrate_client = open(&database_url).await?;
            jobly::migrate::run(&mut migrate_client).await.map(|_| ())
        })
        .await?;

    Ok(Some(TestDb {
        client,
        _guard: guard,
    }))
}

async fn open(database_url: &str) -> JoblyResult<Client> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(client)
}

/// Replace all rows with the standard fixtures.
pub async fn seed(tx: &Transaction<'_>) -> JoblyResult<()> {
    tx.batch_execute(
        "DELETE FROM jobs;
         DELETE FROM companies;
         INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img');
         INSERT INTO jobs (title, salary, equity, company_handle)
         VALUES ('j1', 50000, '0.0005', 'c1'),
                ('j2', 60000, '0.0006', 'c2'),
                ('j3', 100000, '0', 'c3');",
    )
    .await
    .map_err(JoblyError::from_db_error)
}
