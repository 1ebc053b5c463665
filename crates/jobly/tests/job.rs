//! Job accessor round trips against a real database.

mod common;

use jobly::{Job, JobFilter, JobPatch, JoblyError, JoblyResult, NewJob};
use rust_decimal::Decimal;

fn new_job() -> NewJob {
    NewJob {
        title: "test title".into(),
        salary: Some(80000),
        equity: Some(Decimal::new(5, 4)),
        company_handle: "c1".into(),
    }
}

type Summary = (String, Option<i32>, Option<String>, String);

fn summary(jobs: &[Job]) -> Vec<Summary> {
    jobs.iter()
        .map(|j| {
            (
                j.title.clone(),
                j.salary,
                j.equity.map(|e| e.to_string()),
                j.company_handle.clone(),
            )
        })
        .collect()
}

fn row(title: &str, salary: i32, equity: &str, handle: &str) -> Summary {
    (
        title.to_string(),
        Some(salary),
        Some(equity.to_string()),
        handle.to_string(),
    )
}

#[tokio::test]
async fn create_returns_generated_id() -> JoblyResult<()> {
    let Some(mut db) = common::connect("create_returns_generated_id").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let job = Job::create(&tx, &new_job()).await?;
    assert!(job.id > 0);
    assert_eq!(job.title, "test title");
    assert_eq!(job.salary, Some(80000));
    assert_eq!(job.equity.map(|e| e.to_string()).as_deref(), Some("0.0005"));
    assert_eq!(job.company_handle, "c1");

    assert_eq!(Job::get(&tx, job.id).await?, job);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn create_with_unknown_company_is_not_found() -> JoblyResult<()> {
    let Some(mut db) = common::connect("create_with_unknown_company_is_not_found").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let err = Job::create(
        &tx,
        &NewJob {
            company_handle: "Does not exist".into(),
            ..new_job()
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());

    let count: i64 = tx
        .query_one("SELECT COUNT(*) FROM jobs", &[])
        .await
        .map_err(JoblyError::from_db_error)?
        .get(0);
    assert_eq!(count, 3);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn find_all_filters() -> JoblyResult<()> {
    let Some(mut db) = common::connect("find_all_filters").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let all = Job::find_all(&tx, None).await?;
    assert_eq!(
        summary(&all),
        vec![
            row("j1", 50000, "0.0005", "c1"),
            row("j2", 60000, "0.0006", "c2"),
            row("j3", 100000, "0", "c3"),
        ]
    );

    let by_title = Job::find_all(
        &tx,
        Some(&JobFilter {
            title: Some("j1".into()),
            ..Default::default()
        }),
    )
    .await?;
    assert_eq!(summary(&by_title), vec![row("j1", 50000, "0.0005", "c1")]);

    let by_salary = Job::find_all(
        &tx,
        Some(&JobFilter {
            min_salary: Some(55000),
            ..Default::default()
        }),
    )
    .await?;
    assert_eq!(
        summary(&by_salary),
        vec![row("j2", 60000, "0.0006", "c2"), row("j3", 100000, "0", "c3")]
    );

    let with_equity = Job::find_all(
        &tx,
        Some(&JobFilter {
            has_equity: Some(true),
            ..Default::default()
        }),
    )
    .await?;
    assert_eq!(
        summary(&with_equity),
        vec![row("j1", 50000, "0.0005", "c1"), row("j2", 60000, "0.0006", "c2")]
    );

    let salary_no_equity_constraint = Job::find_all(
        &tx,
        Some(&JobFilter {
            min_salary: Some(55000),
            has_equity: Some(false),
            ..Default::default()
        }),
    )
    .await?;
    assert_eq!(summary(&salary_no_equity_constraint), summary(&by_salary));

    let only_false_equity = Job::find_all(
        &tx,
        Some(&JobFilter {
            has_equity: Some(false),
            ..Default::default()
        }),
    )
    .await?;
    assert_eq!(summary(&only_false_equity), summary(&all));

    let everything = Job::find_all(
        &tx,
        Some(&JobFilter {
            title: Some("j".into()),
            min_salary: Some(55000),
            has_equity: Some(true),
        }),
    )
    .await?;
    assert_eq!(summary(&everything), vec![row("j2", 60000, "0.0006", "c2")]);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_changes_only_given_fields() -> JoblyResult<()> {
    let Some(mut db) = common::connect("update_changes_only_given_fields").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let created = Job::create(&tx, &new_job()).await?;
    let updated = Job::update(
        &tx,
        created.id,
        &JobPatch {
            title: Some("New Job".into()),
            salary: Some(Some(999999)),
            equity: Some(Some(Decimal::ONE)),
            company_handle: Some("c2".into()),
        },
    )
    .await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "New Job");
    assert_eq!(updated.salary, Some(999999));
    assert_eq!(updated.equity.map(|e| e.to_string()).as_deref(), Some("1"));
    assert_eq!(updated.company_handle, "c2");

    let cleared = Job::update(
        &tx,
        created.id,
        &JobPatch {
            salary: Some(None),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(cleared.salary, None);
    assert_eq!(cleared.title, "New Job");
    assert_eq!(cleared.equity, updated.equity);
    assert_eq!(Job::get(&tx, created.id).await?, cleared);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_errors() -> JoblyResult<()> {
    let Some(mut db) = common::connect("update_errors").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let created = Job::create(&tx, &new_job()).await?;
    let err = Job::update(&tx, created.id, &JobPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_invalid_request());

    let err = Job::update(
        &tx,
        0,
        &JobPatch {
            title: Some("x".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn remove_deletes_row() -> JoblyResult<()> {
    let Some(mut db) = common::connect("remove_deletes_row").await? else {
        return Ok(());
    };
    let tx = db.client.transaction().await.map_err(JoblyError::from_db_error)?;
    common::seed(&tx).await?;

    let created = Job::create(&tx, &new_job()).await?;
    Job::remove(&tx, created.id).await?;
    assert!(Job::get(&tx, created.id).await.unwrap_err().is_not_found());
    assert!(Job::remove(&tx, created.id).await.unwrap_err().is_not_found());
    assert!(Job::remove(&tx, 0).await.unwrap_err().is_not_found());

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}
