use std::sync::Arc;
use std::thread;

use stockpile_core::{
    ItemFilter, ItemQuery, ItemService, NewItem, RepoError, SqliteItemRepository, StoreWorker,
    WorkerError, UNSAVED_LIST_NAME,
};
use tempfile::tempdir;

#[test]
fn items_round_trip_through_worker() {
    let worker = StoreWorker::open_in_memory().unwrap();

    let id = worker
        .with_items(|service| service.add_item(UNSAVED_LIST_NAME, "rice", "2"))
        .unwrap();
    let items = worker
        .with_items(|service| service.list_items(&ItemQuery::new(UNSAVED_LIST_NAME)))
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].amount, 2.0);
}

#[test]
fn job_errors_are_reported_as_job_variant() {
    let worker = StoreWorker::open_in_memory().unwrap();

    let err = worker
        .with_items(|service| service.add_item(UNSAVED_LIST_NAME, "  ", ""))
        .unwrap_err();

    assert!(matches!(err, WorkerError::Job(RepoError::Validation(_))));
    assert!(err.job_error().is_some_and(RepoError::is_validation));
}

#[test]
fn storage_failure_reaches_caller_as_job_db_error() {
    let worker = StoreWorker::open_in_memory().unwrap();

    let err = worker
        .call::<_, RepoError, _>(|conn| {
            let service = ItemService::new(SqliteItemRepository::try_new(conn)?);
            conn.execute_batch("DROP TABLE items;")?;
            service.add_item(UNSAVED_LIST_NAME, "rice", "1")
        })
        .unwrap_err();

    assert!(matches!(err, WorkerError::Job(RepoError::Db(_))));
    assert!(!err.job_error().is_some_and(RepoError::is_validation));
}

#[test]
fn raw_connection_jobs_see_the_same_database() {
    let worker = StoreWorker::open_in_memory().unwrap();
    worker
        .with_items(|service| service.create_item(&NewItem::new("Garage", "oil")))
        .unwrap();

    let count: i64 = worker
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0)))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn concurrent_callers_are_serialized() {
    let worker = Arc::new(StoreWorker::open_in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|thread_no| {
            let worker = Arc::clone(&worker);
            thread::spawn(move || {
                for step in 0..10 {
                    let name = format!("item-{thread_no}-{step}");
                    worker
                        .with_items(move |service| {
                            service.add_item(UNSAVED_LIST_NAME, &name, "1")
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let items = worker
        .with_items(|service| service.list_items(&ItemQuery::new(UNSAVED_LIST_NAME)))
        .unwrap();
    assert_eq!(items.len(), 40);
    let orders: Vec<i64> = items.iter().map(|item| item.order).collect();
    assert_eq!(orders, (0..40).collect::<Vec<i64>>());
}

#[test]
fn panicking_job_disconnects_worker() {
    let worker = StoreWorker::open_in_memory().unwrap();

    let err = worker
        .call::<(), RepoError, _>(|_| panic!("boom"))
        .unwrap_err();
    assert!(matches!(err, WorkerError::Disconnected));

    let after = worker
        .with_items(|service| service.list_names())
        .unwrap_err();
    assert!(matches!(after, WorkerError::Disconnected));
}

#[test]
fn file_backed_worker_persists_across_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");

    {
        let worker = StoreWorker::open(&path).unwrap();
        worker
            .with_items(|service| {
                service.add_item(UNSAVED_LIST_NAME, "rice", "0")?;
                service.add_item(UNSAVED_LIST_NAME, "beans", "3")?;
                service.save_working_list_as("Weekly")
            })
            .unwrap();
    }

    let worker = StoreWorker::open(&path).unwrap();
    let (names, cleared) = worker
        .with_items(|service| {
            let names = service.list_names()?;
            let cleared = service.clear("Weekly", ItemFilter::Empty)?;
            Ok((names, cleared))
        })
        .unwrap();
    assert_eq!(names, ["Weekly"]);
    assert_eq!(cleared, 1);
}

#[test]
fn dropping_worker_finishes_queued_work() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");

    let worker = Arc::new(StoreWorker::open(&path).unwrap());
    let writer = {
        let worker = Arc::clone(&worker);
        thread::spawn(move || {
            worker
                .with_items(|service| service.add_item(UNSAVED_LIST_NAME, "rice", "1"))
                .unwrap()
        })
    };
    writer.join().unwrap();
    drop(worker);

    let reopened = StoreWorker::open(&path).unwrap();
    let items = reopened
        .with_items(|service| service.list_items(&ItemQuery::new(UNSAVED_LIST_NAME)))
        .unwrap();
    assert_eq!(items.len(), 1);
}
