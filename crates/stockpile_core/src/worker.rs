//! Background store worker.
//!
//! # Responsibility
//! - Own the SQLite connection on one dedicated thread.
//! - Run store operations one at a time, off the caller's thread.
//! - Block the caller until its operation has completed.
//!
//! # Invariants
//! - Jobs run strictly in submission order, never concurrently.
//! - A submitted job always runs to completion, even if its caller stops
//!   waiting. Multi-row writes are transactional, so they land fully or not at all.
//! - Dropping the worker drains queued jobs, then joins the thread.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::repo::item_repo::{RepoError, RepoResult, SqliteItemRepository};
use crate::service::item_service::ItemService;
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_THREAD_NAME: &str = "stockpile-store";

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Failure to run a job on the store worker.
#[derive(Debug)]
pub enum WorkerError<E> {
    /// The worker thread could not be started.
    Spawn(std::io::Error),
    /// The worker thread is gone (stopped or panicked mid-job).
    Disconnected,
    /// The job ran and returned an error.
    Job(E),
}

impl<E: Display> Display for WorkerError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to start store worker: {err}"),
            Self::Disconnected => write!(f, "store worker is not running"),
            Self::Job(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for WorkerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Disconnected => None,
            Self::Job(err) => Some(err),
        }
    }
}

impl<E> WorkerError<E> {
    /// Returns the job error, if the job itself failed.
    pub fn job_error(&self) -> Option<&E> {
        match self {
            Self::Job(err) => Some(err),
            _ => None,
        }
    }
}

/// Handle to the background thread owning the item database.
///
/// Constructed explicitly by the application root and passed to whoever needs
/// the store; there is no process-wide instance.
pub struct StoreWorker {
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// Opens the database file and starts the worker.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkerError<DbError>> {
        let conn = open_db(path).map_err(WorkerError::Job)?;
        Self::spawn(conn).map_err(WorkerError::Spawn)
    }

    /// Starts a worker over a private in-memory database.
    pub fn open_in_memory() -> Result<Self, WorkerError<DbError>> {
        let conn = open_db_in_memory().map_err(WorkerError::Job)?;
        Self::spawn(conn).map_err(WorkerError::Spawn)
    }

    /// Moves an already migrated connection onto a new worker thread.
    pub fn spawn(mut conn: Connection) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                info!("event=worker_start module=worker status=ok");
                let mut jobs = 0_u64;
                while let Ok(job) = receiver.recv() {
                    job(&mut conn);
                    jobs += 1;
                }
                info!("event=worker_stop module=worker status=ok jobs={jobs}");
            })?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Runs `job` on the worker thread and blocks until it returns.
    pub fn call<T, E, F>(&self, job: F) -> Result<T, WorkerError<E>>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(WorkerError::Disconnected)?;
        let (reply_tx, reply_rx) = mpsc::channel();

        let boxed: Job = Box::new(move |conn| {
            let started_at = Instant::now();
            let result = job(conn);
            debug!(
                "event=store_job module=worker status={} duration_ms={}",
                if result.is_ok() { "ok" } else { "error" },
                started_at.elapsed().as_millis()
            );
            // The caller may have stopped waiting; the job has still run.
            let _ = reply_tx.send(result);
        });

        sender.send(boxed).map_err(|_| WorkerError::Disconnected)?;
        match reply_rx.recv() {
            Ok(result) => result.map_err(WorkerError::Job),
            Err(_) => {
                error!("event=store_job module=worker status=error error_code=worker_disconnected");
                Err(WorkerError::Disconnected)
            }
        }
    }

    /// Runs `f` against an item service bound to the worker's connection.
    pub fn with_items<T, F>(&self, f: F) -> Result<T, WorkerError<RepoError>>
    where
        F: FnOnce(&ItemService<SqliteItemRepository<'_>>) -> RepoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.call(move |conn| {
            let repo = SqliteItemRepository::try_new(conn)?;
            f(&ItemService::new(repo))
        })
    }
}

impl Debug for StoreWorker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreWorker")
            .field("running", &self.sender.is_some())
            .finish()
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("event=worker_stop module=worker status=error error_code=worker_panicked");
            }
        }
    }
}
