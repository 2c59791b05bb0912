//! # Background Jobs
//!
//! Follow-up work that must not hold up a request: geocoding a location, refreshing
//! a product's derived price, seeding a product's variant matrix and delivering
//! notifications. Each job names one entity and re-reads it when it runs.
//!
//! The worker is built like a resource actor:
//!
//! ```rust,ignore
//! let (worker, jobs) = JobWorker::new();
//! // services get `jobs.clone()` ...
//! tokio::spawn(worker.run(JobContext { catalog, locations, notifier }));
//! jobs.dispatch(Job::GeocodeLocation(id));
//! ```
//!
//! Failures are logged and dropped. There is no retry.
//!
//! The services in the context hold a [`JobQueue`] themselves, so the channel
//! never closes on its own; the platform stops the worker with
//! [`JobQueue::shutdown`].

use crate::catalog_actor::CatalogError;
use crate::location_actor::LocationError;
use crate::model::{LocationId, NotificationId, ProductId, UserId};
use crate::notifications::{Notifier, NotifyError, PushMessage};
use crate::services::{CatalogService, LocationService};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    GeocodeLocation(LocationId),
    RefreshProductPrice(ProductId),
    SeedVariantMatrix(ProductId),
    DispatchAdminNotification(NotificationId),
    NotifyUser { user: UserId, message: PushMessage },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::GeocodeLocation(_) => "geocode_location",
            Job::RefreshProductPrice(_) => "refresh_product_price",
            Job::SeedVariantMatrix(_) => "seed_variant_matrix",
            Job::DispatchAdminNotification(_) => "dispatch_admin_notification",
            Job::NotifyUser { .. } => "notify_user",
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("job worker is not running")]
    Closed,
}

enum Envelope {
    Run {
        job: Job,
        done: Option<oneshot::Sender<Result<(), JobError>>>,
    },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle for queueing jobs.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl JobQueue {
    /// Queues `job` without waiting for it.
    pub fn dispatch(&self, job: Job) {
        debug!(job = job.name(), "Dispatching job");
        let name = job.name();
        if self.sender.send(Envelope::Run { job, done: None }).is_err() {
            warn!(job = name, "Job queue closed, dropping job");
        }
    }

    /// Queues `job` and waits for its outcome.
    pub async fn run_now(&self, job: Job) -> Result<(), JobError> {
        let (done, outcome) = oneshot::channel();
        self.sender
            .send(Envelope::Run {
                job,
                done: Some(done),
            })
            .map_err(|_| JobError::Closed)?;
        outcome.await.map_err(|_| JobError::Closed)?
    }

    /// Waits until every job queued before this call has run.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(Envelope::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// Stops the worker once the jobs queued so far are done.
    pub fn shutdown(&self) {
        let _ = self.sender.send(Envelope::Shutdown);
    }
}

/// What the worker needs to run jobs.
#[derive(Clone)]
pub struct JobContext {
    pub catalog: CatalogService,
    pub locations: LocationService,
    pub notifier: Notifier,
}

pub struct JobWorker {
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl JobWorker {
    pub fn new() -> (Self, JobQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, JobQueue { sender })
    }

    /// Runs jobs one at a time until [`JobQueue::shutdown`] or until every
    /// queue handle is dropped.
    pub async fn run(mut self, context: JobContext) {
        info!("Job worker started");
        let mut processed = 0u64;
        while let Some(envelope) = self.receiver.recv().await {
            match envelope {
                Envelope::Run { job, done } => {
                    let name = job.name();
                    let outcome = execute(&context, job).await;
                    processed += 1;
                    match &outcome {
                        Ok(()) => debug!(job = name, "Job done"),
                        Err(e) => warn!(job = name, error = %e, "Job failed"),
                    }
                    if let Some(done) = done {
                        let _ = done.send(outcome);
                    }
                }
                Envelope::Flush(tx) => {
                    let _ = tx.send(());
                }
                Envelope::Shutdown => break,
            }
        }
        info!(processed, "Job worker stopped");
    }
}

#[instrument(skip(context), fields(job = job.name()))]
async fn execute(context: &JobContext, job: Job) -> Result<(), JobError> {
    match job {
        Job::GeocodeLocation(id) => {
            context.locations.geocode(id).await?;
        }
        Job::RefreshProductPrice(id) => {
            context.catalog.refresh_price(id).await?;
        }
        Job::SeedVariantMatrix(id) => {
            let created = context.catalog.seed_variant_matrix(id).await?;
            info!(product = %id, created, "Variant matrix seeded");
        }
        Job::DispatchAdminNotification(id) => {
            context.notifier.dispatch_admin_notification(id).await?;
        }
        Job::NotifyUser { user, message } => {
            let report = context.notifier.notify_user(user, &message).await?;
            debug!(%user, delivered = report.delivered, "User notified");
        }
    }
    Ok(())
}
