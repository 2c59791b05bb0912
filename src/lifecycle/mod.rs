//! # Lifecycle
//!
//! Building, wiring and stopping the whole system.
//!
//! [`Platform::start`] creates every resource actor, injects the clients an
//! actor depends on as its context, starts the job worker and builds the
//! services on top:
//!
//! ```text
//! users ─┐
//! variants ─┼──► orders (context: OrderContext)
//! coupons ─┘
//!
//! services ──dispatch──► JobWorker ──► services (JobContext)
//! ```
//!
//! Only the Order actor has dependencies, and they form no cycle, so resource
//! actors stop when their clients are dropped. The job worker and the services
//! hold each other's handles, so it is stopped explicitly with
//! [`JobQueue::shutdown`](crate::jobs::JobQueue::shutdown) first.

pub mod platform;
pub mod tracing;

pub use platform::*;
pub use tracing::*;
