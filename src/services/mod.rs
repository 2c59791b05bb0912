//! # Services
//!
//! Operations that involve more than one actor or an outside system. Services are
//! cheap to clone (they hold clients and `Arc`s) and are what the HTTP handlers
//! and the job worker call.
//!
//! Follow-up work is queued as [`Job`](crate::jobs::Job)s rather than awaited:
//!
//! | Operation                      | Queued job                          |
//! |--------------------------------|-------------------------------------|
//! | create product                 | `SeedVariantMatrix(product)`        |
//! | create size / color / planter  | `SeedVariantMatrix` per product     |
//! | update variant, place/cancel order | `RefreshProductPrice(product)`  |
//! | create / rename location       | `GeocodeLocation(location)`         |
//! | broadcast notification         | `DispatchAdminNotification(id)`     |
//! | payment confirmed, adoption, donation | `NotifyUser { .. }`          |

mod catalog;
mod checkout;
mod location;
mod notification;
mod order;
mod sponsorship;

pub use catalog::{CatalogService, ProductDetail, VariantChange};
pub use checkout::{CheckoutError, CheckoutService, OpenIntents};
pub use location::LocationService;
pub use notification::NotificationService;
pub use order::{CouponQuote, OrderService, PlaceOrder};
pub use sponsorship::SponsorshipService;
