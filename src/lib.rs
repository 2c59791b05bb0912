//! # Canopy
//!
//! Backend of a plant shop and tree sponsorship platform: a product catalog with
//! a size x color x planter variant matrix, coupons, orders and payments, tree
//! adoption and donation campaigns, a location hierarchy with geocoding, OTP
//! sign-in and push/SMS notifications.
//!
//! ## 🏗️ Architecture
//!
//! Every stored resource lives inside its own resource actor built on
//! [`canopy_actors`]. Actors own their state and process messages one at a time,
//! so cross-record invariants (slug and SKU uniqueness, stock reservation,
//! coupon usage counts) hold without locks.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Resources ([`model`] and the `*_actor` modules)
//! Records and their create/update payloads, plus the
//! [`ActorEntity`](canopy_actors::ActorEntity) impls that validate them.
//!
//! ### 2. The Interface ([`clients`])
//! Domain clients wrapping `ResourceClient<T>`, each returning its actor's error type.
//!
//! ### 3. Workflows ([`services`], [`auth`], [`notifications`])
//! Multi-actor flows such as seeding the variant matrix, checkout and adoption.
//! Slow follow-up work goes through the [`jobs`] queue.
//!
//! ### 4. Adapters ([`payments`], [`geocoding`], [`notifications::push`], [`notifications::sms`])
//! Outbound providers behind traits, with in-process fallbacks for development.
//!
//! ### 5. The Orchestrator ([`lifecycle`]) and the API ([`http`])
//! [`Platform`](lifecycle::Platform) starts and wires everything;
//! [`http::router`] exposes it over JSON.
//!
//! ## 🚀 Running
//!
//! ```bash
//! CANOPY_ADMIN_KEY=secret RUST_LOG=info cargo run
//! ```

pub mod auth;
pub mod catalog_actor;
pub mod clients;
pub mod codes;
pub mod config;
pub mod coupon_actor;
pub mod geocoding;
pub mod http;
pub mod jobs;
pub mod lifecycle;
pub mod location_actor;
pub mod model;
pub mod notification_actor;
pub mod notifications;
pub mod order_actor;
pub mod payments;
pub mod services;
pub mod sponsorship_actor;
pub mod user_actor;
pub mod validation;
