//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; actor logs carry an `entity_type` field
//! instead.
//!
//! ```bash
//! RUST_LOG=info cargo run            # one line per actor operation and job
//! RUST_LOG=debug cargo run           # plus payloads and outbound requests
//! RUST_LOG=canopy=debug,info cargo run
//! ```
//!
//! A placed order reads like this at `info`:
//!
//! ```text
//! INFO Action ok entity_type="ProductVariant" id=variant_3
//! INFO Created entity_type="Order" id=order_1 size=1
//! INFO place_order: Order placed order=order_1 total=240.00
//! INFO seed_variant_matrix: Variant matrix seeded product=product_1 created=4
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Falls back to `info` when `RUST_LOG` is unset.
///
/// Calling it twice is harmless; the second call leaves the first subscriber in
/// place.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
