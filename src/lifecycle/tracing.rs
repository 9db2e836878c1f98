//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` fmt layer used by the
//! demo binary. Libraries only emit events; installing a subscriber is the
//! binary's job.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: startup and shutdown per table, with final size
//! - **Record Operations**: Created / Updated / Deleted at info, payloads at debug
//! - **Client Calls**: one span per table-client method via `#[instrument]`
//! - **Storefront State**: cart reloads, feed re-fetches and the read failures
//!   they recover from (warn)
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run      # Compact logs
//! RUST_LOG=debug cargo run     # Full payloads
//! RUST_LOG=storefront_sync::cart_store=debug cargo run
//! ```

/// Initializes the global subscriber: `RUST_LOG` filtering, compact output,
/// no module targets (the `table` field carries the context instead).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
