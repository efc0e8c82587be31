pub mod artifacts;
pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod raster;
pub mod server;
pub mod transcode;

pub use error::{Result, ServiceError};

/// Logging setup shared by the binaries
pub mod util {
    use tracing_subscriber::EnvFilter;

    /// Install the global `tracing` subscriber. `RUST_LOG` wins over the
    /// built-in default filter when it is set.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(super::config::RUST_LOG));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
