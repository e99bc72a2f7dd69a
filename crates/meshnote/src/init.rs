//! Logging setup for applications embedding meshnote.

/// Initializes `env_logger` from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; only the first call installs the logger.
/// Returns whether this call installed it.
pub fn init_logging() -> bool {
    let installed = env_logger::try_init().is_ok();
    if installed {
        log::info!("meshnote {} logging initialized", env!("CARGO_PKG_VERSION"));
    }
    installed
}
