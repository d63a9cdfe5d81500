//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Game rule rejections during the skirmish are logged, not returned; only
/// setup failures end the run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: nationstate_core::config::ConfigError,
    },

    /// An engine command needed for setup failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: nationstate_core::EngineError,
    },

    /// The event logger task did not finish cleanly.
    #[error("event logger error: {message}")]
    EventLogger {
        /// Description of the failure.
        message: String,
    },
}
