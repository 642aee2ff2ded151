use thiserror::Error;

/// Top-level error type for Agenda.
#[derive(Debug, Error)]
pub enum AgendaError {
    /// Error from the NLU oracle.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Memory/storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// A referenced task does not exist or is not owned by the caller.
    #[error("task not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
