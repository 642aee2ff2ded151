use crate::{
    context::ConversationContext,
    error::AgendaError,
    message::{IncomingMessage, OutgoingMessage},
    oracle::{OracleReply, OracleRequest},
    task::{Task, TaskDraft, TaskPatch},
};
use async_trait::async_trait;

/// NLU oracle — classifies a raw message into intent and slot values.
///
/// Infallible by contract: implementations must degrade to
/// [`OracleReply::clarify_fallback`] on any transport or parse failure.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn classify(&self, request: &OracleRequest<'_>) -> OracleReply;
}

/// Row-level persistence for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, draft: &TaskDraft) -> Result<Task, AgendaError>;

    /// Fails with [`AgendaError::NotFound`] when the id is absent or owned
    /// by someone else.
    async fn update(&self, id: &str, owner_id: &str, patch: &TaskPatch)
        -> Result<Task, AgendaError>;

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), AgendaError>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>, AgendaError>;

    async fn get_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Task>, AgendaError>;
}

/// Durable per-user conversation state, keyed by phone identity.
///
/// `put` is an upsert with last-writer-wins semantics; per-key atomicity is
/// all the orchestrator relies on.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<ConversationContext>, AgendaError>;

    async fn put(&self, user_id: &str, context: &ConversationContext) -> Result<(), AgendaError>;

    async fn delete(&self, user_id: &str) -> Result<(), AgendaError>;
}

/// Messaging channel — receives and sends user messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, AgendaError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), AgendaError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), AgendaError>;
}
