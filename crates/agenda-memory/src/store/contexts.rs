//! Durable per-user conversation state.
//!
//! One row per phone identity. `put` is an upsert with last-writer-wins
//! semantics: two overlapping turns for the same user may interleave their
//! read-decide-write sequences, and the later write wins. Accepted
//! limitation — the store guarantees per-key atomicity, not compare-and-swap.

use super::Store;
use agenda_core::{context::ConversationContext, error::AgendaError, traits::ContextStore};
use async_trait::async_trait;

#[async_trait]
impl ContextStore for Store {
    async fn get(&self, user_id: &str) -> Result<Option<ConversationContext>, AgendaError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT context FROM conversation_contexts WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AgendaError::Memory(format!("get context failed: {e}")))?;

        match row {
            Some((json,)) => {
                let context: ConversationContext = serde_json::from_str(&json)
                    .map_err(|e| AgendaError::Memory(format!("bad context json: {e}")))?;
                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, user_id: &str, context: &ConversationContext) -> Result<(), AgendaError> {
        let json = serde_json::to_string(context)?;
        sqlx::query(
            "INSERT INTO conversation_contexts (user_id, context, updated_at) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(user_id) DO UPDATE SET context = excluded.context, \
             updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| AgendaError::Memory(format!("put context failed: {e}")))?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), AgendaError> {
        sqlx::query("DELETE FROM conversation_contexts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AgendaError::Memory(format!("delete context failed: {e}")))?;
        Ok(())
    }
}
