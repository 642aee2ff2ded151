//! Per-message processing: control keywords, oracle classification, the
//! dialogue step, side effects, and delivery.

use super::{keywords, keywords::Control, Gateway};
use crate::dialogue::{self, StoreOp, TurnInput};
use crate::texts;
use agenda_core::{
    context::{ConversationContext, DialogState},
    error::AgendaError,
    message::{IncomingMessage, OutgoingMessage},
    oracle::OracleRequest,
    task::upcoming,
};
use tracing::{error, info, warn};

/// A turn's outcome: reply text plus optional reply buttons.
type Reply = (String, Vec<String>);

impl Gateway {
    /// Process one incoming message end to end.
    ///
    /// Any failure inside the turn is contained here: the user gets a fixed
    /// apology and the stored context stays exactly as it was, so the next
    /// message resumes the flow.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let preview: String = incoming.text.chars().take(48).collect();
        info!("[{}] {}: {preview}", incoming.channel, incoming.sender_id);

        let reply = if let Some(control) = keywords::parse(&incoming.text) {
            self.handle_control(control, &incoming).await
        } else {
            match self.run_turn(&incoming).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("turn failed for {}: {e}", incoming.sender_id);
                    (texts::apology().to_string(), Vec::new())
                }
            }
        };

        self.deliver(&incoming, reply).await;
    }

    /// Control keywords bypass the oracle entirely.
    async fn handle_control(&self, control: Control, incoming: &IncomingMessage) -> Reply {
        let user = &incoming.sender_id;
        let result: Result<Reply, AgendaError> = match control {
            Control::Cancel => self
                .contexts
                .delete(user)
                .await
                .map(|()| (texts::cancelled().to_string(), Vec::new())),
            Control::Restart => self
                .contexts
                .delete(user)
                .await
                .map(|()| (texts::restarted().to_string(), Vec::new())),
            Control::Help => Ok((texts::help().to_string(), Vec::new())),
            Control::List => self.tasks.list_by_owner(user).await.map(|tasks| {
                let up = upcoming(&tasks, incoming.timestamp);
                (texts::task_list(&up, incoming.timestamp), Vec::new())
            }),
        };

        result.unwrap_or_else(|e| {
            error!("control keyword failed for {user}: {e}");
            (texts::apology().to_string(), Vec::new())
        })
    }

    pub(super) async fn run_turn(&self, incoming: &IncomingMessage) -> Result<Reply, AgendaError> {
        let now = incoming.timestamp;
        let user = &incoming.sender_id;

        let context = match self.contexts.get(user).await? {
            Some(ctx) if !ctx.is_stale(now) => ctx,
            Some(_) => {
                info!("discarding stale context for {user}");
                ConversationContext::new(now)
            }
            None => ConversationContext::new(now),
        };

        let tasks = self.tasks.list_by_owner(user).await?;
        let history = self.history_snapshot(user);
        let accumulated = if context.state == DialogState::Initial {
            None
        } else {
            context.slots.accumulated_text()
        };

        let request = OracleRequest {
            message: &incoming.text,
            history: &history,
            tasks: &tasks,
            now,
            accumulated,
        };
        let reply = self.oracle.classify(&request).await;

        let decision = dialogue::step(&TurnInput {
            sender_id: user,
            text: &incoming.text,
            context,
            reply: &reply,
            tasks: &tasks,
            now,
        });

        // Side effects run before the context write, so a failed store call
        // leaves the persisted state exactly as it was.
        match decision.op {
            StoreOp::None => {}
            StoreOp::Create(draft) => {
                self.tasks.create(&draft).await?;
            }
            StoreOp::Update { id, patch } => match self.tasks.update(&id, user, &patch).await {
                Ok(_) => {}
                Err(AgendaError::NotFound(_)) => return self.vanished(user).await,
                Err(e) => return Err(e),
            },
            StoreOp::Delete { id } => match self.tasks.delete(&id, user).await {
                Ok(()) => {}
                Err(AgendaError::NotFound(_)) => return self.vanished(user).await,
                Err(e) => return Err(e),
            },
        }

        match decision.context {
            Some(mut ctx) => {
                ctx.touch(now);
                self.contexts.put(user, &ctx).await?;
            }
            None => self.contexts.delete(user).await?,
        }

        Ok((decision.reply, decision.buttons))
    }

    /// The referenced task is gone (deleted meanwhile). Reset the flow and
    /// say so politely instead of surfacing an error.
    async fn vanished(&self, user: &str) -> Result<Reply, AgendaError> {
        warn!("referenced task vanished mid-flow for {user}");
        self.contexts.delete(user).await?;
        Ok((texts::not_found().to_string(), Vec::new()))
    }

    /// Send the reply through the originating channel, after the dedup guard.
    async fn deliver(&self, incoming: &IncomingMessage, (text, buttons): Reply) {
        self.remember_turn(&incoming.sender_id, &incoming.text, &text);

        if !self.dedup.should_send(&incoming.sender_id, &text) {
            info!("suppressing duplicate outbound to {}", incoming.sender_id);
            return;
        }

        let Some(channel) = self.channels.get(&incoming.channel) else {
            warn!("no channel named {} to reply through", incoming.channel);
            return;
        };

        let message = OutgoingMessage {
            to: incoming.sender_id.clone(),
            text,
            buttons,
        };
        if let Err(e) = channel.send(message).await {
            error!("failed to send reply: {e}");
        }
    }
}
