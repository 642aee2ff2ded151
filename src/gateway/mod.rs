//! Gateway — the event loop connecting channels, the oracle, and the stores.

mod dedup;
mod keywords;
mod pipeline;

use agenda_core::{
    message::IncomingMessage,
    traits::{Channel, ContextStore, Oracle, TaskStore},
};
use crate::texts;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

/// The central gateway that routes messages between channels and the
/// dialogue state machine.
pub struct Gateway {
    channels: HashMap<String, Arc<dyn Channel>>,
    // Held as two trait objects so call sites stay unambiguous even though
    // one concrete store implements both.
    tasks: Arc<dyn TaskStore>,
    contexts: Arc<dyn ContextStore>,
    oracle: Arc<dyn Oracle>,
    dedup: dedup::DedupGuard,
    /// Best-effort rolling history per user, handed to the oracle. The
    /// durable truth for multi-turn extraction is the context's raw turns.
    history: std::sync::Mutex<HashMap<String, VecDeque<String>>>,
    history_turns: usize,
    /// Senders with a turn in flight; further messages are buffered.
    active_senders: Mutex<HashMap<String, Vec<IncomingMessage>>>,
}

impl Gateway {
    pub fn new(
        channels: HashMap<String, Arc<dyn Channel>>,
        tasks: Arc<dyn TaskStore>,
        contexts: Arc<dyn ContextStore>,
        oracle: Arc<dyn Oracle>,
        history_turns: usize,
    ) -> Self {
        Self {
            channels,
            tasks,
            contexts,
            oracle,
            dedup: dedup::DedupGuard::new(),
            history: std::sync::Mutex::new(HashMap::new()),
            history_turns,
            active_senders: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop until ctrl-c.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "agenda gateway running | channels: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.dispatch_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Dispatch a message: buffer if the sender already has a turn in
    /// flight, otherwise process it, then drain anything buffered meanwhile.
    /// Turns for one sender never interleave.
    async fn dispatch_message(self: Arc<Self>, incoming: IncomingMessage) {
        let sender_key = format!("{}:{}", incoming.channel, incoming.sender_id);

        {
            let mut active = self.active_senders.lock().await;
            if let Some(buffer) = active.get_mut(&sender_key) {
                buffer.push(incoming.clone());
                info!("buffered message from {sender_key} (turn in progress)");
                self.ack_buffered(&incoming).await;
                return;
            }
            active.insert(sender_key.clone(), Vec::new());
        }

        self.handle_message(incoming).await;

        loop {
            let next = {
                let mut active = self.active_senders.lock().await;
                match active.get_mut(&sender_key) {
                    Some(buf) if !buf.is_empty() => Some(buf.remove(0)),
                    _ => {
                        active.remove(&sender_key);
                        None
                    }
                }
            };

            match next {
                Some(buffered) => {
                    info!("processing buffered message from {sender_key}");
                    self.handle_message(buffered).await;
                }
                None => break,
            }
        }
    }

    /// Tell the user their message was queued behind the current turn.
    /// Goes through the dedup guard like every outbound, so a burst of
    /// buffered messages yields a single ack.
    async fn ack_buffered(&self, incoming: &IncomingMessage) {
        let Some(channel) = self.channels.get(&incoming.channel) else {
            return;
        };
        let text = texts::buffered();
        if !self.dedup.should_send(&incoming.sender_id, text) {
            return;
        }
        let msg = agenda_core::message::OutgoingMessage::text(&incoming.sender_id, text);
        if let Err(e) = channel.send(msg).await {
            error!("failed to send buffering ack: {e}");
        }
    }

    /// Record one exchange in the rolling oracle history.
    pub(super) fn remember_turn(&self, user_id: &str, user_text: &str, reply_text: &str) {
        let Ok(mut history) = self.history.lock() else {
            return;
        };
        let turns = history.entry(user_id.to_string()).or_default();
        turns.push_back(format!("Usuário: {user_text}"));
        turns.push_back(format!("Assistente: {reply_text}"));
        while turns.len() > self.history_turns {
            turns.pop_front();
        }
    }

    pub(super) fn history_snapshot(&self, user_id: &str) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history
                .get(user_id)
                .map(|turns| turns.iter().cloned().collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    async fn shutdown(&self) {
        info!("Shutting down...");
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }
        info!("Shutdown complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::context::ConversationContext;
    use agenda_core::error::AgendaError;
    use agenda_core::oracle::{OracleReply, OracleRequest};
    use agenda_core::task::{Task, TaskDraft, TaskPatch};
    use async_trait::async_trait;

    struct NoopOracle;

    #[async_trait]
    impl Oracle for NoopOracle {
        async fn classify(&self, _request: &OracleRequest<'_>) -> OracleReply {
            OracleReply::clarify_fallback()
        }
    }

    struct EmptyTasks;

    #[async_trait]
    impl TaskStore for EmptyTasks {
        async fn create(&self, _draft: &TaskDraft) -> Result<Task, AgendaError> {
            Err(AgendaError::Memory("unused".to_string()))
        }
        async fn update(
            &self,
            id: &str,
            _owner_id: &str,
            _patch: &TaskPatch,
        ) -> Result<Task, AgendaError> {
            Err(AgendaError::NotFound(id.to_string()))
        }
        async fn delete(&self, id: &str, _owner_id: &str) -> Result<(), AgendaError> {
            Err(AgendaError::NotFound(id.to_string()))
        }
        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Task>, AgendaError> {
            Ok(vec![])
        }
        async fn get_by_id(&self, _id: &str, _owner_id: &str) -> Result<Option<Task>, AgendaError> {
            Ok(None)
        }
    }

    /// Context store over a single in-memory slot, for turn-level tests.
    #[derive(Default)]
    struct SlotContexts {
        slot: std::sync::Mutex<Option<ConversationContext>>,
    }

    #[async_trait]
    impl ContextStore for SlotContexts {
        async fn get(&self, _user_id: &str) -> Result<Option<ConversationContext>, AgendaError> {
            Ok(self.slot.lock().unwrap().clone())
        }
        async fn put(
            &self,
            _user_id: &str,
            context: &ConversationContext,
        ) -> Result<(), AgendaError> {
            *self.slot.lock().unwrap() = Some(context.clone());
            Ok(())
        }
        async fn delete(&self, _user_id: &str) -> Result<(), AgendaError> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Channel that records every sent text, for outbound assertions.
    #[derive(Default)]
    struct RecordingChannel {
        sent: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "whatsapp"
        }
        async fn start(
            &self,
        ) -> Result<mpsc::Receiver<IncomingMessage>, AgendaError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }
        async fn send(
            &self,
            message: agenda_core::message::OutgoingMessage,
        ) -> Result<(), AgendaError> {
            self.sent.lock().unwrap().push(message.text);
            Ok(())
        }
        async fn stop(&self) -> Result<(), AgendaError> {
            Ok(())
        }
    }

    fn gateway_with(contexts: Arc<SlotContexts>) -> Gateway {
        Gateway::new(
            HashMap::new(),
            Arc::new(EmptyTasks),
            contexts,
            Arc::new(NoopOracle),
            10,
        )
    }

    fn gateway() -> Gateway {
        gateway_with(Arc::new(SlotContexts::default()))
    }

    fn confirming_context(last_update: chrono::NaiveDateTime) -> ConversationContext {
        let mut ctx = ConversationContext::new(last_update);
        ctx.state = agenda_core::context::DialogState::Confirming;
        ctx.slots.title = Some("Almoço".to_string());
        ctx.slots.when = chrono::NaiveDate::from_ymd_opt(2026, 8, 22)
            .unwrap()
            .and_hms_opt(13, 0, 0);
        ctx
    }

    fn incoming(text: &str, timestamp: chrono::NaiveDateTime) -> IncomingMessage {
        IncomingMessage {
            id: uuid::Uuid::new_v4(),
            channel: "whatsapp".to_string(),
            sender_id: "5511999990000".to_string(),
            sender_name: None,
            text: text.to_string(),
            timestamp,
        }
    }

    fn reference_now() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 8, 21)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_stale_context_is_replaced_before_processing() {
        let contexts = Arc::new(SlotContexts::default());
        let stale = confirming_context(reference_now() - chrono::Duration::minutes(31));
        *contexts.slot.lock().unwrap() = Some(stale);

        let gw = gateway_with(contexts.clone());
        gw.run_turn(&incoming("oi", reference_now())).await.unwrap();

        // A live confirming context would have kept confirming; the stale one
        // was discarded, so the clarify-classified turn starts fresh.
        let stored = contexts.slot.lock().unwrap().clone().unwrap();
        assert_eq!(
            stored.state,
            agenda_core::context::DialogState::WaitingForClarification
        );
        assert!(stored.slots.title.is_none());
    }

    #[tokio::test]
    async fn test_live_context_keeps_its_flow() {
        let contexts = Arc::new(SlotContexts::default());
        let live = confirming_context(reference_now() - chrono::Duration::minutes(5));
        *contexts.slot.lock().unwrap() = Some(live);

        let gw = gateway_with(contexts.clone());
        gw.run_turn(&incoming("e convida a Ana", reference_now()))
            .await
            .unwrap();

        let stored = contexts.slot.lock().unwrap().clone().unwrap();
        assert_eq!(
            stored.state,
            agenda_core::context::DialogState::Confirming
        );
        assert_eq!(stored.slots.title.as_deref(), Some("Almoço"));
    }

    #[tokio::test]
    async fn test_buffered_ack_is_sent_at_most_once() {
        let channel = Arc::new(RecordingChannel::default());
        let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
        channels.insert("whatsapp".to_string(), channel.clone());
        let gw = Gateway::new(
            channels,
            Arc::new(EmptyTasks),
            Arc::new(SlotContexts::default()),
            Arc::new(NoopOracle),
            10,
        );

        // Two messages buffered back-to-back behind one in-flight turn.
        gw.ack_buffered(&incoming("reunião amanhã", reference_now()))
            .await;
        gw.ack_buffered(&incoming("às 15h", reference_now())).await;

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), [texts::buffered()]);
    }

    #[test]
    fn test_history_is_capped() {
        let gw = gateway();
        for i in 0..20 {
            gw.remember_turn("5511", &format!("pergunta {i}"), &format!("resposta {i}"));
        }
        let history = gw.history_snapshot("5511");
        assert_eq!(history.len(), 10);
        assert_eq!(history.last().unwrap(), "Assistente: resposta 19");
    }

    #[test]
    fn test_history_is_per_user() {
        let gw = gateway();
        gw.remember_turn("5511", "oi", "olá");
        assert!(gw.history_snapshot("5522").is_empty());
        assert_eq!(gw.history_snapshot("5511").len(), 2);
    }
}
