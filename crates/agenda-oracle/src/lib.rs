//! # agenda-oracle
//!
//! The NLU oracle client: sends the user's message (plus conversation
//! history, task list, and accumulated slot turns) to an OpenAI-compatible
//! chat-completions endpoint prompted to answer with strict JSON, and parses
//! the answer into the typed [`agenda_core::oracle::OracleReply`].
//!
//! The oracle is best-effort by contract: any transport or parse failure
//! degrades to a clarify reply instead of surfacing an error.

mod client;
mod prompt;
mod wire;

pub use client::OracleClient;
