//! # agenda-core
//!
//! Core types, traits, configuration, and error handling for the Agenda
//! assistant: the slot model, conversation context, conflict detection,
//! slot diffing, and the contracts of every external collaborator.

pub mod config;
pub mod conflict;
pub mod context;
pub mod diff;
pub mod error;
pub mod message;
pub mod oracle;
pub mod slots;
pub mod task;
pub mod textnorm;
pub mod timefmt;
pub mod traits;
