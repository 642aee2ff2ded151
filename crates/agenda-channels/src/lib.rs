//! # agenda-channels
//!
//! Messaging platform integrations. Currently WhatsApp Cloud API: an axum
//! webhook server for inbound events and a Graph API client for outbound
//! messages.

pub mod whatsapp;

pub use whatsapp::WhatsAppChannel;
