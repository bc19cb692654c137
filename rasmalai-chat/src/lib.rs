//! Conversation logic for rasmalai
//!
//! This crate provides the conversation manager: session lifecycle, the
//! send/reply turn, and history persistence.

pub mod manager;
pub mod turn;

pub use manager::{ConversationManager, NEW_CHAT_TITLE};
pub use turn::PendingTurn;
