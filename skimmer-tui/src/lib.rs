//! Chat interface: one input line, a transcript of turns, and inline
//! pipeline progress.

mod chat;
mod command;
mod input;
mod session;
mod styles;
mod transcript;
mod turn;
mod view;

pub use chat::run_chat;
pub use session::{ChatSession, ConversationTurn, Role};
pub use turn::{TurnOutcome, TurnRequest, run_turn};
