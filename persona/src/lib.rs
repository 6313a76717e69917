//! Talk with anyone: persona prompts and turn-taking.
//!
//! The crate renders prompts for a simulated persona ([`prompt`]), owns the
//! session state machine that decides whose turn it is ([`controller`]), and
//! drives generations through a completion gateway ([`session`],
//! [`gateway`]).

pub mod controller;
pub mod events;
pub mod gateway;
pub mod prompt;
pub mod session;
pub mod types;

pub use controller::{
    Controller, ControllerError, Phase, Request, Resolution, Slot, SlotState, Snapshot, Ticket,
};
pub use events::{Event, EventBus};
pub use gateway::{Completer, GenerationError, HttpGateway};
pub use prompt::{
    ConversationPrompt, DescriptionPrompt, Exchange, PromptFragment, conversation_prompt,
    description_prompt,
};
pub use session::{ErrorSink, Session, TracingSink};
pub use types::{Conversation, Persona, Speaker};
