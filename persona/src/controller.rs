//! Turn-taking state machine for a single persona chat session.
//!
//! [`Controller`] is the one state record for a session: the persona, the
//! append-only conversation and two generation slots. Every mutation goes
//! through one of its transition methods, which keeps strict alternation
//! enforceable in one place.
//!
//! Requests are identified by [`Ticket`]s. A result is only applied when
//! its ticket matches the request currently pending in that slot, so late
//! or duplicate resolutions are reported as [`Resolution::Stale`] and leave
//! the state untouched.

use serde::Serialize;
use thiserror::Error;

use crate::gateway::GenerationError;
use crate::prompt::{Exchange, conversation_prompt, description_prompt};
use crate::types::{Conversation, Persona, Speaker};

/// Independent single-outstanding-request channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Description,
    Reply,
}

/// Identifies one issued generation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    slot: Slot,
    id: u64,
}

impl Ticket {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Idle,
    Pending(u64),
}

/// A generation the caller must send to the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub ticket: Ticket,
    pub prompt: String,
}

/// Coarse session state derived from the controller's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    NoPersona,
    AwaitingDescription,
    /// Persona described, or chatting without a description; holds whose
    /// turn comes next.
    Ready(Speaker),
}

/// Outcome of feeding a generation result back into the controller.
#[derive(Debug)]
pub enum Resolution {
    /// The result was trimmed and stored.
    Applied { slot: Slot, text: String },
    /// The generation failed; only the pending flag was cleared.
    Failed { slot: Slot, error: GenerationError },
    /// The ticket no longer matches a pending request; nothing changed.
    Stale,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a name is required")]
    MissingName,
    #[error("details are required")]
    MissingDetails,
    #[error("names and details must fit on one line")]
    LineBreak,
    #[error("a persona has already been chosen")]
    PersonaAlreadySet,
    #[error("nothing to say")]
    EmptyInput,
    #[error("input is disabled until the persona replies")]
    InputDisabled,
}

/// Serializable view of a controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub persona: Option<Persona>,
    pub history: Vec<String>,
    pub phase: Phase,
    pub input_disabled: bool,
}

#[derive(Debug, Default)]
pub struct Controller {
    persona: Option<Persona>,
    described: bool,
    conversation: Conversation,
    description: SlotState,
    reply: SlotState,
    next_ticket: u64,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persona and issue its description request.
    ///
    /// The persona is fixed for the rest of the session; a second
    /// submission is rejected.
    pub fn submit_persona(
        &mut self,
        name: &str,
        details: &str,
    ) -> Result<Request, ControllerError> {
        let (name, details) = (name.trim(), details.trim());
        if name.is_empty() {
            return Err(ControllerError::MissingName);
        }
        if details.is_empty() {
            return Err(ControllerError::MissingDetails);
        }
        if name.contains(['\r', '\n']) || details.contains(['\r', '\n']) {
            return Err(ControllerError::LineBreak);
        }
        if self.persona.is_some() {
            return Err(ControllerError::PersonaAlreadySet);
        }
        let persona = Persona::new(name, details);
        let prompt = description_prompt(&persona);
        self.persona = Some(persona);
        let ticket = self.issue(Slot::Description);
        Ok(Request { ticket, prompt })
    }

    /// Append a human turn and issue the persona's reply request.
    ///
    /// The turn is appended before any network round-trip.
    pub fn submit_human(&mut self, text: &str) -> Result<Request, ControllerError> {
        if self.input_disabled() {
            return Err(ControllerError::InputDisabled);
        }
        if text.trim().is_empty() {
            return Err(ControllerError::EmptyInput);
        }
        let Some(persona) = self.persona.as_ref() else {
            return Err(ControllerError::InputDisabled);
        };
        self.conversation.push(text);
        let prompt = conversation_prompt(persona, self.conversation.all());
        let ticket = self.issue(Slot::Reply);
        Ok(Request { ticket, prompt })
    }

    /// Feed the gateway's answer for `ticket` back into the session.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, GenerationError>,
    ) -> Resolution {
        let slot = self.slot_mut(ticket.slot);
        if *slot != SlotState::Pending(ticket.id) {
            return Resolution::Stale;
        }
        *slot = SlotState::Idle;

        let text = match outcome {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                return Resolution::Failed {
                    slot: ticket.slot,
                    error,
                };
            }
        };
        match ticket.slot {
            Slot::Description => {
                let Some(persona) = self.persona.as_mut() else {
                    return Resolution::Stale;
                };
                persona.description = text.clone();
                self.described = true;
            }
            Slot::Reply => {
                if self.conversation.next_speaker() != Speaker::Persona {
                    return Resolution::Stale;
                }
                self.conversation.push(text.clone());
            }
        }
        Resolution::Applied {
            slot: ticket.slot,
            text,
        }
    }

    /// Whether the human input control must be inert.
    pub fn input_disabled(&self) -> bool {
        self.persona.is_none()
            || self.pending(Slot::Description)
            || self.pending(Slot::Reply)
            || self.conversation.next_speaker() == Speaker::Persona
    }

    pub fn phase(&self) -> Phase {
        match self.persona {
            None => Phase::NoPersona,
            Some(_) if self.pending(Slot::Description) => Phase::AwaitingDescription,
            // A failed description leaves the session waiting until the
            // human starts talking anyway.
            Some(_) if !self.described && self.conversation.is_empty() => {
                Phase::AwaitingDescription
            }
            Some(_) => Phase::Ready(self.conversation.next_speaker()),
        }
    }

    pub fn pending(&self, slot: Slot) -> bool {
        matches!(self.slot_state(slot), SlotState::Pending(_))
    }

    pub fn slot_state(&self, slot: Slot) -> SlotState {
        match slot {
            Slot::Description => self.description,
            Slot::Reply => self.reply,
        }
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn history(&self) -> &[String] {
        self.conversation.all()
    }

    /// The description prompt and the description it produced so far.
    pub fn description_exchange(&self) -> Option<Exchange> {
        let persona = self.persona.as_ref()?;
        Some(Exchange {
            prompt: description_prompt(persona),
            outcome: persona.description.clone(),
        })
    }

    /// The prompt that preceded the latest turn, paired with that turn.
    pub fn last_exchange(&self) -> Option<Exchange> {
        let persona = self.persona.as_ref()?;
        let history = self.conversation.all();
        let (last, earlier) = history.split_last()?;
        Some(Exchange {
            prompt: conversation_prompt(persona, earlier),
            outcome: last.clone(),
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            persona: self.persona.clone(),
            history: self.conversation.all().to_vec(),
            phase: self.phase(),
            input_disabled: self.input_disabled(),
        }
    }

    fn issue(&mut self, slot: Slot) -> Ticket {
        self.next_ticket += 1;
        let id = self.next_ticket;
        *self.slot_mut(slot) = SlotState::Pending(id);
        Ticket { slot, id }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::Description => &mut self.description,
            Slot::Reply => &mut self.reply,
        }
    }
}
