//! Prompt rendering for persona conversations.
//!
//! Every prompt sent to the completion gateway is produced here. The same
//! text is shown back to the user as the audit trail of what was sent, so
//! the output must stay byte-for-byte reproducible.
//!
//! ```
//! use persona::{Persona, description_prompt};
//! let p = Persona::new("John Dorian", "the main character from Scrubs");
//! assert_eq!(
//!     description_prompt(&p),
//!     "Generate a detailed description of John Dorian, the main character from Scrubs."
//! );
//! ```

use serde::Serialize;

use crate::types::{Persona, Speaker};

/// Common interface for constructing prompts.
pub trait PromptFragment {
    /// Render the full prompt text.
    fn build_prompt(&self) -> String;
}

/// Prompt asking the model to describe a persona.
#[derive(Clone, Copy)]
pub struct DescriptionPrompt<'a> {
    pub persona: &'a Persona,
}

impl PromptFragment for DescriptionPrompt<'_> {
    fn build_prompt(&self) -> String {
        format!(
            "Generate a detailed description of {}, {}.",
            self.persona.name, self.persona.details
        )
    }
}

/// Prompt asking the model to continue a dialogue as the persona.
#[derive(Clone, Copy)]
pub struct ConversationPrompt<'a> {
    pub persona: &'a Persona,
    pub history: &'a [String],
}

impl PromptFragment for ConversationPrompt<'_> {
    fn build_prompt(&self) -> String {
        let name = &self.persona.name;
        let mut lines = Vec::with_capacity(self.history.len() + 4);
        lines.push(format!(
            "You are {name}, {}. {}",
            self.persona.details,
            single_line(&self.persona.description)
        ));
        lines.push("Human: I'm a human.".to_string());
        lines.push(format!("{name}: I'm {name}."));
        for (index, turn) in self.history.iter().enumerate() {
            let turn = single_line(turn);
            lines.push(match Speaker::at(index) {
                Speaker::Human => format!("Human: {turn}"),
                Speaker::Persona => format!("{name}: {turn}"),
            });
        }
        lines.push(format!("{name}: "));
        lines.join("\n")
    }
}

/// Render the description request for `persona`.
pub fn description_prompt(persona: &Persona) -> String {
    DescriptionPrompt { persona }.build_prompt()
}

/// Render the reply request for `persona` given the dialogue so far.
pub fn conversation_prompt(persona: &Persona, history: &[String]) -> String {
    ConversationPrompt { persona, history }.build_prompt()
}

/// A prompt paired with what came back for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub prompt: String,
    pub outcome: String,
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd() -> Persona {
        Persona::new("John Dorian", "the main character from Scrubs")
            .with_description("J.D. is a doctor.\nHe daydreams.")
    }

    #[test]
    fn description_contains_name_and_details() {
        let p = jd();
        let prompt = description_prompt(&p);
        assert!(prompt.contains("John Dorian"));
        assert!(prompt.contains("the main character from Scrubs"));
        assert!(!prompt.contains('\n'));
    }

    #[test]
    fn description_ignores_description_field() {
        let a = Persona::new("A", "b");
        let b = a.clone().with_description("anything");
        assert_eq!(description_prompt(&a), description_prompt(&b));
    }

    #[test]
    fn empty_history_renders_bootstrap_only() {
        let prompt = conversation_prompt(&jd(), &[]);
        assert_eq!(
            prompt,
            "You are John Dorian, the main character from Scrubs. J.D. is a doctor. He daydreams.\n\
             Human: I'm a human.\n\
             John Dorian: I'm John Dorian.\n\
             John Dorian: "
        );
    }

    #[test]
    fn line_count_tracks_history() {
        let p = jd();
        let mut history = Vec::new();
        for i in 0..7 {
            let prompt = conversation_prompt(&p, &history);
            assert_eq!(prompt.split('\n').count(), 4 + history.len());
            history.push(format!("turn {i}"));
        }
    }

    #[test]
    fn turns_are_attributed_by_parity() {
        let history = vec!["Hi!".to_string(), "Hey.".to_string(), "Bye".to_string()];
        let prompt = conversation_prompt(&jd(), &history);
        let lines: Vec<&str> = prompt.split('\n').collect();
        assert_eq!(lines[3], "Human: Hi!");
        assert_eq!(lines[4], "John Dorian: Hey.");
        assert_eq!(lines[5], "Human: Bye");
        assert_eq!(lines[6], "John Dorian: ");
    }

    #[test]
    fn multiline_turns_stay_on_one_line() {
        let history = vec!["one\r\ntwo\nthree".to_string()];
        let prompt = conversation_prompt(&jd(), &history);
        assert_eq!(prompt.split('\n').count(), 5);
        assert!(prompt.contains("Human: one two three"));
    }

    #[test]
    fn rendering_is_repeatable() {
        let p = jd();
        let history = vec!["Hi!".to_string()];
        assert_eq!(
            conversation_prompt(&p, &history),
            conversation_prompt(&p, &history)
        );
        assert_eq!(description_prompt(&p), description_prompt(&p));
    }
}
