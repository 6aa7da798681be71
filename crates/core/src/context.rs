//! Conversation context — bounded rolling history plus the persona.
//!
//! The context is owned by a single assistant session and mutated through
//! `&mut self`; it carries no lock. Appends evict the oldest turns first once
//! `max_turns` is exceeded. The persona is never stored in the history: it is
//! synthesised as the leading system message by [`ConversationContext::messages`].

use std::collections::VecDeque;

use crate::message::Message;

#[derive(Debug, Clone)]
pub struct ConversationContext {
    system_prompt: String,
    max_turns: usize,
    history: VecDeque<Message>,
}

impl ConversationContext {
    /// Create an empty context. A `max_turns` of zero is clamped to one.
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            system_prompt: system_prompt.into(),
            max_turns,
            history: VecDeque::with_capacity(max_turns),
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.append(Message::user(content));
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.append(Message::assistant(content));
    }

    fn append(&mut self, message: Message) {
        self.history.push_back(message);
        while self.history.len() > self.max_turns {
            self.history.pop_front();
        }
    }

    /// The exact sequence handed to a model backend: the persona as a system
    /// message, followed by the retained history in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        std::iter::once(Message::system(self.system_prompt.clone()))
            .chain(self.history.iter().cloned())
            .collect()
    }

    /// Drop all turns. Persona and bound are kept.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> impl Iterator<Item = &Message> {
        self.history.iter()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.back()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}
