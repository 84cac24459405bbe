//! Rolling conversation history.

use llm::Message;
use std::collections::VecDeque;

/// Default number of turns kept after the system turn.
pub const DEFAULT_HISTORY_TURNS: usize = 9;

/// Pinned system turn followed by the most recent user and assistant turns.
#[derive(Debug, Clone)]
pub struct ConversationState {
    system: Message,
    turns: VecDeque<Message>,
    max_turns: usize,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            system: Message::system(system_prompt),
            turns: VecDeque::with_capacity(max_turns + 2),
            max_turns,
        }
    }

    pub fn system_turn(&self) -> &Message {
        &self.system
    }

    /// Turns after the system turn, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Message> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Messages for classifying `utterance`: system turn, history, then the
    /// utterance as a human turn.
    pub fn request_messages(&self, utterance: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() + 2);
        messages.push(self.system.clone());
        messages.extend(self.turns.iter().cloned());
        messages.push(Message::human(utterance));
        messages
    }

    /// Append one exchange and drop the oldest turns beyond the bound.
    pub fn record_exchange(&mut self, utterance: &str, reply: &str) {
        self.turns.push_back(Message::human(utterance));
        self.turns.push_back(Message::assistant(reply));
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Forget everything except the system turn.
    pub fn reset(&mut self) {
        self.turns.clear();
    }
}
