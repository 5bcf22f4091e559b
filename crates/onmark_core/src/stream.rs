//! Simulated token streaming: reveals a precomputed response a few
//! characters per tick into a message slot.

use crate::chat::{ConversationId, MessageId};
use crate::seeded::Lcg;

/// Default reveal tick.
pub const STREAM_TICK_MS: u64 = 60;
/// Largest number of characters revealed per tick.
pub const MAX_STEP: u32 = 6;

pub type StreamId = u64;

const RESPONSES: [&str; 5] = [
    "Based on your data files, I can see some interesting patterns. Let me analyze the specific metrics you're interested in.",
    "That's a great question! Looking at your uploaded datasets, I notice several trends that might be relevant to your query.",
    "I can help you with that analysis. Your data shows some compelling insights that I'd be happy to break down for you.",
    "Excellent question! From the data you've uploaded, I can provide detailed insights about the patterns and trends you're asking about.",
    "Let me analyze that for you using your uploaded files. I see some key metrics that directly relate to your question.",
];

/// Picks a canned response. The prompt plays no part in the choice.
pub fn canned_response(rng: &mut Lcg) -> &'static str {
    RESPONSES[rng.next_index(RESPONSES.len())]
}

/// Characters revealed on the next tick, uniform in `1..=MAX_STEP`.
pub fn next_step(rng: &mut Lcg) -> usize {
    rng.next_in_range(1, MAX_STEP) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStream {
    pub id: StreamId,
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    full_text: String,
    /// Revealed length in characters.
    cursor: usize,
    total: usize,
}

impl ActiveStream {
    pub fn total(&self) -> usize {
        self.total
    }

    fn prefix(&self) -> &str {
        match self.full_text.char_indices().nth(self.cursor) {
            Some((byte_idx, _)) => &self.full_text[..byte_idx],
            None => &self.full_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Streaming(ActiveStream),
}

/// Result of starting a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStart {
    pub started: StreamId,
    /// The stream that was running before, if any; its ticker must stop.
    pub cancelled: Option<StreamId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a cancelled or finished stream.
    Stale,
    Progress {
        conversation_id: ConversationId,
        message_id: MessageId,
        content: String,
        finished: bool,
    },
}

/// Holds at most one active stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamSimulator {
    state: StreamState,
    next_id: StreamId,
}

impl StreamSimulator {
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, StreamState::Streaming(_))
    }

    pub fn active(&self) -> Option<&ActiveStream> {
        match &self.state {
            StreamState::Streaming(active) => Some(active),
            StreamState::Idle => None,
        }
    }

    /// Cancels whatever is running, then starts revealing `full_text`.
    pub fn start(
        &mut self,
        conversation_id: ConversationId,
        message_id: MessageId,
        full_text: impl Into<String>,
    ) -> StreamStart {
        let cancelled = self.cancel();
        self.next_id += 1;
        let full_text = full_text.into();
        let total = full_text.chars().count();
        self.state = StreamState::Streaming(ActiveStream {
            id: self.next_id,
            conversation_id,
            message_id,
            full_text,
            cursor: 0,
            total,
        });
        StreamStart {
            started: self.next_id,
            cancelled,
        }
    }

    /// Returns the id of the stream that was cancelled.
    pub fn cancel(&mut self) -> Option<StreamId> {
        match std::mem::take(&mut self.state) {
            StreamState::Streaming(active) => Some(active.id),
            StreamState::Idle => None,
        }
    }

    /// Moves the cursor of stream `id` forward by `step` characters.
    pub fn advance(&mut self, id: StreamId, step: usize) -> TickOutcome {
        let StreamState::Streaming(active) = &mut self.state else {
            return TickOutcome::Stale;
        };
        if active.id != id {
            return TickOutcome::Stale;
        }

        active.cursor = (active.cursor + step.max(1)).min(active.total);
        let finished = active.cursor >= active.total;
        let outcome = TickOutcome::Progress {
            conversation_id: active.conversation_id,
            message_id: active.message_id,
            content: active.prefix().to_owned(),
            finished,
        };
        if finished {
            self.state = StreamState::Idle;
        }
        outcome
    }
}
