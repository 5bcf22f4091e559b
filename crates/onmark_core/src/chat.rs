use crate::progress::Millis;

/// Longest title derived from the opening message, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
    pub last_activity: Millis,
}

impl Conversation {
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}

/// `text` cut to [`TITLE_MAX_CHARS`] characters, with `...` when cut.
pub fn title_from(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    if text.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}

/// Conversations, most recent first, plus the currently selected one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatSession {
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
    next_id: u64,
}

impl ChatSession {
    /// The two example conversations the chat opens with; the first is active.
    pub fn sample() -> Self {
        let mut session = Self::default();
        session.push_sample(
            "Sales Data Analysis",
            1_705_314_600_000,
            "Can you help me analyze the sales data trends from Q1?",
            "I'd be happy to help analyze your Q1 sales data! Based on the uploaded file \"sales_data_q1.csv\", I can see you have 15,420 records with revenue, quantity, and product information. What specific trends would you like me to focus on?",
        );
        session.push_sample(
            "User Behavior Insights",
            1_705_247_100_000,
            "What patterns do you see in the user behavior data?",
            "Looking at your user behavior data with 45,230 session records, I notice several interesting patterns: 1) Peak activity occurs between 2-4 PM, 2) Mobile users have 40% longer session durations, 3) Page bounce rates are lowest on product pages. Would you like me to dive deeper into any of these areas?",
        );
        session.active = session.conversations.first().map(|c| c.id);
        session
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Returns false when no such conversation exists.
    pub fn select(&mut self, id: ConversationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.active = None;
    }

    /// Returns false when no such conversation exists.
    pub fn remove(&mut self, id: ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.conversations.len() != before
    }

    /// Appends `text` as a user message to the active conversation, opening
    /// a new conversation first when none is active.
    pub fn push_user_message(&mut self, text: &str, now: Millis) -> ConversationId {
        let message = Message {
            id: self.alloc_message_id(),
            role: Role::User,
            content: text.to_owned(),
            timestamp: now,
        };
        let target = self.active.filter(|id| self.get(*id).is_some());
        match target {
            Some(id) => {
                self.append(id, message, now);
                id
            }
            None => {
                let id = ConversationId(self.alloc());
                self.conversations.insert(
                    0,
                    Conversation {
                        id,
                        title: title_from(text),
                        messages: vec![message],
                        last_activity: now,
                    },
                );
                self.active = Some(id);
                id
            }
        }
    }

    /// Appends an empty assistant message to be filled by a stream.
    pub fn push_placeholder(&mut self, conversation: ConversationId, now: Millis) -> MessageId {
        let id = self.alloc_message_id();
        self.append(
            conversation,
            Message {
                id,
                role: Role::Assistant,
                content: String::new(),
                timestamp: now,
            },
            now,
        );
        id
    }

    /// Replaces the content of a message. Returns false when the conversation
    /// or message no longer exists.
    pub fn set_content(
        &mut self,
        conversation: ConversationId,
        message: MessageId,
        content: &str,
    ) -> bool {
        let slot = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation)
            .and_then(|c| c.messages.iter_mut().find(|m| m.id == message));
        match slot {
            Some(slot) => {
                content.clone_into(&mut slot.content);
                true
            }
            None => false,
        }
    }

    /// Locates an assistant message anywhere in the session.
    pub fn find_assistant_message(&self, message: MessageId) -> Option<(ConversationId, &Message)> {
        self.conversations.iter().find_map(|c| {
            c.message(message)
                .filter(|m| m.role == Role::Assistant)
                .map(|m| (c.id, m))
        })
    }

    pub fn find_message(&self, message: MessageId) -> Option<&Message> {
        self.conversations.iter().find_map(|c| c.message(message))
    }

    /// Appends a finished user/assistant exchange as its own conversation.
    /// The answer lands one minute after the question.
    fn push_sample(&mut self, title: &str, asked_at: Millis, question: &str, answer: &str) {
        let id = ConversationId(self.alloc());
        let answered_at = asked_at + 60_000;
        let messages = vec![
            Message {
                id: self.alloc_message_id(),
                role: Role::User,
                content: question.to_owned(),
                timestamp: asked_at,
            },
            Message {
                id: self.alloc_message_id(),
                role: Role::Assistant,
                content: answer.to_owned(),
                timestamp: answered_at,
            },
        ];
        self.conversations.push(Conversation {
            id,
            title: title.to_owned(),
            messages,
            last_activity: asked_at,
        });
    }

    fn append(&mut self, conversation: ConversationId, message: Message, now: Millis) {
        if let Some(c) = self.conversations.iter_mut().find(|c| c.id == conversation) {
            c.messages.push(message);
            c.last_activity = now;
        }
    }

    fn alloc_message_id(&mut self) -> MessageId {
        MessageId(self.alloc())
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
