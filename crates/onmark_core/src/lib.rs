//! OnMark core: pure state machine for the upload -> discovery -> chat
//! workspace, plus view-model helpers. Timers and storage are effects.
mod chat;
mod effect;
mod files;
mod msg;
mod progress;
mod seeded;
mod state;
mod stream;
mod update;
mod view_model;

pub use chat::{
    title_from, ChatSession, Conversation, ConversationId, Message, MessageId, Role,
    TITLE_MAX_CHARS,
};
pub use effect::{Effect, NoticeLevel};
pub use files::{
    FileCollection, FileId, FileRecord, PendingUpload, PreviewRecord, PREVIEW_COLUMNS,
    PREVIEW_RECORDS, UPLOAD_COLUMNS,
};
pub use msg::Msg;
pub use progress::{HidePlan, Millis, ProgressSnapshot, ProgressTracker, AUTO_HIDE_MS};
pub use seeded::{seed_from_str, seeded_values, Lcg};
pub use state::{AppState, Timings, SPARKLINE_POINTS, UPLOAD_DELAY_MS};
pub use stream::{
    canned_response, next_step, ActiveStream, StreamId, StreamSimulator, StreamStart, StreamState,
    TickOutcome, MAX_STEP, STREAM_TICK_MS,
};
pub use update::update;
pub use view_model::{
    AppViewModel, ColumnDetailView, ColumnView, ConversationRowView, ConversationView,
    DiscoveryView, FileRowView, MessageView, StepStatus, StepView, StepperView, STEP_LABELS,
};
