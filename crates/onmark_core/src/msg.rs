use crate::chat::{ConversationId, MessageId};
use crate::files::{FileId, PendingUpload};
use crate::progress::{Millis, ProgressSnapshot};
use crate::stream::StreamId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Restore the milestone record loaded from storage at start-up.
    RestoreProgress {
        snapshot: ProgressSnapshot,
        now: Millis,
    },
    /// User picked files to upload.
    UploadRequested(Vec<PendingUpload>),
    /// The simulated processing delay for a batch has elapsed.
    UploadProcessed {
        batch_id: u64,
        uploaded_on: String,
        now: Millis,
    },
    /// User removed a file from the dashboard.
    FileRemoved(FileId),
    /// User edited the dashboard search box.
    SearchChanged(String),
    /// The discovery view for a file was displayed.
    DiscoveryOpened { file_id: FileId, now: Millis },
    DiscoveryClosed,
    /// User asked to start the milestones over.
    ResetProgressClicked,
    /// The auto-hide timer armed with `generation` expired.
    HideTimerElapsed { generation: u64 },
    /// User edited the chat input.
    InputChanged(String),
    /// User sent the current chat input.
    MessageSent { now: Millis },
    NewChatClicked,
    ConversationSelected(ConversationId),
    ConversationDeleted(ConversationId),
    /// User asked for a fresh answer in an assistant message.
    RegenerateClicked(MessageId),
    /// Reveal tick for a stream.
    StreamTick { stream_id: StreamId },
    CopyClicked(MessageId),
    /// Clipboard write result.
    CopyFinished { ok: bool },
}
