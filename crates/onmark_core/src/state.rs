use crate::chat::ChatSession;
use crate::files::{
    FileCollection, FileId, FileRecord, PendingUpload, PreviewRecord, PREVIEW_RECORDS,
};
use crate::progress::{Millis, ProgressTracker, AUTO_HIDE_MS};
use crate::seeded::{seeded_values, Lcg};
use crate::stream::{StreamSimulator, STREAM_TICK_MS};
use crate::view_model::{
    AppViewModel, ColumnDetailView, ColumnView, ConversationRowView, ConversationView,
    DiscoveryView, FileRowView, MessageView, StepperView,
};

/// Default simulated upload processing time.
pub const UPLOAD_DELAY_MS: u64 = 2_000;
/// Sparkline length in the column detail view.
pub const SPARKLINE_POINTS: usize = 24;

/// Timer durations used by `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub hide_after_ms: Millis,
    pub stream_tick_ms: u64,
    pub upload_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            hide_after_ms: AUTO_HIDE_MS,
            stream_tick_ms: STREAM_TICK_MS,
            upload_delay_ms: UPLOAD_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingBatch {
    pub(crate) id: u64,
    pub(crate) files: Vec<PendingUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) progress: ProgressTracker,
    pub(crate) files: FileCollection,
    pub(crate) chat: ChatSession,
    pub(crate) stream: StreamSimulator,
    pub(crate) input: String,
    pub(crate) search: String,
    pub(crate) selected_file: Option<FileId>,
    pub(crate) pending_upload: Option<PendingBatch>,
    pub(crate) next_batch: u64,
    pub(crate) rng: Lcg,
    pub(crate) timings: Timings,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: FileCollection) -> Self {
        self.files = files;
        self
    }

    pub fn with_chat(mut self, chat: ChatSession) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng = Lcg::new(seed);
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self.progress = ProgressTracker::with_hide_after(timings.hide_after_ms);
        self
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn stream(&self) -> &StreamSimulator {
        &self.stream
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn is_uploading(&self) -> bool {
        self.pending_upload.is_some()
    }

    /// A response is being revealed; sending is blocked meanwhile.
    pub fn is_loading(&self) -> bool {
        self.stream.is_streaming()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            stepper: StepperView::from_tracker(&self.progress),
            uploading: self.is_uploading(),
            search: self.search.clone(),
            files: self
                .files
                .search(&self.search)
                .map(FileRowView::from_record)
                .collect(),
            file_count: self.files.len(),
            total_rows: self.files.total_rows(),
            total_bytes: self.files.total_bytes(),
            discovery: self
                .selected_file
                .as_ref()
                .and_then(|id| self.files.get(id))
                .map(|file| self.discovery_view(file)),
            conversations: self
                .chat
                .conversations()
                .iter()
                .map(|c| ConversationRowView {
                    id: c.id,
                    title: c.title.clone(),
                    last_activity: c.last_activity,
                    active: self.chat.active_id() == Some(c.id),
                })
                .collect(),
            active_conversation: self.chat.active().map(|c| ConversationView {
                id: c.id,
                title: c.title.clone(),
                messages: c
                    .messages
                    .iter()
                    .map(|m| MessageView {
                        id: m.id,
                        role: m.role,
                        content: m.content.clone(),
                        timestamp: m.timestamp,
                        streaming: self
                            .stream
                            .active()
                            .is_some_and(|s| s.message_id == m.id),
                    })
                    .collect(),
            }),
            input: self.input.clone(),
            streaming: self.stream.is_streaming(),
            dirty: self.dirty,
        }
    }

    /// Sparkline placeholder for one column of a file.
    pub fn column_detail(&self, file_id: &FileId, column: &str) -> Option<ColumnDetailView> {
        let file = self.files.get(file_id)?;
        if !file.columns.iter().any(|c| c == column) {
            return None;
        }
        Some(ColumnDetailView {
            file_id: file.id.clone(),
            column: column.to_owned(),
            values: seeded_values(&format!("{column}{}", file.id), SPARKLINE_POINTS),
            related_file: file
                .related_file(column)
                .and_then(|id| self.files.get(id))
                .map(|related| (related.id.clone(), related.name.clone())),
        })
    }

    /// Returns whether the state changed since the last call, then clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_upload(&mut self, files: Vec<PendingUpload>) -> u64 {
        self.next_batch += 1;
        self.pending_upload = Some(PendingBatch {
            id: self.next_batch,
            files,
        });
        self.next_batch
    }

    /// Turns the pending batch into records. `None` for an unknown batch.
    pub(crate) fn finish_upload(
        &mut self,
        batch_id: u64,
        uploaded_on: &str,
        now: Millis,
    ) -> Option<usize> {
        if self.pending_upload.as_ref().map(|batch| batch.id) != Some(batch_id) {
            return None;
        }
        let batch = self.pending_upload.take()?;
        let records: Vec<FileRecord> = batch
            .files
            .iter()
            .enumerate()
            .map(|(index, pending)| {
                FileRecord::from_upload(
                    FileId(format!("{now}-{index}")),
                    pending,
                    uploaded_on,
                    &mut self.rng,
                )
            })
            .collect();
        let count = records.len();
        self.files.add(records);
        Some(count)
    }

    fn discovery_view(&self, file: &FileRecord) -> DiscoveryView {
        DiscoveryView {
            file_id: file.id.clone(),
            name: file.name.clone(),
            row_count: file.row_count,
            database_link: file.database_link.clone(),
            columns: file
                .columns
                .iter()
                .map(|name| ColumnView {
                    name: name.clone(),
                    related_file: file.related_file(name).cloned(),
                })
                .collect(),
            preview: PREVIEW_RECORDS.iter().map(PreviewRecord::cells).collect(),
        }
    }
}
