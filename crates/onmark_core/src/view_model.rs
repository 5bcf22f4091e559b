use crate::chat::{ConversationId, MessageId, Role};
use crate::files::{FileId, FileRecord};
use crate::progress::{Millis, ProgressTracker};

pub const STEP_LABELS: [&str; 3] = ["Upload", "Discovery", "Chat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub label: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepperView {
    pub visible: bool,
    pub current: usize,
    /// Fill of the progress bar, in percent.
    pub percent: u8,
    pub steps: Vec<StepView>,
}

impl StepperView {
    pub fn from_tracker(tracker: &ProgressTracker) -> Self {
        let current = tracker.current_step();
        let last = STEP_LABELS.len() - 1;
        let percent = (current.min(last) * 100 / last) as u8;
        let steps = STEP_LABELS
            .iter()
            .copied()
            .enumerate()
            .map(|(index, label)| StepView {
                label,
                status: match index.cmp(&current) {
                    std::cmp::Ordering::Less => StepStatus::Complete,
                    std::cmp::Ordering::Equal => StepStatus::Active,
                    std::cmp::Ordering::Greater => StepStatus::Upcoming,
                },
            })
            .collect();
        Self {
            visible: tracker.is_visible(),
            current,
            percent,
            steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub upload_date: String,
    pub row_count: u64,
    pub column_count: usize,
    pub database_link: Option<String>,
}

impl FileRowView {
    pub(crate) fn from_record(file: &FileRecord) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            size: file.size,
            upload_date: file.upload_date.clone(),
            row_count: file.row_count,
            column_count: file.columns.len(),
            database_link: file.database_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub name: String,
    pub related_file: Option<FileId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryView {
    pub file_id: FileId,
    pub name: String,
    pub row_count: u64,
    pub database_link: Option<String>,
    pub columns: Vec<ColumnView>,
    /// Sample records, one `[String; 5]` per row in `PREVIEW_COLUMNS` order.
    pub preview: Vec<[String; 5]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDetailView {
    pub file_id: FileId,
    pub column: String,
    pub values: Vec<f64>,
    /// Id and name of the file this column links to.
    pub related_file: Option<(FileId, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRowView {
    pub id: ConversationId,
    pub title: String,
    pub last_activity: Millis,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: Millis,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub stepper: StepperView,
    pub uploading: bool,
    pub search: String,
    /// Files matching `search`.
    pub files: Vec<FileRowView>,
    pub file_count: usize,
    pub total_rows: u64,
    pub total_bytes: u64,
    pub discovery: Option<DiscoveryView>,
    pub conversations: Vec<ConversationRowView>,
    pub active_conversation: Option<ConversationView>,
    pub input: String,
    pub streaming: bool,
    pub dirty: bool,
}
