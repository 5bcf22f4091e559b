use crate::progress::ProgressSnapshot;
use crate::stream::StreamId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the snapshot to durable storage.
    PersistProgress(ProgressSnapshot),
    /// Drop any armed auto-hide timer.
    CancelHideTimer,
    /// Arm the auto-hide timer; it reports back with `generation`.
    ScheduleHide { generation: u64, delay_ms: u64 },
    /// Simulated processing latency before an upload batch lands.
    ScheduleUpload { batch_id: u64, delay_ms: u64 },
    /// Start the repeating reveal tick for a stream, replacing any other.
    StartStreamTicker { stream_id: StreamId, interval_ms: u64 },
    StopStreamTicker { stream_id: StreamId },
    CopyToClipboard { text: String },
    Notify { level: NoticeLevel, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl Effect {
    pub(crate) fn success(text: impl Into<String>) -> Self {
        Effect::Notify {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Effect::Notify {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
