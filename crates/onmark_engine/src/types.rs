use std::io;

use thiserror::Error;

pub type StreamId = u64;

/// Timer expiries reported back to the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    HideElapsed { generation: u64 },
    UploadReady { batch_id: u64 },
    StreamTick { stream_id: StreamId },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start timer runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("timer worker thread panicked")]
    WorkerPanicked,
}
