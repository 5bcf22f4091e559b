use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use onmark_logging::{onmark_debug, onmark_trace, onmark_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineError, StreamId, TimerEvent};

enum TimerCommand {
    ScheduleHide { generation: u64, delay: Duration },
    CancelHide,
    ScheduleUpload { batch_id: u64, delay: Duration },
    StartTicker { stream_id: StreamId, interval: Duration },
    StopTicker { stream_id: StreamId },
}

/// Runs the application's timers on a dedicated tokio runtime.
///
/// Each timer kind has a single slot: scheduling a new timer aborts the one
/// already in the slot. Expiries arrive through [`Self::try_recv`]. An
/// expiry that was sent before its timer got replaced is still delivered,
/// so receivers must check generation or stream ids.
pub struct TimerService {
    cmd_tx: async_mpsc::UnboundedSender<TimerCommand>,
    event_rx: mpsc::Receiver<TimerEvent>,
    shutdown: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl TimerService {
    pub fn new() -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("onmark-timers")
            .enable_time()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        let worker = thread::Builder::new()
            .name("onmark-timer-driver".to_string())
            .spawn(move || runtime.block_on(run(cmd_rx, event_tx, token)))?;

        Ok(Self {
            cmd_tx,
            event_rx,
            shutdown,
            worker: Some(worker),
        })
    }

    pub fn schedule_hide(&self, generation: u64, delay: Duration) {
        self.send(TimerCommand::ScheduleHide { generation, delay });
    }

    pub fn cancel_hide(&self) {
        self.send(TimerCommand::CancelHide);
    }

    pub fn schedule_upload(&self, batch_id: u64, delay: Duration) {
        self.send(TimerCommand::ScheduleUpload { batch_id, delay });
    }

    /// Starts a repeating tick for `stream_id`, replacing any running ticker.
    pub fn start_ticker(&self, stream_id: StreamId, interval: Duration) {
        self.send(TimerCommand::StartTicker {
            stream_id,
            interval: interval.max(Duration::from_millis(1)),
        });
    }

    /// Stops the ticker only if it still belongs to `stream_id`.
    pub fn stop_ticker(&self, stream_id: StreamId) {
        self.send(TimerCommand::StopTicker { stream_id });
    }

    pub fn try_recv(&self) -> Option<TimerEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<TimerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Aborts every timer and waits for the runtime thread to exit.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.shutdown.cancel();
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| EngineError::WorkerPanicked),
            None => Ok(()),
        }
    }

    fn send(&self, command: TimerCommand) {
        if self.cmd_tx.send(command).is_err() {
            onmark_warn!("Timer command dropped; timer worker has stopped");
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn run(
    mut cmd_rx: async_mpsc::UnboundedReceiver<TimerCommand>,
    event_tx: mpsc::Sender<TimerEvent>,
    shutdown: CancellationToken,
) {
    let mut slots = TimerSlots::default();
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            command = cmd_rx.recv() => match command {
                Some(command) => slots.apply(command, &event_tx),
                None => break,
            },
        }
    }
    slots.abort_all();
    onmark_debug!("Timer worker stopped");
}

#[derive(Default)]
struct TimerSlots {
    hide: Option<JoinHandle<()>>,
    upload: Option<JoinHandle<()>>,
    ticker: Option<(StreamId, JoinHandle<()>)>,
}

impl TimerSlots {
    fn apply(&mut self, command: TimerCommand, event_tx: &mpsc::Sender<TimerEvent>) {
        match command {
            TimerCommand::ScheduleHide { generation, delay } => {
                abort(self.hide.take());
                onmark_trace!("Hide timer gen={} in {:?}", generation, delay);
                self.hide = Some(spawn_once(
                    delay,
                    TimerEvent::HideElapsed { generation },
                    event_tx.clone(),
                ));
            }
            TimerCommand::CancelHide => abort(self.hide.take()),
            TimerCommand::ScheduleUpload { batch_id, delay } => {
                abort(self.upload.take());
                self.upload = Some(spawn_once(
                    delay,
                    TimerEvent::UploadReady { batch_id },
                    event_tx.clone(),
                ));
            }
            TimerCommand::StartTicker {
                stream_id,
                interval,
            } => {
                if let Some((previous, handle)) = self.ticker.take() {
                    onmark_debug!("Ticker {} replaced by {}", previous, stream_id);
                    handle.abort();
                }
                let handle = spawn_ticker(stream_id, interval, event_tx.clone());
                self.ticker = Some((stream_id, handle));
            }
            TimerCommand::StopTicker { stream_id } => {
                if self.ticker.as_ref().is_some_and(|(id, _)| *id == stream_id) {
                    abort(self.ticker.take().map(|(_, handle)| handle));
                }
            }
        }
    }

    fn abort_all(&mut self) {
        abort(self.hide.take());
        abort(self.upload.take());
        abort(self.ticker.take().map(|(_, handle)| handle));
    }
}

fn abort(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

fn spawn_once(
    delay: Duration,
    event: TimerEvent,
    event_tx: mpsc::Sender<TimerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        time::sleep(delay).await;
        let _ = event_tx.send(event);
    })
}

fn spawn_ticker(
    stream_id: StreamId,
    interval: Duration,
    event_tx: mpsc::Sender<TimerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if event_tx.send(TimerEvent::StreamTick { stream_id }).is_err() {
                break;
            }
        }
    })
}
