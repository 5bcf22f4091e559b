use std::time::Duration;

use onmark_core::{Effect, Msg, NoticeLevel};
use onmark_engine::{EngineError, KeyValueStore, TimerEvent, TimerService};
use onmark_logging::{onmark_debug, onmark_info, onmark_warn};

use super::clipboard::FileClipboard;
use super::persistence::save_progress;

/// A user-facing notice raised while running effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) level: NoticeLevel,
    pub(crate) text: String,
}

/// What running a batch of effects produced for the loop.
#[derive(Debug, Default)]
pub(crate) struct EffectOutcome {
    /// Messages to feed back into `update`.
    pub(crate) follow_ups: Vec<Msg>,
    pub(crate) notices: Vec<Notice>,
}

pub(crate) struct EffectRunner {
    timers: TimerService,
    store: Box<dyn KeyValueStore>,
    clipboard: FileClipboard,
}

impl EffectRunner {
    pub(crate) fn new(
        timers: TimerService,
        store: Box<dyn KeyValueStore>,
        clipboard: FileClipboard,
    ) -> Self {
        Self {
            timers,
            store,
            clipboard,
        }
    }

    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) -> EffectOutcome {
        let mut outcome = EffectOutcome::default();
        for effect in effects {
            match effect {
                Effect::PersistProgress(snapshot) => {
                    onmark_debug!("PersistProgress {:?}", snapshot);
                    save_progress(self.store(), snapshot);
                }
                Effect::CancelHideTimer => self.timers.cancel_hide(),
                Effect::ScheduleHide {
                    generation,
                    delay_ms,
                } => {
                    self.timers
                        .schedule_hide(generation, Duration::from_millis(delay_ms));
                }
                Effect::ScheduleUpload { batch_id, delay_ms } => {
                    onmark_info!("Upload batch {} ready in {} ms", batch_id, delay_ms);
                    self.timers
                        .schedule_upload(batch_id, Duration::from_millis(delay_ms));
                }
                Effect::StartStreamTicker {
                    stream_id,
                    interval_ms,
                } => {
                    onmark_debug!("Stream {} started", stream_id);
                    self.timers
                        .start_ticker(stream_id, Duration::from_millis(interval_ms));
                }
                Effect::StopStreamTicker { stream_id } => {
                    onmark_debug!("Stream {} stopped", stream_id);
                    self.timers.stop_ticker(stream_id);
                }
                Effect::CopyToClipboard { text } => {
                    let ok = match self.clipboard.write_text(&text) {
                        Ok(path) => {
                            onmark_debug!("Copied {} chars to {:?}", text.chars().count(), path);
                            true
                        }
                        Err(err) => {
                            onmark_warn!("Clipboard write failed: {}", err);
                            false
                        }
                    };
                    outcome.follow_ups.push(Msg::CopyFinished { ok });
                }
                Effect::Notify { level, text } => {
                    match level {
                        NoticeLevel::Success => onmark_info!("Notice: {}", text),
                        NoticeLevel::Error => onmark_warn!("Notice: {}", text),
                    }
                    outcome.notices.push(Notice { level, text });
                }
            }
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) fn recv_timer(&self, timeout: Duration) -> Option<TimerEvent> {
        self.timers.recv_timeout(timeout)
    }

    pub(crate) fn try_recv_timer(&self) -> Option<TimerEvent> {
        self.timers.try_recv()
    }

    pub(crate) fn shutdown(&mut self) -> Result<(), EngineError> {
        self.timers.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use onmark_core::ProgressSnapshot;
    use onmark_engine::MemoryStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::platform::persistence::load_progress;

    fn runner(dir: &std::path::Path) -> EffectRunner {
        EffectRunner::new(
            TimerService::new().unwrap(),
            Box::new(MemoryStore::new()),
            FileClipboard::new(dir),
        )
    }

    #[test]
    fn persist_effect_reaches_the_store() {
        let temp = TempDir::new().unwrap();
        let runner = runner(temp.path());
        let snapshot = ProgressSnapshot {
            upload_confirmed: true,
            ..ProgressSnapshot::default()
        };

        runner.run(vec![Effect::PersistProgress(snapshot)]);
        assert_eq!(load_progress(runner.store()), snapshot);
    }

    #[test]
    fn copy_reports_success_and_writes_text() {
        let temp = TempDir::new().unwrap();
        let runner = runner(temp.path());

        let outcome = runner.run(vec![Effect::CopyToClipboard {
            text: "hello".to_string(),
        }]);

        assert_eq!(outcome.follow_ups, vec![Msg::CopyFinished { ok: true }]);
        assert_eq!(
            fs::read_to_string(temp.path().join("clipboard.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn copy_failure_reports_not_ok() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let runner = runner(&blocker);

        let outcome = runner.run(vec![Effect::CopyToClipboard {
            text: "hello".to_string(),
        }]);
        assert_eq!(outcome.follow_ups, vec![Msg::CopyFinished { ok: false }]);
    }

    #[test]
    fn notices_are_collected_in_order() {
        let temp = TempDir::new().unwrap();
        let runner = runner(temp.path());

        let outcome = runner.run(vec![
            Effect::Notify {
                level: NoticeLevel::Success,
                text: "one".to_string(),
            },
            Effect::Notify {
                level: NoticeLevel::Error,
                text: "two".to_string(),
            },
        ]);

        let texts: Vec<_> = outcome.notices.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(outcome.notices[1].level, NoticeLevel::Error);
    }

    #[test]
    fn scheduled_hide_comes_back_as_timer_event() {
        let temp = TempDir::new().unwrap();
        let runner = runner(temp.path());

        runner.run(vec![Effect::ScheduleHide {
            generation: 4,
            delay_ms: 5,
        }]);
        assert_eq!(
            runner.recv_timer(Duration::from_secs(2)),
            Some(TimerEvent::HideElapsed { generation: 4 })
        );
    }
}
