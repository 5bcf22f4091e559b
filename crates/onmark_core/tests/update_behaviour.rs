use std::sync::Once;

use onmark_core::{
    update, AppState, Effect, FileCollection, FileId, Msg, NoticeLevel, PendingUpload,
    ProgressSnapshot, StepStatus, PREVIEW_RECORDS, UPLOAD_COLUMNS,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(onmark_logging::initialize_for_tests);
}

fn pending(name: &str) -> PendingUpload {
    PendingUpload {
        name: name.to_string(),
        size: 1_024,
    }
}

fn upload(state: AppState, names: &[&str], now: i64) -> (AppState, Vec<Effect>) {
    let files = names.iter().map(|name| pending(name)).collect();
    let (state, effects) = update(state, Msg::UploadRequested(files));
    let batch_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ScheduleUpload { batch_id, .. } => Some(*batch_id),
            _ => None,
        })
        .expect("schedule upload effect");
    update(
        state,
        Msg::UploadProcessed {
            batch_id,
            uploaded_on: "2024-02-01".to_string(),
            now,
        },
    )
}

fn send(state: AppState, text: &str, now: i64) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(text.to_string()));
    update(state, Msg::MessageSent { now })
}

fn complete(now: i64) -> AppState {
    let (state, _) = upload(AppState::new(), &["metrics.csv"], now);
    let (state, _) = update(
        state,
        Msg::DiscoveryOpened {
            file_id: FileId::from(format!("{now}-0").as_str()),
            now,
        },
    );
    let (state, _) = send(state, "hello", now);
    state
}

#[test]
fn upload_waits_for_processing_delay() {
    init_logging();
    let (mut state, effects) = update(
        AppState::new(),
        Msg::UploadRequested(vec![pending("a.csv"), pending("b.json")]),
    );

    assert_eq!(
        effects,
        vec![Effect::ScheduleUpload {
            batch_id: 1,
            delay_ms: 2_000
        }]
    );
    assert!(state.is_uploading());
    assert!(state.files().is_empty());
    assert!(state.consume_dirty());

    let (state, effects) = update(state, Msg::UploadRequested(vec![pending("c.csv")]));
    assert!(effects.is_empty(), "second batch is refused while processing");

    let (state, effects) = update(
        state,
        Msg::UploadProcessed {
            batch_id: 1,
            uploaded_on: "2024-02-01".to_string(),
            now: 500,
        },
    );
    assert!(!state.is_uploading());
    assert_eq!(state.files().len(), 2);
    let first = state.files().get(&FileId::from("500-0")).expect("first file");
    assert_eq!(first.name, "a.csv");
    assert_eq!(first.upload_date, "2024-02-01");
    assert_eq!(first.columns, UPLOAD_COLUMNS.map(String::from).to_vec());
    assert!((1_000..51_000).contains(&first.row_count));
    assert_eq!(
        effects,
        vec![
            Effect::Notify {
                level: NoticeLevel::Success,
                text: "Successfully uploaded 2 file(s)".to_string(),
            },
            Effect::PersistProgress(ProgressSnapshot {
                upload_confirmed: true,
                ..ProgressSnapshot::default()
            }),
            Effect::CancelHideTimer,
        ]
    );
}

#[test]
fn empty_upload_is_ignored() {
    let (state, effects) = update(AppState::new(), Msg::UploadRequested(Vec::new()));
    assert!(effects.is_empty());
    assert!(!state.is_uploading());
}

#[test]
fn unknown_batch_is_ignored() {
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadProcessed {
            batch_id: 7,
            uploaded_on: "2024-02-01".to_string(),
            now: 1,
        },
    );
    assert!(effects.is_empty());
    assert!(state.files().is_empty());
}

#[test]
fn second_upload_does_not_persist_again() {
    let (state, _) = upload(AppState::new(), &["a.csv"], 1);
    let (state, effects) = upload(state, &["b.csv"], 2);
    assert_eq!(state.files().len(), 2);
    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::PersistProgress(_))));
}

#[test]
fn discovery_requires_an_existing_file() {
    let (state, _) = upload(AppState::new(), &["a.csv"], 1);
    let (state, effects) = update(
        state,
        Msg::DiscoveryOpened {
            file_id: FileId::from("nope"),
            now: 2,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.progress().discovery_confirmed());
    assert!(state.view().discovery.is_none());
}

#[test]
fn discovery_before_upload_only_selects_the_file() {
    let state = AppState::new().with_files(FileCollection::sample());
    let (state, effects) = update(
        state,
        Msg::DiscoveryOpened {
            file_id: FileId::from("1"),
            now: 2,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.progress().discovery_confirmed());
    let discovery = state.view().discovery.expect("discovery view");
    assert_eq!(discovery.name, "sales_data_q1.csv");
    assert_eq!(discovery.columns[1].related_file, Some(FileId::from("4")));
}

#[test]
fn discovery_shows_the_sample_record_preview() {
    let state = AppState::new().with_files(FileCollection::sample());
    let (state, _) = update(
        state,
        Msg::DiscoveryOpened {
            file_id: FileId::from("2"),
            now: 2,
        },
    );

    let discovery = state.view().discovery.expect("discovery view");
    assert_eq!(discovery.preview.len(), PREVIEW_RECORDS.len());
    assert_eq!(
        discovery.preview[0],
        [
            "1".to_string(),
            "2024-01-15 10:30:00".to_string(),
            "$1250.75".to_string(),
            "Sales".to_string(),
            "Complete".to_string(),
        ]
    );
    assert_eq!(discovery.preview[5][2], "$445.20");
    assert_eq!(discovery.preview[7][4], "Processing");
}

#[test]
fn full_flow_arms_the_hide_timer() {
    init_logging();
    let now = 1_000;
    let (state, _) = upload(AppState::new(), &["metrics.csv"], now);
    let (state, effects) = update(
        state,
        Msg::DiscoveryOpened {
            file_id: FileId::from("1000-0"),
            now,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::PersistProgress(ProgressSnapshot {
                upload_confirmed: true,
                discovery_confirmed: true,
                ..ProgressSnapshot::default()
            }),
            Effect::CancelHideTimer,
        ]
    );

    let (state, effects) = send(state, "What changed last week?", now + 5);
    let generation = state.progress().hide_generation();
    assert_eq!(
        effects[..3],
        [
            Effect::PersistProgress(ProgressSnapshot {
                upload_confirmed: true,
                discovery_confirmed: true,
                chat_confirmed: true,
                completed_at: Some(now + 5),
            }),
            Effect::CancelHideTimer,
            Effect::ScheduleHide {
                generation,
                delay_ms: 10_000,
            },
        ]
    );
    let view = state.view();
    assert!(view.stepper.visible);
    assert_eq!(view.stepper.percent, 100);
    assert!(view
        .stepper
        .steps
        .iter()
        .all(|step| step.status == StepStatus::Complete));

    let (state, _) = update(state, Msg::HideTimerElapsed { generation });
    assert!(!state.view().stepper.visible);
}

#[test]
fn stale_hide_timer_does_not_hide() {
    let state = complete(0);
    let generation = state.progress().hide_generation();
    let (state, _) = update(
        state,
        Msg::HideTimerElapsed {
            generation: generation - 1,
        },
    );
    assert!(state.progress().is_visible());
}

#[test]
fn removing_last_file_resets_progress() {
    init_logging();
    let state = complete(10);
    assert!(state.progress().is_complete());

    let (state, effects) = update(state, Msg::FileRemoved(FileId::from("10-0")));
    assert!(state.files().is_empty());
    assert_eq!(state.progress().snapshot(), ProgressSnapshot::default());
    assert!(state.progress().is_visible());
    assert_eq!(
        effects,
        vec![
            Effect::Notify {
                level: NoticeLevel::Success,
                text: "File removed successfully".to_string(),
            },
            Effect::PersistProgress(ProgressSnapshot::default()),
            Effect::CancelHideTimer,
        ]
    );
}

#[test]
fn removing_one_of_many_keeps_progress() {
    let (state, _) = upload(AppState::new(), &["a.csv", "b.csv"], 3);
    let (state, effects) = update(state, Msg::FileRemoved(FileId::from("3-1")));
    assert_eq!(effects.len(), 1);
    assert!(state.progress().upload_confirmed());
}

#[test]
fn reset_clicked_clears_and_persists() {
    let state = complete(0);
    let (state, effects) = update(state, Msg::ResetProgressClicked);
    assert_eq!(state.progress().snapshot(), ProgressSnapshot::default());
    assert_eq!(
        effects,
        vec![
            Effect::PersistProgress(ProgressSnapshot::default()),
            Effect::CancelHideTimer,
        ]
    );
}

#[test]
fn restore_progress_rearms_remaining_time() {
    let state = AppState::new().with_files(FileCollection::sample());
    let (state, effects) = update(
        state,
        Msg::RestoreProgress {
            snapshot: ProgressSnapshot {
                upload_confirmed: true,
                discovery_confirmed: true,
                chat_confirmed: true,
                completed_at: Some(1_000),
            },
            now: 4_000,
        },
    );
    assert!(state.progress().is_complete());
    assert!(matches!(
        effects.last(),
        Some(Effect::ScheduleHide { delay_ms: 7_000, .. })
    ));
}

#[test]
fn restore_progress_without_files_persists_defaults() {
    let (state, effects) = update(
        AppState::new(),
        Msg::RestoreProgress {
            snapshot: ProgressSnapshot {
                upload_confirmed: true,
                ..ProgressSnapshot::default()
            },
            now: 1,
        },
    );
    assert!(!state.progress().upload_confirmed());
    assert_eq!(
        effects,
        vec![
            Effect::PersistProgress(ProgressSnapshot::default()),
            Effect::CancelHideTimer,
        ]
    );
}

#[test]
fn search_filters_dashboard_rows() {
    let state = AppState::new().with_files(FileCollection::sample());
    let (state, _) = update(state, Msg::SearchChanged("CSV".to_string()));
    let view = state.view();
    let names: Vec<_> = view.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["sales_data_q1.csv", "products_catalog.csv"]);
    assert_eq!(view.file_count, 5);
    assert_eq!(view.total_rows, 15_420 + 45_230 + 2_340 + 8_750 + 12_540);
}

#[test]
fn column_detail_is_deterministic_and_links_related_file() {
    let state = AppState::new().with_files(FileCollection::sample());
    let first = state
        .column_detail(&FileId::from("1"), "product_id")
        .expect("column exists");
    let second = state
        .column_detail(&FileId::from("1"), "product_id")
        .expect("column exists");

    assert_eq!(first, second);
    assert_eq!(first.values.len(), 24);
    assert_eq!(
        first.related_file,
        Some((FileId::from("4"), "products_catalog.csv".to_string()))
    );
    assert!(state.column_detail(&FileId::from("1"), "missing").is_none());
}

#[test]
fn copy_round_trip_notifies() {
    let (state, _) = send(AppState::new(), "hi", 1);
    let message_id = state.chat().active().expect("conversation").messages[0].id;

    let (state, effects) = update(state, Msg::CopyClicked(message_id));
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            text: "hi".to_string()
        }]
    );

    let (state, effects) = update(state, Msg::CopyFinished { ok: false });
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Error,
            text: "Copy failed".to_string(),
        }]
    );
    let (_, effects) = update(state, Msg::CopyFinished { ok: true });
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Success,
            text: "Copied to clipboard".to_string(),
        }]
    );
}
