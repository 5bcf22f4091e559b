use crate::progress::{HidePlan, Millis};
use crate::stream::{canned_response, next_step, StreamStart, TickOutcome};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RestoreProgress { snapshot, now } => {
            let has_files = !state.files.is_empty();
            state.progress.restore(snapshot, has_files, now);
            state.mark_dirty();
            progress_changed(&mut state, now)
        }
        Msg::UploadRequested(files) => {
            if files.is_empty() || state.is_uploading() {
                return (state, Vec::new());
            }
            let batch_id = state.begin_upload(files);
            state.mark_dirty();
            vec![Effect::ScheduleUpload {
                batch_id,
                delay_ms: state.timings.upload_delay_ms,
            }]
        }
        Msg::UploadProcessed {
            batch_id,
            uploaded_on,
            now,
        } => {
            let Some(count) = state.finish_upload(batch_id, &uploaded_on, now) else {
                return (state, Vec::new());
            };
            state.mark_dirty();
            let mut effects = vec![Effect::success(format!(
                "Successfully uploaded {count} file(s)"
            ))];
            if state.progress.confirm_upload() {
                effects.extend(progress_changed(&mut state, now));
            }
            effects
        }
        Msg::FileRemoved(file_id) => {
            if !state.files.remove(&file_id) {
                return (state, Vec::new());
            }
            if state.selected_file.as_ref() == Some(&file_id) {
                state.selected_file = None;
            }
            state.mark_dirty();
            let mut effects = vec![Effect::success("File removed successfully")];
            if state.files.is_empty() && state.progress.files_emptied() {
                effects.extend(progress_reset(&state));
            }
            effects
        }
        Msg::SearchChanged(term) => {
            state.search = term;
            state.mark_dirty();
            Vec::new()
        }
        Msg::DiscoveryOpened { file_id, now } => {
            if state.files.get(&file_id).is_none() {
                return (state, Vec::new());
            }
            state.selected_file = Some(file_id);
            state.mark_dirty();
            if state.progress.confirm_discovery(now) {
                progress_changed(&mut state, now)
            } else {
                Vec::new()
            }
        }
        Msg::DiscoveryClosed => {
            if state.selected_file.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResetProgressClicked => {
            state.progress.reset();
            state.mark_dirty();
            progress_reset(&state)
        }
        Msg::HideTimerElapsed { generation } => {
            if state.progress.hide_elapsed(generation) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::InputChanged(text) => {
            state.input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::MessageSent { now } => send_message(&mut state, now),
        Msg::NewChatClicked => {
            state.chat.deselect();
            state.input.clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ConversationSelected(id) => {
            if state.chat.select(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ConversationDeleted(id) => {
            if !state.chat.remove(id) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            let owns_stream = state
                .stream
                .active()
                .is_some_and(|s| s.conversation_id == id);
            if !owns_stream {
                return (state, Vec::new());
            }
            match state.stream.cancel() {
                Some(stream_id) => vec![Effect::StopStreamTicker { stream_id }],
                None => Vec::new(),
            }
        }
        Msg::RegenerateClicked(message_id) => {
            let owner = state
                .chat
                .find_assistant_message(message_id)
                .map(|(conversation_id, _)| conversation_id);
            let Some(conversation_id) = owner else {
                return (state, Vec::new());
            };
            let response = canned_response(&mut state.rng);
            state.chat.set_content(conversation_id, message_id, "");
            let start = state.stream.start(conversation_id, message_id, response);
            state.mark_dirty();
            ticker_effects(&state, start)
        }
        Msg::StreamTick { stream_id } => stream_tick(&mut state, stream_id),
        Msg::CopyClicked(message_id) => match state.chat.find_message(message_id) {
            Some(message) => vec![Effect::CopyToClipboard {
                text: message.content.clone(),
            }],
            None => Vec::new(),
        },
        Msg::CopyFinished { ok } => {
            if ok {
                vec![Effect::success("Copied to clipboard")]
            } else {
                vec![Effect::error("Copy failed")]
            }
        }
    };

    (state, effects)
}

fn send_message(state: &mut AppState, now: Millis) -> Vec<Effect> {
    let text = state.input.trim().to_owned();
    if text.is_empty() || state.is_loading() {
        return Vec::new();
    }

    let conversation_id = state.chat.push_user_message(&text, now);
    state.input.clear();
    state.mark_dirty();

    let mut effects = Vec::new();
    if state.progress.confirm_chat(now) {
        effects.extend(progress_changed(state, now));
    }

    let response = canned_response(&mut state.rng);
    let placeholder = state.chat.push_placeholder(conversation_id, now);
    let start = state.stream.start(conversation_id, placeholder, response);
    effects.extend(ticker_effects(state, start));
    effects
}

fn stream_tick(state: &mut AppState, stream_id: u64) -> Vec<Effect> {
    let is_current = state.stream.active().is_some_and(|s| s.id == stream_id);
    if !is_current {
        // Late tick from a replaced stream; make sure its ticker is gone.
        return vec![Effect::StopStreamTicker { stream_id }];
    }

    let step = next_step(&mut state.rng);
    let TickOutcome::Progress {
        conversation_id,
        message_id,
        content,
        finished,
    } = state.stream.advance(stream_id, step)
    else {
        return Vec::new();
    };

    state.mark_dirty();
    if !state.chat.set_content(conversation_id, message_id, &content) {
        state.stream.cancel();
        return vec![Effect::StopStreamTicker { stream_id }];
    }
    if finished {
        vec![Effect::StopStreamTicker { stream_id }]
    } else {
        Vec::new()
    }
}

fn ticker_effects(state: &AppState, start: StreamStart) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    if let Some(stream_id) = start.cancelled {
        effects.push(Effect::StopStreamTicker { stream_id });
    }
    effects.push(Effect::StartStreamTicker {
        stream_id: start.started,
        interval_ms: state.timings.stream_tick_ms,
    });
    effects
}

/// Persist, then re-arm the auto-hide timer from `completed_at`.
fn progress_changed(state: &mut AppState, now: Millis) -> Vec<Effect> {
    let mut effects = vec![
        Effect::PersistProgress(state.progress.snapshot()),
        Effect::CancelHideTimer,
    ];
    if let HidePlan::HideAfter {
        generation,
        delay_ms,
    } = state.progress.sync_visibility(now)
    {
        effects.push(Effect::ScheduleHide {
            generation,
            delay_ms,
        });
    }
    effects
}

fn progress_reset(state: &AppState) -> Vec<Effect> {
    vec![
        Effect::PersistProgress(state.progress.snapshot()),
        Effect::CancelHideTimer,
    ]
}
