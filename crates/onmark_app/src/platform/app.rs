use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use onmark_core::{
    update, AppState, AppViewModel, ChatSession, FileCollection, Millis, Msg, Timings,
};
use onmark_engine::{
    ensure_data_dir, EngineConfig, FileStore, TimerEvent, TimerService, CONFIG_FILENAME,
};
use onmark_logging::{onmark_debug, onmark_info, onmark_warn};

use super::clipboard::FileClipboard;
use super::effects::{EffectOutcome, EffectRunner};
use super::error::AppError;
use super::persistence::load_progress;
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

/// How long the loop waits for input before checking timers.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub fn run_app() -> Result<(), AppError> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let config = EngineConfig::load(&config_path)?;

    onmark_logging::initialize(
        &config.log_file,
        onmark_logging::parse_level(&config.log_level),
    );
    onmark_info!("Starting onmark with {:?}", config);

    ensure_data_dir(&config.data_dir)?;
    let runner = EffectRunner::new(
        TimerService::new()?,
        Box::new(FileStore::new(config.data_dir.clone())),
        FileClipboard::new(&config.data_dir),
    );

    let state = AppState::new()
        .with_files(FileCollection::sample())
        .with_chat(ChatSession::sample())
        .with_seed(rand::random())
        .with_timings(Timings {
            hide_after_ms: config.hide_after_millis(),
            stream_tick_ms: config.stream_tick_ms,
            upload_delay_ms: config.upload_delay_ms,
        });

    let mut app = App::new(state, runner);
    println!("OnMark data workspace. Type `help` for commands.");
    let snapshot = load_progress(app.runner.store());
    app.dispatch(Msg::RestoreProgress {
        snapshot,
        now: now_millis(),
    });

    let result = app.run(spawn_input_reader());
    app.runner.shutdown()?;
    onmark_info!("Exited");
    result
}

struct App {
    state: AppState,
    runner: EffectRunner,
    /// View as last printed; changes are rendered against it.
    shown: AppViewModel,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            shown: AppViewModel::default(),
        }
    }

    fn run(&mut self, input: mpsc::Receiver<String>) -> Result<(), AppError> {
        prompt()?;
        loop {
            match input.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    if !self.handle_line(&line)? {
                        return Ok(());
                    }
                    prompt()?;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    onmark_info!("Input closed");
                    return Ok(());
                }
            }

            while let Some(event) = self.runner.try_recv_timer() {
                self.dispatch(timer_msg(event));
            }
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> Result<bool, AppError> {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(err) => {
                println!("{err}");
                return Ok(true);
            }
        };
        onmark_debug!("Command {:?}", command);

        match command {
            Command::Upload(files) => self.dispatch(Msg::UploadRequested(files)),
            Command::Files(term) if term == self.shown.search => {
                print_flush(&render::format_files(&self.shown))?;
            }
            Command::Files(term) => self.dispatch(Msg::SearchChanged(term)),
            Command::Remove(id) => self.dispatch(Msg::FileRemoved(id)),
            Command::Discover(file_id) => {
                if self.state.files().get(&file_id).is_none() {
                    println!("No file [{file_id}]");
                }
                self.dispatch(Msg::DiscoveryOpened {
                    file_id,
                    now: now_millis(),
                });
            }
            Command::Close => self.dispatch(Msg::DiscoveryClosed),
            Command::Column { file_id, column } => {
                match self.state.column_detail(&file_id, &column) {
                    Some(detail) => print_flush(&render::format_column_detail(&detail))?,
                    None => println!("No column {column:?} in file [{file_id}]"),
                }
            }
            Command::Say(text) => {
                if self.state.is_loading() {
                    println!("Wait for the current response to finish.");
                    return Ok(true);
                }
                self.dispatch(Msg::InputChanged(text));
                self.dispatch(Msg::MessageSent { now: now_millis() });
            }
            Command::New => self.dispatch(Msg::NewChatClicked),
            Command::Chats => print_flush(&render::format_conversation_list(&self.shown))?,
            Command::Open(id) => {
                if self.state.chat().get(id).is_none() {
                    println!("No conversation [{id}]");
                }
                self.dispatch(Msg::ConversationSelected(id));
            }
            Command::Delete(id) => self.dispatch(Msg::ConversationDeleted(id)),
            Command::Regen(id) => self.dispatch(Msg::RegenerateClicked(id)),
            Command::Copy(id) => self.dispatch(Msg::CopyClicked(id)),
            Command::Reset => self.dispatch(Msg::ResetProgressClicked),
            Command::Status => print_flush(&render::render_status(&self.shown))?,
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Applies `msg` and everything it leads to, then prints what changed.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = vec![msg];
        while let Some(msg) = queue.pop() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;

            let EffectOutcome {
                follow_ups,
                notices,
            } = self.runner.run(effects);
            self.render();
            for notice in &notices {
                println!("{}", render::format_notice(notice));
            }
            queue.extend(follow_ups.into_iter().rev());
        }
    }

    fn render(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view();
        let text = render::render_changes(&self.shown, &view);
        self.shown = view;
        if let Err(err) = print_flush(&text) {
            onmark_warn!("Render failed: {}", err);
        }
    }
}

fn timer_msg(event: TimerEvent) -> Msg {
    match event {
        TimerEvent::HideElapsed { generation } => Msg::HideTimerElapsed { generation },
        TimerEvent::UploadReady { batch_id } => Msg::UploadProcessed {
            batch_id,
            uploaded_on: upload_date(Utc::now()),
            now: now_millis(),
        },
        TimerEvent::StreamTick { stream_id } => Msg::StreamTick { stream_id },
    }
}

/// Upload dates are calendar days in UTC.
fn upload_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn prompt() -> io::Result<()> {
    print_flush("> ")
}

fn print_flush(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
