use std::fmt::Write;

use onmark_core::{
    AppViewModel, ColumnDetailView, ConversationView, DiscoveryView, MessageView, NoticeLevel,
    Role, StepStatus, StepperView, PREVIEW_COLUMNS,
};

use crate::platform::effects::Notice;

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Text to print for the sections that differ between two views.
///
/// A message that is being streamed is printed as it grows: only the newly
/// revealed characters are emitted, and the line is closed once the stream
/// finishes.
pub fn render_changes(previous: &AppViewModel, view: &AppViewModel) -> String {
    let mut out = String::new();

    if previous.stepper != view.stepper {
        if view.stepper.visible {
            out.push_str(&format_stepper(&view.stepper));
            out.push('\n');
        } else if previous.stepper.visible {
            out.push_str("Progress complete; stepper hidden.\n");
        }
    }

    if view.uploading && !previous.uploading {
        out.push_str("Uploading...\n");
    }

    if previous.files != view.files || previous.search != view.search {
        out.push_str(&format_files(view));
    }

    if previous.discovery != view.discovery {
        match &view.discovery {
            Some(discovery) => out.push_str(&format_discovery(discovery)),
            None if previous.discovery.is_some() => out.push_str("Discovery closed.\n"),
            None => {}
        }
    }

    render_conversation_changes(
        &mut out,
        previous.active_conversation.as_ref(),
        view.active_conversation.as_ref(),
    );

    out
}

/// Full snapshot of the view, for the `status` command.
pub fn render_status(view: &AppViewModel) -> String {
    let mut out = String::new();
    if view.stepper.visible {
        out.push_str(&format_stepper(&view.stepper));
    } else {
        out.push_str("Progress: complete (stepper hidden)");
    }
    out.push('\n');
    if view.uploading {
        out.push_str("Uploading...\n");
    }
    out.push_str(&format_files(view));
    if let Some(discovery) = &view.discovery {
        out.push_str(&format_discovery(discovery));
    }
    out.push_str(&format_conversation_list(view));
    if let Some(conversation) = &view.active_conversation {
        out.push_str(&format_conversation(conversation));
    }
    if view.streaming {
        out.push_str("(a response is streaming)\n");
    }
    out
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("* {}", notice.text),
        NoticeLevel::Error => format!("! {}", notice.text),
    }
}

pub fn format_stepper(stepper: &StepperView) -> String {
    let steps: Vec<String> = stepper
        .steps
        .iter()
        .map(|step| {
            let mark = match step.status {
                StepStatus::Complete => "x",
                StepStatus::Active => ">",
                StepStatus::Upcoming => " ",
            };
            format!("[{mark}] {}", step.label)
        })
        .collect();
    format!("{}  {}%", steps.join(" -- "), stepper.percent)
}

pub fn format_files(view: &AppViewModel) -> String {
    let mut out = format!(
        "Files: {} | Rows: {} | Size: {}\n",
        view.file_count,
        format_with_commas(view.total_rows),
        format_bytes(view.total_bytes)
    );
    if !view.search.is_empty() {
        let _ = writeln!(out, "  matching {:?}: {}", view.search, view.files.len());
    }
    for file in &view.files {
        let _ = writeln!(
            out,
            "  [{id}] {name} ({size}, {rows} rows, {columns} columns, {date})",
            id = file.id,
            name = file.name,
            size = format_bytes(file.size),
            rows = format_with_commas(file.row_count),
            columns = file.column_count,
            date = file.upload_date
        );
    }
    out
}

pub fn format_discovery(discovery: &DiscoveryView) -> String {
    let mut out = format!(
        "Discovery: {} ({} rows)\n",
        discovery.name,
        format_with_commas(discovery.row_count)
    );
    if let Some(link) = &discovery.database_link {
        let _ = writeln!(out, "  database: {link}");
    }
    for column in &discovery.columns {
        match &column.related_file {
            Some(related) => {
                let _ = writeln!(out, "  - {} -> file [{}]", column.name, related);
            }
            None => {
                let _ = writeln!(out, "  - {}", column.name);
            }
        }
    }
    if !discovery.preview.is_empty() {
        let _ = writeln!(out, "  {}", PREVIEW_COLUMNS.join(" | "));
        for row in &discovery.preview {
            let _ = writeln!(out, "  {}", row.join(" | "));
        }
        let _ = writeln!(
            out,
            "  Showing {} of {} records",
            discovery.preview.len(),
            format_with_commas(discovery.row_count)
        );
    }
    out
}

pub fn format_column_detail(detail: &ColumnDetailView) -> String {
    let mut out = format!(
        "{} / [{}]  {}\n",
        detail.column,
        detail.file_id,
        sparkline(&detail.values)
    );
    if let Some((id, name)) = &detail.related_file {
        let _ = writeln!(out, "  links to [{id}] {name}");
    }
    out
}

pub fn format_conversation_list(view: &AppViewModel) -> String {
    if view.conversations.is_empty() {
        return "No conversations yet.\n".to_string();
    }
    let mut out = String::from("Conversations:\n");
    for row in &view.conversations {
        let marker = if row.active { '*' } else { ' ' };
        let _ = writeln!(out, " {marker}[{}] {}", row.id, row.title);
    }
    out
}

fn format_conversation(conversation: &ConversationView) -> String {
    let mut out = format!("== [{}] {} ==\n", conversation.id, conversation.title);
    for message in &conversation.messages {
        out.push_str(&message_header(message));
        out.push_str(&message.content);
        if message.streaming {
            out.push_str(" ...");
        }
        out.push('\n');
    }
    out
}

fn render_conversation_changes(
    out: &mut String,
    previous: Option<&ConversationView>,
    view: Option<&ConversationView>,
) {
    let line_open = previous.is_some_and(|c| c.messages.iter().any(|m| m.streaming));
    let (previous, view) = match (previous, view) {
        (_, None) => {
            if line_open {
                out.push('\n');
            }
            if previous.is_some() {
                out.push_str("New chat. Type a message to start.\n");
            }
            return;
        }
        (Some(previous), Some(view)) if previous.id == view.id => (previous, view),
        (_, Some(view)) => {
            // Freshly opened: print it whole, leaving a streaming line open.
            if line_open {
                out.push('\n');
            }
            let _ = writeln!(out, "== [{}] {} ==", view.id, view.title);
            for message in &view.messages {
                out.push_str(&message_header(message));
                out.push_str(&message.content);
                if !message.streaming {
                    out.push('\n');
                }
            }
            return;
        }
    };

    for message in &view.messages {
        let before = previous.messages.iter().find(|m| m.id == message.id);
        match before {
            Some(before) if message.content.starts_with(&before.content) => {
                out.push_str(&message.content[before.content.len()..]);
                if before.streaming && !message.streaming {
                    out.push('\n');
                }
            }
            Some(before) => {
                if before.streaming {
                    out.push('\n');
                }
                out.push_str(&message_header(message));
                out.push_str(&message.content);
                if !message.streaming {
                    out.push('\n');
                }
            }
            None => {
                out.push_str(&message_header(message));
                out.push_str(&message.content);
                if !message.streaming {
                    out.push('\n');
                }
            }
        }
    }
}

fn message_header(message: &MessageView) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{who} #{}> ", message.id)
}

fn sparkline(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| {
            let index = (value.clamp(0.0, 1.0) * SPARK_BARS.len() as f64) as usize;
            SPARK_BARS[index.min(SPARK_BARS.len() - 1)]
        })
        .collect()
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use onmark_core::{ConversationId, FileId, MessageId, StepView};
    use pretty_assertions::assert_eq;

    use super::*;

    fn message(id: u64, role: Role, content: &str, streaming: bool) -> MessageView {
        MessageView {
            id: MessageId(id),
            role,
            content: content.to_string(),
            timestamp: 0,
            streaming,
        }
    }

    fn with_conversation(messages: Vec<MessageView>) -> AppViewModel {
        AppViewModel {
            active_conversation: Some(ConversationView {
                id: ConversationId(1),
                title: "hello".to_string(),
                messages,
            }),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(15_420), "15,420");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn bytes_scale_to_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_048_000), "2.0 MB");
    }

    #[test]
    fn sparkline_maps_unit_interval_to_bars() {
        assert_eq!(sparkline(&[0.0, 0.5, 0.999]), "▁▅█");
    }

    #[test]
    fn stepper_marks_each_step() {
        let stepper = StepperView {
            visible: true,
            current: 1,
            percent: 50,
            steps: vec![
                StepView {
                    label: "Upload",
                    status: StepStatus::Complete,
                },
                StepView {
                    label: "Discovery",
                    status: StepStatus::Active,
                },
                StepView {
                    label: "Chat",
                    status: StepStatus::Upcoming,
                },
            ],
        };
        assert_eq!(
            format_stepper(&stepper),
            "[x] Upload -- [>] Discovery -- [ ] Chat  50%"
        );
    }

    #[test]
    fn unchanged_view_prints_nothing() {
        let view = with_conversation(vec![message(1, Role::User, "hi", false)]);
        assert_eq!(render_changes(&view, &view), "");
    }

    #[test]
    fn streaming_prints_only_new_characters() {
        let before = with_conversation(vec![
            message(1, Role::User, "hi", false),
            message(2, Role::Assistant, "Bas", true),
        ]);
        let during = with_conversation(vec![
            message(1, Role::User, "hi", false),
            message(2, Role::Assistant, "Based", true),
        ]);
        let after = with_conversation(vec![
            message(1, Role::User, "hi", false),
            message(2, Role::Assistant, "Based on", false),
        ]);

        assert_eq!(render_changes(&before, &during), "ed");
        assert_eq!(render_changes(&during, &after), " on\n");
    }

    #[test]
    fn new_placeholder_opens_a_line() {
        let before = with_conversation(vec![message(1, Role::User, "hi", false)]);
        let after = with_conversation(vec![
            message(1, Role::User, "hi", false),
            message(2, Role::Assistant, "", true),
        ]);
        assert_eq!(render_changes(&before, &after), "assistant #2> ");
    }

    #[test]
    fn regenerate_restarts_the_line() {
        let before = with_conversation(vec![message(2, Role::Assistant, "Old answer", false)]);
        let after = with_conversation(vec![message(2, Role::Assistant, "", true)]);
        assert_eq!(render_changes(&before, &after), "assistant #2> ");
    }

    #[test]
    fn discovery_lists_columns_and_links() {
        let discovery = DiscoveryView {
            file_id: FileId::from("1"),
            name: "sales.csv".to_string(),
            row_count: 1_500,
            database_link: None,
            columns: vec![
                onmark_core::ColumnView {
                    name: "date".to_string(),
                    related_file: None,
                },
                onmark_core::ColumnView {
                    name: "product_id".to_string(),
                    related_file: Some(FileId::from("4")),
                },
            ],
            preview: Vec::new(),
        };
        assert_eq!(
            format_discovery(&discovery),
            "Discovery: sales.csv (1,500 rows)\n  - date\n  - product_id -> file [4]\n"
        );
    }

    #[test]
    fn discovery_preview_is_a_table_with_a_footer() {
        let discovery = DiscoveryView {
            file_id: FileId::from("2"),
            name: "users.csv".to_string(),
            row_count: 45_230,
            database_link: None,
            columns: Vec::new(),
            preview: vec![[
                "1".to_string(),
                "2024-01-15 10:30:00".to_string(),
                "$1250.75".to_string(),
                "Sales".to_string(),
                "Complete".to_string(),
            ]],
        };
        assert_eq!(
            format_discovery(&discovery),
            "Discovery: users.csv (45,230 rows)\n\
             \x20 id | timestamp | value | category | status\n\
             \x20 1 | 2024-01-15 10:30:00 | $1250.75 | Sales | Complete\n\
             \x20 Showing 1 of 45,230 records\n"
        );
    }

    #[test]
    fn hiding_the_stepper_is_announced_once() {
        let visible = AppViewModel {
            stepper: StepperView {
                visible: true,
                current: 3,
                percent: 100,
                steps: Vec::new(),
            },
            ..AppViewModel::default()
        };
        let hidden = AppViewModel {
            stepper: StepperView {
                visible: false,
                ..visible.stepper.clone()
            },
            ..AppViewModel::default()
        };
        assert_eq!(
            render_changes(&visible, &hidden),
            "Progress complete; stepper hidden.\n"
        );
        assert_eq!(render_changes(&hidden, &hidden), "");
    }
}
