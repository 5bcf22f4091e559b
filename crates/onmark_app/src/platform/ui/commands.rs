use onmark_core::{ConversationId, FileId, MessageId, PendingUpload};
use thiserror::Error;

/// One line of terminal input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Upload(Vec<PendingUpload>),
    /// Filter the dashboard; an empty term clears the filter.
    Files(String),
    Remove(FileId),
    Discover(FileId),
    Close,
    Column { file_id: FileId, column: String },
    Say(String),
    New,
    Chats,
    Open(ConversationId),
    Delete(ConversationId),
    Regen(MessageId),
    Copy(MessageId),
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ParseError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a valid id")]
    InvalidId(String),
    #[error("{0:?} is not a valid size in bytes")]
    InvalidSize(String),
}

pub(crate) const HELP: &str = "\
Commands:
  upload <name>[:bytes] ...    upload files (processed after a short delay)
  files [term]                 list files, filtered by term
  remove <file-id>             remove a file
  discover <file-id>           open the discovery view for a file
  close                        close the discovery view
  column <file-id> <column>    show a column sparkline
  say <text>                   send a chat message (plain text works too)
  new                          start a new chat
  chats                        list conversations
  open <conversation-id>       switch conversation
  delete <conversation-id>     delete a conversation
  regen <message-id>           regenerate an assistant message
  copy <message-id>            copy a message
  reset                        start the milestones over
  status                       show everything
  help                         show this help
  quit                         exit";

/// Parses a line. Blank lines yield `Ok(None)`; text that does not start
/// with a command word is sent as a chat message.
pub(crate) fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "upload" => Command::Upload(parse_uploads(rest)?),
        "files" => Command::Files(rest.to_owned()),
        "remove" => Command::Remove(single_arg(rest, "remove <file-id>")?.into()),
        "discover" => Command::Discover(single_arg(rest, "discover <file-id>")?.into()),
        "close" => Command::Close,
        "column" => match rest.split_once(char::is_whitespace) {
            Some((file_id, column)) if !column.trim().is_empty() => Command::Column {
                file_id: file_id.into(),
                column: column.trim().to_owned(),
            },
            _ => return Err(ParseError::Usage("column <file-id> <column>")),
        },
        "say" if rest.is_empty() => return Err(ParseError::Usage("say <text>")),
        "say" => Command::Say(rest.to_owned()),
        "new" => Command::New,
        "chats" => Command::Chats,
        "open" => Command::Open(ConversationId(parse_id(rest, "open <conversation-id>")?)),
        "delete" => Command::Delete(ConversationId(parse_id(
            rest,
            "delete <conversation-id>",
        )?)),
        "regen" => Command::Regen(MessageId(parse_id(rest, "regen <message-id>")?)),
        "copy" => Command::Copy(MessageId(parse_id(rest, "copy <message-id>")?)),
        "reset" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Say(line.to_owned()),
    };
    Ok(Some(command))
}

fn single_arg<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(ParseError::Usage(usage));
    }
    Ok(rest)
}

fn parse_id(rest: &str, usage: &'static str) -> Result<u64, ParseError> {
    let arg = single_arg(rest, usage)?;
    arg.trim_start_matches('#')
        .parse()
        .map_err(|_| ParseError::InvalidId(arg.to_owned()))
}

fn parse_uploads(rest: &str) -> Result<Vec<PendingUpload>, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage("upload <name>[:bytes] ..."));
    }
    rest.split_whitespace()
        .map(|spec| match spec.rsplit_once(':') {
            Some((name, size)) if !name.is_empty() => Ok(PendingUpload {
                name: name.to_owned(),
                size: size
                    .parse()
                    .map_err(|_| ParseError::InvalidSize(size.to_owned()))?,
            }),
            _ => Ok(PendingUpload {
                name: spec.to_owned(),
                size: 0,
            }),
        })
        .collect()
}
