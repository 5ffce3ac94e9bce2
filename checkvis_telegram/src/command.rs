use checkvis_core::Request;
use teloxide::types::{BotCommand, MessageEntity, MessageEntityKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Define { args: Vec<String> },
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand {
                command: "start".to_string(),
                description: "Show the welcome message".to_string(),
            },
            BotCommand {
                command: "define".to_string(),
                description: "Remember a word for a case number: /define <word> <case_number>"
                    .to_string(),
            },
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    /// Parse a `/command` message.
    ///
    /// Returns `None` for unknown commands and for commands addressed to
    /// another bot (`/start@other_bot`). An empty `bot_name` accepts any mention.
    #[must_use]
    pub fn parse_from_text(text: &str, bot_name: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;

        // Remove bot mention if present (e.g., "/define@my_bot")
        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (head, None),
        };
        let addressed_elsewhere = mention
            .is_some_and(|m| !bot_name.is_empty() && !m.eq_ignore_ascii_case(bot_name));
        if addressed_elsewhere {
            return None;
        }

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "define" => Some(Self::Define {
                args: parts.map(ToString::to_string).collect(),
            }),
            _ => None,
        }
    }
}

impl From<Command> for Request {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Self::Start,
            Command::Define { args } => Self::Define { args },
        }
    }
}

/// True when the message opens with a bot-command entity.
#[must_use]
pub fn starts_with_bot_command(entities: &[MessageEntity]) -> bool {
    entities
        .iter()
        .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
}

/// Classify an inbound text message.
///
/// `is_command` comes from the message entities (see
/// [`starts_with_bot_command`]); unrecognised commands yield `None` and get
/// no reply. Everything else, including text like `/ hello` that Telegram
/// does not mark as a command, is free text.
#[must_use]
pub fn parse_request(text: &str, bot_name: &str, is_command: bool) -> Option<Request> {
    if is_command {
        Command::parse_from_text(text, bot_name).map(Request::from)
    } else {
        Some(Request::Text(text.to_string()))
    }
}
