//! Reporting sink for rule messages.
//!
//! Rules only produce content. Where the messages end up (terminal,
//! JSON, a GUI) is up to the [`Reporter`] the driver passes in.

use serde::{Deserialize, Serialize};

/// Kind of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Headline of a violation.
    Error,
    /// Detail line belonging to the preceding headline.
    ErrorDetail,
    /// Non-blocking warning.
    Warning,
    /// Narration of applied or skipped fixes.
    Info,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::ErrorDetail => write!(f, "detail"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One reported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message kind.
    pub kind: MessageKind,
    /// Message text.
    pub text: String,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Destination for rule messages.
pub trait Reporter {
    /// Records one message.
    fn report(&mut self, message: Message);
}

impl dyn Reporter + '_ {
    /// Reports a violation headline.
    pub fn error(&mut self, text: impl Into<String>) {
        self.report(Message::new(MessageKind::Error, text));
    }

    /// Reports a detail line for the preceding headline.
    pub fn error_detail(&mut self, text: impl Into<String>) {
        self.report(Message::new(MessageKind::ErrorDetail, text));
    }

    /// Reports a non-blocking warning.
    pub fn warning(&mut self, text: impl Into<String>) {
        self.report(Message::new(MessageKind::Warning, text));
    }

    /// Reports fix narration.
    pub fn info(&mut self, text: impl Into<String>) {
        self.report(Message::new(MessageKind::Info, text));
    }
}

/// In-memory [`Reporter`] that keeps messages in order.
///
/// Every message is mirrored to `tracing` at debug level.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    messages: Vec<Message>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in the order they were reported.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages of one kind.
    pub fn of_kind(&self, kind: MessageKind) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.kind == kind)
    }

    /// Whether any message text contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    /// Number of violation headlines.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.of_kind(MessageKind::Error).count()
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Takes the messages out, leaving the report empty.
    pub fn take(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

impl Reporter for Report {
    fn report(&mut self, message: Message) {
        tracing::debug!(kind = %message.kind, "{}", message.text);
        self.messages.push(message);
    }
}
