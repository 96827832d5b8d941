use crate::rng::CycleRng;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Coordinates,
    Designation,
    Phrase,
}

impl MessageKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Coordinates => "coordinates",
            Self::Designation => "designation",
            Self::Phrase => "phrase",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "coordinates" => Some(Self::Coordinates),
            "designation" => Some(Self::Designation),
            "phrase" => Some(Self::Phrase),
            _ => None,
        }
    }
}

/// One cycle payload candidate: the decoded text plus how many 5-digit groups
/// its transmission expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub groups: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    Io(String),
    Parse { line: usize, message: String },
    Empty,
    InvalidValue { line: usize, field: &'static str, message: String },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Self::Empty => write!(f, "message pool is empty"),
            Self::InvalidValue { line, field, message } => {
                write!(f, "invalid {field} at line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for PayloadError {}

const MAX_GROUPS: usize = 200;

/// Fixed pool of transmission payloads. One entry is selected per cycle by the
/// seeded generator.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePool {
    messages: Vec<Message>,
}

impl MessagePool {
    /// The catalogue's built-in pool.
    pub fn builtin() -> Self {
        fn msg(kind: MessageKind, text: &str, groups: usize) -> Message {
            Message {
                kind,
                text: text.to_string(),
                groups,
            }
        }
        use MessageKind::*;

        Self {
            messages: vec![
                msg(Coordinates, "52.5163N  13.3777E", 24),
                msg(Coordinates, "51.9975N  1.1346W", 24),
                msg(Coordinates, "56.1304N  40.4067E", 24),
                msg(Coordinates, "59.9311N  30.3609E", 24),
                msg(Coordinates, "38.8977N  77.0365W", 24),
                msg(Coordinates, "48.1375N  11.5755E", 24),
                msg(Designation, "ECHO  7  CONFIRMED", 18),
                msg(Designation, "CARDINAL  ACTIVE", 16),
                msg(Designation, "NIGHTWATCH  STANDING  BY", 20),
                msg(Designation, "FULCRUM  STATUS  RED", 18),
                msg(Designation, "OPUS  3  TERMINATED", 18),
                msg(Phrase, "THE  WATER  REMEMBERS", 20),
                msg(Phrase, "ALL  SIGNALS  ARE  FINAL", 22),
                msg(Phrase, "VERIFY  AT  DAWN", 16),
                msg(Phrase, "THE  PATTERN  HOLDS", 18),
                msg(Phrase, "NOTHING  IS  LOST", 16),
            ],
        }
    }

    /// Parse a user pool. One message per line:
    /// `<kind> | <groups> | <text>`; blank lines and `#` comments skipped.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let mut messages = Vec::new();

        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut parts = trimmed.splitn(3, '|');
            let (Some(kind_raw), Some(groups_raw), Some(text_raw)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(PayloadError::Parse {
                    line: line_no,
                    message: "expected <kind> | <groups> | <text>".to_string(),
                });
            };

            let kind = MessageKind::parse(kind_raw).ok_or(PayloadError::InvalidValue {
                line: line_no,
                field: "kind",
                message: format!(
                    "unknown kind '{}' (coordinates/designation/phrase)",
                    kind_raw.trim()
                ),
            })?;

            let groups =
                groups_raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| PayloadError::InvalidValue {
                        line: line_no,
                        field: "groups",
                        message: format!("'{}' is not a group count", groups_raw.trim()),
                    })?;
            if groups == 0 || groups > MAX_GROUPS {
                return Err(PayloadError::InvalidValue {
                    line: line_no,
                    field: "groups",
                    message: format!("must be in 1..={MAX_GROUPS}"),
                });
            }

            let text = text_raw.trim().to_string();
            if text.is_empty() {
                return Err(PayloadError::InvalidValue {
                    line: line_no,
                    field: "text",
                    message: "text must not be empty".to_string(),
                });
            }

            messages.push(Message { kind, text, groups });
        }

        if messages.is_empty() {
            return Err(PayloadError::Empty);
        }
        Ok(Self { messages })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PayloadError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PayloadError::Io(e.to_string()))?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pick(&self, rng: &mut CycleRng) -> &Message {
        &self.messages[rng.index(self.messages.len())]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
