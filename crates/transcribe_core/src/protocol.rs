use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sent upstream to end a streaming session gracefully.
pub const TERMINATE_MESSAGE: &str = r#"{"type":"Terminate"}"#;

/// JSON frames relayed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Transcription { text: String, is_final: bool },
    Error { message: String },
}

impl ClientMessage {
    pub fn transcription(text: impl Into<String>, is_final: bool) -> Self {
        Self::Transcription {
            text: text.into(),
            is_final,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub is_final: bool,
    pub turn_order: Option<u64>,
    pub end_of_turn_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOpened {
    pub session_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionTerminated {
    pub audio_duration_seconds: Option<f64>,
    pub session_duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEvent {
    Opened(SessionOpened),
    Transcript(Transcript),
    Terminated(SessionTerminated),
    Error(String),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum StreamingMessage {
    Begin {
        id: String,
        #[serde(default)]
        expires_at: Option<i64>,
    },
    Turn {
        #[serde(default)]
        transcript: String,
        #[serde(default)]
        end_of_turn: bool,
        #[serde(default)]
        turn_is_formatted: bool,
        #[serde(default)]
        turn_order: Option<u64>,
        #[serde(default)]
        end_of_turn_confidence: Option<f64>,
    },
    Termination {
        #[serde(default)]
        audio_duration_seconds: Option<f64>,
        #[serde(default)]
        session_duration_seconds: Option<f64>,
    },
}

/// Parses one text frame from the streaming API.
///
/// With `format_turns` enabled the service sends every completed turn twice,
/// first raw and then formatted. Only the formatted copy counts as final.
pub fn parse_upstream_message(payload: &str, format_turns: bool) -> Option<UpstreamEvent> {
    let value: Value = serde_json::from_str(payload).ok()?;

    if let Some(error) = value.get("error") {
        let message = match error.as_str() {
            Some(text) => text.to_string(),
            None => error.to_string(),
        };
        return Some(UpstreamEvent::Error(message));
    }

    let event = match serde_json::from_value::<StreamingMessage>(value).ok()? {
        StreamingMessage::Begin { id, expires_at } => UpstreamEvent::Opened(SessionOpened {
            session_id: id,
            expires_at: expires_at.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        }),
        StreamingMessage::Turn {
            transcript,
            end_of_turn,
            turn_is_formatted,
            turn_order,
            end_of_turn_confidence,
        } => {
            let is_final = if format_turns {
                end_of_turn && turn_is_formatted
            } else {
                end_of_turn
            };
            UpstreamEvent::Transcript(Transcript {
                text: transcript,
                is_final,
                turn_order,
                end_of_turn_confidence,
            })
        }
        StreamingMessage::Termination {
            audio_duration_seconds,
            session_duration_seconds,
        } => UpstreamEvent::Terminated(SessionTerminated {
            audio_duration_seconds,
            session_duration_seconds,
        }),
    };

    Some(event)
}
