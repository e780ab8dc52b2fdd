//! Data models for chat exports and computed statistics.
//!
//! The export types mirror the `result.json` layout written by Telegram
//! Desktop. Only the fields used by the statistics are modeled; everything
//! else in the document is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A decoded chat export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatExport {
    /// Chat title.
    #[serde(default)]
    pub name: Option<String>,
    /// Chat kind, e.g. `public_supergroup`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Telegram chat id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Messages in chronological order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A single exported message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Message id, unique within the chat.
    pub id: i64,
    /// `message` or `service`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// ISO-like local timestamp as written by the exporter.
    #[serde(default)]
    pub date: Option<String>,
    /// Author display name. Missing for service messages and deleted accounts.
    #[serde(default)]
    pub from: Option<String>,
    /// Author id, e.g. `user123456`.
    #[serde(default)]
    pub from_id: Option<String>,
    /// Message body.
    #[serde(default)]
    pub text: MessageText,
    /// Id of the message this one replies to.
    #[serde(default)]
    pub reply_to_message_id: Option<i64>,
}

/// Message body: either a plain string or a list of formatted segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Plain(String),
    Segments(Vec<TextSegment>),
    /// Anything else (e.g. `null`); contributes no text.
    Other(Value),
}

impl Default for MessageText {
    fn default() -> Self {
        MessageText::Plain(String::new())
    }
}

impl MessageText {
    /// True when the raw field carries nothing: an empty string, an empty
    /// segment list, or a non-text value.
    pub fn is_empty(&self) -> bool {
        match self {
            MessageText::Plain(s) => s.is_empty(),
            MessageText::Segments(segments) => segments.is_empty(),
            MessageText::Other(_) => true,
        }
    }
}

/// One piece of a composite message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSegment {
    Plain(String),
    /// Links, mentions, hashtags, bold text and so on.
    Entity {
        text: String,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
    Other(Value),
}

/// Per-message question flags, keyed by message id.
///
/// Ids that were never indexed read as "not a question".
#[derive(Debug, Clone, Default)]
pub struct QuestionIndex {
    flags: HashMap<i64, bool>,
}

impl QuestionIndex {
    pub fn insert(&mut self, id: i64, is_question: bool) {
        self.flags.insert(id, is_question);
    }

    pub fn is_question(&self, id: i64) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Number of indexed messages.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of indexed messages flagged as questions.
    pub fn question_count(&self) -> usize {
        self.flags.values().filter(|flag| **flag).count()
    }
}

/// Reply count for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTally {
    pub user: String,
    pub replies: usize,
}

/// Users ranked by the number of replies they gave to questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRepliers {
    pub entries: Vec<UserTally>,
}

impl TopRepliers {
    /// Reply count for a user, if ranked.
    #[allow(dead_code)] // Lookup helper for callers holding a ranking
    pub fn get(&self, user: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|tally| tally.user == user)
            .map(|tally| tally.replies)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest reply count, or 0 when empty.
    pub fn max_replies(&self) -> usize {
        self.entries.first().map(|tally| tally.replies).unwrap_or(0)
    }
}

/// A word and how often it occurs after filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Aggregate counts over the whole export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Messages in the export.
    pub messages: usize,
    /// Messages with non-empty text.
    pub text_messages: usize,
    /// Messages containing a question.
    pub questions: usize,
    /// Replies whose target is a question.
    pub replies_to_questions: usize,
}

/// Metadata for the ranking report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Chat title, if the export has one.
    pub chat_name: Option<String>,
    /// Path of the analyzed export.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Requested ranking size.
    pub top_n: usize,
    /// Duration of the run so far in seconds.
    pub duration_seconds: f64,
}

/// The complete top-repliers report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: ReportMetadata,
    pub summary: ChatSummary,
    pub top_users: Vec<UserTally>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_composite_text() {
        let json = r#"{
            "name": "Group",
            "type": "public_supergroup",
            "id": 42,
            "messages": [
                {"id": 1, "type": "message", "from": "Ali", "text": "hello"},
                {"id": 2, "type": "message", "from": "Sara",
                 "text": ["see ", {"type": "link", "text": "example.com"}, {"foo": 1}],
                 "reply_to_message_id": 1}
            ]
        }"#;

        let export: ChatExport = serde_json::from_str(json).unwrap();
        assert_eq!(export.name.as_deref(), Some("Group"));
        assert_eq!(export.messages.len(), 2);
        assert_eq!(export.messages[0].text, MessageText::Plain("hello".to_string()));
        assert_eq!(export.messages[1].reply_to_message_id, Some(1));

        match &export.messages[1].text {
            MessageText::Segments(segments) => {
                assert_eq!(segments.len(), 3);
                assert!(matches!(segments[1], TextSegment::Entity { .. }));
                assert!(matches!(segments[2], TextSegment::Other(_)));
            }
            other => panic!("expected segments, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"{"messages": [{"id": 7, "type": "service", "from": null}]}"#;
        let export: ChatExport = serde_json::from_str(json).unwrap();

        let msg = &export.messages[0];
        assert!(msg.from.is_none());
        assert!(msg.text.is_empty());
        assert!(msg.reply_to_message_id.is_none());
    }

    #[test]
    fn test_null_text_is_empty() {
        let msg: Message = serde_json::from_str(r#"{"id": 1, "text": null}"#).unwrap();
        assert!(msg.text.is_empty());
    }

    #[test]
    fn test_question_index_absent_is_false() {
        let mut index = QuestionIndex::default();
        index.insert(1, true);
        index.insert(2, false);

        assert!(index.is_question(1));
        assert!(!index.is_question(2));
        assert!(!index.is_question(99));
        assert_eq!(index.len(), 2);
        assert_eq!(index.question_count(), 1);
    }

    #[test]
    fn test_top_repliers_lookup() {
        let top = TopRepliers {
            entries: vec![
                UserTally {
                    user: "u1".to_string(),
                    replies: 3,
                },
                UserTally {
                    user: "u2".to_string(),
                    replies: 1,
                },
            ],
        };

        assert_eq!(top.get("u1"), Some(3));
        assert_eq!(top.get("u3"), None);
        assert_eq!(top.max_replies(), 3);
        assert_eq!(TopRepliers::default().max_replies(), 0);
    }
}
