use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Unique identifier for a collaboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollaborationId(pub Uuid);

impl CollaborationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CollaborationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CollaborationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CollaborationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A question extracted from a transcript together with the answer given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    pub question: String,
    pub answer: String,
}

/// A follow-up task identified in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub description: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// Optional calendar metadata attached to a collaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub title: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    /// IANA timezone name the event was scheduled in, e.g. `Europe/Berlin`.
    pub timezone: String,
}

/// A structured record distilled from a recorded conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: CollaborationId,
    pub title: String,
    pub description: String,
    pub participants: Vec<String>,
    pub answers: Vec<ExtractedAnswer>,
    pub action_items: Vec<ActionItem>,
    pub event: Option<EventMetadata>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a new collaboration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCollaboration {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub answers: Vec<ExtractedAnswer>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub event: Option<EventMetadata>,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl NewCollaboration {
    /// Check the invariants a store relies on before persisting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] when the title is blank, a participant name is
    /// blank, or the event ends before it starts.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::Invalid("title must not be empty".to_string()));
        }
        if self.participants.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Invalid(
                "participant names must not be empty".to_string(),
            ));
        }
        if let Some(event) = &self.event {
            if event.end.is_some_and(|end| end < event.start) {
                return Err(Error::Invalid("event ends before it starts".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewCollaboration {
        NewCollaboration {
            title: "Weekly sync".to_string(),
            participants: vec!["alice".to_string(), "bob".to_string()],
            ..NewCollaboration::default()
        }
    }

    #[test]
    fn collaboration_id_roundtrip() {
        let id = CollaborationId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CollaborationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn collaboration_id_parses_from_str() {
        let id = CollaborationId::new();
        let parsed: CollaborationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<CollaborationId>().is_err());
    }

    #[test]
    fn new_collaboration_accepts_valid_input() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn new_collaboration_rejects_blank_title() {
        let params = NewCollaboration {
            title: "   ".to_string(),
            ..sample()
        };
        assert!(matches!(params.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn new_collaboration_rejects_blank_participant() {
        let mut params = sample();
        params.participants.push(String::new());
        assert!(matches!(params.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn new_collaboration_rejects_inverted_event() {
        let start = Utc::now();
        let params = NewCollaboration {
            event: Some(EventMetadata {
                title: "Launch".to_string(),
                start,
                end: Some(start - chrono::Duration::hours(1)),
                location: None,
                timezone: "UTC".to_string(),
            }),
            ..sample()
        };
        assert!(matches!(params.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn new_collaboration_defaults_optional_fields() {
        let params: NewCollaboration =
            serde_json::from_str(r#"{"title": "Retro"}"#).unwrap();
        assert_eq!(params.title, "Retro");
        assert!(params.participants.is_empty());
        assert!(params.event.is_none());
    }

    #[test]
    fn action_item_done_defaults_to_false() {
        let item: ActionItem =
            serde_json::from_str(r#"{"description": "Send notes"}"#).unwrap();
        assert!(!item.done);
        assert!(item.assignee.is_none());
    }
}
