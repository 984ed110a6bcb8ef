//! Conversation turn and image-reference types for Glimmer.
//!
//! A [`Turn`] is one exchange unit: user, assistant, or system. Turns shown
//! while a request is in flight carry a [`Pending`] marker; those never
//! reach the wire and never reach the session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(TurnRole::System),
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// Opaque reference to image bytes attached to or produced by a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    /// Base64-encoded bytes together with their mime type.
    Inline { mime_type: String, data: String },
    /// A fetchable location, resolved to bytes at dispatch time.
    Url(String),
}

/// Kind of in-flight work a placeholder turn represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pending {
    Response,
    ImageGeneration,
    ImageEdit,
}

/// One message unit in a conversation.
///
/// The timestamp is assigned when the turn is constructed and is immutable
/// thereafter. `content` may be empty when an image is the sole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Pending>,
}

impl Turn {
    /// Create a resolved turn with the given role and content.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            image: None,
            pending: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Create an assistant placeholder turn for an in-flight operation.
    pub fn placeholder(kind: Pending, content: impl Into<String>) -> Self {
        Self {
            pending: Some(kind),
            ..Self::new(TurnRole::Assistant, content)
        }
    }

    /// Attach an image reference to this turn.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Whether this turn is an unresolved placeholder.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::System, TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_role_serde() {
        let role = TurnRole::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: TurnRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Turn::system("hi").role, TurnRole::System);
        assert_eq!(Turn::user("hi").role, TurnRole::User);
        assert_eq!(Turn::assistant("hi").role, TurnRole::Assistant);
    }

    #[test]
    fn test_placeholder_is_pending() {
        let turn = Turn::placeholder(Pending::ImageGeneration, "Generating image...");
        assert!(turn.is_pending());
        assert_eq!(turn.role, TurnRole::Assistant);
        assert_eq!(turn.pending, Some(Pending::ImageGeneration));
    }

    #[test]
    fn test_resolved_turn_is_not_pending() {
        assert!(!Turn::user("hello").is_pending());
    }

    #[test]
    fn test_with_image() {
        let image = ImageRef::Url("https://example.com/cat.png".to_string());
        let turn = Turn::assistant("a cat").with_image(image.clone());
        assert_eq!(turn.image, Some(image));
    }

    #[test]
    fn test_turn_serde_omits_empty_optionals() {
        let json = serde_json::to_value(Turn::user("hi")).unwrap();
        assert!(json.get("image").is_none());
        assert!(json.get("pending").is_none());
    }

    #[test]
    fn test_turn_serde_roundtrip_with_image() {
        let turn = Turn::assistant("done").with_image(ImageRef::Inline {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        });
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, turn);
    }
}
