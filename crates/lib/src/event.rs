//! Inbound webhook payload classification.
//!
//! The platform POSTs JSON of varying shape to the webhook; anything that is
//! not a verification handshake or a file_shared event is acknowledged and
//! ignored, including bodies that fail to parse.

use serde::Deserialize;

/// A classified inbound webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// One-time endpoint ownership handshake; the challenge must be echoed back verbatim.
    UrlVerification { challenge: String },
    /// A file was shared; carries the file and uploader identifiers.
    FileShared { file_id: String, user_id: String },
    /// Anything else — acknowledged, no action.
    Other,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    typ: Option<String>,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    event: Option<EventBody>,
}

#[derive(Debug, Deserialize)]
struct EventBody {
    #[serde(rename = "type")]
    typ: String,
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

/// Classify a raw webhook body. Malformed JSON or payloads missing the fields
/// their type requires classify as `Other`.
pub fn classify(body: &[u8]) -> InboundEvent {
    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(e) => e,
        Err(_) => return InboundEvent::Other,
    };
    if envelope.typ.as_deref() == Some("url_verification") {
        if let Some(challenge) = envelope.challenge {
            return InboundEvent::UrlVerification { challenge };
        }
        return InboundEvent::Other;
    }
    if let Some(event) = envelope.event {
        if event.typ == "file_shared" {
            if let (Some(file_id), Some(user_id)) = (event.file_id, event.user_id) {
                return InboundEvent::FileShared { file_id, user_id };
            }
        }
    }
    InboundEvent::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_url_verification() {
        let body = br#"{"type":"url_verification","challenge":"abc123"}"#;
        assert_eq!(
            classify(body),
            InboundEvent::UrlVerification {
                challenge: "abc123".to_string()
            }
        );
    }

    #[test]
    fn classifies_file_shared() {
        let body = br#"{"event":{"type":"file_shared","file_id":"F123","user_id":"U456"}}"#;
        assert_eq!(
            classify(body),
            InboundEvent::FileShared {
                file_id: "F123".to_string(),
                user_id: "U456".to_string()
            }
        );
    }

    #[test]
    fn other_event_types_are_ignored() {
        let body = br#"{"event":{"type":"message","user_id":"U456","text":"hi"}}"#;
        assert_eq!(classify(body), InboundEvent::Other);
    }

    #[test]
    fn file_shared_without_ids_is_ignored() {
        let body = br#"{"event":{"type":"file_shared"}}"#;
        assert_eq!(classify(body), InboundEvent::Other);
    }

    #[test]
    fn verification_without_challenge_is_ignored() {
        let body = br#"{"type":"url_verification"}"#;
        assert_eq!(classify(body), InboundEvent::Other);
    }

    #[test]
    fn malformed_json_is_ignored() {
        assert_eq!(classify(b"not json"), InboundEvent::Other);
        assert_eq!(classify(b""), InboundEvent::Other);
        assert_eq!(classify(b"[1,2,3]"), InboundEvent::Other);
    }
}
