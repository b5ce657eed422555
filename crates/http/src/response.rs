//! JSON envelope shared by every bookshelf response

use serde::{Deserialize, Serialize};

/// Outcome marker carried by every envelope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// Standard response body: `{status, message?, data?}`
#[derive(Debug, Serialize)]
pub struct Envelope<T = ()> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful response carrying only data
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    /// Successful response carrying a message and data
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope {
    /// Successful response carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Failed response carrying a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_only_envelope_omits_data() {
        let body = serde_json::to_value(Envelope::message("Book deleted successfully")).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "message": "Book deleted successfully"})
        );
    }

    #[test]
    fn data_only_envelope_omits_message() {
        let body = serde_json::to_value(Envelope::success(json!({"books": []}))).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"books": []}}));
    }

    #[test]
    fn fail_envelope_is_marked_fail() {
        let body = serde_json::to_value(Envelope::fail("Book not found")).unwrap();
        assert_eq!(body, json!({"status": "fail", "message": "Book not found"}));
    }
}
