use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A link or image target found in a message, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRef {
    pub url: String,
}

/// A user or group mention. `group` is omitted from serialized output for users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub group: bool,
}

impl Mention {
    pub fn user(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            group: false,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            screen_name: name.into(),
            group: true,
        }
    }
}

/// An issue reference. `repo` is absent when the reference is local to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedChat {
    /// The input message, unmodified.
    pub text: String,
    /// Rendered markup.
    pub html: String,
    pub urls: Vec<UrlRef>,
    pub mentions: Vec<Mention>,
    pub issues: Vec<IssueRef>,
}

/// Internal pipeline failures. The public entry points recover from these and
/// never hand them to callers of [`ChatRenderer::render`].
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("html formatting failed: {message}")]
    Format { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: the same input always yields the same output.
pub trait ChatRenderer: Send + Sync {
    fn render(&self, text: &str) -> ProcessedChat;
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;

    #[test]
    fn serialized_result_uses_wire_field_names() {
        let result = ProcessedChat {
            text: "hi @alice @@ops #1 a/b#2".into(),
            html: "hi <span>…</span>".into(),
            urls: vec![UrlRef {
                url: "http://example.com".into(),
            }],
            mentions: vec![Mention::user("alice"), Mention::group("ops")],
            issues: vec![
                IssueRef {
                    number: "1".into(),
                    repo: None,
                },
                IssueRef {
                    number: "2".into(),
                    repo: Some("a/b".into()),
                },
            ],
        };

        assert_json_snapshot!(result, @r#"
        {
          "text": "hi @alice @@ops #1 a/b#2",
          "html": "hi <span>…</span>",
          "urls": [
            {
              "url": "http://example.com"
            }
          ],
          "mentions": [
            {
              "screenName": "alice"
            },
            {
              "screenName": "ops",
              "group": true
            }
          ],
          "issues": [
            {
              "number": "1"
            },
            {
              "number": "2",
              "repo": "a/b"
            }
          ]
        }
        "#);
    }

    #[test]
    fn missing_optional_fields_deserialize_to_defaults() {
        let mention: Mention = serde_json::from_str(r#"{"screenName":"bob"}"#).expect("mention");
        assert_eq!(mention, Mention::user("bob"));

        let issue: IssueRef = serde_json::from_str(r#"{"number":"5"}"#).expect("issue");
        assert_eq!(issue.repo, None);
    }
}
