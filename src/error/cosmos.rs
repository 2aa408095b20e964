use serde::Deserialize;

/// Structured error information extracted from a Cosmos DB error response.
///
/// The gateway answers failed requests with a body such as
/// `{"code":"NotFound","message":"Message: {\"Errors\":[...]}\r\nActivityId: ..."}`.
/// Only the parts useful to a person reading the console are kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: Option<String>,
    pub message: Option<String>,
    pub activity_id: Option<String>,
}

#[derive(Deserialize)]
struct RawErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct NestedErrors {
    #[serde(rename = "Errors", default)]
    errors: Vec<String>,
}

impl ErrorInfo {
    /// Build error info from a raw response body.
    ///
    /// Bodies that are not JSON are kept as the message so nothing the
    /// service said is lost.
    pub fn from_response_body(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            return Self::default();
        }

        let Ok(raw) = serde_json::from_str::<RawErrorBody>(body) else {
            return Self {
                message: Some(body.to_string()),
                ..Self::default()
            };
        };

        let mut info = Self {
            code: raw.code,
            ..Self::default()
        };

        if let Some(message) = raw.message {
            info.activity_id = extract_activity_id(&message);
            info.message = Some(extract_first_error(&message).unwrap_or(message));
        }

        info
    }
}

/// Pull the first entry of the `Errors` array embedded in a gateway message.
fn extract_first_error(message: &str) -> Option<String> {
    let start = message.find('{')?;
    let end = message.rfind('}')?;
    if end <= start {
        return None;
    }

    let nested: NestedErrors = serde_json::from_str(&message[start..=end]).ok()?;
    nested.errors.into_iter().next()
}

fn extract_activity_id(message: &str) -> Option<String> {
    let after = &message[message.find("ActivityId: ")? + "ActivityId: ".len()..];
    let id: String = after
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
        .collect();
    (!id.is_empty()).then_some(id)
}
