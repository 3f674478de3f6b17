use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::ToydeskError;

/// `axum::Json` whose rejections are reported in the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ToydeskError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ToydeskError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> ToydeskError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            match extract_missing_field(&message) {
                Some(field) => ToydeskError::Validation(format!("{field} is required")),
                None => ToydeskError::Validation(format!("Invalid JSON: {message}")),
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ToydeskError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ToydeskError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            ToydeskError::Internal("Failed to read request body".to_string())
        }
        _ => ToydeskError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
