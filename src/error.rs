//! Ошибки бронирования и их отображение в HTTP-ответы.
//!
//! Ошибки валидации пользовательские: они прерывают текущий запрос и
//! возвращаются клиентом как 400 с телом, сгруппированным по полям.
//! Ошибки хранилища логируются и превращаются в 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Координата места, вышедшая за границы зала.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatField {
    Row,
    Seat,
}

impl SeatField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatField::Row => "row",
            SeatField::Seat => "seat",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SeatField::Row => "Row",
            SeatField::Seat => "Seat",
        }
    }
}

impl fmt::Display for SeatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} number out of range.", .0.label())]
    OutOfRange(SeatField),
    #[error("This seat is already taken.")]
    SeatTaken { row: i32, seat: i32 },
    #[error("Invalid pk \"{0}\" - object does not exist.")]
    SessionNotFound(i64),
    #[error("This list may not be empty.")]
    EmptyOrder,
}

impl ValidationError {
    /// Поле, к которому привязывается сообщение в ответе.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange(field) => field.as_str(),
            ValidationError::SeatTaken { .. } => "non_field_errors",
            ValidationError::SessionNotFound(_) => "movie_session",
            ValidationError::EmptyOrder => "tickets",
        }
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Payload(#[from] validator::ValidationErrors),
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            // проигранная гонка за место выглядит для клиента так же, как обычный конфликт
            StoreError::SeatTaken { row, seat, .. } => {
                BookingError::Validation(ValidationError::SeatTaken { row, seat })
            }
            StoreError::MissingReference { field, id } => BookingError::InvalidField {
                field: field.to_string(),
                message: format!("Invalid pk \"{id}\" - object does not exist."),
            },
            StoreError::Duplicate { resource, field } => BookingError::InvalidField {
                field: field.to_string(),
                message: format!("{resource} with this {field} already exists."),
            },
            other => BookingError::Storage(other),
        }
    }
}

impl From<JsonRejection> for BookingError {
    fn from(rejection: JsonRejection) -> Self {
        let (field, message) = match &rejection {
            JsonRejection::JsonDataError(err) => describe_data_error(&err.body_text()),
            other => ("non_field_errors".to_string(), other.body_text()),
        };
        BookingError::InvalidField { field, message }
    }
}

/// Разбирает текст отказа serde вида `tickets[0].row: invalid type: ... at line 1 column 9`
/// в пару (поле, сообщение).
fn describe_data_error(text: &str) -> (String, String) {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, rest)| rest);

    if let Some(start) = detail.find("missing field `") {
        let name = &detail[start + "missing field `".len()..];
        if let Some(end) = name.find('`') {
            return (name[..end].to_string(), "This field is required.".to_string());
        }
    }

    let (path, reason) = match detail.split_once(": ") {
        Some((path, reason)) if !path.contains(' ') => (Some(path), reason),
        _ => (None, detail),
    };
    let reason = reason
        .rsplit_once(" at line ")
        .map_or(reason, |(head, _)| head)
        .to_string();

    // последний сегмент пути без индексов: tickets[0].row -> row
    let field = path
        .and_then(|p| p.rsplit('.').next())
        .map(|segment| segment.split('[').next().unwrap_or(segment))
        .filter(|name| !name.is_empty())
        .unwrap_or("non_field_errors");
    (field.to_string(), reason)
}

impl BookingError {
    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::Validation(_)
            | BookingError::Payload(_)
            | BookingError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            BookingError::Validation(err) => keyed(err.field(), err.to_string()),
            BookingError::Payload(errors) => {
                let mut fields = Map::new();
                for (field, errs) in errors.field_errors() {
                    let messages: Vec<Value> = errs
                        .iter()
                        .map(|e| {
                            let message = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            Value::String(message)
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                Value::Object(fields)
            }
            BookingError::InvalidField { field, message } => keyed(field, message.clone()),
            BookingError::NotFound { .. } => json!({ "detail": "Not found." }),
            BookingError::Storage(_) => json!({ "detail": "Internal server error." }),
        }
    }
}

fn keyed(field: &str, message: String) -> Value {
    let mut fields = Map::new();
    fields.insert(field.to_string(), Value::Array(vec![Value::String(message)]));
    Value::Object(fields)
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        match &self {
            BookingError::Storage(err) => tracing::error!("storage failure: {:?}", err),
            other => tracing::debug!("request rejected: {}", other),
        }
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_nested_field_is_required() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: \
             tickets[0]: missing field `movie_session` at line 1 column 27",
        );
        assert_eq!(field, "movie_session");
        assert_eq!(message, "This field is required.");
    }

    #[test]
    fn wrong_type_is_keyed_by_last_path_segment() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: \
             tickets[1].row: invalid type: string \"a\", expected i32 at line 1 column 60",
        );
        assert_eq!(field, "row");
        assert_eq!(message, "invalid type: string \"a\", expected i32");
    }

    #[test]
    fn pathless_data_error_falls_back_to_non_field_errors() {
        let (field, message) = describe_data_error(
            "Failed to deserialize the JSON body into the target type: \
             invalid type: integer `5`, expected struct NewGenre at line 1 column 1",
        );
        assert_eq!(field, "non_field_errors");
        assert_eq!(message, "invalid type: integer `5`, expected struct NewGenre");
    }

    #[test]
    fn out_of_range_is_keyed_by_field() {
        let err = BookingError::from(ValidationError::OutOfRange(SeatField::Row));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), json!({ "row": ["Row number out of range."] }));

        let err = BookingError::from(ValidationError::OutOfRange(SeatField::Seat));
        assert_eq!(err.body(), json!({ "seat": ["Seat number out of range."] }));
    }

    #[test]
    fn seat_taken_is_a_general_message() {
        let err = BookingError::from(ValidationError::SeatTaken { row: 5, seat: 5 });
        assert_eq!(
            err.body(),
            json!({ "non_field_errors": ["This seat is already taken."] })
        );
    }

    #[test]
    fn lost_race_in_store_becomes_seat_taken() {
        let err = BookingError::from(StoreError::SeatTaken { session_id: 1, row: 2, seat: 3 });
        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::SeatTaken { row: 2, seat: 3 })
        ));
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = BookingError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body(), json!({ "detail": "Internal server error." }));
    }

    #[test]
    fn missing_reference_names_the_field() {
        let err = BookingError::from(StoreError::MissingReference { field: "genres", id: 42 });
        assert_eq!(
            err.body(),
            json!({ "genres": ["Invalid pk \"42\" - object does not exist."] })
        );
    }
}
