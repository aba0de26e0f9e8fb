use serde_json::Value;
use tracing::info;

use crate::{error::RelayError, service::common_structs::HomeworkStatus};

pub const HOMEWORKS_KEY: &str = "homeworks";
pub const HOMEWORK_NAME_KEY: &str = "homework_name";
pub const STATUS_KEY: &str = "status";
pub const CURRENT_DATE_KEY: &str = "current_date";


/// Checks the API answer shape and returns its homework records, newest first.
pub fn check_response(response: &Value) -> Result<&[Value], RelayError> {
    let answer = response
        .as_object()
        .ok_or_else(|| RelayError::WrongTypeResponse(response.to_string()))?;

    let homeworks = answer
        .get(HOMEWORKS_KEY)
        .ok_or(RelayError::MissingKey(HOMEWORKS_KEY))?
        .as_array()
        .ok_or(RelayError::WrongType { key: HOMEWORKS_KEY, expected: "list" })?;

    if homeworks.is_empty() {
        return Err(RelayError::EmptyValue(HOMEWORKS_KEY));
    }

    info!(count = homeworks.len(), "Status of homework update");
    Ok(homeworks)
}

/// Renders the chat message for one homework record.
pub fn parse_status(homework: &Value) -> Result<String, RelayError> {
    let record = homework
        .as_object()
        .ok_or(RelayError::WrongType { key: "homework", expected: "dict" })?;

    let homework_name = string_field(record, HOMEWORK_NAME_KEY)?;
    let status: HomeworkStatus = string_field(record, STATUS_KEY)?.parse()?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        homework_name,
        status.verdict()
    ))
}

/// Server time of the answer, used as the next poll window start.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}

fn string_field<'a>(record: &'a serde_json::Map<String, Value>, key: &'static str) -> Result<&'a str, RelayError> {
    record
        .get(key)
        .ok_or(RelayError::MissingKey(key))?
        .as_str()
        .ok_or(RelayError::WrongType { key, expected: "string" })
}
