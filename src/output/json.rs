use serde::Serialize;
use serde_json::{json, Value};

use crate::error::SprintdeskError;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &SprintdeskError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

/// Serialize a record for the `data` field.
pub fn to_data<T: Serialize>(value: &T) -> Result<Value, SprintdeskError> {
    serde_json::to_value(value).map_err(|e| SprintdeskError::database(format!("serialize: {e}")))
}

pub fn print(value: &Value) {
    println!("{value:#}");
}
