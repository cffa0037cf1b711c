use rocket::serde::json::{serde_json::Map, Value};

/// Project `data` onto the fields of `schema`.
///
/// Every schema field is present in the result, taking its value from `data`
/// when `data` has it and keeping the schema's default otherwise. Fields of
/// `data` unknown to the schema are dropped, so request bodies can never set
/// fields an endpoint does not expose.
pub fn create_model(schema: &Map<String, Value>, data: &Value) -> Map<String, Value> {
    let mut model = schema.clone();
    if let Value::Object(data) = data {
        for (key, value) in model.iter_mut() {
            if let Some(provided) = data.get(key) {
                *value = provided.clone();
            }
        }
    }
    model
}

/// Is `value` an object with no fields?
pub fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(fields) if fields.is_empty())
}
