use serde_json::{Map, Value};

/// Deep-merge `user` over `default`.
///
/// Objects present on both sides merge key by key. Any other user value
/// replaces the default wholesale; a missing or `null` user value keeps the
/// default.
pub fn merge_configs(default: &Value, user: &Value) -> Value {
    match (default, user) {
        (Value::Object(default_map), Value::Object(user_map)) => {
            let mut merged = Map::new();
            for (key, default_value) in default_map {
                let value = match user_map.get(key) {
                    Some(user_value) => merge_configs(default_value, user_value),
                    None => default_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            for (key, user_value) in user_map {
                if !default_map.contains_key(key) {
                    merged.insert(key.clone(), user_value.clone());
                }
            }
            Value::Object(merged)
        }
        (default, Value::Null) => default.clone(),
        (_, user) => user.clone(),
    }
}
