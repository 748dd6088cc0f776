use serde::Serialize;

#[derive(Debug)]
pub struct Masked;

pub trait MaskPolicy {
    fn mask(value: &str) -> String;
}

impl MaskPolicy for Masked {
    fn mask(value: &str) -> String {
        let len = value.chars().count();
        if len > 4 {
            let tail: String = value.chars().skip(len - 4).collect();
            "*".repeat(len - 4) + &tail
        } else {
            value.to_string()
        }
    }
}

/// Return true if a key name holds a credential that must never be logged.
fn is_secret_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("password") || k.contains("token") || k == "authorization"
}

/// Return true if a key name likely holds a subscriber phone number.
fn is_phone_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k == "from" || k == "to" || k.contains("phone") || k.contains("msisdn")
}

pub fn secure_serializable(v: impl Serialize) -> serde_json::Value {
    serde_json::to_value(v)
        .map(|value| secure_value(&value))
        .unwrap_or(serde_json::Value::Null)
}

/// Masked rendering of a raw response body. Non-JSON bodies are passed through.
pub fn secure_body(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => secure_value(&value).to_string(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

pub fn secure_value(v: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let is_secret = is_secret_key(k);
                let is_phone = is_phone_key(k);
                let new_val = match val {
                    Value::String(_) | Value::Number(_) if is_secret => {
                        Value::String("***".to_string())
                    }
                    Value::String(s) if is_phone => Value::String(Masked::mask(s)),
                    Value::Number(n) if is_phone => Value::String(Masked::mask(&n.to_string())),
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        other => other.clone(),
    }
}
