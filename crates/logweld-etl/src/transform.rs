//! Record-level transforms applied after the join.

use serde_json::Value;

use logweld_core::Record;

/// Buckets `status_code` into a coarse `response_category` field.
///
/// 2xx is `Success`, 4xx is `Client Error`, everything else (including 1xx
/// and 3xx) is `Server Error`. Records without a numeric `status_code` are
/// left untouched.
pub fn add_response_category(record: &mut Record) {
    let Some(code) = record.get("status_code").and_then(Value::as_i64) else {
        return;
    };
    let category = match code {
        200..=299 => "Success",
        400..=499 => "Client Error",
        _ => "Server Error",
    };
    record.insert("response_category".to_owned(), Value::from(category));
}

/// Applies every transform to every record, in order.
pub fn apply_transforms(records: &mut [Record], transforms: &[fn(&mut Record)]) {
    for record in records.iter_mut() {
        for transform in transforms {
            transform(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn status_codes_bucket_into_categories() {
        for (code, expected) in [
            (200, "Success"),
            (201, "Success"),
            (404, "Client Error"),
            (500, "Server Error"),
            (302, "Server Error"),
        ] {
            let mut r = record(json!({"status_code": code}));
            add_response_category(&mut r);
            assert_eq!(r["response_category"], json!(expected), "code {code}");
        }
    }

    #[test]
    fn records_without_status_code_are_untouched() {
        let mut r = record(json!({"user_id": "u1"}));
        add_response_category(&mut r);
        assert!(!r.contains_key("response_category"));
    }

    #[test]
    fn apply_transforms_runs_over_all_records() {
        let mut rows = vec![
            record(json!({"status_code": 200})),
            record(json!({"status_code": 404})),
        ];
        apply_transforms(&mut rows, &[add_response_category]);
        assert_eq!(rows[0]["response_category"], json!("Success"));
        assert_eq!(rows[1]["response_category"], json!("Client Error"));
    }
}
