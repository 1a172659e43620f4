use serde_json::Value;

/// Normalize a raw like count: non-finite becomes 0, then round, then floor at 0.
pub fn clamp_likes(raw: f64) -> u64 {
    if !raw.is_finite() {
        return 0;
    }
    // `as` saturates at u64::MAX
    raw.round().max(0.0) as u64
}

/// Clamp an untyped JSON value. Numeric strings count; anything else is 0.
pub fn clamp_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| clamp_likes(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => s.trim().parse::<f64>().map(clamp_likes).unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clamps_edge_values() {
        assert_eq!(clamp_likes(f64::NAN), 0);
        assert_eq!(clamp_likes(f64::INFINITY), 0);
        assert_eq!(clamp_likes(f64::NEG_INFINITY), 0);
        assert_eq!(clamp_likes(-3.0), 0);
        assert_eq!(clamp_likes(-0.4), 0);
        assert_eq!(clamp_likes(2.5), 3);
        assert_eq!(clamp_likes(2.49), 2);
        assert_eq!(clamp_likes(41.0), 41);
    }

    #[test]
    fn clamp_is_idempotent() {
        for raw in [f64::NAN, -1.5, 0.0, 0.5, 1.0, 7.7, 1e300, f64::MAX] {
            let once = clamp_likes(raw);
            assert_eq!(clamp_likes(once as f64), once, "input {raw}");
        }
    }

    #[test]
    fn clamps_json_values() {
        assert_eq!(clamp_value(&json!(5)), 5);
        assert_eq!(clamp_value(&json!(-5)), 0);
        assert_eq!(clamp_value(&json!(4.6)), 5);
        assert_eq!(clamp_value(&json!("12")), 12);
        assert_eq!(clamp_value(&json!("twelve")), 0);
        assert_eq!(clamp_value(&json!(null)), 0);
        assert_eq!(clamp_value(&json!({"likes": 3})), 0);
        assert_eq!(clamp_value(&json!(u64::MAX)), u64::MAX);
    }
}
