/// Compact display string for a count.
///
/// Non-finite input shows as `"0"` and negatives clamp to zero. Up to 999 one
/// decimal is kept (a trailing `.0` is dropped), up to 99 999 the value is
/// rounded up, then `K`/`M`/`B` bands floor. Anything larger is `"NaN"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let value = value.max(0.0);
    if value <= 999.0 {
        let tenths = (value * 10.0).round() as u64;
        return if tenths % 10 == 0 {
            (tenths / 10).to_string()
        } else {
            format!("{}.{}", tenths / 10, tenths % 10)
        };
    }
    if value <= 99_999.0 {
        return format!("{}", value.ceil());
    }
    if value <= 9_999_999.0 {
        return format!("{}K", (value / 1e3).floor());
    }
    if value <= 9_999_999_999.0 {
        return format!("{}M", (value / 1e6).floor());
    }
    if value <= 9_999_999_999_999.0 {
        return format!("{}B", (value / 1e9).floor());
    }
    "NaN".to_string()
}
