use chrono::{DateTime, Local, NaiveDateTime};

/// Format a backend timestamp as `dd-mm-yyyy HH:MM` in local time.
/// Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS` form; anything else is returned as-is.
pub fn format_datetime(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Local).format("%d-%m-%Y %H:%M").to_string()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        dt.format("%d-%m-%Y %H:%M").to_string()
    } else {
        value.to_string()
    }
}

/// Format an optional timestamp, with a placeholder when missing
pub fn format_optional_datetime(value: Option<&str>, missing: &str) -> String {
    value.map(format_datetime).unwrap_or_else(|| missing.to_string())
}

/// Date portion only, `dd-mm-yyyy`
pub fn format_date(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Local).format("%d-%m-%Y").to_string()
    } else {
        let date: String = value.chars().take(10).collect();
        match chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(date) => date.format("%d-%m-%Y").to_string(),
            Err(_) => value.to_string(),
        }
    }
}

pub fn format_energy(value: Option<f64>) -> String {
    match value {
        Some(kwh) => format!("{:.2} kWh", kwh),
        None => "-".to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
