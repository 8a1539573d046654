//! Lenient deserializers for numeric fields the backend sends as either
//! JSON numbers or numeric strings (e.g. `"0.25"` for a tariff).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn parse(value: NumberOrString) -> Option<f64> {
    match value {
        NumberOrString::Number(n) => Some(n),
        NumberOrString::String(s) => s.trim().replace(',', ".").parse().ok(),
    }
}

pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(value.and_then(parse).unwrap_or(0.0))
}

pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(value.and_then(parse))
}

/// Accepts ids as numbers or strings and keeps them as strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Float(f64),
        Str(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
        Id::Str(s) => s,
    })
}
