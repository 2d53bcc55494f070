use serde::{Deserialize, Deserializer};

/// Memory suffixes, binary first so `Mi` is not read as `M`.
const MEMORY_SUFFIXES: [(&str, i64); 8] = [
    ("Ki", 1 << 10),
    ("Mi", 1 << 20),
    ("Gi", 1 << 30),
    ("Ti", 1 << 40),
    ("k", 1_000),
    ("M", 1_000_000),
    ("G", 1_000_000_000),
    ("T", 1_000_000_000_000),
];

/// Parses a memory quantity (`512Mi`, `2G`, `1048576`) into bytes.
pub fn parse_quantity(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    let (digits, factor) = MEMORY_SUFFIXES
        .iter()
        .find_map(|(suffix, factor)| raw.strip_suffix(suffix).map(|d| (d, *factor)))
        .unwrap_or((raw, 1));

    let value = digits
        .parse::<i64>()
        .map_err(|_| format!("invalid memory quantity '{}'", raw))?;
    value
        .checked_mul(factor)
        .ok_or_else(|| format!("memory quantity '{}' overflows", raw))
}

/// Parses a cpu quantity into millicores: `250m` or whole cores like `2`.
pub fn parse_cpu(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    match raw.strip_suffix('m') {
        Some(milli) => milli
            .parse::<i64>()
            .map_err(|_| format!("invalid cpu quantity '{}'", raw)),
        None => raw
            .parse::<i64>()
            .ok()
            .and_then(|cores| cores.checked_mul(1000))
            .ok_or_else(|| format!("invalid cpu quantity '{}'", raw)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Int(i64),
    Text(String),
}

/// Accepts a plain integer (bytes) or a quantity string.
pub fn de_memory<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Quantity::deserialize(deserializer)? {
        Quantity::Int(v) => Ok(v),
        Quantity::Text(s) => parse_quantity(&s).map_err(serde::de::Error::custom),
    }
}

/// Accepts a plain integer (millicores) or a cpu quantity string.
pub fn de_cpu<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Quantity::deserialize(deserializer)? {
        Quantity::Int(v) => Ok(v),
        Quantity::Text(s) => parse_cpu(&s).map_err(serde::de::Error::custom),
    }
}

pub fn human_bytes(bytes: i64) -> String {
    const GI: u64 = 1 << 30;
    const MI: u64 = 1 << 20;
    let sign = if bytes < 0 { "-" } else { "" };
    match bytes.unsigned_abs() {
        b if b >= GI && b % GI == 0 => format!("{}{}Gi", sign, b / GI),
        b if b >= MI && b % MI == 0 => format!("{}{}Mi", sign, b / MI),
        _ => bytes.to_string(),
    }
}

pub fn human_duration(dur: std::time::Duration) -> String {
    let secs = dur.as_secs();
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}
