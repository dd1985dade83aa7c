//! # models::position
//!
//! Open positions as the broker reports them.
//!
//! Alpaca encodes every decimal as a JSON string, and any field may be missing
//! or garbage.  The wire record keeps raw text; [`Position`] holds the parsed
//! view where "malformed" and "absent" are the same thing: `None`.

use serde::Deserialize;
use serde_json::Value;

// ─── PositionSide ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
    /// Anything else the broker sends back, kept verbatim for the logs.
    Other(String),
}

impl PositionSide {
    /// Case-insensitive: `"LONG"`, `"Long"` and `" long "` are all long.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" => PositionSide::Long,
            "short" => PositionSide::Short,
            _ => PositionSide::Other(raw.to_string()),
        }
    }

    #[inline]
    pub fn is_long(&self) -> bool {
        matches!(self, PositionSide::Long)
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
            PositionSide::Other(raw) => write!(f, "{raw:?}"),
        }
    }
}

// ─── Position ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    /// Quantity exactly as the broker wrote it.  Sent back unchanged on a
    /// full-size sell so fractional shares keep their precision.
    pub qty: Option<String>,
    pub avg_entry_price: Option<f64>,
    pub current_price: Option<f64>,
    /// Unrealised P/L as a fraction (0.05 = 5%).  Kept even when NaN or
    /// infinite: a broker figure that is present but unusable must not be
    /// replaced by one derived from prices.
    pub unrealized_plpc: Option<f64>,
}

/// Row of `GET /v2/positions`.
///
/// Every field is an untyped JSON value so a number where a string was
/// expected (or `null`) never fails the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionRecord {
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub side: Option<Value>,
    #[serde(default)]
    pub qty: Option<Value>,
    #[serde(default)]
    pub avg_entry_price: Option<Value>,
    #[serde(default)]
    pub current_price: Option<Value>,
    #[serde(default)]
    pub unrealized_plpc: Option<Value>,
}

impl From<PositionRecord> for Position {
    fn from(record: PositionRecord) -> Self {
        let text = |v: &Option<Value>| v.as_ref().and_then(value_text);

        Self {
            symbol:          text(&record.symbol).unwrap_or_else(|| "?".to_string()),
            side:            PositionSide::parse(&text(&record.side).unwrap_or_default()),
            qty:             text(&record.qty),
            avg_entry_price: parse_decimal(text(&record.avg_entry_price).as_deref()),
            current_price:   parse_decimal(text(&record.current_price).as_deref()),
            unrealized_plpc: parse_number(text(&record.unrealized_plpc).as_deref()),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lenient decimal parse: absent, blank, non-numeric, NaN and infinities all
/// come back as `None`.
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    parse_number(raw).filter(|v| v.is_finite())
}

/// Like [`parse_decimal`] but keeps `NaN` and infinities.
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
