use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A `{title, answer}` or `{title, amount}` entry from one of the JSON list
/// columns of a salary record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub label: String,
    pub value: Value,
}

#[derive(Deserialize)]
struct RawLineItem {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    amount: Option<Value>,
}

impl<'de> Deserialize<'de> for LineItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawLineItem::deserialize(deserializer)?;
        let value = match (raw.answer, raw.amount) {
            (Some(answer), _) if !answer.is_null() => answer,
            (_, Some(amount)) => amount,
            _ => Value::Null,
        };

        Ok(LineItem {
            label: raw.title.as_ref().map(display_value).unwrap_or_default(),
            value,
        })
    }
}

impl LineItem {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The value as printed on the report.
    pub fn display(&self) -> String {
        display_value(&self.value)
    }

    /// Numeric reading of the value; text that is not a number counts as 0.
    pub fn amount(&self) -> f64 {
        numeric_value(&self.value)
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numbers and numeric text; anything else, including `NaN` and infinities
/// spelled out in text, reads as 0.
pub fn numeric_value(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite()).unwrap_or(0.0)
}
