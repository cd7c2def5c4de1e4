// src/features/encoder.rs

use serde::{Deserialize, Serialize};

/// Maps category strings to dense integer codes over a fixed, sorted
/// vocabulary. The vocabulary is fit once over every category the imputer
/// will ever see (train and test together), so encoding never meets an
/// unknown value; decoding rounds a possibly-fractional code back to the
/// nearest valid class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The placeholder used for missing entries before encoding: the first
    /// class in sorted order.
    pub fn first_class(&self) -> Option<&str> {
        self.classes.first().map(String::as_str)
    }

    pub fn encode(&self, value: &str) -> Option<f64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|idx| idx as f64)
    }

    /// Rounds to the nearest valid code and returns its class. An empty
    /// vocabulary (a column that was entirely missing) decodes to "".
    pub fn decode_rounded(&self, code: f64) -> &str {
        if self.classes.is_empty() {
            return "";
        }
        let max = (self.classes.len() - 1) as f64;
        let idx = code.round().clamp(0.0, max) as usize;
        &self.classes[idx]
    }
}
