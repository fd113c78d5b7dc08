use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::modules::analysis::model::{NormalizedResult, SentenceStats};
use crate::modules::analysis::schema::RawAnalyzerResponse;

// The engine wraps some values in one-element arrays and leaves others bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn first(self) -> Option<T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.into_iter().next(),
        }
    }
}

fn resolve<T: DeserializeOwned>(value: &Value) -> Option<T> {
    OneOrMany::<T>::deserialize(value).ok()?.first()
}

/// Looks `key` up at the top level, then under `details`. Anything absent,
/// empty or of the wrong type resolves to `None`.
fn field<T: DeserializeOwned>(raw: &Value, key: &str) -> Option<T> {
    let top = raw.get(key).and_then(resolve::<T>);
    top.or_else(|| {
        raw.get("details")
            .and_then(|details| details.get(key))
            .and_then(resolve::<T>)
    })
}

fn count(raw: &Value, key: &str) -> u64 {
    let value = field::<f64>(raw, key).unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

pub fn scale_score(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn normalize(raw: &RawAnalyzerResponse) -> NormalizedResult {
    let raw = &raw.0;

    NormalizedResult {
        is_romantic: field::<bool>(raw, "romantic").unwrap_or(false),
        score: scale_score(field::<f64>(raw, "sentiment_score").unwrap_or(0.0)),
        stats: SentenceStats {
            total: count(raw, "total_sentences"),
            positive: count(raw, "positive_sentences"),
            negative: count(raw, "negative_sentences"),
            neutral: count(raw, "neutral_sentences"),
        },
    }
}
