use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::modules::analysis::model::NormalizedResult;
use crate::modules::analysis::stats::StatsView;

#[derive(Debug, Serialize)]
pub struct SentimentPayload<'a> {
    pub document: u32,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawAnalyzerResponse(pub Value);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub id: String,
    #[serde(flatten)]
    pub result: NormalizedResult,
    pub percentages: StatsView,
    pub analyzed_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiResponse {
    pub fn ok(data: AnalysisData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn failure(error: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormatsResponse {
    pub formats: Vec<&'static str>,
    pub max_images: usize,
}
