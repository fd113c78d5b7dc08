use crate::modules::analysis::intake::IntakeError;
use crate::modules::analysis::model::{AnalysisRequest, ImageBatch, MessageLog, Selection};

// Sender tags are not part of the corpus.
pub fn flatten_corpus(log: &MessageLog) -> String {
    log.messages()
        .iter()
        .flat_map(|m| m.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn from_log(log: &MessageLog, document: u32) -> Result<AnalysisRequest, IntakeError> {
    let text = flatten_corpus(log);
    if text.is_empty() {
        return Err(IntakeError::EmptyInput);
    }

    Ok(AnalysisRequest::Text { document, text })
}

pub fn from_batch(batch: ImageBatch, document: u32) -> Result<AnalysisRequest, IntakeError> {
    if batch.is_empty() {
        return Err(IntakeError::EmptyInput);
    }

    Ok(AnalysisRequest::Images {
        document,
        images: batch.into_images(),
    })
}

pub fn unify(selection: Selection, document: u32) -> Result<AnalysisRequest, IntakeError> {
    match selection {
        Selection::Empty => Err(IntakeError::EmptyInput),
        Selection::Log(log) => from_log(&log, document),
        Selection::Images { batch, .. } => from_batch(batch, document),
    }
}
