use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::modules::analysis::model::{
    ImageBatch, IncomingFile, Message, MessageLog, Selection, UploadedImage,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("{0}")]
    Schema(String),
    #[error("Nothing to analyze: select images or a message log first")]
    EmptyInput,
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },
}

fn schema(message: impl Into<String>) -> IntakeError {
    IntakeError::Schema(message.into())
}

pub fn supported_image_formats() -> Vec<&'static str> {
    vec!["png", "jpg", "jpeg", "gif", "webp", "heic", "bmp"]
}

fn extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn mime_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn is_generic(content_type: &str) -> bool {
    content_type.is_empty() || content_type == "application/octet-stream"
}

fn effective_type(file: &IncomingFile) -> String {
    let declared = file.content_type.trim().to_lowercase();
    if is_generic(&declared) {
        mime_type_for(&file.file_name).to_string()
    } else {
        declared
    }
}

fn is_image(file: &IncomingFile) -> bool {
    effective_type(file).starts_with("image/")
}

fn is_message_log(file: &IncomingFile) -> bool {
    let content_type = effective_type(file);
    content_type == "application/json" || content_type.ends_with("+json")
}

// Empty selection is a pending state, not an error.
pub fn classify(files: Vec<IncomingFile>) -> Result<Selection, IntakeError> {
    if files.is_empty() {
        return Ok(Selection::Empty);
    }

    if let Some(other) = files.iter().find(|f| !is_image(f) && !is_message_log(f)) {
        return Err(schema(format!(
            "Unsupported file `{}`: expected images or a JSON message log",
            other.file_name
        )));
    }

    let logs = files.iter().filter(|f| is_message_log(f)).count();
    match logs {
        0 => {
            let images = files
                .into_iter()
                .map(|f| UploadedImage {
                    content_type: effective_type(&f),
                    file_name: f.file_name,
                    bytes: f.bytes,
                })
                .collect();
            let (batch, notice) = ImageBatch::truncated(images);
            Ok(Selection::Images { batch, notice })
        }
        1 if files.len() == 1 => {
            let log = parse_message_log(&files[0].bytes)?;
            Ok(Selection::Log(log))
        }
        1 => Err(schema("A message log cannot be combined with images")),
        _ => Err(schema("Only one message log can be submitted at a time")),
    }
}

pub fn parse_message_log(bytes: &[u8]) -> Result<MessageLog, IntakeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| schema(format!("Invalid JSON: {}", e)))?;
    message_log_from_value(value)
}

pub fn message_log_from_value(value: Value) -> Result<MessageLog, IntakeError> {
    let Value::Array(items) = value else {
        return Err(schema("Expected a JSON array of messages"));
    };

    let messages = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| message_from_value(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    MessageLog::from_validated(messages).ok_or(IntakeError::EmptyInput)
}

fn string_field(index: usize, record: &serde_json::Map<String, Value>, key: &str) -> Result<String, IntakeError> {
    match record.get(key) {
        None => Err(schema(format!("Message {} is missing `{}`", index, key))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(schema(format!("Message {}: `{}` must be a string", index, key))),
    }
}

fn message_from_value(index: usize, item: Value) -> Result<Message, IntakeError> {
    let Value::Object(record) = item else {
        return Err(schema(format!("Message {} must be an object", index)));
    };

    let message = Message {
        document: string_field(index, &record, "document")?,
        text: string_field(index, &record, "text")?,
    };

    message
        .validate()
        .map_err(|e| schema(format!("Message {}: {}", index, e)))?;

    Ok(message)
}

pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<IncomingFile>, IntakeError> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|e| IntakeError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            Ok(IncomingFile {
                content_type: mime_type_for(&file_name).to_string(),
                file_name,
                bytes,
            })
        })
        .collect()
}
