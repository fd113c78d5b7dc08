use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MAX_IMAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Contact,
}

// `document` is `S-<id>` for messages the user sent, `R-<id>` for received ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Message {
    #[validate(custom(function = "validate_document_tag"))]
    pub document: String,
    #[validate(length(min = 1, message = "Text cannot be empty"))]
    pub text: String,
}

fn validate_document_tag(document: &str) -> Result<(), ValidationError> {
    let rest = document
        .strip_prefix("S-")
        .or_else(|| document.strip_prefix("R-"));

    match rest {
        Some(id) if id.chars().next().is_some_and(|c| c != '\n') => Ok(()),
        _ => Err(ValidationError::new("document_prefix").with_message(Cow::Borrowed(
            "document must start with `S-` or `R-` followed by an identifier",
        ))),
    }
}

impl Message {
    pub fn sender(&self) -> Sender {
        if self.document.starts_with("S-") {
            Sender::User
        } else {
            Sender::Contact
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub(crate) fn from_validated(messages: Vec<Message>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self { messages })
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn sent_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender() == Sender::User)
            .count()
    }

    pub fn received_count(&self) -> usize {
        self.len() - self.sent_count()
    }
}

#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBatch {
    images: Vec<UploadedImage>,
}

impl ImageBatch {
    pub fn truncated(mut images: Vec<UploadedImage>) -> (Self, Option<BatchLimitNotice>) {
        let received = images.len();
        let notice = if received > MAX_IMAGES {
            images.truncate(MAX_IMAGES);
            Some(BatchLimitNotice {
                received,
                kept: MAX_IMAGES,
            })
        } else {
            None
        };

        (Self { images }, notice)
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<UploadedImage> {
        self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchLimitNotice {
    pub received: usize,
    pub kept: usize,
}

impl std::fmt::Display for BatchLimitNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} images selected, only the first {} were kept",
            self.received, self.kept
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Empty,
    Images {
        batch: ImageBatch,
        notice: Option<BatchLimitNotice>,
    },
    Log(MessageLog),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text { document: u32, text: String },
    Images { document: u32, images: Vec<UploadedImage> },
}

impl AnalysisRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisRequest::Text { .. } => "text",
            AnalysisRequest::Images { .. } => "images",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStats {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub is_romantic: bool,
    pub score: u8,
    pub stats: SentenceStats,
}

impl NormalizedResult {
    pub fn verdict(&self) -> &'static str {
        if self.is_romantic {
            "romantic"
        } else {
            "platonic"
        }
    }
}
