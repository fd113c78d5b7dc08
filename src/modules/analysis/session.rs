use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::modules::analysis::intake::{self, IntakeError};
use crate::modules::analysis::model::{
    AnalysisRequest, BatchLimitNotice, ImageBatch, IncomingFile, MessageLog, NormalizedResult,
    Selection, UploadedImage,
};
use crate::modules::analysis::normalizer;
use crate::modules::analysis::preview::{PreviewHandle, PreviewRegistry};
use crate::modules::analysis::unifier;
use crate::services::sentiment::{SentimentClient, SentimentError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A submission is already in progress")]
    Busy,
    #[error("No submission is in progress")]
    NotSubmitting,
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Gateway(#[from] SentimentError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Done(NormalizedResult),
    Error(String),
}

#[derive(Debug)]
pub struct StagedImage {
    pub image: UploadedImage,
    pub preview: PreviewHandle,
}

#[derive(Debug, Default)]
enum Staged {
    #[default]
    Nothing,
    Images(Vec<StagedImage>),
    Log(MessageLog),
}

/// One user's client-side flow. Only one submission may be in flight;
/// staging keeps working meanwhile since the request is built up front.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    document: u32,
    staged: Staged,
    state: SubmissionState,
    previews: PreviewRegistry,
}

impl Session {
    pub fn new(document: u32) -> Self {
        Self::with_registry(document, PreviewRegistry::new())
    }

    pub fn with_registry(document: u32, previews: PreviewRegistry) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
            staged: Staged::Nothing,
            state: SubmissionState::Idle,
            previews,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn staged_images(&self) -> &[StagedImage] {
        match &self.staged {
            Staged::Images(images) => images,
            _ => &[],
        }
    }

    pub fn staged_log(&self) -> Option<&MessageLog> {
        match &self.staged {
            Staged::Log(log) => Some(log),
            _ => None,
        }
    }

    // A failed selection leaves the current staging untouched.
    pub fn select(&mut self, files: Vec<IncomingFile>) -> Result<Option<BatchLimitNotice>, IntakeError> {
        let selection = intake::classify(files)?;

        let notice = match selection {
            Selection::Empty => {
                self.staged = Staged::Nothing;
                None
            }
            Selection::Log(log) => {
                self.staged = Staged::Log(log);
                None
            }
            Selection::Images { batch, notice } => {
                let staged = batch
                    .into_images()
                    .into_iter()
                    .map(|image| StagedImage {
                        preview: self.previews.acquire(&image),
                        image,
                    })
                    .collect();
                self.staged = Staged::Images(staged);
                notice
            }
        };

        if let Some(notice) = notice {
            warn!(session = %self.id, %notice, "Image selection truncated");
        }
        Ok(notice)
    }

    pub fn remove_image(&mut self, index: usize) -> Option<UploadedImage> {
        let Staged::Images(images) = &mut self.staged else {
            return None;
        };
        if index >= images.len() {
            return None;
        }

        let removed = images.remove(index);
        if images.is_empty() {
            self.staged = Staged::Nothing;
        }
        Some(removed.image)
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.state == SubmissionState::Submitting {
            return Err(SessionError::Busy);
        }
        self.staged = Staged::Nothing;
        self.state = SubmissionState::Idle;
        Ok(())
    }

    fn build_request(&self) -> Result<AnalysisRequest, IntakeError> {
        match &self.staged {
            Staged::Nothing => Err(IntakeError::EmptyInput),
            Staged::Log(log) => unifier::from_log(log, self.document),
            Staged::Images(images) => {
                let (batch, _) =
                    ImageBatch::truncated(images.iter().map(|s| s.image.clone()).collect());
                unifier::from_batch(batch, self.document)
            }
        }
    }

    pub fn begin_submission(&mut self) -> Result<AnalysisRequest, SessionError> {
        if self.state == SubmissionState::Submitting {
            return Err(SessionError::Busy);
        }

        let request = self.build_request()?;
        self.state = SubmissionState::Submitting;
        info!(session = %self.id, kind = request.kind(), "Submission started");
        Ok(request)
    }

    pub fn finish_submission(
        &mut self,
        outcome: Result<NormalizedResult, String>,
    ) -> Result<&SubmissionState, SessionError> {
        if self.state != SubmissionState::Submitting {
            return Err(SessionError::NotSubmitting);
        }

        self.state = match outcome {
            Ok(result) => SubmissionState::Done(result),
            Err(message) => SubmissionState::Error(message),
        };
        Ok(&self.state)
    }

    pub async fn submit(&mut self, client: &SentimentClient) -> Result<NormalizedResult, SessionError> {
        let request = self.begin_submission()?;

        match client.analyze(request).await {
            Ok(raw) => {
                let result = normalizer::normalize(&raw);
                self.finish_submission(Ok(result))?;
                Ok(result)
            }
            Err(e) => {
                self.finish_submission(Err(e.to_string()))?;
                Err(e.into())
            }
        }
    }
}
