use serde::{Deserialize, Serialize};
use verse_pipeline::SelectedVerse;

/// Request payload for `POST /api/gita`.
#[derive(Debug, Deserialize)]
pub struct AskGitaRequest {
    pub question: String,
}

/// `data` of a successful `POST /api/gita`. Empty `verses` means no relevant verse was found.
#[derive(Debug, Serialize)]
pub struct AskGitaResponse {
    pub verses: Vec<SelectedVerse>,
}
