//! Blocking HTTP client for the explorer backend.
//!
//! Routes and payload shapes follow the backend's REST API:
//! `POST /api/search`, `GET /api/images`, `GET|POST /api/images/{id}/labels`,
//! `DELETE /api/images/{id}/labels/{label_id}`, `POST /api/analyze`,
//! `GET /api/discover`.

use serde::Deserialize;
use serde_json::json;

use crate::error::RemoteError;
use crate::model::{CoercedDraft, ImageRecord, Label};

use super::{AnalysisType, MediaType, RemoteCollaborator};

/// `POST /api/analyze` response body.
#[derive(Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

/// `GET /api/discover` response body.
#[derive(Deserialize)]
struct DiscoverResponse {
    patterns: String,
}

/// REST client against a running backend.
pub struct HttpCollaborator {
    agent: ureq::Agent,
    api_base: String,
}

impl HttpCollaborator {
    /// Create a client for the given backend base URL (without `/api`).
    pub fn new(backend_url: impl Into<String>) -> Self {
        let base = backend_url.into();
        Self {
            agent: ureq::agent(),
            api_base: format!("{}/api", base.trim_end_matches('/')),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Map a ureq failure onto the error taxonomy.
    ///
    /// 404 → NotFound, 400/422 → Validation; everything else goes through
    /// the per-operation constructor.
    fn map_err(err: ureq::Error, op: fn(String) -> RemoteError) -> RemoteError {
        match err {
            ureq::Error::Status(404, resp) => RemoteError::NotFound(read_detail(resp)),
            ureq::Error::Status(400 | 422, resp) => RemoteError::Validation(read_detail(resp)),
            ureq::Error::Status(code, resp) => op(format!("HTTP {code}: {}", read_detail(resp))),
            ureq::Error::Transport(t) => op(t.to_string()),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(
        resp: ureq::Response,
        op: fn(String) -> RemoteError,
    ) -> Result<T, RemoteError> {
        let body = resp.into_string().map_err(|e| op(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| op(format!("malformed response: {e}")))
    }
}

/// Pull the error detail out of a failure response body, falling back to the
/// raw body or status text.
fn read_detail(resp: ureq::Response) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: String,
    }
    let status = resp.status_text().to_string();
    match resp.into_string() {
        Ok(body) => serde_json::from_str::<Detail>(&body)
            .map(|d| d.detail)
            .unwrap_or(if body.is_empty() { status } else { body }),
        Err(_) => status,
    }
}

impl RemoteCollaborator for HttpCollaborator {
    fn search_images(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<ImageRecord>, RemoteError> {
        log::debug!("searching archive for '{query}'");
        let resp = self
            .agent
            .post(&self.url("/search"))
            .send_json(json!({
                "query": query,
                "media_type": media_type.as_str(),
            }))
            .map_err(|e| Self::map_err(e, RemoteError::Search))?;
        Self::parse(resp, RemoteError::Search)
    }

    fn list_saved_images(&self) -> Result<Vec<ImageRecord>, RemoteError> {
        let resp = self
            .agent
            .get(&self.url("/images"))
            .call()
            .map_err(|e| Self::map_err(e, RemoteError::Gallery))?;
        Self::parse(resp, RemoteError::Gallery)
    }

    fn list_labels(&self, image_id: &str) -> Result<Vec<Label>, RemoteError> {
        let resp = self
            .agent
            .get(&self.url(&format!("/images/{image_id}/labels")))
            .call()
            .map_err(|e| Self::map_err(e, RemoteError::Load))?;
        Self::parse(resp, RemoteError::Load)
    }

    fn create_label(&self, image_id: &str, draft: &CoercedDraft) -> Result<Label, RemoteError> {
        log::debug!("persisting label '{}' on image {image_id}", draft.label);
        let resp = self
            .agent
            .post(&self.url(&format!("/images/{image_id}/labels")))
            .send_json(draft)
            .map_err(|e| Self::map_err(e, RemoteError::Persist))?;
        Self::parse(resp, RemoteError::Persist)
    }

    fn delete_label(&self, image_id: &str, label_id: &str) -> Result<(), RemoteError> {
        log::debug!("deleting label {label_id} on image {image_id}");
        self.agent
            .delete(&self.url(&format!("/images/{image_id}/labels/{label_id}")))
            .call()
            .map_err(|e| Self::map_err(e, RemoteError::Persist))?;
        Ok(())
    }

    fn analyze_image(
        &self,
        image_url: &str,
        analysis_type: AnalysisType,
    ) -> Result<String, RemoteError> {
        log::debug!("requesting {} analysis", analysis_type.as_str());
        let resp = self
            .agent
            .post(&self.url("/analyze"))
            .send_json(json!({
                "image_url": image_url,
                "analysis_type": analysis_type.as_str(),
            }))
            .map_err(|e| Self::map_err(e, RemoteError::Analysis))?;
        let parsed: AnalyzeResponse = Self::parse(resp, RemoteError::Analysis)?;
        Ok(parsed.analysis)
    }

    fn discover_patterns(&self) -> Result<String, RemoteError> {
        let resp = self
            .agent
            .get(&self.url("/discover"))
            .call()
            .map_err(|e| Self::map_err(e, RemoteError::Discovery))?;
        let parsed: DiscoverResponse = Self::parse(resp, RemoteError::Discovery)?;
        Ok(parsed.patterns)
    }
}
