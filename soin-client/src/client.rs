//! Typed HTTP client for the SOIN REST contract.
//!
//! Authenticated calls take an explicit [`AuthContext`] constructed from the
//! session at call time; the client itself holds no credential state, only
//! the base URL and the connection pool.

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Result, SoinError};
use crate::identity::{Identity, Role};
use crate::session::AuthContext;
use crate::submission::{AdminStats, NewSubmission, Submission};

/// Successful login / registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: Identity,
}

/// Registration payload. Role selection happens here; a `Doctor` role yields
/// a pending identity on the server side.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterProfile {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Client for the SOIN backend API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the backend root URL (e.g.
    /// `http://localhost:8000`). The `/api` prefix is appended here.
    pub fn new(backend_url: impl AsRef<str>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let base_url = format!("{}/api", backend_url.as_ref().trim_end_matches('/'));
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a relative image path from a submission against the API base.
    pub fn resolve_image_url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        info!("logging in as {email}");
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read_auth_response(response).await
    }

    pub async fn register(&self, profile: &RegisterProfile) -> Result<AuthResponse> {
        info!("registering {} as {:?}", profile.email, profile.role);
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(profile)
            .send()
            .await?;
        Self::read_auth_response(response).await
    }

    /// Resolve a bearer token to the identity it belongs to.
    pub async fn me(&self, ctx: &AuthContext) -> Result<Identity> {
        let response = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(auth_failure(error_from_response(response).await))
        }
    }

    pub async fn submissions(&self, ctx: &AuthContext) -> Result<Vec<Submission>> {
        let response = self
            .http
            .get(self.url("/submissions"))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Create a submission: image bytes and field values in one multipart
    /// request. Not retried automatically; resubmission is an explicit
    /// user action.
    pub async fn create_submission(
        &self,
        ctx: &AuthContext,
        new: NewSubmission,
    ) -> Result<Submission> {
        if new.image_bytes.is_empty() {
            return Err(SoinError::InvalidSubmission(
                "a tongue image is required".to_string(),
            ));
        }

        let symptoms = serde_json::to_string(&new.symptoms)?;
        let medications = serde_json::to_string(&new.medications)?;
        let mime = image_mime(&new.image_file_name);

        let image = Part::bytes(new.image_bytes)
            .file_name(new.image_file_name)
            .mime_str(mime)?;

        let form = Form::new()
            .part("tongue_image", image)
            .text("blood_glucose", new.blood_glucose.to_string())
            .text("hba1c", new.hba1c.to_string())
            .text(
                "insulin_level",
                new.insulin_level.map(|v| v.to_string()).unwrap_or_default(),
            )
            .text("diabetes_type", new.diabetes_type.as_str())
            .text("symptoms", symptoms)
            .text("medications", medications)
            .text("notes", new.notes.unwrap_or_default());

        info!("uploading submission");
        let response = self
            .http
            .post(self.url("/submissions"))
            .bearer_auth(ctx.bearer())
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn admin_stats(&self, ctx: &AuthContext) -> Result<AdminStats> {
        let response = self
            .http
            .get(self.url("/admin/stats"))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn pending_doctors(&self, ctx: &AuthContext) -> Result<Vec<Identity>> {
        let response = self
            .http
            .get(self.url("/admin/pending-doctors"))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Approve or reject a pending doctor account.
    pub async fn approve_doctor(
        &self,
        ctx: &AuthContext,
        doctor_id: &str,
        approve: bool,
    ) -> Result<()> {
        info!("setting doctor {doctor_id} approval to {approve}");
        let response = self
            .http
            .post(self.url(&format!("/admin/approve-doctor/{doctor_id}")))
            .query(&[("approve", approve)])
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Download the full data export as archive bytes.
    pub async fn export_data(&self, ctx: &AuthContext) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url("/admin/export-data"))
            .bearer_auth(ctx.bearer())
            .send()
            .await?;
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            debug!("export archive: {} bytes", bytes.len());
            Ok(bytes.to_vec())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn read_auth_response(response: Response) -> Result<AuthResponse> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(auth_failure(error_from_response(response).await))
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

/// Decode the backend's `{"detail": message}` error shape.
async fn error_from_response(response: Response) -> SoinError {
    let status: StatusCode = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unspecified server error")
                .to_string()
        });
    SoinError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Auth endpoints surface the server reason as an authentication failure.
fn auth_failure(err: SoinError) -> SoinError {
    match err {
        SoinError::Api { message, .. } => SoinError::AuthFailed(message),
        other => other,
    }
}

fn image_mime(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}
