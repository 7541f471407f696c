//! `RemoteStore` over the backend's JSON/HTTP API.
//!
//! Thin reqwest wrapper. Paths and response bodies are handled by pure
//! functions at the bottom of the file so they can be tested offline.

use std::time::Duration;

use async_trait::async_trait;
use canvas::note::{Canvas, CanvasId, Note, NoteDraft, NoteId, PositionUpdate, SizeUpdate};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CanvasListEntry, MediaKind, RemoteError, RemoteStore};
use crate::config::ClientConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Build a client for `config.api_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and return the raw body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().await.map_err(|e| RemoteError::Request(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| RemoteError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Response { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, RemoteError> {
        let text = self.send(request).await?;
        parse_json(&text)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_canvases(&self) -> Result<Vec<CanvasListEntry>, RemoteError> {
        self.send_json(self.http.get(self.url(&canvases_path()))).await
    }

    async fn get_canvas(&self, id: CanvasId) -> Result<Canvas, RemoteError> {
        self.send_json(self.http.get(self.url(&canvas_path(id)))).await
    }

    async fn create_canvas(&self, name: &str) -> Result<Canvas, RemoteError> {
        let body = CreateCanvasBody { name };
        self.send_json(self.http.post(self.url(&canvases_path())).json(&body)).await
    }

    async fn delete_canvas(&self, id: CanvasId) -> Result<(), RemoteError> {
        self.send(self.http.delete(self.url(&canvas_path(id)))).await?;
        Ok(())
    }

    async fn list_notes(&self, canvas: CanvasId) -> Result<Vec<Note>, RemoteError> {
        self.send_json(self.http.get(self.url(&notes_path(canvas)))).await
    }

    async fn create_note(&self, canvas: CanvasId, draft: &NoteDraft) -> Result<Note, RemoteError> {
        self.send_json(self.http.post(self.url(&notes_path(canvas))).json(draft)).await
    }

    async fn update_note(&self, canvas: CanvasId, note: &Note) -> Result<Note, RemoteError> {
        self.send_json(self.http.put(self.url(&note_path(canvas, note.id))).json(note)).await
    }

    async fn patch_positions(&self, canvas: CanvasId, updates: &[PositionUpdate]) -> Result<(), RemoteError> {
        let body = PatchBody { updates };
        self.send(self.http.patch(self.url(&positions_path(canvas))).json(&body)).await?;
        debug!(canvas_id = %canvas, count = updates.len(), "positions committed");
        Ok(())
    }

    async fn patch_sizes(&self, canvas: CanvasId, updates: &[SizeUpdate]) -> Result<(), RemoteError> {
        let body = PatchBody { updates };
        self.send(self.http.patch(self.url(&sizes_path(canvas))).json(&body)).await?;
        debug!(canvas_id = %canvas, count = updates.len(), "sizes committed");
        Ok(())
    }

    async fn delete_note(&self, canvas: CanvasId, note: NoteId) -> Result<(), RemoteError> {
        self.send(self.http.delete(self.url(&note_path(canvas, note)))).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        canvas: CanvasId,
        kind: MediaKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_owned()));
        let text = self.send(self.http.post(self.url(&upload_path(canvas, kind))).multipart(form)).await?;
        parse_upload_response(&text)
    }

    async fn ocr_existing(&self, canvas: CanvasId, file_path: &str, lang: &str) -> Result<String, RemoteError> {
        let body = RecognizeBody { file_path, lang };
        let text = self.send(self.http.post(self.url(&ocr_path(canvas))).json(&body)).await?;
        parse_ocr_response(&text)
    }

    async fn transcribe_existing(
        &self,
        canvas: CanvasId,
        file_path: &str,
        lang: &str,
    ) -> Result<String, RemoteError> {
        let body = RecognizeBody { file_path, lang };
        let text = self.send(self.http.post(self.url(&transcribe_path(canvas))).json(&body)).await?;
        parse_transcribe_response(&text)
    }
}

// =============================================================================
// PATHS
// =============================================================================

fn canvases_path() -> String {
    "/canvases".to_owned()
}

fn canvas_path(id: CanvasId) -> String {
    format!("/canvases/{id}")
}

fn notes_path(canvas: CanvasId) -> String {
    format!("/canvases/{canvas}/notes")
}

fn note_path(canvas: CanvasId, note: NoteId) -> String {
    format!("/canvases/{canvas}/notes/{note}")
}

fn positions_path(canvas: CanvasId) -> String {
    format!("/canvases/{canvas}/notes/positions")
}

fn sizes_path(canvas: CanvasId) -> String {
    format!("/canvases/{canvas}/notes/sizes")
}

fn upload_path(canvas: CanvasId, kind: MediaKind) -> String {
    format!("/canvases/{canvas}/upload/{}", kind.as_str())
}

fn ocr_path(canvas: CanvasId) -> String {
    format!("/canvases/{canvas}/ocr-existing")
}

fn transcribe_path(canvas: CanvasId) -> String {
    format!("/canvases/{canvas}/transcribe-existing")
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct CreateCanvasBody<'a> {
    name: &'a str,
}

#[derive(serde::Serialize)]
struct PatchBody<'a, T> {
    updates: &'a [T],
}

#[derive(serde::Serialize)]
struct RecognizeBody<'a> {
    file_path: &'a str,
    lang: &'a str,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    file_path: String,
}

#[derive(serde::Deserialize)]
struct OcrResponse {
    text: String,
}

#[derive(serde::Deserialize)]
struct TranscribeResponse {
    transcript: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, RemoteError> {
    serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))
}

fn parse_upload_response(json: &str) -> Result<String, RemoteError> {
    parse_json::<UploadResponse>(json).map(|r| r.file_path)
}

fn parse_ocr_response(json: &str) -> Result<String, RemoteError> {
    parse_json::<OcrResponse>(json).map(|r| r.text)
}

fn parse_transcribe_response(json: &str) -> Result<String, RemoteError> {
    parse_json::<TranscribeResponse>(json).map(|r| r.transcript)
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
