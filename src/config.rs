//! Client configuration parsed from environment variables.

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OCR_LANG: &str = "eng+rus";
pub const DEFAULT_TRANSCRIBE_LANG: &str = "ru-ru";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Recognition languages passed to the backend's OCR and speech services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionLangs {
    pub ocr: String,
    pub transcribe: String,
}

impl Default for RecognitionLangs {
    fn default() -> Self {
        Self { ocr: DEFAULT_OCR_LANG.to_owned(), transcribe: DEFAULT_TRANSCRIBE_LANG.to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeouts: Timeouts,
    pub langs: RecognitionLangs,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `NOTECANVAS_API_URL`: backend base URL, default `http://localhost:8000`
    /// - `NOTECANVAS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `NOTECANVAS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `NOTECANVAS_OCR_LANG`: default `eng+rus`
    /// - `NOTECANVAS_TRANSCRIBE_LANG`: default `ru-ru`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparsable numbers fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_url(&lookup("NOTECANVAS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()));
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("NOTECANVAS_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("NOTECANVAS_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let langs = RecognitionLangs {
            ocr: non_empty(lookup("NOTECANVAS_OCR_LANG")).unwrap_or_else(|| DEFAULT_OCR_LANG.to_owned()),
            transcribe: non_empty(lookup("NOTECANVAS_TRANSCRIBE_LANG"))
                .unwrap_or_else(|| DEFAULT_TRANSCRIBE_LANG.to_owned()),
        };
        Self { api_url, timeouts, langs }
    }

    /// Replace the base URL (e.g. from a command-line flag).
    #[must_use]
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_url(url);
        self
    }
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
