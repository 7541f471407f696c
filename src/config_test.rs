use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = ClientConfig::from_lookup(|_| None);
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.langs.ocr, "eng+rus");
    assert_eq!(cfg.langs.transcribe, "ru-ru");
    assert_eq!(cfg, ClientConfig::default());
}

#[test]
fn overrides_are_applied() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("NOTECANVAS_API_URL", "https://notes.example.test/api/"),
        ("NOTECANVAS_REQUEST_TIMEOUT_SECS", "42"),
        ("NOTECANVAS_CONNECT_TIMEOUT_SECS", "7"),
        ("NOTECANVAS_OCR_LANG", "eng"),
        ("NOTECANVAS_TRANSCRIBE_LANG", "en-us"),
    ]));
    assert_eq!(cfg.api_url, "https://notes.example.test/api");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.langs, RecognitionLangs { ocr: "eng".into(), transcribe: "en-us".into() });
}

#[test]
fn unparsable_timeouts_fall_back() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("NOTECANVAS_REQUEST_TIMEOUT_SECS", "soon"),
        ("NOTECANVAS_CONNECT_TIMEOUT_SECS", "-3"),
    ]));
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn blank_langs_fall_back() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("NOTECANVAS_OCR_LANG", "  ")]));
    assert_eq!(cfg.langs.ocr, DEFAULT_OCR_LANG);
}

#[test]
fn with_api_url_trims_trailing_slashes() {
    let cfg = ClientConfig::default().with_api_url("http://127.0.0.1:9000//");
    assert_eq!(cfg.api_url, "http://127.0.0.1:9000");
}
