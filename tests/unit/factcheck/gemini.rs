use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn missing_or_empty_key_is_config_error() {
    assert!(matches!(
        FactCheckConfig::from_lookup(lookup(&[])),
        Err(FactCheckError::Config(_))
    ));
    assert!(matches!(
        FactCheckConfig::from_lookup(lookup(&[("API_KEY", "  ")])),
        Err(FactCheckError::Config(_))
    ));
}

#[test]
fn overrides_are_applied() {
    let cfg = FactCheckConfig::from_lookup(lookup(&[
        ("API_KEY", "k"),
        ("FACTCHECK_MODEL", "gemini-test"),
        ("FACTCHECK_ENDPOINT", "http://127.0.0.1:9/v1/"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_key, "k");
    assert_eq!(cfg.url(), "http://127.0.0.1:9/v1/models/gemini-test:generateContent");
    assert!(!format!("{cfg:?}").contains("\"k\""));
}

#[test]
fn default_url_targets_flash_model() {
    let cfg = FactCheckConfig::new("k");
    assert_eq!(
        cfg.url(),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[test]
fn request_enables_search_grounding() {
    let v = serde_json::to_value(request_body("hello")).unwrap();
    assert_eq!(v["contents"][0]["parts"][0]["text"], "hello");
    assert_eq!(v["contents"][0]["role"], "user");
    assert!(v["tools"][0]["googleSearch"].is_object());
}

#[test]
fn response_text_and_sources_are_extracted() {
    let body = r#"{
        "candidates": [{
            "content": {"parts": [{"text": "Mostly accurate. "}, {"text": "One date is off."}]},
            "groundingMetadata": {"groundingChunks": [
                {"web": {"uri": "https://a.example", "title": "A"}},
                {"retrievedContext": {}},
                {"web": {"uri": "https://b.example", "title": "B"}},
                {"web": {"uri": "https://a.example", "title": "A again"}},
                {"web": {"title": "no uri"}}
            ]}
        }]
    }"#;
    let r = parse_response(body).unwrap();
    assert_eq!(r.text, "Mostly accurate. One date is off.");
    let uris: Vec<&str> = r.sources.iter().map(|s| s.uri.as_str()).collect();
    assert_eq!(uris, ["https://a.example", "https://b.example"]);
    assert_eq!(r.sources[0].title, "A");
}

#[test]
fn response_without_grounding_has_no_sources() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#;
    let r = parse_response(body).unwrap();
    assert_eq!(r.text, "ok");
    assert!(r.sources.is_empty());
}

#[test]
fn malformed_or_empty_responses_are_upstream_errors() {
    assert!(matches!(
        parse_response("not json"),
        Err(FactCheckError::Upstream(_))
    ));
    assert!(matches!(
        parse_response(r#"{"candidates":[]}"#),
        Err(FactCheckError::Upstream(_))
    ));
}

#[test]
fn unreachable_endpoint_is_upstream_error() {
    let mut cfg = FactCheckConfig::new("k");
    cfg.endpoint = "http://127.0.0.1:9".to_owned();
    cfg.timeout = std::time::Duration::from_secs(2);
    let client = GeminiClient::new(cfg).unwrap();
    assert!(matches!(
        client.analyze("Title", ""),
        Err(FactCheckError::Upstream(_))
    ));
}

#[test]
fn blank_request_never_reaches_the_network() {
    let mut cfg = FactCheckConfig::new("k");
    cfg.endpoint = "http://127.0.0.1:9".to_owned();
    let client = GeminiClient::new(cfg).unwrap();
    assert!(matches!(
        client.analyze("", "  "),
        Err(FactCheckError::NothingToAnalyze)
    ));
}
