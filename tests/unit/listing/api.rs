use super::*;

const LISTING: &str = r#"{
  "success": true,
  "data": {
    "memes": [
      {"id": "181913649", "name": "Drake Hotline Bling", "url": "https://i.imgflip.com/30b1gx.jpg", "width": 1200, "height": 1200, "box_count": 2, "captions": 1},
      {"id": "87743020", "name": "Two Buttons", "url": "https://i.imgflip.com/1g8my4.jpg", "width": 600, "height": 908, "box_count": 3},
      {"id": "112126428", "name": "Distracted Boyfriend", "url": "https://i.imgflip.com/1ur9b0.jpg", "width": 0}
    ]
  }
}"#;

fn names(ts: &[&Template]) -> Vec<String> {
    ts.iter().map(|t| t.name.clone()).collect()
}

#[test]
fn parses_templates_in_order() {
    let ts = parse_listing(LISTING.as_bytes()).unwrap();
    assert_eq!(ts.len(), 3);
    assert_eq!(ts[0].id, "181913649");
    assert_eq!(ts[0].url, "https://i.imgflip.com/30b1gx.jpg");
    assert_eq!(ts[0].dimensions(), (1200, 1200));
    assert_eq!(ts[1].dimensions(), (600, 908));
}

#[test]
fn zero_or_missing_dimensions_fall_back() {
    let ts = parse_listing(LISTING.as_bytes()).unwrap();
    assert_eq!(ts[2].dimensions(), (FALLBACK_DIMENSION, FALLBACK_DIMENSION));
}

#[test]
fn unsuccessful_listing_is_an_error() {
    let err = parse_listing(br#"{"success": false, "error_message": "rate limited"}"#).unwrap_err();
    assert!(matches!(err, MemeError::Listing(_)));
    assert!(err.to_string().contains("rate limited"), "{err}");

    let err = parse_listing(br#"{"success": false}"#).unwrap_err();
    assert!(matches!(err, MemeError::Listing(_)));
}

#[test]
fn malformed_listing_is_an_error() {
    for body in [
        &b"not json"[..],
        br#"{"success": true}"#,
        br#"{"success": true, "data": {}}"#,
        br#"{"success": true, "data": {"memes": [{"id": "1"}]}}"#,
    ] {
        let err = parse_listing(body).unwrap_err();
        assert!(matches!(err, MemeError::Listing(_)), "{err}");
    }
}

#[test]
fn filter_is_trimmed_and_case_insensitive() {
    let ts = parse_listing(LISTING.as_bytes()).unwrap();
    assert_eq!(
        names(&filter_templates(&ts, "  DRAKE ")),
        vec!["Drake Hotline Bling"]
    );
    assert_eq!(
        names(&filter_templates(&ts, "RA")),
        vec!["Drake Hotline Bling", "Distracted Boyfriend"]
    );
    assert!(filter_templates(&ts, "nope").is_empty());
}

#[test]
fn blank_filter_returns_everything() {
    let ts = parse_listing(LISTING.as_bytes()).unwrap();
    assert_eq!(filter_templates(&ts, "").len(), 3);
    assert_eq!(filter_templates(&ts, " \t").len(), 3);
}
