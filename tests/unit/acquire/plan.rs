use super::*;

#[test]
fn direct_path_is_first_and_unmodified() {
    let paths = AccessPathPlanner::default().plan("https://x/img.png");
    assert_eq!(paths.len(), 5);
    assert_eq!(paths[0].kind, AccessKind::Direct);
    assert_eq!(paths[0].uri, "https://x/img.png");
}

#[test]
fn relays_follow_in_declared_order() {
    let paths = AccessPathPlanner::default().plan("https://x/img.png");
    let enc = "https%3A%2F%2Fx%2Fimg.png";
    let uris: Vec<String> = paths.iter().skip(1).map(|p| p.uri.clone()).collect();
    assert_eq!(
        uris,
        vec![
            format!("https://corsproxy.io/?url={enc}"),
            format!("https://corsproxy.org/?{enc}"),
            format!("https://api.allorigins.win/raw?url={enc}"),
            format!("https://api.cors.lol/?url={enc}"),
        ]
    );
    for (i, p) in paths.iter().enumerate().skip(1) {
        assert_eq!(p.kind, AccessKind::Relay(i - 1));
    }
}

#[test]
fn planning_is_deterministic() {
    let planner = AccessPathPlanner::default();
    assert_eq!(planner.plan("https://x/a b.jpg"), planner.plan("https://x/a b.jpg"));
}

#[test]
fn encoding_matches_uri_component_rules() {
    assert_eq!(
        encode_uri_component("https://i.imgflip.com/1bij.jpg?a=1&b=two words"),
        "https%3A%2F%2Fi.imgflip.com%2F1bij.jpg%3Fa%3D1%26b%3Dtwo%20words"
    );
    assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
    assert_eq!(encode_uri_component("é"), "%C3%A9");
}

#[test]
fn duplicates_are_kept() {
    let planner = AccessPathPlanner::new([
        RelayTemplate::new("https://r/?u={url}"),
        RelayTemplate::new("https://r/?u={url}"),
    ]);
    let paths = planner.plan("https://x/y.png");
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[1].uri, paths[2].uri);
}

#[test]
fn relay_without_placeholder_appends() {
    let planner = AccessPathPlanner::new([RelayTemplate::new("https://r/raw?")]);
    let paths = planner.plan("https://x/y.png");
    assert_eq!(paths[1].uri, "https://r/raw?https%3A%2F%2Fx%2Fy.png");
}

#[test]
fn direct_only_yields_single_candidate() {
    let paths = AccessPathPlanner::direct_only().plan("https://x/y.png");
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].kind, AccessKind::Direct);
}
