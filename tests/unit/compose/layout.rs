use proptest::prelude::*;

use super::*;
use crate::render::recording::RecordingTarget;

/// 10 px per glyph at size 10 (advance ratio 1.0).
fn measurer() -> RecordingTarget {
    RecordingTarget::with_advance_ratio(1.0)
}

#[test]
fn scale_keeps_sizes_that_fit() {
    assert_eq!(scale_size(600, 600, 600), (600, 600));
    assert_eq!(scale_size(500, 300, 600), (500, 300));
    assert_eq!(scale_size(1, 1, 600), (1, 1));
}

#[test]
fn scale_maps_larger_side_to_max() {
    assert_eq!(scale_size(1200, 800, 600), (600, 400));
    assert_eq!(scale_size(800, 1200, 600), (400, 600));
    assert_eq!(scale_size(601, 10, 600), (600, 10));
}

#[test]
fn scale_rounds_each_side_independently() {
    // r = 600 / 937; 500 * r = 320.17..
    assert_eq!(scale_size(937, 500, 600), (600, 320));
    // r = 600 / 1001; 333 * r = 199.6..
    assert_eq!(scale_size(1001, 333, 600), (600, 200));
}

#[test]
fn font_and_stroke_sizes_have_floors() {
    let opts = ComposeOpts::default();
    assert_eq!(font_size_for(600, &opts), 33);
    assert_eq!(font_size_for(200, &opts), 24);
    assert_eq!(font_size_for(431, &opts), 24);
    assert_eq!(font_size_for(450, &opts), 25);
    assert_eq!(stroke_width_for(33, &opts), 3);
    assert_eq!(stroke_width_for(24, &opts), 2);
    assert_eq!(stroke_width_for(19, &opts), 2);
}

#[test]
fn wrap_empty_and_blank_yield_one_empty_line() {
    let mut m = measurer();
    assert_eq!(wrap_lines("", 100.0, 10.0, &mut m), vec![String::new()]);
    assert_eq!(wrap_lines("   \t\n ", 100.0, 10.0, &mut m), vec![String::new()]);
}

#[test]
fn wrap_greedily_fills_lines() {
    let mut m = measurer();
    // 10 glyphs of 10 px fit in 100 px.
    let lines = wrap_lines("aaa bbb ccc ddd", 100.0, 10.0, &mut m);
    assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);

    let lines = wrap_lines("aaaa bbbbb c", 100.0, 10.0, &mut m);
    assert_eq!(lines, vec!["aaaa bbbbb", "c"]);
}

#[test]
fn wrap_collapses_whitespace_runs() {
    let mut m = measurer();
    let lines = wrap_lines("  one \t two\n\nthree  ", 1000.0, 10.0, &mut m);
    assert_eq!(lines, vec!["one two three"]);
}

#[test]
fn wrap_never_splits_an_oversized_word() {
    let mut m = measurer();
    let lines = wrap_lines("hi supercalifragilistic yo", 100.0, 10.0, &mut m);
    assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
}

#[test]
fn end_to_end_layout_for_a_large_template() {
    let mut m = RecordingTarget::new();
    let plan = plan_layout(
        (1200, 800),
        &Captions::new("TOP", "BOTTOM"),
        &ComposeOpts::default(),
        &mut m,
    );

    assert_eq!((plan.display_width, plan.display_height), (600, 400));
    assert_eq!(plan.font_size_px, 33);
    assert!((plan.line_height_px - 39.6).abs() < 1e-9);
    assert_eq!(plan.top.lines, vec!["TOP"]);
    assert_eq!(plan.top.line_y(0), 12.0);
    assert_eq!(plan.bottom.lines, vec!["BOTTOM"]);
    assert!((plan.bottom.line_y(0) - 348.4).abs() < 1e-9);
    assert_eq!(plan.center_x(), 300.0);
    assert_eq!(plan.display_size(), Size::new(600.0, 400.0));
}

#[test]
fn blank_bottom_caption_still_reserves_one_line() {
    let mut m = RecordingTarget::new();
    let plan = plan_layout(
        (600, 400),
        &Captions::new("TOP", ""),
        &ComposeOpts::default(),
        &mut m,
    );
    assert_eq!(plan.bottom.lines, vec![""]);
    assert!((plan.bottom.y_start - (400.0 - 12.0 - plan.line_height_px)).abs() < 1e-9);
}

#[test]
fn bottom_block_grows_upward() {
    // 0.6 * 33 = 19.8 px per glyph; 576 px fits 29 glyphs.
    let mut m = RecordingTarget::new();
    let bottom = "word ".repeat(20);
    let plan = plan_layout(
        (600, 400),
        &Captions::new("", bottom.trim()),
        &ComposeOpts::default(),
        &mut m,
    );
    let n = plan.bottom.lines.len();
    assert!(n > 1);
    let last_bottom_edge = plan.bottom.line_y(n - 1) + plan.line_height_px;
    assert!((last_bottom_edge - (400.0 - 12.0)).abs() < 1e-9);
    assert!((plan.bottom.height() - n as f64 * plan.line_height_px).abs() < 1e-9);
}

proptest! {
    #[test]
    fn wrapped_lines_fit_unless_single_word(
        words in prop::collection::vec("[a-zA-Z]{1,14}", 0..30),
        max_width in 20.0f32..400.0,
    ) {
        let text = words.join(" ");
        let mut m = measurer();
        let lines = wrap_lines(&text, max_width, 2.0, &mut m);

        prop_assert!(!lines.is_empty());
        for line in &lines {
            let w = m.measure_text(line, 2.0);
            prop_assert!(w <= max_width || !line.contains(' '), "{line:?} is {w} > {max_width}");
        }
        // No word is lost, reordered or split.
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).filter(|w| !w.is_empty()).collect();
        let expected: Vec<&str> = words.iter().map(String::as_str).collect();
        prop_assert_eq!(rejoined, expected);
    }
}
