use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::acquire::error::AttemptError;
use crate::acquire::plan::{AccessKind, AccessPath, AccessPathPlanner};
use crate::acquire::source::{FetchResponse, MapImageSource};
use crate::render::recording::{DrawOp, RecordingTarget};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([40, 80, 120, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn payload(bytes: Vec<u8>) -> AcquiredBytes {
    AcquiredBytes {
        bytes,
        content_type: "image/png".to_string(),
        path: AccessPath {
            kind: AccessKind::Direct,
            uri: "https://i/a.png".to_string(),
        },
    }
}

fn template(id: &str, w: u32, h: u32) -> Template {
    Template::new(id, format!("https://i/{id}.png"), format!("Meme {id}"), w, h).unwrap()
}

fn session() -> Session<RecordingTarget> {
    Session::new(RecordingTarget::new(), ComposeOpts::default())
}

fn exhausted() -> AcquireError {
    AcquireError::Exhausted {
        attempts: 5,
        last: AttemptError::Status {
            url: "https://relay/5".to_string(),
            status: 503,
        },
    }
}

#[test]
fn select_starts_pending_and_clears_captions() {
    let mut s = session();
    s.set_captions(Captions::new("a", "b")).unwrap();
    let ticket = s.select(template("1", 1200, 800));

    assert_eq!(ticket.generation(), 1);
    assert_eq!(ticket.template().id, "1");
    assert!(s.selection().unwrap().state.is_pending());
    assert_eq!(s.captions(), &Captions::default());
    assert!(s.is_current(&ticket));
}

#[test]
fn commit_success_renders_at_declared_size() {
    let mut s = session();
    let ticket = s.select(template("1", 1200, 800));
    // Declared size wins over the bitmap's own size.
    let outcome = s.commit(ticket, Ok(payload(png(30, 20)))).unwrap();

    assert_eq!(outcome, CommitOutcome::Ready);
    assert_eq!(s.target().size(), (600, 400));
    assert_eq!(
        s.target().ops()[1],
        DrawOp::Image {
            source: (30, 20),
            width: 600,
            height: 400
        }
    );
    assert_eq!(s.tracker().live(), 1);
}

#[test]
fn caption_edits_redraw_synchronously() {
    let mut s = session();
    let ticket = s.select(template("1", 1200, 800));
    s.commit(ticket, Ok(payload(png(4, 4)))).unwrap();

    let plan = s.set_top_text("TOP").unwrap().unwrap();
    assert_eq!(plan.top.lines, vec!["TOP"]);
    let plan = s.set_bottom_text("BOTTOM").unwrap().unwrap();
    assert_eq!(plan.top.lines, vec!["TOP"]);
    assert_eq!(plan.bottom.lines, vec!["BOTTOM"]);
    assert!((plan.bottom.line_y(0) - 348.4).abs() < 1e-9);
    assert_eq!(s.captions(), &Captions::new("TOP", "BOTTOM"));

    let ops = s.target().ops();
    let last_fills: Vec<&str> = ops
        .iter()
        .rev()
        .take(4)
        .filter_map(|op| match op {
            DrawOp::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(last_fills, vec!["BOTTOM", "TOP"]);
}

#[test]
fn edits_without_a_bitmap_draw_nothing() {
    let mut s = session();
    assert_eq!(s.set_top_text("x").unwrap(), None);
    s.select(template("1", 100, 100));
    assert_eq!(s.set_top_text("x").unwrap(), None);
    assert!(s.target().ops().is_empty());
}

#[test]
fn acquisition_failure_keeps_the_reason() {
    let mut s = session();
    let ticket = s.select(template("1", 100, 100));
    let outcome = s.commit(ticket, Err(exhausted())).unwrap();

    assert_eq!(outcome, CommitOutcome::Failed);
    let failure = s.selection().unwrap().state.failure().unwrap();
    assert_eq!(failure, &Failure::Acquisition(exhausted()));
    assert_eq!(failure.user_message(), "Image failed to load. Try another meme.");
    assert!(s.selection().unwrap().state.resource().is_none());
    assert_eq!(s.tracker().issued(), 0);
}

#[test]
fn decode_failure_draws_notice_over_previous_surface() {
    let mut s = session();
    let first = s.select(template("1", 400, 300));
    s.commit(first, Ok(payload(png(4, 3)))).unwrap();

    let second = s.select(template("2", 1000, 1000));
    let outcome = s.commit(second, Ok(payload(b"<html>not an image".to_vec()))).unwrap();

    assert_eq!(outcome, CommitOutcome::Failed);
    let state = &s.selection().unwrap().state;
    assert!(matches!(state.failure(), Some(Failure::Decode(_))));
    assert_eq!(
        state.failure().unwrap().user_message(),
        "Image could not be decoded. Try another meme."
    );
    // The undecodable bytes stay owned by the selection.
    assert!(state.resource().is_some());
    assert_eq!(s.tracker().live(), 1);

    assert_eq!(s.target().size(), (400, 300));
    assert_eq!(
        s.target().filled_text().last().copied(),
        Some("Image failed to load")
    );
}

#[test]
fn decode_failure_on_a_fresh_surface_draws_nothing() {
    let mut s = session();
    let ticket = s.select(template("1", 100, 100));
    s.commit(ticket, Ok(payload(vec![0, 1, 2]))).unwrap();
    assert!(s.target().ops().is_empty());
    assert!(matches!(s.export(), Err(MemeError::Export(_))));
}

#[test]
fn selecting_again_releases_previous_resource_exactly_once() {
    let mut s = session();
    let a = s.select(template("A", 100, 100));
    s.commit(a, Ok(payload(png(2, 2)))).unwrap();
    assert_eq!((s.tracker().live(), s.tracker().released()), (1, 0));

    let b = s.select(template("B", 100, 100));
    assert_eq!((s.tracker().live(), s.tracker().released()), (0, 1));
    s.commit(b, Ok(payload(png(2, 2)))).unwrap();
    assert_eq!((s.tracker().live(), s.tracker().released()), (1, 1));
    assert_eq!(s.tracker().issued(), 2);
}

#[test]
fn stale_result_is_released_and_ignored() {
    let mut s = session();
    let a = s.select(template("A", 100, 100));
    let b = s.select(template("B", 200, 100));
    assert!(!s.is_current(&a));

    let outcome = s.commit(a, Ok(payload(png(2, 2)))).unwrap();
    assert_eq!(outcome, CommitOutcome::Stale);
    assert_eq!(s.tracker().issued(), 1);
    assert_eq!(s.tracker().live(), 0);
    assert_eq!(s.selection().unwrap().template.id, "B");
    assert!(s.selection().unwrap().state.is_pending());
    assert!(s.target().ops().is_empty());

    assert_eq!(
        s.commit(b, Ok(payload(png(2, 2)))).unwrap(),
        CommitOutcome::Ready
    );
    assert_eq!(s.target().size(), (200, 100));
}

#[test]
fn stale_failure_is_ignored() {
    let mut s = session();
    let a = s.select(template("A", 100, 100));
    s.select(template("B", 100, 100));
    assert_eq!(s.commit(a, Err(exhausted())).unwrap(), CommitOutcome::Stale);
    assert!(s.selection().unwrap().state.is_pending());
}

#[test]
fn a_ticket_commits_only_once() {
    let mut s = session();
    let a = s.select(template("A", 100, 100));
    s.commit(a.clone(), Ok(payload(png(2, 2)))).unwrap();
    assert_eq!(
        s.commit(a, Ok(payload(png(2, 2)))).unwrap(),
        CommitOutcome::Stale
    );
    assert_eq!(s.tracker().live(), 1);
}

#[test]
fn back_releases_and_invalidates_in_flight_tickets() {
    let mut s = session();
    let a = s.select(template("A", 100, 100));
    s.commit(a, Ok(payload(png(2, 2)))).unwrap();

    let b = s.select(template("B", 100, 100));
    s.back();
    assert!(s.selection().is_none());
    assert_eq!(s.tracker().live(), 0);
    assert_eq!(s.commit(b, Ok(payload(png(2, 2)))).unwrap(), CommitOutcome::Stale);
    assert_eq!(s.tracker().live(), 0);

    let generation = s.generation();
    s.back();
    assert_eq!(s.generation(), generation);
    assert_eq!(s.tracker().released(), 2);
}

#[test]
fn export_names_artifact_after_template() {
    let mut s = session();
    assert!(matches!(s.export(), Err(MemeError::Export(_))));

    let ticket = s.select(template("61579", 300, 200));
    assert!(matches!(s.export(), Err(MemeError::Export(_))));
    s.commit(ticket, Ok(payload(png(3, 2)))).unwrap();

    let export = s.export().unwrap();
    assert_eq!(export.file_name, "meme-61579.png");
    let back = image::load_from_memory(&export.png).unwrap();
    assert_eq!((back.width(), back.height()), (300, 200));
}

#[test]
fn side_rounding_to_zero_renders_but_export_fails() {
    let target = crate::render::cpu::CpuTarget::from_font_path("tests/data/fonts/DejaVuSans-Bold.ttf")
        .unwrap();
    let mut s = Session::new(target, ComposeOpts::default());

    let ticket = s.select(template("thin", 2000, 1));
    let outcome = s.commit(ticket, Ok(payload(png(20, 1)))).unwrap();
    assert_eq!(outcome, CommitOutcome::Ready);
    assert_eq!(s.target().size(), (600, 0));

    let plan = s.set_top_text("STILL DRAWS").unwrap().unwrap();
    assert_eq!((plan.display_width, plan.display_height), (600, 0));

    match s.export() {
        Err(MemeError::Export(msg)) => assert!(!msg.contains("nothing rendered"), "{msg}"),
        other => panic!("expected export error, got {:?}", other.map(|e| e.file_name)),
    }
}

#[tokio::test]
async fn load_acquires_through_the_fallback_chain() {
    let t = template("7", 1200, 800);
    let paths = AccessPathPlanner::default().plan(&t.url);
    let source = Arc::new(
        MapImageSource::new()
            .fail(&paths[0].uri, "cors blocked")
            .respond(&paths[1].uri, FetchResponse::ok("image/png", png(12, 8))),
    );
    let acquirer = Acquirer::new(source.clone());

    let mut s = session();
    let outcome = s.load(&acquirer, t).await.unwrap();
    assert_eq!(outcome, CommitOutcome::Ready);
    assert_eq!(source.requests().len(), 2);
    let resource = s.selection().unwrap().state.resource().unwrap();
    assert_eq!(resource.payload().unwrap().path.kind, AccessKind::Relay(0));
    assert_eq!(resource.bitmap().unwrap().dimensions(), (12, 8));
}
