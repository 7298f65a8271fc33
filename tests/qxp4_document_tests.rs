//! End-to-end decoding of synthesized 4.x documents

mod common;

use common::builders::{DocumentBuilder, Shape};
use common::{read, rect_path, Call};
use qxprust::collector::GraphicFill;
use qxprust::{Color, DocumentType, NotificationType, QxpError, QxpVersion};

const A4: [f64; 4] = [0.0, 0.0, 842.0, 595.0];

#[test]
fn test_rectangle_and_text_box() {
    let mut doc = DocumentBuilder::qxp4();
    let story = doc.plain_story(b"Hello\tworld");
    doc.globals().page(
        A4,
        &[
            Shape::rect([10.0, 20.0, 60.0, 120.0]),
            Shape::text_head([100.0, 20.0, 200.0, 320.0], 5, story, 0),
        ],
    );

    let (result, sink) = read(doc.build());
    let report = result.unwrap();
    assert_eq!(report.version, QxpVersion::Qxp4);
    assert_eq!(report.document_type, DocumentType::Document);
    assert!(!report.notifications.has_type(NotificationType::Error));

    assert_eq!(sink.pages(), vec![(595.0, 842.0)]);
    let paths = sink.paths();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].0, rect_path(10.0, 20.0, 60.0, 120.0));
    assert_eq!(paths[0].1.fill, Some(GraphicFill::Solid(Color::RED)));

    let start = sink
        .calls
        .iter()
        .position(|c| matches!(c, Call::StartText(_)))
        .unwrap();
    assert_eq!(
        sink.calls[start + 1..start + 8].to_vec(),
        vec![
            Call::OpenParagraph,
            Call::OpenSpan,
            Call::Text("Hello".into()),
            Call::Tab,
            Call::Text("world".into()),
            Call::CloseSpan,
            Call::CloseParagraph,
        ]
    );
}

#[test]
fn test_rotating_cipher_across_pages() {
    let mut doc = DocumentBuilder::qxp4();
    let first = doc.plain_story(b"first");
    let second = doc.plain_story(b"second");
    doc.globals()
        .page(
            A4,
            &[
                Shape::text_head([100.0, 20.0, 200.0, 320.0], 1, first, 0),
                Shape::rect([10.0, 20.0, 60.0, 120.0]),
            ],
        )
        .page(
            A4,
            &[
                Shape::rect([10.0, 20.0, 60.0, 120.0]),
                Shape::rect([70.0, 20.0, 90.0, 120.0]),
                Shape::text_head([100.0, 20.0, 200.0, 320.0], 2, second, 0),
            ],
        );

    let (result, sink) = read(doc.build());
    result.unwrap();
    assert_eq!(sink.pages().len(), 2);
    assert_eq!(sink.paths().len(), 5);
    assert_eq!(
        sink.text_objects(),
        vec!["first".to_string(), "second".to_string()]
    );
}

#[test]
fn test_linked_chain_lengths() {
    let mut story = Vec::new();
    story.extend([b'x'; 30]);
    story.extend([b'y'; 40]);

    let mut doc = DocumentBuilder::qxp4();
    let head = doc.plain_story(&story);
    doc.globals().page(
        A4,
        &[
            Shape::text_head([100.0, 20.0, 200.0, 320.0], 4, head, 6),
            Shape::text_next([300.0, 20.0, 400.0, 320.0], 4, 6, 30, 0),
        ],
    );

    let (result, sink) = read(doc.build());
    result.unwrap();
    assert_eq!(sink.text_objects(), vec!["x".repeat(30), "y".repeat(40)]);
}

#[test]
fn test_group() {
    let mut doc = DocumentBuilder::qxp4();
    doc.globals().page(
        A4,
        &[
            Shape::group([10.0, 20.0, 160.0, 120.0], &[1, 2]),
            Shape::rect([10.0, 20.0, 60.0, 120.0]),
            Shape::rect([110.0, 20.0, 160.0, 120.0]),
        ],
    );

    let (result, sink) = read(doc.build());
    result.unwrap();
    let drawn: Vec<&Call> = sink
        .calls
        .iter()
        .filter(|c| matches!(c, Call::OpenGroup(_) | Call::CloseGroup | Call::Path(..)))
        .collect();
    assert_eq!(drawn.len(), 4);
    assert_eq!(drawn[0], &Call::OpenGroup(99));
    assert_eq!(drawn[3], &Call::CloseGroup);
}

#[test]
fn test_library_is_not_decoded() {
    let mut doc = DocumentBuilder::qxp4().with_type_code(b"LB");
    doc.globals().page(A4, &[Shape::rect([10.0, 20.0, 60.0, 120.0])]);

    let (result, sink) = read(doc.build());
    assert!(matches!(result, Err(QxpError::UnsupportedFormat(_))));
    assert!(sink.calls.is_empty());
}

#[test]
fn test_unknown_type_code_is_unsupported() {
    let mut doc = DocumentBuilder::qxp4().with_type_code(b"ZZ");
    doc.globals();

    let (result, _) = read(doc.build());
    assert!(matches!(result, Err(QxpError::UnsupportedFormat(_))));
}

#[test]
fn test_zero_cipher_state() {
    let mut doc = DocumentBuilder::qxp4().with_cipher(0, 0);
    doc.globals().page(
        A4,
        &[
            Shape::rect([10.0, 20.0, 60.0, 120.0]),
            Shape::rect([110.0, 20.0, 160.0, 120.0]),
        ],
    );

    let (result, sink) = read(doc.build());
    result.unwrap();
    assert_eq!(sink.paths().len(), 2);
}
