use kurbo::{Affine, Point};
use mapedit_core::{EditOutcome, EditorInput, GeometryEditor, GeometryKind, InputMask, SessionController};
use mapedit_core::feature::FeatureStyle;
use mapedit_render::{HostSink, RecordingHost, ReadySignal, ready_pair};
use std::cell::RefCell;
use std::rc::Rc;

fn controller(host: &Rc<RefCell<RecordingHost>>, ready: &ReadySignal) -> SessionController {
    let mut controller = SessionController::new();
    for kind in GeometryKind::ALL {
        let sink = HostSink::new(host.clone(), ready.clone(), FeatureStyle::default());
        controller
            .register(kind, GeometryEditor::new(kind, Box::new(sink)))
            .unwrap();
    }
    controller
}

#[test]
fn test_editing_before_host_is_ready() {
    let host = Rc::new(RefCell::new(RecordingHost::with_view(Affine::scale(100.0))));
    let (ready, notifier) = ready_pair();
    let mut controller = controller(&host, &ready);

    controller.activate(GeometryKind::LineString).unwrap();
    controller.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
    controller.dispatch(EditorInput::Move(Point::new(0.0, 1.0)));
    assert_eq!(host.borrow().op_count(), 0);

    notifier.notify();
    pollster::block_on(ready.wait());

    // The next editor call replays the deferred open and preview.
    controller.dispatch(EditorInput::Click(Point::new(0.0, 1.0)));
    let host_ref = host.borrow();
    assert_eq!(host_ref.input(), InputMask::ALL);
    let preview = host_ref.source("mapedit-linestring-preview").unwrap();
    assert_eq!(preview["features"][0]["geometry"]["type"], "LineString");
}

#[test]
fn test_sync_sinks_replays_without_further_input() {
    let host = Rc::new(RefCell::new(RecordingHost::new()));
    let (ready, notifier) = ready_pair();
    let mut controller = controller(&host, &ready);

    controller.activate(GeometryKind::Polygon).unwrap();
    controller.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
    controller.sync_sinks();
    assert!(host.borrow().layer_ids().is_empty());

    notifier.notify();
    controller.sync_sinks();
    let host_ref = host.borrow();
    assert!(host_ref.source("mapedit-polygon-committed").is_some());
    assert!(!host_ref.layer_ids().is_empty());
    assert_eq!(host_ref.input(), InputMask::ALL);
    let preview = host_ref.source("mapedit-polygon-preview").unwrap();
    assert!(preview["features"].as_array().is_some_and(|f| !f.is_empty()));
}

#[test]
fn test_commit_reaches_host_and_clear_all_empties_it() {
    let host = Rc::new(RefCell::new(RecordingHost::new()));
    let mut controller = controller(&host, &ReadySignal::ready());

    controller.activate(GeometryKind::Polygon).unwrap();
    for p in [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)] {
        controller.dispatch(EditorInput::Click(p));
    }
    assert!(matches!(controller.dispatch(EditorInput::Finish), EditOutcome::Committed(_)));

    let committed = |host: &Rc<RefCell<RecordingHost>>| {
        host.borrow()
            .source("mapedit-polygon-committed")
            .and_then(|s| s["features"].as_array().cloned())
            .unwrap_or_default()
    };
    let features = committed(&host);
    assert!(features.iter().any(|f| f["geometry"]["type"] == "Polygon"));
    assert!(features.iter().any(|f| f["properties"]["labelKind"] == "area"));

    let preview = host.borrow().source("mapedit-polygon-preview").cloned();
    assert_eq!(preview.and_then(|p| p["features"].as_array().map(Vec::len)), Some(0));

    controller.clear_all();
    assert!(committed(&host).is_empty());
}

#[test]
fn test_dropping_the_controller_removes_layers() {
    let host = Rc::new(RefCell::new(RecordingHost::new()));
    let controller = {
        let mut c = controller(&host, &ReadySignal::ready());
        c.activate(GeometryKind::Point).unwrap();
        c.activate(GeometryKind::LineString).unwrap();
        c
    };
    assert!(!host.borrow().layer_ids().is_empty());
    drop(controller);
    assert!(host.borrow().layer_ids().is_empty());
}
