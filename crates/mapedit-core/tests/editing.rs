use kurbo::Point;
use mapedit_core::input::IdentityProjection;
use mapedit_core::{
    CommittedFeature, Cursor, EditOutcome, EditorInput, GeometryEditor, GeometryKind, GeometryUpdate, InputMask,
    InputTranslator, LabelKind, MouseButton, PointerEvent, RenderSink, SessionController, SessionEvent, SwitchPolicy,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recorded {
    last_update: Option<GeometryUpdate>,
    committed: Vec<CommittedFeature>,
    cursor: Option<Cursor>,
    input: Option<InputMask>,
}

struct RecordingSink(Rc<RefCell<Recorded>>);

impl RenderSink for RecordingSink {
    fn open(&mut self, _kind: GeometryKind) {}
    fn push(&mut self, update: &GeometryUpdate) {
        self.0.borrow_mut().last_update = Some(update.clone());
    }
    fn commit(&mut self, feature: &CommittedFeature) {
        self.0.borrow_mut().committed.push(feature.clone());
    }
    fn clear_committed(&mut self) {
        self.0.borrow_mut().committed.clear();
    }
    fn set_input(&mut self, mask: InputMask) {
        self.0.borrow_mut().input = Some(mask);
    }
    fn set_cursor(&mut self, cursor: Cursor) {
        self.0.borrow_mut().cursor = Some(cursor);
    }
    fn close(&mut self) {}
}

fn recording_editor(kind: GeometryKind) -> (GeometryEditor, Rc<RefCell<Recorded>>) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let editor = GeometryEditor::new(kind, Box::new(RecordingSink(recorded.clone())));
    (editor, recorded)
}

#[test]
fn test_linestring_double_click_scenario() {
    let (mut editor, recorded) = recording_editor(GeometryKind::LineString);
    let finished = Rc::new(RefCell::new(Vec::new()));
    let target = finished.clone();
    editor.on_finish(move |f| target.borrow_mut().push(f));

    editor.start();
    editor.on_click(Point::new(0.0, 0.0));
    editor.on_pointer_move(Point::new(0.0, 1.0));
    editor.on_click(Point::new(0.0, 1.0));
    editor.on_pointer_move(Point::new(0.0, 2.0));
    let outcome = editor.on_double_click(Point::new(0.0, 2.0));

    assert!(matches!(outcome, EditOutcome::Committed(_)));
    let finished = finished.borrow();
    assert_eq!(finished.len(), 1);
    let feature = &finished[0];
    assert_eq!(
        feature.vertices,
        vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(0.0, 2.0)]
    );

    let segments: Vec<_> = feature
        .labels
        .iter()
        .filter(|l| l.kind == LabelKind::Segment)
        .collect();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "111.195km");
    assert_eq!(segments[0].position, Point::new(0.0, 0.5));
    assert!(feature.labels.iter().any(|l| l.text == "222.390km"));
    assert!(feature.labels.iter().all(|l| l.kind != LabelKind::Preview));

    let recorded = recorded.borrow();
    assert_eq!(recorded.committed.len(), 1);
    assert!(recorded.last_update.as_ref().is_some_and(GeometryUpdate::is_empty));
    assert_eq!(recorded.cursor, Some(Cursor::Default));
    assert_eq!(recorded.input, Some(InputMask::NONE));
}

#[test]
fn test_right_click_until_empty() {
    let (mut editor, recorded) = recording_editor(GeometryKind::LineString);
    editor.start();
    editor.on_click(Point::new(0.0, 0.0));
    editor.on_click(Point::new(1.0, 0.0));
    editor.on_click(Point::new(2.0, 0.0));
    editor.on_pointer_move(Point::new(3.0, 0.0));

    assert_eq!(editor.on_right_click(), EditOutcome::Updated);
    assert_eq!(editor.buffer().real_vertices().len(), 2);
    // The ghost stays at the pointer, trailing the new last vertex.
    assert_eq!(editor.buffer().ghost(), Some(Point::new(3.0, 0.0)));

    assert_eq!(editor.on_right_click(), EditOutcome::Updated);
    assert_eq!(editor.on_right_click(), EditOutcome::Updated);
    assert!(!editor.is_drawing());
    assert_eq!(editor.on_right_click(), EditOutcome::Ignored);

    // Still listening: the next click starts a new session.
    assert!(editor.is_active());
    editor.on_click(Point::new(5.0, 5.0));
    assert_eq!(editor.buffer().real_vertices(), &[Point::new(5.0, 5.0)]);
    assert!(recorded.borrow().committed.is_empty());
}

#[test]
fn test_polygon_commit_is_closed_with_area() {
    let (mut editor, recorded) = recording_editor(GeometryKind::Polygon);
    editor.start();
    for p in [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)] {
        editor.on_click(p);
    }
    assert!(recorded.borrow().committed.is_empty());

    assert!(matches!(editor.finish(), EditOutcome::Committed(_)));
    let recorded = recorded.borrow();
    let feature = &recorded.committed[0];
    assert_eq!(feature.vertices.len(), 4);
    assert_eq!(feature.vertices.first(), feature.vertices.last());
    let area = feature.labels.iter().find(|l| l.kind == LabelKind::Area);
    assert!(area.is_some_and(|l| l.text.ends_with("km²")));
    assert!(feature.labels.iter().any(|l| l.kind == LabelKind::Perimeter));
}

#[test]
fn test_polygon_finish_with_two_vertices_discards() {
    let (mut editor, recorded) = recording_editor(GeometryKind::Polygon);
    editor.start();
    editor.on_click(Point::new(0.0, 0.0));
    editor.on_click(Point::new(1.0, 0.0));
    editor.on_pointer_move(Point::new(1.0, 1.0));
    assert_eq!(editor.finish(), EditOutcome::Discarded);
    assert!(recorded.borrow().committed.is_empty());
}

fn controller_with(recorded: &Rc<RefCell<Recorded>>) -> SessionController {
    let mut controller = SessionController::new();
    for kind in GeometryKind::ALL {
        let editor = GeometryEditor::new(kind, Box::new(RecordingSink(recorded.clone())));
        controller.register(kind, editor).unwrap();
    }
    controller
}

fn click_through(translator: &mut InputTranslator, controller: &mut SessionController, x: f64, y: f64) {
    let position = Point::new(x, y);
    for event in [
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
        },
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        },
    ] {
        for input in translator.handle_pointer_event(event, &IdentityProjection) {
            controller.dispatch(input);
        }
    }
}

#[test]
fn test_translated_pointer_events_drive_the_active_editor() {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let mut controller = controller_with(&recorded);
    let mut translator = InputTranslator::new();
    let events = controller.subscribe();
    controller.activate(GeometryKind::LineString).unwrap();

    click_through(&mut translator, &mut controller, 0.0, 0.0);
    click_through(&mut translator, &mut controller, 0.0, 40.0);
    // Second click at the same spot completes a double-click.
    click_through(&mut translator, &mut controller, 0.0, 40.0);

    assert_eq!(recorded.borrow().committed.len(), 1);
    assert_eq!(recorded.borrow().committed[0].vertices.len(), 2);
    assert_eq!(controller.active(), None);

    let received: Vec<_> = events.try_iter().collect();
    assert!(matches!(received[0], SessionEvent::Activated { kind: GeometryKind::LineString }));
    assert!(received.iter().any(|e| matches!(e, SessionEvent::Committed { .. })));
    assert!(matches!(received.last(), Some(SessionEvent::Deactivated { .. })));
}

#[test]
fn test_point_double_click_commits_one_point() {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let mut controller = controller_with(&recorded);
    let mut translator = InputTranslator::new();
    controller.activate(GeometryKind::Point).unwrap();

    click_through(&mut translator, &mut controller, 10.0, 10.0);
    click_through(&mut translator, &mut controller, 10.0, 10.0);

    let recorded = recorded.borrow();
    assert_eq!(recorded.committed.len(), 1);
    assert_eq!(recorded.committed[0].vertices, vec![Point::new(10.0, 10.0)]);
    assert_eq!(controller.active(), Some(GeometryKind::Point));
}

#[test]
fn test_double_click_jitter_adds_no_vertex() {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let mut controller = controller_with(&recorded);
    let mut translator = InputTranslator::new();
    controller.activate(GeometryKind::LineString).unwrap();

    click_through(&mut translator, &mut controller, 0.0, 0.0);
    click_through(&mut translator, &mut controller, 0.0, 100.0);
    click_through(&mut translator, &mut controller, 0.0, 102.0);

    let recorded = recorded.borrow();
    assert_eq!(recorded.committed.len(), 1);
    assert_eq!(
        recorded.committed[0].vertices,
        vec![Point::new(0.0, 0.0), Point::new(0.0, 100.0)]
    );
}

#[test]
fn test_switching_editors_with_cancel_policy() {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let mut controller = controller_with(&recorded);
    controller.set_switch_policy(SwitchPolicy::Cancel);
    controller.activate(GeometryKind::Polygon).unwrap();
    for p in [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)] {
        controller.dispatch(EditorInput::Click(p));
    }
    controller.activate(GeometryKind::Point).unwrap();
    assert!(recorded.borrow().committed.is_empty());

    controller.dispatch(EditorInput::Click(Point::new(4.0, 4.0)));
    assert_eq!(recorded.borrow().committed.len(), 1);
    assert_eq!(recorded.borrow().committed[0].kind, GeometryKind::Point);

    controller.clear_all();
    assert!(recorded.borrow().committed.is_empty());
}

#[test]
fn test_keyboard_finish_and_undo() {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let mut controller = controller_with(&recorded);
    controller.activate(GeometryKind::LineString).unwrap();
    controller.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
    controller.dispatch(EditorInput::Click(Point::new(0.0, 1.0)));
    controller.dispatch(EditorInput::Click(Point::new(0.0, 2.0)));
    assert_eq!(controller.dispatch(EditorInput::Undo), EditOutcome::Updated);
    assert!(matches!(controller.dispatch(EditorInput::Finish), EditOutcome::Committed(_)));
    assert_eq!(recorded.borrow().committed[0].vertices.len(), 2);
}
