use perler_core::geometry::{MAX_ZOOM, MIN_ZOOM};
use perler_core::{
    BeadColor, CellIndex, Edit, PatternData, PointerEvent, Rgb, ScreenPoint, SessionState,
    ViewCommand,
};

fn pattern(width: u32, height: u32) -> PatternData {
    let white = BeadColor::new("H01", "White", Rgb::WHITE);
    let black = BeadColor::new("H18", "Black", Rgb::BLACK);
    PatternData::from_fn(width, height, |x, y| {
        if (x + y) % 3 == 0 {
            black.clone()
        } else {
            white.clone()
        }
    })
    .unwrap()
}

fn tap(session: &mut SessionState, pos: ScreenPoint) -> Option<ViewCommand> {
    session.handle_pointer(PointerEvent::Down { id: 0, pos });
    session.handle_pointer(PointerEvent::Up { id: 0, pos })
}

#[test]
fn tap_after_zoom_and_pan_selects_the_drawn_cell() {
    let mut session = SessionState::new(pattern(20, 15), 800.0, 600.0).unwrap();

    // Zoom in about an off-centre point, then drag.
    session.handle_pointer(PointerEvent::Wheel {
        delta_y: -1500.0,
        pos: Some(ScreenPoint::new(300.0, 250.0)),
    });
    assert!((session.controller().view().zoom - 2.5).abs() < 1e-9);
    session.handle_pointer(PointerEvent::Down { id: 0, pos: ScreenPoint::new(400.0, 300.0) });
    session.handle_pointer(PointerEvent::Move { id: 0, pos: ScreenPoint::new(420.0, 290.0) });
    session.handle_pointer(PointerEvent::Move { id: 0, pos: ScreenPoint::new(430.0, 280.0) });
    assert_eq!(session.handle_pointer(PointerEvent::Up { id: 0, pos: ScreenPoint::new(430.0, 280.0) }), None);

    for cell in [CellIndex::new(0, 0), CellIndex::new(3, 7), CellIndex::new(19, 14)] {
        let controller = session.controller();
        let at = controller.geometry().cell_center(controller.view(), cell);
        assert_eq!(tap(&mut session, at), Some(ViewCommand::SelectCell(cell)));
    }
}

#[test]
fn selected_cell_feeds_single_replace() {
    let mut session = SessionState::new(pattern(10, 10), 400.0, 400.0).unwrap();
    let target = CellIndex::new(3, 3);
    let at = {
        let c = session.controller();
        c.geometry().cell_center(c.view(), target)
    };
    let Some(ViewCommand::SelectCell(cell)) = tap(&mut session, at) else {
        panic!("tap should select a cell");
    };
    assert_eq!(cell, target);

    let red = BeadColor::new("H05", "Red", Rgb::new(200, 30, 40));
    let before = session.pattern().clone();
    session
        .apply(&Edit::ReplaceCell { x: cell.x, y: cell.y, with: red })
        .unwrap();
    let after = session.pattern();
    assert_eq!(after.cell(3, 3).unwrap().id, "H05");
    assert_eq!(after.count("H05"), 1);
    assert_eq!(after.count("H18"), before.count("H18") - 1);

    assert!(session.undo());
    assert_eq!(session.pattern(), &before);
}

#[test]
fn wheel_and_pinch_never_leave_zoom_limits() {
    let mut session = SessionState::new(pattern(8, 8), 300.0, 300.0).unwrap();
    for _ in 0..50 {
        session.handle_pointer(PointerEvent::Wheel { delta_y: -900.0, pos: None });
        let z = session.controller().view().zoom;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&z), "{z}");
    }
    assert_eq!(session.controller().view().zoom, MAX_ZOOM);

    // Pinch in hard.
    session.handle_pointer(PointerEvent::Down { id: 1, pos: ScreenPoint::new(0.0, 150.0) });
    session.handle_pointer(PointerEvent::Down { id: 2, pos: ScreenPoint::new(1000.0, 150.0) });
    for step in 1..=50 {
        let x = 1000.0 - step as f64 * 20.0;
        session.handle_pointer(PointerEvent::Move { id: 2, pos: ScreenPoint::new(x, 150.0) });
        let z = session.controller().view().zoom;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&z), "{z}");
    }
    assert_eq!(session.controller().view().zoom, MIN_ZOOM);
}

#[test]
fn loading_a_new_pattern_resets_the_view() {
    let mut session = SessionState::new(pattern(8, 8), 300.0, 300.0).unwrap();
    session.handle_pointer(PointerEvent::Wheel { delta_y: -500.0, pos: Some(ScreenPoint::new(10.0, 10.0)) });
    assert!(!session.controller().is_default_view());

    session.load_pattern(pattern(30, 12)).unwrap();
    assert!(session.controller().is_default_view());
    assert_eq!(session.controller().geometry().grid_width, 30);
    assert!(!session.can_undo());
}
