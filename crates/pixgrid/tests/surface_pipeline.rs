//! Loader → index → surface composition.
//!
//! A 150×150 grid of 10px cells in a 300×300 container mounts centered at
//! offset (-600, -600), so cells 60..90 on each axis are visible and cell
//! (70, 70) sits at screen (100, 100).

use std::sync::Arc;

use pixgrid::{
    Cell, CellCoord, CellSource, ChangeEvent, GridDataLoader, GridSurface, InputEvent, LoadError,
    MemoryCellSource, Point, PointerButton, PointerEvent, PointerEventKind, Recovery,
    ReleaseOutcome, SelectionChange, Size, SurfaceConfig, feed,
};
use web_time::Instant;

const CONFIG: &str = r#"
[index]
chunk_size = 16

[loader]
page_size = 2
max_retries = 0
"#;

fn rows() -> Vec<Cell> {
    vec![
        Cell::new("a", 70, 70)
            .with_owner("u1")
            .with_image("https://img.example/a.png")
            .with_link("https://a.example"),
        Cell::new("b", 71, 71),
        Cell::new("c", 120, 120).with_owner("u2"),
    ]
}

fn setup() -> (Arc<MemoryCellSource>, GridDataLoader, GridSurface) {
    let config = SurfaceConfig::from_toml_str(CONFIG)
        .unwrap()
        .validated()
        .unwrap();
    let source = Arc::new(MemoryCellSource::with_rows(rows()));
    let loader = GridDataLoader::new(
        Arc::clone(&source) as Arc<dyn CellSource>,
        config.to_loader_config(),
    );
    let mut surface = GridSurface::new(&config);
    surface.mount(Size::new(300.0, 300.0));
    (source, loader, surface)
}

fn pointer(kind: PointerEventKind, x: f64, y: f64) -> InputEvent {
    InputEvent::Pointer(PointerEvent::new(kind, x, y))
}

fn click(surface: &mut GridSurface, x: f64, y: f64) -> Option<SelectionChange> {
    let t = Instant::now();
    surface.handle(&pointer(PointerEventKind::Down(PointerButton::Primary), x, y), t);
    surface
        .handle(&pointer(PointerEventKind::Up(PointerButton::Primary), x, y), t)
        .selection
}

#[test]
fn reload_populates_visible_cells() {
    let (_source, loader, mut surface) = setup();
    assert_eq!(surface.controller().offset(), Point::new(-600.0, -600.0));

    let report = surface.reload(&loader).unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.indexed, 2);
    assert_eq!(report.pages, 2);
    assert_eq!(surface.index().chunk_size(), 16);

    let visible: Vec<_> = surface.visible_cells().iter().map(|c| c.id.clone()).collect();
    assert_eq!(visible, vec!["a".to_string()]);
    assert_eq!(
        surface.cell_at(Point::new(105.0, 105.0)).map(|c| c.id.as_str()),
        Some("a")
    );
}

#[test]
fn clicks_select_and_realtime_purchase_prunes() {
    let (_source, loader, mut surface) = setup();
    surface.reload(&loader).unwrap();

    assert_eq!(
        click(&mut surface, 105.0, 105.0),
        Some(SelectionChange::OwnedCellClicked {
            coord: CellCoord::new(70, 70),
            link_url: Some("https://a.example".into()),
        })
    );
    assert_eq!(
        click(&mut surface, 115.0, 115.0),
        Some(SelectionChange::Selected(CellCoord::new(71, 71)))
    );
    assert_eq!(
        click(&mut surface, 125.0, 115.0),
        Some(SelectionChange::Selected(CellCoord::new(72, 71)))
    );
    assert_eq!(surface.selection().len(), 2);

    // Someone else buys (71, 71) and (70, 70) is released.
    let (tx, mut rx) = feed::channel();
    tx.publish_json(
        r#"{"eventType":"UPDATE","new":{"id":"b","x":71,"y":71,"owner_id":"u3"},"old":{}}"#,
    )
    .unwrap();
    tx.publish(ChangeEvent::Delete { x: 70, y: 70 }).unwrap();

    assert_eq!(surface.sync(&loader, &mut rx), 2);
    assert!(!surface.selection().contains(CellCoord::new(71, 71)));
    assert!(surface.selection().contains(CellCoord::new(72, 71)));

    let visible: Vec<_> = surface.visible_cells().iter().map(|c| c.id.clone()).collect();
    assert_eq!(visible, vec!["b".to_string()]);
    assert_eq!(surface.sync(&loader, &mut rx), 0);
}

#[test]
fn drag_pans_without_selecting() {
    let (_source, loader, mut surface) = setup();
    surface.reload(&loader).unwrap();
    let t = Instant::now();

    surface.handle(&pointer(PointerEventKind::Down(PointerButton::Primary), 150.0, 150.0), t);
    surface.handle(&pointer(PointerEventKind::Move, 250.0, 150.0), t);
    surface.on_frame();
    assert_eq!(surface.controller().offset(), Point::new(-500.0, -600.0));

    let out = surface.handle(&pointer(PointerEventKind::Up(PointerButton::Primary), 250.0, 150.0), t);
    assert!(matches!(out.dispatch.outcome, Some(ReleaseOutcome::Pan { .. })));
    assert!(out.selection.is_none());
    assert!(surface.selection().is_empty());
    assert_eq!(surface.controller().visible_cells().x, 50);
}

#[test]
fn failed_reload_keeps_previous_index() {
    let (source, loader, mut surface) = setup();
    surface.reload(&loader).unwrap();
    let before = surface.index().len();

    source.fail_next([LoadError::permanent("permission denied")]);
    let err = surface.reload(&loader).unwrap_err();
    assert_eq!(err.recovery(), Recovery::KeepStaleIndex);
    assert_eq!(surface.index().len(), before);
    assert!(surface.index().has(70, 70));
}

#[test]
fn cancelled_loader_refuses_reload() {
    let (_source, loader, mut surface) = setup();
    loader.cancel();
    let err = surface.reload(&loader).unwrap_err();
    assert_eq!(err.recovery(), Recovery::Abandoned);
    assert!(surface.index().is_empty());
}
