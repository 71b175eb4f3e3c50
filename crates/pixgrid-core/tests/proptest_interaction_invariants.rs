//! Property-based invariant tests for the grid interaction controller.
//!
//! These tests drive `GridInteractionController` with arbitrary input
//! sequences and check:
//!
//! 1. The committed offset always lies in the clamp range
//! 2. The adopted zoom always lies in `[min_zoom, max_zoom]`
//! 3. Every proposed zoom is already clamped
//! 4. A release is a click or a pan, consistent with the drag threshold
//! 5. Unmount leaves no frame or timer outstanding
//! 6. No panics on arbitrary operation sequences

use pixgrid_core::event::{
    InputEvent, PointerButton, PointerEvent, PointerEventKind, TouchEvent, TouchPhase, TouchPoint,
    WheelEvent,
};
use pixgrid_core::geometry::{Point, Size};
use pixgrid_core::interaction::{
    GridInteractionController, HostCommand, InteractionConfig, ReleaseOutcome,
};
use pixgrid_core::viewport::clamp_axis;
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Down(f64, f64, u8),
    Up(f64, f64),
    Move(f64, f64),
    Leave,
    Frame,
    Wheel(f64),
    SetZoom(f64),
    Resize(f64, f64),
    TouchStart(Vec<(f64, f64)>),
    TouchMove(Vec<(f64, f64)>),
    TouchEnd,
    TouchCancel,
    Blur,
    Advance(u64),
    SetEnabled(bool),
}

fn coord() -> impl Strategy<Value = f64> {
    -2000.0f64..4000.0
}

fn touches(n: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((coord(), coord()), n)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (coord(), coord(), 0u8..4).prop_map(|(x, y, b)| Op::Down(x, y, b)),
        2 => (coord(), coord()).prop_map(|(x, y)| Op::Up(x, y)),
        4 => (coord(), coord()).prop_map(|(x, y)| Op::Move(x, y)),
        1 => Just(Op::Leave),
        3 => Just(Op::Frame),
        2 => (-300.0f64..300.0).prop_map(Op::Wheel),
        1 => zoom_strategy().prop_map(Op::SetZoom),
        1 => (0.0f64..3000.0, 0.0f64..3000.0).prop_map(|(w, h)| Op::Resize(w, h)),
        2 => touches(1..=2).prop_map(Op::TouchStart),
        2 => touches(1..=2).prop_map(Op::TouchMove),
        1 => Just(Op::TouchEnd),
        1 => Just(Op::TouchCancel),
        1 => Just(Op::Blur),
        2 => (0u64..500).prop_map(Op::Advance),
        1 => any::<bool>().prop_map(Op::SetEnabled),
    ]
}

fn zoom_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![-1.0f64..10.0, Just(f64::NAN), Just(f64::INFINITY)]
}

fn to_touches(points: &[(f64, f64)]) -> Vec<TouchPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| TouchPoint::new(i as u32, x, y))
        .collect()
}

struct Harness {
    ctl: GridInteractionController,
    now: Instant,
    proposals: Vec<f64>,
    outcomes: Vec<(ReleaseOutcome, f64)>,
}

impl Harness {
    fn new(container: Size) -> Self {
        let mut ctl = GridInteractionController::new(InteractionConfig::default());
        ctl.mount(container);
        Self {
            ctl,
            now: Instant::now(),
            proposals: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    fn input(&mut self, event: InputEvent) {
        let d = self.ctl.handle(&event, self.now);
        for cmd in &d.commands {
            if let HostCommand::ProposeZoom(z) = cmd {
                self.proposals.push(*z);
            }
        }
        if let Some(outcome) = d.outcome {
            self.outcomes.push((outcome, self.ctl.drag_distance()));
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Down(x, y, b) => self.input(InputEvent::Pointer(PointerEvent::new(
                PointerEventKind::Down(PointerButton::from_u8(*b)),
                *x,
                *y,
            ))),
            Op::Up(x, y) => self.input(InputEvent::Pointer(PointerEvent::new(
                PointerEventKind::Up(PointerButton::Primary),
                *x,
                *y,
            ))),
            Op::Move(x, y) => self.input(InputEvent::Pointer(PointerEvent::new(
                PointerEventKind::Move,
                *x,
                *y,
            ))),
            Op::Leave => self.input(InputEvent::Pointer(PointerEvent::new(
                PointerEventKind::Leave,
                0.0,
                0.0,
            ))),
            Op::Frame => {
                self.ctl.on_frame();
            }
            Op::Wheel(dy) => self.input(InputEvent::Wheel(WheelEvent::vertical(0.0, 0.0, *dy))),
            Op::SetZoom(z) => {
                self.ctl.set_zoom(*z);
            }
            Op::Resize(w, h) => {
                self.ctl.resize(Size::new(*w, *h));
            }
            Op::TouchStart(points) => self.input(InputEvent::Touch(TouchEvent::new(
                TouchPhase::Start,
                to_touches(points),
            ))),
            Op::TouchMove(points) => self.input(InputEvent::Touch(TouchEvent::new(
                TouchPhase::Move,
                to_touches(points),
            ))),
            Op::TouchEnd => {
                self.input(InputEvent::Touch(TouchEvent::new(TouchPhase::End, Vec::new())));
            }
            Op::TouchCancel => {
                self.input(InputEvent::Touch(TouchEvent::new(
                    TouchPhase::Cancel,
                    Vec::new(),
                )));
            }
            Op::Blur => self.input(InputEvent::Focus(false)),
            Op::Advance(ms) => {
                self.now += Duration::from_millis(*ms);
                self.ctl.on_timer(self.now);
            }
            Op::SetEnabled(on) => {
                self.ctl.set_enabled(*on);
            }
        }
    }

    fn offset_in_range(&self) -> bool {
        let cfg = self.ctl.config();
        let extent = cfg.grid.extent(self.ctl.zoom());
        let container = self.ctl.container_size();
        let offset = self.ctl.offset();
        clamp_axis(offset.x, container.width, extent.width, cfg.pan_buffer) == offset.x
            && clamp_axis(offset.y, container.height, extent.height, cfg.pan_buffer) == offset.y
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1–3. Offset and zoom stay clamped
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offset_always_clamped(
        w in 100.0f64..2000.0,
        h in 100.0f64..2000.0,
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut harness = Harness::new(Size::new(w, h));
        prop_assert!(harness.offset_in_range(), "offset out of range after mount");
        for op in &ops {
            harness.apply(op);
            prop_assert!(
                harness.offset_in_range(),
                "offset {:?} out of range after {:?}", harness.ctl.offset(), op
            );
        }
    }

    #[test]
    fn zoom_always_within_bounds(
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        for op in &ops {
            harness.apply(op);
            let z = harness.ctl.zoom();
            prop_assert!((0.5..=5.0).contains(&z), "zoom {} after {:?}", z, op);
        }
    }

    #[test]
    fn proposed_zoom_is_clamped(
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        for op in &ops {
            harness.apply(op);
            // Adopt proposals the way a host would.
            if let Some(z) = harness.proposals.last().copied() {
                harness.ctl.set_zoom(z);
            }
        }
        for z in &harness.proposals {
            prop_assert!((0.5..=5.0).contains(z), "proposed zoom {} out of range", z);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Release classification respects the drag threshold
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn release_classification_matches_threshold(
        ops in prop::collection::vec(op_strategy(), 1..150),
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        for op in &ops {
            harness.apply(op);
        }
        let threshold = harness.ctl.config().drag_threshold;
        for (outcome, distance) in &harness.outcomes {
            match outcome {
                ReleaseOutcome::Click { cell } => {
                    prop_assert!(*distance < threshold, "click after {} px", distance);
                    prop_assert!(harness.ctl.config().grid.contains(*cell));
                }
                ReleaseOutcome::Pan { distance: reported } => {
                    prop_assert!(*reported >= threshold, "pan below threshold: {}", reported);
                }
            }
        }
    }

    #[test]
    fn straight_drag_classification(
        start_x in 100.0f64..700.0,
        start_y in 100.0f64..500.0,
        dx in -40.0f64..40.0,
        dy in -40.0f64..40.0,
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        harness.apply(&Op::Down(start_x, start_y, 0));
        harness.apply(&Op::Move(start_x + dx, start_y + dy));
        harness.apply(&Op::Frame);
        let moved = harness.ctl.drag_distance();
        harness.apply(&Op::Up(start_x + dx, start_y + dy));

        prop_assert!(!harness.ctl.is_dragging());
        match harness.outcomes.last() {
            Some((ReleaseOutcome::Pan { .. }, _)) => prop_assert!(moved >= 5.0),
            Some((ReleaseOutcome::Click { .. }, _)) => prop_assert!(moved < 5.0),
            None => prop_assert!(moved < 5.0, "no outcome only for off-grid clicks"),
        }
    }

    #[test]
    fn drag_released_before_frame_is_classified_by_movement(
        start_x in 100.0f64..700.0,
        start_y in 100.0f64..500.0,
        dx in -40.0f64..40.0,
        dy in -40.0f64..40.0,
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        let before = harness.ctl.offset();
        harness.apply(&Op::Down(start_x, start_y, 0));
        harness.apply(&Op::Move(start_x + dx, start_y + dy));
        harness.apply(&Op::Up(start_x + dx, start_y + dy));

        let moved = dx.hypot(dy);
        prop_assert!(!harness.ctl.frame_pending());
        match harness.outcomes.last() {
            Some((ReleaseOutcome::Pan { distance }, _)) => {
                prop_assert!(moved >= 5.0);
                prop_assert!((distance - moved).abs() < 1e-6);
            }
            Some((ReleaseOutcome::Click { .. }, _)) => prop_assert!(moved < 5.0),
            None => prop_assert!(false, "release on the grid must be classified"),
        }
        let after = harness.ctl.offset();
        prop_assert!((after.x - (before.x + dx)).abs() < 1e-6);
        prop_assert!((after.y - (before.y + dy)).abs() < 1e-6);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Unmount leaves nothing pending
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn unmount_cancels_everything(
        ops in prop::collection::vec(op_strategy(), 0..80),
        late in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut harness = Harness::new(Size::new(800.0, 600.0));
        for op in &ops {
            harness.apply(op);
        }
        harness.ctl.unmount();
        prop_assert!(!harness.ctl.frame_pending());
        prop_assert!(!harness.ctl.timer_pending());
        prop_assert!(!harness.ctl.is_dragging());

        // Late input and callbacks are ignored.
        let offset = harness.ctl.offset();
        for op in &late {
            if matches!(op, Op::SetZoom(_) | Op::Resize(..) | Op::SetEnabled(_)) {
                continue;
            }
            harness.apply(op);
        }
        prop_assert_eq!(harness.ctl.offset(), offset);
        prop_assert!(!harness.ctl.frame_pending());
        prop_assert!(harness.ctl.hovered().is_none());
    }
}

#[test]
fn mount_centers_grid_in_large_container() {
    let harness = Harness::new(Size::new(2000.0, 2000.0));
    // Centering gives 250, but the pan range is [600, 1900].
    let offset = harness.ctl.offset();
    assert_eq!(offset, Point::new(600.0, 600.0));
}
