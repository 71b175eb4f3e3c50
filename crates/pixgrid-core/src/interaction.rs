#![forbid(unsafe_code)]

//! Grid interaction: turns pointer, wheel, and touch input into viewport
//! changes, debounced hover, and click-vs-pan classification.
//!
//! [`GridInteractionController`] owns the [`ViewportState`] and a small
//! gesture state machine. It never talks to a runtime directly: every
//! handler returns a [`Dispatch`] listing the [`HostCommand`]s the embedding
//! event loop must carry out (request an animation frame, arm a timer,
//! prevent a default action, show a notice, ...). The host calls
//! [`on_frame`](GridInteractionController::on_frame) and
//! [`on_timer`](GridInteractionController::on_timer) when those fire.
//!
//! # State Machine
//!
//! - **Gesture**: `Idle → Panning → Idle` for mouse and single touch,
//!   `Idle → Pinching → Idle` for two-finger touch.
//! - **Hover**: `NotHovering ⇄ Hovering(cell)`, only while idle. Entering a
//!   cell is debounced; leaving the grid clears immediately.
//!
//! # Invariants
//!
//! 1. Zoom is owned by the caller. The controller proposes clamped values
//!    with [`HostCommand::ProposeZoom`] and only adopts a zoom passed to
//!    [`set_zoom`](GridInteractionController::set_zoom).
//! 2. Every committed offset is clamped (see [`crate::viewport`]).
//! 3. At most one offset commit per animation frame; intermediate samples are
//!    dropped. A release commits the pending sample before classifying.
//! 4. A release whose accumulated drag distance is below the threshold is a
//!    click, otherwise a pan. Never both.
//! 5. After [`unmount`](GridInteractionController::unmount) no frame request
//!    or timer is outstanding and further input is ignored.
//!
//! # Failure Modes
//!
//! - A pinch whose baseline distance is zero skips the zoom update.
//! - Frame or timer callbacks arriving after cancellation are no-ops.

use web_time::{Duration, Instant};

use crate::event::{InputEvent, PointerButton, PointerEventKind, TouchEvent, TouchPhase};
use crate::geometry::{CellCoord, CellRect, Point, Size};
use crate::schedule::{Cooldown, DelayedCallback, FrameSlot};
use crate::viewport::{GridGeometry, ViewportState, clamp_offset, clamp_zoom};

/// Notice shown when input arrives while interaction is disabled.
pub const VIEW_ONLY_ADVISORY: &str = "The grid is in view-only mode; panning and selection are disabled.";

/// Zoom changes smaller than this are not proposed.
const ZOOM_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds, bounds, and timings for grid interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Grid dimensions and base cell size.
    pub grid: GridGeometry,
    /// Lower zoom bound (default: 0.5).
    pub min_zoom: f64,
    /// Upper zoom bound (default: 5.0).
    pub max_zoom: f64,
    /// Multiplicative step per wheel notch (default: 1.1).
    pub zoom_factor: f64,
    /// Empty space allowed past a container edge while panning (default: 100px).
    pub pan_buffer: f64,
    /// Debounce before a hovered cell is reported (default: 150ms).
    pub hover_delay: Duration,
    /// Drag distance (px) at or above which a release counts as a pan (default: 5).
    pub drag_threshold: f64,
    /// Minimum spacing between view-only notices (default: 3s).
    pub advisory_cooldown: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            grid: GridGeometry::default(),
            min_zoom: 0.5,
            max_zoom: 5.0,
            zoom_factor: 1.1,
            pan_buffer: 100.0,
            hover_delay: Duration::from_millis(150),
            drag_threshold: 5.0,
            advisory_cooldown: Duration::from_millis(3000),
        }
    }
}

// ---------------------------------------------------------------------------
// Public state and outputs
// ---------------------------------------------------------------------------

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    Idle,
    /// Single-pointer pan. `origin` is `pointer - offset` at gesture start.
    Panning {
        /// Pointer position minus offset when the pan began.
        origin: Point,
    },
    /// Two-finger pinch zoom.
    Pinching {
        /// Inter-finger distance when the pinch began.
        baseline_distance: f64,
        /// Zoom when the pinch began.
        base_zoom: f64,
    },
}

/// Instruction for the embedding event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Register wheel/touch listeners on the container (non-passive, so
    /// default actions can be prevented).
    AttachListeners,
    /// Remove the listeners registered by `AttachListeners`.
    DetachListeners,
    /// Schedule one animation-frame callback to `on_frame`.
    RequestFrame,
    /// Cancel the outstanding animation-frame callback.
    CancelFrame,
    /// (Re)arm the single hover timer to call `on_timer` after `delay`.
    ArmTimer {
        /// Delay from now.
        delay: Duration,
    },
    /// Cancel the hover timer.
    CancelTimer,
    /// Prevent the browser default for the current event (page scroll).
    PreventDefault,
    /// Ask the zoom owner to adopt a new, already clamped, zoom.
    ProposeZoom(f64),
    /// Show a transient notice to the user.
    ShowAdvisory(&'static str),
    /// The debounced hover cell changed.
    HoverChanged(Option<CellCoord>),
    /// Offset or container size changed; re-render.
    ViewportChanged,
}

/// How a finished pointer interaction was classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Short press on a grid cell: selection intent.
    Click {
        /// Cell under the release point.
        cell: CellCoord,
    },
    /// The pointer moved far enough to count as a pan.
    Pan {
        /// Accumulated drag distance in pixels.
        distance: f64,
    },
}

/// Result of one controller call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Commands for the host, in order.
    pub commands: Vec<HostCommand>,
    /// Classification of a completed press, if this call ended one.
    pub outcome: Option<ReleaseOutcome>,
}

impl Dispatch {
    /// Whether the dispatch contains the given command.
    #[must_use]
    pub fn has(&self, command: &HostCommand) -> bool {
        self.commands.contains(command)
    }

    /// The zoom proposed by this dispatch, if any.
    #[must_use]
    pub fn proposed_zoom(&self) -> Option<f64> {
        self.commands.iter().rev().find_map(|c| match c {
            HostCommand::ProposeZoom(z) => Some(*z),
            _ => None,
        })
    }

    /// Whether nothing needs to happen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.outcome.is_none()
    }
}

// ---------------------------------------------------------------------------
// GridInteractionController
// ---------------------------------------------------------------------------

/// Viewport state machine driven by pointer, wheel, and touch input.
///
/// Call [`mount`](Self::mount) once the container exists, then feed every
/// input through [`handle`](Self::handle).
pub struct GridInteractionController {
    config: InteractionConfig,
    viewport: ViewportState,
    enabled: bool,
    mounted: bool,

    // Gesture tracking
    gesture: GestureState,
    drag_distance: f64,
    last_pointer: Point,
    frame: FrameSlot<Point>,

    // Hover tracking
    hover: Option<CellCoord>,
    hover_timer: DelayedCallback<CellCoord>,

    advisory: Cooldown,
}

impl std::fmt::Debug for GridInteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridInteractionController")
            .field("viewport", &self.viewport)
            .field("gesture", &self.gesture)
            .field("hover", &self.hover)
            .field("enabled", &self.enabled)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl GridInteractionController {
    /// Create an unmounted, enabled controller at zoom 1.0 (clamped).
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        let zoom = clamp_zoom(1.0, config.min_zoom, config.max_zoom);
        Self {
            hover_timer: DelayedCallback::new(config.hover_delay),
            advisory: Cooldown::new(config.advisory_cooldown),
            viewport: ViewportState {
                zoom,
                ..ViewportState::default()
            },
            config,
            enabled: true,
            mounted: false,
            gesture: GestureState::Idle,
            drag_distance: 0.0,
            last_pointer: Point::ZERO,
            frame: FrameSlot::new(),
            hover: None,
        }
    }

    // --- Lifecycle ---------------------------------------------------------

    /// Attach to a container of the given size.
    ///
    /// Centers the grid in the container (then clamps) and asks the host to
    /// register its listeners.
    pub fn mount(&mut self, container: Size) -> Dispatch {
        let mut out = Dispatch::default();
        if self.mounted {
            return self.resize(container);
        }
        self.mounted = true;
        self.viewport.container = container;
        let extent = self.extent();
        let centered = Point::new(
            (container.width - extent.width) / 2.0,
            (container.height - extent.height) / 2.0,
        );
        self.viewport.offset = self.clamped(centered);
        out.commands.push(HostCommand::AttachListeners);
        out.commands.push(HostCommand::ViewportChanged);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            width = container.width,
            height = container.height,
            "grid interaction mounted"
        );
        out
    }

    /// Tear down: cancel pending callbacks, detach listeners, drop transient
    /// state.
    pub fn unmount(&mut self) -> Dispatch {
        let mut out = Dispatch::default();
        if !self.mounted {
            return out;
        }
        self.cancel_gesture(&mut out.commands);
        if self.hover_timer.cancel() {
            out.commands.push(HostCommand::CancelTimer);
        }
        self.hover = None;
        self.advisory.reset();
        out.commands.push(HostCommand::DetachListeners);
        self.mounted = false;
        #[cfg(feature = "tracing")]
        tracing::debug!("grid interaction unmounted");
        out
    }

    /// The container was resized.
    pub fn resize(&mut self, container: Size) -> Dispatch {
        let mut out = Dispatch::default();
        self.viewport.container = container;
        self.reclamp(&mut out.commands);
        if !out.has(&HostCommand::ViewportChanged) {
            out.commands.push(HostCommand::ViewportChanged);
        }
        out
    }

    /// Adopt a zoom chosen by the zoom owner. The value is clamped and the
    /// offset re-clamped against the new grid extent.
    pub fn set_zoom(&mut self, zoom: f64) -> Dispatch {
        let mut out = Dispatch::default();
        let zoom = clamp_zoom(zoom, self.config.min_zoom, self.config.max_zoom);
        if (zoom - self.viewport.zoom).abs() > ZOOM_EPSILON {
            self.viewport.zoom = zoom;
            out.commands.push(HostCommand::ViewportChanged);
        }
        self.reclamp(&mut out.commands);
        out
    }

    /// Enable or disable interaction. Any change cancels a pending hover
    /// timer, and disabling also cancels an in-progress gesture. Hover keeps
    /// working while disabled: the next move re-arms the timer.
    pub fn set_enabled(&mut self, enabled: bool) -> Dispatch {
        let mut out = Dispatch::default();
        if self.enabled == enabled {
            return out;
        }
        self.enabled = enabled;
        if self.hover_timer.cancel() {
            out.commands.push(HostCommand::CancelTimer);
        }
        if !enabled {
            self.cancel_gesture(&mut out.commands);
        }
        out
    }

    // --- Input ---------------------------------------------------------------

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> Dispatch {
        let mut out = Dispatch::default();
        if !self.mounted {
            return out;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(event = event.kind_name(), gesture = ?self.gesture, "input");

        match event {
            InputEvent::Pointer(pointer) => {
                let pos = pointer.position();
                match pointer.kind {
                    PointerEventKind::Down(button) => {
                        self.on_pointer_down(pos, button, now, &mut out);
                    }
                    PointerEventKind::Up(_) => {
                        self.on_release(pos, &mut out);
                    }
                    PointerEventKind::Move => {
                        self.on_pointer_move(pos, now, &mut out);
                    }
                    PointerEventKind::Leave => {
                        self.cancel_gesture(&mut out.commands);
                        self.clear_hover(&mut out.commands);
                    }
                }
            }
            InputEvent::Wheel(wheel) => {
                out.commands.push(HostCommand::PreventDefault);
                if wheel.dy != 0.0 {
                    let zoom = self.viewport.zoom;
                    let stepped = if wheel.dy < 0.0 {
                        zoom * self.config.zoom_factor
                    } else {
                        zoom / self.config.zoom_factor
                    };
                    self.propose_zoom(stepped, &mut out.commands);
                }
            }
            InputEvent::Touch(touch) => {
                self.on_touch(touch, now, &mut out);
            }
            InputEvent::Focus(false) => {
                self.cancel_gesture(&mut out.commands);
            }
            InputEvent::Focus(true) => {}
        }

        out
    }

    /// The animation frame requested with [`HostCommand::RequestFrame`] fired.
    ///
    /// Commits the latest pan sample.
    pub fn on_frame(&mut self) -> Dispatch {
        let mut out = Dispatch::default();
        if let Some(pos) = self.frame.take() {
            self.commit_pan(pos, &mut out.commands);
        }
        out
    }

    /// The hover timer armed with [`HostCommand::ArmTimer`] fired.
    pub fn on_timer(&mut self, now: Instant) -> Dispatch {
        let mut out = Dispatch::default();
        if let Some(cell) = self.hover_timer.poll(now)
            && self.hover != Some(cell)
        {
            self.hover = Some(cell);
            out.commands.push(HostCommand::HoverChanged(Some(cell)));
        }
        out
    }

    // --- Accessors -----------------------------------------------------------

    /// Current viewport.
    #[inline]
    #[must_use]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Current pan offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> Point {
        self.viewport.offset
    }

    /// Zoom last adopted through [`set_zoom`](Self::set_zoom).
    #[inline]
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    /// Current container size.
    #[inline]
    #[must_use]
    pub fn container_size(&self) -> Size {
        self.viewport.container
    }

    /// Current gesture state.
    #[inline]
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Whether a pan is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, GestureState::Panning { .. })
    }

    /// Debounced hovered cell.
    #[inline]
    #[must_use]
    pub fn hovered(&self) -> Option<CellCoord> {
        self.hover
    }

    /// Drag distance accumulated by the current (or last) pan.
    #[inline]
    #[must_use]
    pub fn drag_distance(&self) -> f64 {
        self.drag_distance
    }

    /// Whether interaction is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the controller is mounted.
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether an animation frame request is outstanding.
    #[inline]
    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame.is_requested()
    }

    /// Whether the hover timer is armed.
    #[inline]
    #[must_use]
    pub fn timer_pending(&self) -> bool {
        self.hover_timer.is_armed()
    }

    /// Configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Grid cells covered by the container: the rectangle to query the
    /// spatial index with.
    #[must_use]
    pub fn visible_cells(&self) -> CellRect {
        self.viewport.visible_cells(&self.config.grid)
    }

    /// Grid cell under a screen point, if it lies on the grid.
    #[must_use]
    pub fn screen_to_cell(&self, point: Point) -> Option<CellCoord> {
        self.viewport
            .screen_to_cell(point, &self.config.grid)
            .filter(|cell| self.config.grid.contains(*cell))
    }

    /// Screen position of a cell's top-left corner.
    #[must_use]
    pub fn cell_to_screen(&self, coord: CellCoord) -> Point {
        self.viewport.cell_to_screen(coord, &self.config.grid)
    }
}

// ---------------------------------------------------------------------------
// Internal handlers
// ---------------------------------------------------------------------------

impl GridInteractionController {
    fn on_pointer_down(
        &mut self,
        pos: Point,
        button: PointerButton,
        now: Instant,
        out: &mut Dispatch,
    ) {
        if !button.starts_pan() {
            return;
        }
        if !self.enabled {
            self.advise(now, &mut out.commands);
            return;
        }
        self.begin_pan(pos, &mut out.commands);
    }

    fn on_pointer_move(&mut self, pos: Point, now: Instant, out: &mut Dispatch) {
        self.last_pointer = pos;
        match self.gesture {
            GestureState::Panning { .. } => {
                if self.frame.submit(pos) {
                    out.commands.push(HostCommand::RequestFrame);
                }
            }
            GestureState::Pinching { .. } => {}
            GestureState::Idle => self.update_hover(pos, now, &mut out.commands),
        }
    }

    fn on_release(&mut self, pos: Point, out: &mut Dispatch) {
        let GestureState::Panning { .. } = self.gesture else {
            if matches!(self.gesture, GestureState::Pinching { .. }) {
                self.gesture = GestureState::Idle;
            }
            return;
        };
        // The last sample of a drag is committed, not dropped.
        let requested = self.frame.is_requested();
        if let Some(last) = self.frame.take() {
            self.commit_pan(last, &mut out.commands);
        }
        if requested {
            out.commands.push(HostCommand::CancelFrame);
        }
        self.gesture = GestureState::Idle;

        out.outcome = if self.drag_distance < self.config.drag_threshold {
            self.screen_to_cell(pos)
                .map(|cell| ReleaseOutcome::Click { cell })
        } else {
            Some(ReleaseOutcome::Pan {
                distance: self.drag_distance,
            })
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(outcome = ?out.outcome, distance = self.drag_distance, "release");
    }

    fn on_touch(&mut self, touch: &TouchEvent, now: Instant, out: &mut Dispatch) {
        match touch.phase {
            TouchPhase::Start => {
                if touch.touches.is_empty() {
                    return;
                }
                if !self.enabled {
                    self.advise(now, &mut out.commands);
                    return;
                }
                if let Some(distance) = touch.pinch_distance() {
                    self.begin_pinch(distance, &mut out.commands);
                } else if let Some(pos) = touch.primary() {
                    self.last_pointer = pos;
                    self.begin_pan(pos, &mut out.commands);
                }
            }
            TouchPhase::Move => match self.gesture {
                GestureState::Panning { .. } => {
                    if let Some(pos) = touch.primary() {
                        self.last_pointer = pos;
                        if self.frame.submit(pos) {
                            out.commands.push(HostCommand::RequestFrame);
                        }
                    }
                }
                GestureState::Pinching {
                    baseline_distance,
                    base_zoom,
                } => {
                    let Some(current) = touch.pinch_distance() else {
                        return;
                    };
                    if baseline_distance <= 0.0 {
                        return;
                    }
                    self.propose_zoom(base_zoom * (current / baseline_distance), &mut out.commands);
                }
                GestureState::Idle => {}
            },
            TouchPhase::End => {
                let pos = self.last_pointer;
                self.on_release(pos, out);
            }
            TouchPhase::Cancel => {
                self.cancel_gesture(&mut out.commands);
            }
        }
    }

    /// Move the grid to follow a pan sample, accumulating drag distance.
    fn commit_pan(&mut self, pos: Point, out: &mut Vec<HostCommand>) {
        let GestureState::Panning { origin } = self.gesture else {
            return;
        };
        let candidate = pos - origin;
        self.drag_distance += candidate.distance(self.viewport.offset);
        let committed = self.clamped(candidate);
        if committed != self.viewport.offset {
            self.viewport.offset = committed;
            out.push(HostCommand::ViewportChanged);
        }
    }

    fn begin_pan(&mut self, pos: Point, out: &mut Vec<HostCommand>) {
        if self.frame.cancel() {
            out.push(HostCommand::CancelFrame);
        }
        self.gesture = GestureState::Panning {
            origin: pos - self.viewport.offset,
        };
        self.drag_distance = 0.0;
        self.clear_hover(out);
    }

    fn begin_pinch(&mut self, distance: f64, out: &mut Vec<HostCommand>) {
        if self.frame.cancel() {
            out.push(HostCommand::CancelFrame);
        }
        self.gesture = GestureState::Pinching {
            baseline_distance: distance,
            base_zoom: self.viewport.zoom,
        };
        self.clear_hover(out);
    }

    /// Return to idle without classifying a release.
    fn cancel_gesture(&mut self, out: &mut Vec<HostCommand>) {
        if self.frame.cancel() {
            out.push(HostCommand::CancelFrame);
        }
        self.gesture = GestureState::Idle;
    }

    fn update_hover(&mut self, pos: Point, now: Instant, out: &mut Vec<HostCommand>) {
        match self.screen_to_cell(pos) {
            Some(cell) => {
                self.hover_timer.arm(cell, now);
                out.push(HostCommand::ArmTimer {
                    delay: self.hover_timer.delay(),
                });
            }
            None => self.clear_hover(out),
        }
    }

    fn clear_hover(&mut self, out: &mut Vec<HostCommand>) {
        if self.hover_timer.cancel() {
            out.push(HostCommand::CancelTimer);
        }
        if self.hover.take().is_some() {
            out.push(HostCommand::HoverChanged(None));
        }
    }

    fn propose_zoom(&self, zoom: f64, out: &mut Vec<HostCommand>) {
        let clamped = clamp_zoom(zoom, self.config.min_zoom, self.config.max_zoom);
        if (clamped - self.viewport.zoom).abs() > ZOOM_EPSILON {
            out.push(HostCommand::ProposeZoom(clamped));
        }
    }

    fn advise(&mut self, now: Instant, out: &mut Vec<HostCommand>) {
        if self.advisory.try_fire(now) {
            out.push(HostCommand::ShowAdvisory(VIEW_ONLY_ADVISORY));
        }
    }

    fn reclamp(&mut self, out: &mut Vec<HostCommand>) {
        let committed = self.clamped(self.viewport.offset);
        if committed != self.viewport.offset {
            self.viewport.offset = committed;
            if !out.contains(&HostCommand::ViewportChanged) {
                out.push(HostCommand::ViewportChanged);
            }
        }
    }

    fn extent(&self) -> Size {
        self.config.grid.extent(self.viewport.zoom)
    }

    fn clamped(&self, candidate: Point) -> Point {
        clamp_offset(
            candidate,
            self.viewport.container,
            self.extent(),
            self.config.pan_buffer,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
