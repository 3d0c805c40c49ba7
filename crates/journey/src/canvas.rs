//! Pointer-driven interaction over a [`JourneyGraph`]: hit testing, node
//! dragging, node action buttons, palette drops, and the per-node render
//! model.

use serde::Serialize;
use tracing::{debug, warn};

use studio_core::config::CanvasConfig;

use crate::catalog::{self, StepDescriptor};
use crate::graph::{CanvasBounds, JourneyGraph};
use crate::state_machine::{GesturePhase, GestureStateMachine};
use crate::types::{Position, StepId, StepPatch, StepType};

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// The canvas rectangle in client (pointer) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub origin: Position,
    pub width: f64,
    pub height: f64,
}

/// Buttons rendered in a node's header. They swallow the click so the node
/// underneath is neither selected nor dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    Duplicate,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Canvas,
    Node(StepId),
    Action(StepId, NodeAction),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasEvent {
    PointerDown {
        position: Position,
        button: PointerButton,
    },
    PointerMove {
        position: Position,
    },
    PointerUp {
        position: Position,
    },
    PointerCancel,
    /// An external drag (e.g. a palette entry) released over the canvas.
    Drop {
        position: Position,
        payload: Option<StepType>,
    },
}

/// What a single event did to the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasOutcome {
    Ignored,
    SelectionCleared,
    /// The node was selected and now follows the pointer.
    DragStarted(StepId),
    Moved {
        step_id: StepId,
        position: Position,
    },
    DragEnded(StepId),
    ActionArmed(StepId, NodeAction),
    ActionCancelled,
    Duplicated {
        source: StepId,
        copy: StepId,
    },
    Deleted(StepId),
    Added(StepId),
}

/// Header button geometry and drop anchoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    pub button_size: f64,
    pub button_margin: f64,
    /// Point inside the node that ends up under the pointer after a drop.
    pub drop_anchor: Position,
}

impl NodeLayout {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            button_size: config.action_button_size,
            button_margin: config.action_button_margin,
            drop_anchor: Position::new(config.drop_anchor_x, config.drop_anchor_y),
        }
    }

    /// Resolves a node-local point to the header button under it, if any.
    /// Buttons sit right-aligned in the header: duplicate, then delete.
    fn action_at(&self, node_width: f64, local: Position) -> Option<NodeAction> {
        let top = self.button_margin;
        if local.y < top || local.y > top + self.button_size {
            return None;
        }

        let delete_left = node_width - self.button_margin - self.button_size;
        if (delete_left..=delete_left + self.button_size).contains(&local.x) {
            return Some(NodeAction::Delete);
        }

        let duplicate_left = delete_left - self.button_margin / 2.0 - self.button_size;
        if (duplicate_left..=duplicate_left + self.button_size).contains(&local.x) {
            return Some(NodeAction::Duplicate);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveGesture {
    Drag {
        step_id: StepId,
        grab_offset: Position,
    },
    Press {
        step_id: StepId,
        action: NodeAction,
    },
}

/// Render model for one node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub step_id: StepId,
    pub descriptor: StepDescriptor,
    pub title: String,
    pub preview: Option<String>,
    pub delay_badge: Option<String>,
    pub position: Position,
    pub selected: bool,
    pub dragging: bool,
    /// Sequence arrow to the next step. Follows order, never proximity.
    pub has_next_arrow: bool,
}

/// Translates pointer gestures on one canvas into graph mutations.
#[derive(Debug, Clone)]
pub struct CanvasEngine {
    rect: CanvasRect,
    layout: NodeLayout,
    machine: GestureStateMachine,
    active: Option<ActiveGesture>,
}

impl CanvasEngine {
    pub fn new(rect: CanvasRect, layout: NodeLayout) -> Self {
        Self {
            rect,
            layout,
            machine: GestureStateMachine::new(),
            active: None,
        }
    }

    /// Canvas at the client origin, sized from configuration.
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(
            CanvasRect {
                origin: Position::default(),
                width: config.width,
                height: config.height,
            },
            NodeLayout::from_config(config),
        )
    }

    pub fn rect(&self) -> CanvasRect {
        self.rect
    }

    pub fn phase(&self) -> GesturePhase {
        self.machine.phase
    }

    pub fn dragging_step(&self) -> Option<StepId> {
        match self.active {
            Some(ActiveGesture::Drag { step_id, .. }) => Some(step_id),
            _ => None,
        }
    }

    /// Moves or resizes the canvas; the graph's bounds follow the new size.
    pub fn set_rect(&mut self, graph: &mut JourneyGraph, rect: CanvasRect) {
        let current = graph.bounds();
        graph.set_bounds(CanvasBounds::new(
            rect.width,
            rect.height,
            current.node_width,
            current.node_height,
        ));
        self.rect = rect;
    }

    fn to_canvas(&self, client: Position) -> Position {
        client.minus(self.rect.origin)
    }

    /// Topmost element under a client-space point.
    pub fn hit_test(&self, graph: &JourneyGraph, client: Position) -> HitTarget {
        let point = self.to_canvas(client);
        let bounds = graph.bounds();

        for step in graph.steps().iter().rev() {
            let local = point.minus(step.position);
            let inside = (0.0..bounds.node_width).contains(&local.x)
                && (0.0..bounds.node_height).contains(&local.y);
            if !inside {
                continue;
            }
            return match self.layout.action_at(bounds.node_width, local) {
                Some(action) => HitTarget::Action(step.id, action),
                None => HitTarget::Node(step.id),
            };
        }
        HitTarget::Canvas
    }

    pub fn handle(&mut self, graph: &mut JourneyGraph, event: CanvasEvent) -> CanvasOutcome {
        match event {
            CanvasEvent::PointerDown { position, button } => {
                self.pointer_down(graph, position, button)
            }
            CanvasEvent::PointerMove { position } => self.pointer_move(graph, position),
            CanvasEvent::PointerUp { position } => self.pointer_up(graph, position),
            CanvasEvent::PointerCancel => self.cancel(),
            CanvasEvent::Drop { position, payload } => self.drop_step(graph, position, payload),
        }
    }

    fn pointer_down(
        &mut self,
        graph: &mut JourneyGraph,
        client: Position,
        button: PointerButton,
    ) -> CanvasOutcome {
        if button != PointerButton::Primary {
            return CanvasOutcome::Ignored;
        }
        if !self.machine.is_idle() {
            debug!(phase = ?self.machine.phase, "Pointer down during active gesture ignored");
            return CanvasOutcome::Ignored;
        }

        match self.hit_test(graph, client) {
            HitTarget::Canvas => {
                graph.clear_selection();
                CanvasOutcome::SelectionCleared
            }
            HitTarget::Node(step_id) => {
                let Some(step) = graph.step(step_id) else {
                    return CanvasOutcome::Ignored;
                };
                let grab_offset = self.to_canvas(client).minus(step.position);
                self.begin_drag(graph, step_id, grab_offset)
            }
            HitTarget::Action(step_id, action) => {
                if let Err(e) = self.machine.transition(GesturePhase::Pressing) {
                    warn!(error = %e, "Could not arm node action");
                    return CanvasOutcome::Ignored;
                }
                self.active = Some(ActiveGesture::Press { step_id, action });
                CanvasOutcome::ActionArmed(step_id, action)
            }
        }
    }

    /// Starts dragging `step_id` as if it had been pressed `grab_offset` inside
    /// its top-left corner, whatever else overlaps it. Selects the step.
    pub fn begin_drag(
        &mut self,
        graph: &mut JourneyGraph,
        step_id: StepId,
        grab_offset: Position,
    ) -> CanvasOutcome {
        if graph.step(step_id).is_none() {
            return CanvasOutcome::Ignored;
        }
        if let Err(e) = self.machine.transition(GesturePhase::Dragging) {
            warn!(error = %e, "Could not start drag");
            return CanvasOutcome::Ignored;
        }

        graph.select(step_id);
        self.active = Some(ActiveGesture::Drag {
            step_id,
            grab_offset,
        });
        debug!(step_id = %step_id, "Drag started");
        CanvasOutcome::DragStarted(step_id)
    }

    fn pointer_move(&mut self, graph: &mut JourneyGraph, client: Position) -> CanvasOutcome {
        let Some(ActiveGesture::Drag {
            step_id,
            grab_offset,
        }) = self.active
        else {
            return CanvasOutcome::Ignored;
        };

        let raw = self.to_canvas(client).minus(grab_offset);
        if !graph.update_step(step_id, StepPatch::position(raw)) {
            // The dragged step disappeared under us; end the gesture.
            self.finish();
            return CanvasOutcome::DragEnded(step_id);
        }

        let position = graph
            .step(step_id)
            .map(|s| s.position)
            .unwrap_or_default();
        CanvasOutcome::Moved { step_id, position }
    }

    fn pointer_up(&mut self, graph: &mut JourneyGraph, client: Position) -> CanvasOutcome {
        let Some(gesture) = self.finish() else {
            return CanvasOutcome::Ignored;
        };

        match gesture {
            ActiveGesture::Drag { step_id, .. } => {
                debug!(step_id = %step_id, "Drag ended");
                CanvasOutcome::DragEnded(step_id)
            }
            ActiveGesture::Press { step_id, action } => {
                if self.hit_test(graph, client) != HitTarget::Action(step_id, action) {
                    return CanvasOutcome::ActionCancelled;
                }
                match action {
                    NodeAction::Duplicate => match graph.duplicate_step(step_id) {
                        Some(copy) => CanvasOutcome::Duplicated {
                            source: step_id,
                            copy: copy.id,
                        },
                        None => CanvasOutcome::Ignored,
                    },
                    NodeAction::Delete => {
                        if graph.delete_step(step_id) {
                            CanvasOutcome::Deleted(step_id)
                        } else {
                            CanvasOutcome::Ignored
                        }
                    }
                }
            }
        }
    }

    fn cancel(&mut self) -> CanvasOutcome {
        match self.finish() {
            Some(ActiveGesture::Drag { step_id, .. }) => CanvasOutcome::DragEnded(step_id),
            Some(ActiveGesture::Press { .. }) => CanvasOutcome::ActionCancelled,
            None => CanvasOutcome::Ignored,
        }
    }

    fn drop_step(
        &mut self,
        graph: &mut JourneyGraph,
        client: Position,
        payload: Option<StepType>,
    ) -> CanvasOutcome {
        let Some(step_type) = payload else {
            return CanvasOutcome::Ignored;
        };

        let target = self.to_canvas(client).minus(self.layout.drop_anchor);
        let step = graph.add_step(step_type, Some(target));
        CanvasOutcome::Added(step.id)
    }

    /// Ends whatever gesture is active and returns it.
    fn finish(&mut self) -> Option<ActiveGesture> {
        let gesture = self.active.take();
        if gesture.is_some() {
            if let Err(e) = self.machine.transition(GesturePhase::Idle) {
                warn!(error = %e, "Gesture state out of sync, resetting");
            }
        }
        self.machine.reset();
        gesture
    }

    /// Builds the render model for every node, in sequence order.
    pub fn render(&self, graph: &JourneyGraph) -> Vec<NodeView> {
        let selection = graph.selection();
        let dragging = self.dragging_step();
        let last = graph.len().saturating_sub(1);

        graph
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let preview = (step.step_type.has_content() && !step.content.is_empty()).then(|| {
                    let head: String = step.content.chars().take(PREVIEW_CHARS).collect();
                    format!("{head}...")
                });
                let delay_badge = (step.step_type.has_delay() && step.delay > 0)
                    .then(|| format!("{} days", step.delay));

                NodeView {
                    step_id: step.id,
                    descriptor: catalog::describe(step.step_type),
                    title: step.title.clone(),
                    preview,
                    delay_badge,
                    position: step.position,
                    selected: selection == Some(step.id),
                    dragging: dragging == Some(step.id),
                    has_next_arrow: index < last,
                }
            })
            .collect()
    }
}
