use uuid::Uuid;

use tracing::{info, warn};

use studio_core::config::CanvasConfig;
use studio_core::{StudioError, StudioResult};

use crate::canvas::{CanvasEngine, CanvasEvent, CanvasOutcome, CanvasRect, NodeView};
use crate::generator::{GeneratedJourney, JourneyGenerator};
use crate::graph::{GraphSettings, JourneyGraph};
use crate::properties::{self, PropertyField, PropertyPanel};
use crate::store::JourneyStore;
use crate::types::{Journey, Position, Step, StepId, StepType};

/// Handle for one in-flight generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    id: u64,
    prompt: String,
}

impl GenerationTicket {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The journey's steps and name were replaced by the result.
    Applied,
    /// The result arrived after a cancel or after the journey was edited.
    Discarded,
}

#[derive(Debug, Clone, Copy)]
struct PendingGeneration {
    ticket: u64,
    revision: u64,
}

/// One open journey editor: the graph, its canvas, and at most one pending
/// generation.
#[derive(Debug, Clone)]
pub struct EditorSession {
    graph: JourneyGraph,
    canvas: CanvasEngine,
    pending: Option<PendingGeneration>,
    next_ticket: u64,
}

impl EditorSession {
    pub fn new(journey: Journey, config: &CanvasConfig) -> Self {
        Self {
            graph: JourneyGraph::new(journey, GraphSettings::from_config(config)),
            canvas: CanvasEngine::from_config(config),
            pending: None,
            next_ticket: 0,
        }
    }

    pub async fn open<S>(store: &S, id: Uuid, config: &CanvasConfig) -> StudioResult<Self>
    where
        S: JourneyStore + ?Sized,
    {
        let journey = store.load(id).await?;
        info!(journey_id = %id, steps = journey.steps.len(), "Opened journey");
        Ok(Self::new(journey, config))
    }

    pub async fn save<S>(&self, store: &S) -> StudioResult<()>
    where
        S: JourneyStore + ?Sized,
    {
        store.save(self.graph.journey()).await
    }

    pub fn graph(&self) -> &JourneyGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut JourneyGraph {
        &mut self.graph
    }

    pub fn canvas(&self) -> &CanvasEngine {
        &self.canvas
    }

    pub fn journey(&self) -> &Journey {
        self.graph.journey()
    }

    // ─── Editing ────────────────────────────────────────────────────────────

    /// Palette click: appends a step at the default position.
    pub fn add_from_palette(&mut self, step_type: StepType) -> Step {
        self.graph.add_step(step_type, None)
    }

    pub fn add_at(&mut self, step_type: StepType, position: Position) -> Step {
        self.graph.add_step(step_type, Some(position))
    }

    pub fn handle(&mut self, event: CanvasEvent) -> CanvasOutcome {
        self.canvas.handle(&mut self.graph, event)
    }

    /// Drags `step_id`, grabbed at its centre, until its top-left corner sits
    /// at `target` (clamped). Returns `false` if the step does not exist or
    /// another gesture is active.
    pub fn drag_step_to(&mut self, step_id: StepId, target: Position) -> bool {
        let bounds = self.graph.bounds();
        let grab = Position::new(bounds.node_width / 2.0, bounds.node_height / 2.0);
        if self.canvas.begin_drag(&mut self.graph, step_id, grab)
            != CanvasOutcome::DragStarted(step_id)
        {
            return false;
        }

        let release = self
            .canvas
            .rect()
            .origin
            .offset(target.x + grab.x, target.y + grab.y);
        self.handle(CanvasEvent::PointerMove { position: release });
        self.handle(CanvasEvent::PointerUp { position: release });
        true
    }

    /// Moves or resizes the canvas; steps are re-clamped to the new size.
    pub fn set_canvas_rect(&mut self, rect: CanvasRect) {
        self.canvas.set_rect(&mut self.graph, rect);
    }

    pub fn render(&self) -> Vec<NodeView> {
        self.canvas.render(&self.graph)
    }

    pub fn property_panel(&self) -> Option<PropertyPanel> {
        properties::panel(&self.graph)
    }

    pub fn edit_property(&mut self, field: PropertyField, input: &str) -> StudioResult<bool> {
        properties::apply(&mut self.graph, field, input)
    }

    /// Closes the property panel.
    pub fn close_properties(&mut self) {
        self.graph.clear_selection();
    }

    // ─── Generation ─────────────────────────────────────────────────────────

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Registers a generation request. Only one may be pending at a time.
    pub fn begin_generation(&mut self, prompt: &str) -> StudioResult<GenerationTicket> {
        if prompt.trim().is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        if self.pending.is_some() {
            return Err(StudioError::GenerationInProgress);
        }

        self.next_ticket += 1;
        self.pending = Some(PendingGeneration {
            ticket: self.next_ticket,
            revision: self.graph.revision(),
        });
        Ok(GenerationTicket {
            id: self.next_ticket,
            prompt: prompt.to_string(),
        })
    }

    /// Dismisses the pending generation; its result will be discarded.
    pub fn cancel_generation(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Applies a generation result as one full replacement of the steps and
    /// the name, unless the request is stale. Errors from the backend are
    /// returned as-is and leave the journey untouched.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: StudioResult<GeneratedJourney>,
    ) -> StudioResult<GenerationOutcome> {
        let pending = match self.pending {
            Some(pending) if pending.ticket == ticket.id => pending,
            _ => {
                info!(ticket = ticket.id, "Dropping result of dismissed generation");
                return Ok(GenerationOutcome::Discarded);
            }
        };
        self.pending = None;

        let generated = result?;
        if self.graph.revision() != pending.revision {
            warn!(
                ticket = ticket.id,
                "Journey edited while generating, discarding result"
            );
            return Ok(GenerationOutcome::Discarded);
        }

        info!(
            journey_id = %self.graph.journey().id,
            steps = generated.steps.len(),
            "Applying generated journey"
        );
        self.graph.replace_steps(generated.steps);
        self.graph.set_name(generated.name);
        Ok(GenerationOutcome::Applied)
    }

    /// Runs a full generation round trip against `generator`.
    pub async fn generate<G>(
        &mut self,
        generator: &G,
        prompt: &str,
    ) -> StudioResult<GenerationOutcome>
    where
        G: JourneyGenerator + ?Sized,
    {
        let ticket = self.begin_generation(prompt)?;
        let result = generator.generate(ticket.prompt()).await;
        self.complete_generation(ticket, result)
    }
}
