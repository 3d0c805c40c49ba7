use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use studio_core::config::CanvasConfig;

use crate::catalog;
use crate::types::{Journey, Position, Step, StepId, StepPatch, StepType};

/// Canvas size and node footprint. Every stored position lies in
/// `[0, width - node_width] x [0, height - node_height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_height: f64,
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64, node_width: f64, node_height: f64) -> Self {
        Self {
            width,
            height,
            node_width,
            node_height,
        }
    }

    pub fn max_x(&self) -> f64 {
        (self.width - self.node_width).max(0.0)
    }

    pub fn max_y(&self) -> f64 {
        (self.height - self.node_height).max(0.0)
    }

    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.min(self.max_x()).max(0.0),
            position.y.min(self.max_y()).max(0.0),
        )
    }

    pub fn contains(&self, position: Position) -> bool {
        (0.0..=self.max_x()).contains(&position.x) && (0.0..=self.max_y()).contains(&position.y)
    }
}

/// Placement defaults for steps created without an explicit position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSettings {
    pub bounds: CanvasBounds,
    pub default_position: Position,
    pub duplicate_offset: f64,
}

impl GraphSettings {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            bounds: CanvasBounds::new(
                config.width,
                config.height,
                config.node_width,
                config.node_height,
            ),
            default_position: Position::new(config.default_x, config.default_y),
            duplicate_offset: config.duplicate_offset,
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

/// A journey under edit together with its selection.
///
/// Operations addressing a missing step id are no-ops: they report
/// `false`/`None` and leave the journey untouched.
#[derive(Debug, Clone)]
pub struct JourneyGraph {
    journey: Journey,
    settings: GraphSettings,
    selection: Option<StepId>,
    revision: u64,
}

impl JourneyGraph {
    /// Wraps a journey, clamping out-of-bounds positions and re-issuing ids
    /// that collide with an earlier step.
    pub fn new(journey: Journey, settings: GraphSettings) -> Self {
        let mut graph = Self {
            journey,
            settings,
            selection: None,
            revision: 0,
        };
        graph.normalize_steps();
        graph
    }

    pub fn empty(settings: GraphSettings) -> Self {
        Self::new(Journey::new("Untitled Journey", ""), settings)
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn into_journey(self) -> Journey {
        self.journey
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.settings.bounds
    }

    pub fn steps(&self) -> &[Step] {
        &self.journey.steps
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.journey.steps.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.journey.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journey.steps.is_empty()
    }

    /// Number of successful mutations to the journey so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─── Selection ──────────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<StepId> {
        self.selection
    }

    pub fn selected_step(&self) -> Option<&Step> {
        self.selection.and_then(|id| self.step(id))
    }

    /// Selects `id` if it exists. Returns whether the selection was set.
    pub fn select(&mut self, id: StepId) -> bool {
        if self.step(id).is_some() {
            self.selection = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ─── Journey metadata ───────────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.journey.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.journey.description = description.into();
        self.touch();
    }

    /// Updates the canvas size and pulls every step back inside it.
    pub fn set_bounds(&mut self, bounds: CanvasBounds) {
        self.settings.bounds = bounds;
        let mut moved = false;
        for step in &mut self.journey.steps {
            let clamped = bounds.clamp(step.position);
            if clamped != step.position {
                step.position = clamped;
                moved = true;
            }
        }
        if moved {
            self.touch();
        }
    }

    // ─── Steps ──────────────────────────────────────────────────────────────

    /// Appends a new step. Without an explicit position the step lands at the
    /// configured default.
    pub fn add_step(&mut self, step_type: StepType, position: Option<Position>) -> Step {
        let position = self
            .settings
            .bounds
            .clamp(position.unwrap_or(self.settings.default_position));
        let step = Step {
            id: self.fresh_id(),
            step_type,
            title: catalog::default_title(step_type),
            content: String::new(),
            delay: 0,
            position,
        };

        debug!(step_id = %step.id, %step_type, x = position.x, y = position.y, "Adding step");
        self.journey.steps.push(step.clone());
        self.touch();
        step
    }

    /// Merges `patch` into the step with the given id. Returns `false` if no
    /// such step exists. A patch that changes nothing leaves the revision
    /// untouched.
    pub fn update_step(&mut self, id: StepId, patch: StepPatch) -> bool {
        let bounds = self.settings.bounds;
        let Some(step) = self.journey.steps.iter_mut().find(|s| s.id == id) else {
            debug!(step_id = %id, "Update for unknown step ignored");
            return false;
        };
        if patch.is_empty() {
            return true;
        }

        let before = step.clone();
        if let Some(title) = patch.title {
            step.title = title;
        }
        if let Some(content) = patch.content {
            step.content = content;
        }
        if let Some(delay) = patch.delay {
            step.delay = delay;
        }
        if let Some(position) = patch.position {
            step.position = bounds.clamp(position);
        }

        if *step != before {
            self.touch();
        }
        true
    }

    /// Removes the step, clearing the selection if it pointed at it.
    pub fn delete_step(&mut self, id: StepId) -> bool {
        let before = self.journey.steps.len();
        self.journey.steps.retain(|s| s.id != id);
        if self.journey.steps.len() == before {
            debug!(step_id = %id, "Delete for unknown step ignored");
            return false;
        }

        if self.selection == Some(id) {
            self.selection = None;
        }
        debug!(step_id = %id, "Deleted step");
        self.touch();
        true
    }

    /// Appends a copy of the step under a new id, titled with a copy suffix
    /// and shifted by the duplicate offset.
    pub fn duplicate_step(&mut self, id: StepId) -> Option<Step> {
        let source = self.step(id)?.clone();
        let offset = self.settings.duplicate_offset;
        let copy = Step {
            id: self.fresh_id(),
            title: format!("{} (Copy)", source.title),
            position: self
                .settings
                .bounds
                .clamp(source.position.offset(offset, offset)),
            ..source
        };

        debug!(source_id = %id, step_id = %copy.id, "Duplicated step");
        self.journey.steps.push(copy.clone());
        self.touch();
        Some(copy)
    }

    /// Replaces the whole step sequence, e.g. with a template or a generation
    /// result. The selection is cleared.
    pub fn replace_steps(&mut self, steps: Vec<Step>) {
        self.journey.steps = steps;
        self.selection = None;
        self.normalize_steps();
        self.touch();
    }

    fn fresh_id(&self) -> StepId {
        loop {
            let id = StepId::new();
            if self.step(id).is_none() {
                return id;
            }
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.journey.updated_at = Utc::now();
    }

    fn normalize_steps(&mut self) {
        let bounds = self.settings.bounds;
        let mut seen = HashSet::with_capacity(self.journey.steps.len());

        for step in &mut self.journey.steps {
            if !seen.insert(step.id) {
                let replacement = loop {
                    let id = StepId::new();
                    if !seen.contains(&id) {
                        break id;
                    }
                };
                warn!(step_id = %step.id, new_id = %replacement, "Duplicate step id re-issued");
                step.id = replacement;
                seen.insert(replacement);
            }

            let clamped = bounds.clamp(step.position);
            if clamped != step.position {
                warn!(
                    step_id = %step.id,
                    x = step.position.x,
                    y = step.position.y,
                    "Step position outside canvas, clamped"
                );
                step.position = clamped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> JourneyGraph {
        JourneyGraph::empty(GraphSettings::default())
    }

    #[test]
    fn test_add_step_defaults() {
        let mut graph = graph();
        let step = graph.add_step(StepType::Email, None);

        assert_eq!(graph.len(), 1);
        assert_eq!(step.title, "New Email");
        assert_eq!(step.content, "");
        assert_eq!(step.delay, 0);
        assert_eq!(step.position, Position::new(200.0, 200.0));
        assert_eq!(graph.steps()[0], step);
    }

    #[test]
    fn test_add_step_with_position_is_clamped() {
        let mut graph = graph();
        let step = graph.add_step(StepType::Action, Some(Position::new(790.0, -3.0)));
        assert_eq!(step.position, Position::new(550.0, 0.0));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut graph = graph();
        let mut ids = HashSet::new();
        for step_type in StepType::ALL {
            let step = graph.add_step(step_type, None);
            assert!(ids.insert(step.id));
            let copy = graph.duplicate_step(step.id).unwrap();
            assert!(ids.insert(copy.id));
        }
        assert_eq!(graph.len(), 8);
    }

    #[test]
    fn test_update_step_merges_and_clamps() {
        let mut graph = graph();
        let id = graph.add_step(StepType::Wait, None).id;

        assert!(graph.update_step(
            id,
            StepPatch {
                delay: Some(3),
                position: Some(Position::new(-10.0, 10_000.0)),
                ..StepPatch::default()
            }
        ));

        let step = graph.step(id).unwrap();
        assert_eq!(step.delay, 3);
        assert_eq!(step.title, "New Wait");
        assert_eq!(step.position, Position::new(0.0, 450.0));
        assert!(graph.bounds().contains(step.position));
    }

    #[test]
    fn test_missing_id_is_a_no_op() {
        let mut graph = graph();
        graph.add_step(StepType::Email, None);
        graph.add_step(StepType::Wait, None);
        let before = graph.steps().to_vec();
        let revision = graph.revision();

        let missing = StepId::new();
        assert!(!graph.update_step(missing, StepPatch::title("nope")));
        assert!(!graph.delete_step(missing));
        assert!(graph.duplicate_step(missing).is_none());

        assert_eq!(graph.steps(), before.as_slice());
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn test_unchanged_update_keeps_revision() {
        let mut graph = graph();
        let id = graph.add_step(StepType::Email, None).id;
        graph.update_step(id, StepPatch::title("Welcome"));
        let revision = graph.revision();
        let updated_at = graph.journey().updated_at;

        assert!(graph.update_step(id, StepPatch::default()));
        assert!(graph.update_step(id, StepPatch::title("Welcome")));
        assert!(graph.update_step(id, StepPatch::position(Position::new(200.0, 200.0))));
        assert_eq!(graph.revision(), revision);
        assert_eq!(graph.journey().updated_at, updated_at);

        assert!(graph.update_step(id, StepPatch::title("Hello")));
        assert_eq!(graph.revision(), revision + 1);
    }

    #[test]
    fn test_delete_clears_only_matching_selection() {
        let mut graph = graph();
        let a = graph.add_step(StepType::Email, None).id;
        let b = graph.add_step(StepType::Wait, None).id;

        assert!(graph.select(a));
        graph.delete_step(b);
        assert_eq!(graph.selection(), Some(a));

        graph.delete_step(a);
        assert_eq!(graph.selection(), None);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_select_unknown_step_is_rejected() {
        let mut graph = graph();
        assert!(!graph.select(StepId::new()));
        assert_eq!(graph.selection(), None);
    }

    #[test]
    fn test_duplicate_semantics() {
        let mut graph = graph();
        let id = graph.add_step(StepType::WhatsApp, None).id;
        graph.update_step(id, StepPatch::content("Hi {name}"));
        let original = graph.step(id).unwrap().clone();

        let copy = graph.duplicate_step(id).unwrap();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.step_type, original.step_type);
        assert_eq!(copy.content, original.content);
        assert_eq!(copy.delay, original.delay);
        assert!(copy.title.ends_with(" (Copy)"));
        assert_eq!(copy.position, Position::new(220.0, 220.0));
        assert_eq!(graph.step(id).unwrap(), &original);
        assert_eq!(graph.steps().last().unwrap().id, copy.id);
    }

    #[test]
    fn test_duplicate_near_edge_is_clamped() {
        let mut graph = graph();
        let id = graph.add_step(StepType::Email, Some(Position::new(550.0, 450.0))).id;
        let copy = graph.duplicate_step(id).unwrap();
        assert_eq!(copy.position, Position::new(550.0, 450.0));
    }

    #[test]
    fn test_new_repairs_duplicate_ids_and_positions() {
        let mut journey = Journey::sample_onboarding();
        let clash = journey.steps[0].id;
        journey.steps[1].id = clash;
        journey.steps[2].position = Position::new(5_000.0, -1.0);

        let graph = JourneyGraph::new(journey, GraphSettings::default());
        let ids: HashSet<StepId> = graph.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(graph.steps()[0].id, clash);
        assert_eq!(graph.steps()[2].position, Position::new(550.0, 0.0));
    }

    #[test]
    fn test_replace_steps_clears_selection() {
        let mut graph = JourneyGraph::new(Journey::sample_onboarding(), GraphSettings::default());
        let first = graph.steps()[0].id;
        graph.select(first);

        graph.replace_steps(Vec::new());
        assert!(graph.is_empty());
        assert_eq!(graph.selection(), None);
    }

    #[test]
    fn test_shrinking_canvas_reclamps_steps() {
        let mut graph = graph();
        let id = graph.add_step(StepType::Email, Some(Position::new(500.0, 400.0))).id;

        graph.set_bounds(CanvasBounds::new(400.0, 300.0, 250.0, 150.0));
        assert_eq!(graph.step(id).unwrap().position, Position::new(150.0, 150.0));
    }
}
