//! Binds the selected step to an editable form.
//!
//! Delay input is validated here rather than in the graph: anything that does
//! not parse as a non-negative whole number of days is rejected and the step
//! keeps its previous value.

use serde::Serialize;
use tracing::debug;

use studio_core::{StudioError, StudioResult};

use crate::graph::JourneyGraph;
use crate::types::{Step, StepId, StepPatch, StepType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyField {
    Title,
    Content,
    Delay,
}

impl PropertyField {
    pub fn label(self) -> &'static str {
        match self {
            PropertyField::Title => "Title",
            PropertyField::Content => "Content",
            PropertyField::Delay => "Delay (days)",
        }
    }

    fn name(self) -> &'static str {
        match self {
            PropertyField::Title => "title",
            PropertyField::Content => "content",
            PropertyField::Delay => "delay",
        }
    }
}

/// Fields shown for a step type, in form order.
pub fn fields_for(step_type: StepType) -> &'static [PropertyField] {
    match step_type {
        StepType::Wait => &[PropertyField::Title, PropertyField::Delay],
        StepType::Email | StepType::WhatsApp | StepType::Action => {
            &[PropertyField::Title, PropertyField::Content]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    pub field: PropertyField,
    pub label: &'static str,
    pub value: String,
}

/// Form contents for the selected step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyPanel {
    pub step_id: StepId,
    pub step_type: StepType,
    pub values: Vec<PropertyValue>,
}

impl PropertyPanel {
    fn for_step(step: &Step) -> Self {
        let values = fields_for(step.step_type)
            .iter()
            .map(|&field| PropertyValue {
                field,
                label: field.label(),
                value: match field {
                    PropertyField::Title => step.title.clone(),
                    PropertyField::Content => step.content.clone(),
                    PropertyField::Delay => step.delay.to_string(),
                },
            })
            .collect();

        Self {
            step_id: step.id,
            step_type: step.step_type,
            values,
        }
    }

    pub fn value(&self, field: PropertyField) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.value.as_str())
    }
}

/// Panel for the current selection, or `None` when nothing is selected.
pub fn panel(graph: &JourneyGraph) -> Option<PropertyPanel> {
    graph.selected_step().map(PropertyPanel::for_step)
}

/// Applies raw form input to the selected step.
///
/// Returns `Ok(false)` when nothing is selected. Fields that do not apply to
/// the step's type, and delays that are not non-negative integers, are
/// rejected with [`StudioError::InvalidField`].
pub fn apply(graph: &mut JourneyGraph, field: PropertyField, input: &str) -> StudioResult<bool> {
    let Some(step) = graph.selected_step() else {
        return Ok(false);
    };
    let (id, step_type) = (step.id, step.step_type);

    if !fields_for(step_type).contains(&field) {
        return Err(StudioError::InvalidField {
            field: field.name(),
            reason: format!("not editable on {step_type} steps"),
        });
    }

    let patch = match field {
        PropertyField::Title => StepPatch::title(input),
        PropertyField::Content => StepPatch::content(input),
        PropertyField::Delay => StepPatch::delay(parse_delay(input)?),
    };

    debug!(step_id = %id, field = field.name(), "Applying property edit");
    Ok(graph.update_step(id, patch))
}

fn parse_delay(input: &str) -> StudioResult<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|e| StudioError::InvalidField {
            field: "delay",
            reason: format!("{input:?} is not a whole number of days ({e})"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphSettings;

    fn graph_with(step_type: StepType) -> (JourneyGraph, StepId) {
        let mut graph = JourneyGraph::empty(GraphSettings::default());
        let id = graph.add_step(step_type, None).id;
        graph.select(id);
        (graph, id)
    }

    #[test]
    fn test_fields_per_type() {
        assert_eq!(
            fields_for(StepType::Wait),
            &[PropertyField::Title, PropertyField::Delay]
        );
        for step_type in [StepType::Email, StepType::WhatsApp, StepType::Action] {
            assert_eq!(
                fields_for(step_type),
                &[PropertyField::Title, PropertyField::Content]
            );
        }
    }

    #[test]
    fn test_panel_reflects_selection() {
        let (mut graph, id) = graph_with(StepType::Wait);
        let panel = panel(&graph).unwrap();
        assert_eq!(panel.step_id, id);
        assert_eq!(panel.value(PropertyField::Title), Some("New Wait"));
        assert_eq!(panel.value(PropertyField::Delay), Some("0"));
        assert_eq!(panel.value(PropertyField::Content), None);

        graph.clear_selection();
        assert!(super::panel(&graph).is_none());
    }

    #[test]
    fn test_apply_title_and_content() {
        let (mut graph, id) = graph_with(StepType::Email);
        assert!(apply(&mut graph, PropertyField::Title, "Welcome").unwrap());
        assert!(apply(&mut graph, PropertyField::Content, "Hi {name}").unwrap());

        let step = graph.step(id).unwrap();
        assert_eq!(step.title, "Welcome");
        assert_eq!(step.content, "Hi {name}");
    }

    #[test]
    fn test_apply_delay() {
        let (mut graph, id) = graph_with(StepType::Wait);
        assert!(apply(&mut graph, PropertyField::Delay, " 3 ").unwrap());
        assert_eq!(graph.step(id).unwrap().delay, 3);
    }

    #[test]
    fn test_invalid_delay_is_rejected_and_step_unchanged() {
        let (mut graph, id) = graph_with(StepType::Wait);
        apply(&mut graph, PropertyField::Delay, "2").unwrap();

        for input in ["-1", "abc", "", "1.5"] {
            let err = apply(&mut graph, PropertyField::Delay, input).unwrap_err();
            assert!(matches!(err, StudioError::InvalidField { field: "delay", .. }));
        }
        assert_eq!(graph.step(id).unwrap().delay, 2);
    }

    #[test]
    fn test_field_not_applicable_to_type() {
        let (mut graph, _) = graph_with(StepType::Wait);
        assert!(apply(&mut graph, PropertyField::Content, "ignored").is_err());

        let (mut graph, _) = graph_with(StepType::Action);
        assert!(apply(&mut graph, PropertyField::Delay, "1").is_err());
    }

    #[test]
    fn test_apply_without_selection() {
        let mut graph = JourneyGraph::empty(GraphSettings::default());
        graph.add_step(StepType::Email, None);
        assert!(!apply(&mut graph, PropertyField::Title, "x").unwrap());
    }
}
