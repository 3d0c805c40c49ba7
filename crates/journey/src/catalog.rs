//! Display metadata for each step type, as shown in the palette and on
//! canvas nodes.

use serde::Serialize;

use crate::types::StepType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    pub step_type: StepType,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub fn describe(step_type: StepType) -> StepDescriptor {
    let (name, icon, color, description) = match step_type {
        StepType::Wait => ("Wait", "clock", "bg-blue-500", "Add a delay to the journey"),
        StepType::Email => ("Email", "mail", "bg-green-500", "Send an email"),
        StepType::WhatsApp => (
            "WhatsApp",
            "message-square",
            "bg-emerald-500",
            "Send a WhatsApp message",
        ),
        StepType::Action => ("Action", "zap", "bg-purple-500", "Run a custom action"),
    };

    StepDescriptor {
        step_type,
        name,
        icon,
        color,
        description,
    }
}

/// Palette entries in display order.
pub fn palette() -> impl Iterator<Item = StepDescriptor> {
    StepType::ALL.into_iter().map(describe)
}

/// Title given to a freshly added step.
pub fn default_title(step_type: StepType) -> String {
    format!("New {}", describe(step_type).name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_covers_every_type_once() {
        let types: Vec<StepType> = palette().map(|d| d.step_type).collect();
        assert_eq!(types, StepType::ALL.to_vec());
    }

    #[test]
    fn test_default_titles() {
        assert_eq!(default_title(StepType::Email), "New Email");
        assert_eq!(default_title(StepType::Wait), "New Wait");
        assert_eq!(describe(StepType::WhatsApp).icon, "message-square");
    }
}
