use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Phase of the pointer gesture currently handled by a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Idle,
    /// A node is following the pointer.
    Dragging,
    /// A node action button is held down; fires on release over the button.
    Pressing,
}

/// Describes a single valid gesture transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureTransition {
    pub from: GesturePhase,
    pub to: GesturePhase,
    pub trigger: String,
}

/// Guards the canvas gesture lifecycle. Move/up handling is only live while
/// the machine is out of `Idle`, and every non-idle phase can always return
/// to `Idle`.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    pub phase: GesturePhase,
    pub transitions: Vec<GestureTransition>,
}

impl GestureStateMachine {
    /// Creates a machine in `Idle` with all valid transitions configured.
    pub fn new() -> Self {
        let transitions = vec![
            // Idle ->
            GestureTransition {
                from: GesturePhase::Idle,
                to: GesturePhase::Dragging,
                trigger: "primary_down_on_node".to_string(),
            },
            GestureTransition {
                from: GesturePhase::Idle,
                to: GesturePhase::Pressing,
                trigger: "primary_down_on_action".to_string(),
            },
            // Dragging ->
            GestureTransition {
                from: GesturePhase::Dragging,
                to: GesturePhase::Idle,
                trigger: "pointer_up_or_cancel".to_string(),
            },
            // Pressing ->
            GestureTransition {
                from: GesturePhase::Pressing,
                to: GesturePhase::Idle,
                trigger: "pointer_up_or_cancel".to_string(),
            },
        ];

        Self {
            phase: GesturePhase::Idle,
            transitions,
        }
    }

    /// Returns `true` if the given transition is allowed.
    pub fn can_transition(&self, from: GesturePhase, to: GesturePhase) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == from && t.to == to)
    }

    /// Moves the machine to `to`, or errors if the transition is not permitted.
    pub fn transition(&mut self, to: GesturePhase) -> Result<()> {
        if self.can_transition(self.phase, to) {
            self.phase = to;
            Ok(())
        } else {
            Err(anyhow!(
                "Invalid gesture transition from {:?} to {:?}",
                self.phase,
                to
            ))
        }
    }

    /// Unconditionally returns to `Idle`.
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
    }

    pub fn is_idle(&self) -> bool {
        self.phase == GesturePhase::Idle
    }
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_lifecycle() {
        let mut machine = GestureStateMachine::new();
        assert!(machine.transition(GesturePhase::Dragging).is_ok());
        assert!(!machine.is_idle());
        assert!(machine.transition(GesturePhase::Idle).is_ok());
        assert!(machine.is_idle());
    }

    #[test]
    fn test_cannot_start_second_gesture() {
        let mut machine = GestureStateMachine::new();
        machine.transition(GesturePhase::Dragging).unwrap();
        assert!(machine.transition(GesturePhase::Pressing).is_err());
        assert_eq!(machine.phase, GesturePhase::Dragging);
    }

    #[test]
    fn test_idle_to_idle_is_not_a_transition() {
        let mut machine = GestureStateMachine::new();
        assert!(machine.transition(GesturePhase::Idle).is_err());
    }
}
