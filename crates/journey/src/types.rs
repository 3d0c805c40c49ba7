use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use studio_core::{StudioError, StudioResult};

/// The kind of work a step performs. Closed set: adding a variant is a
/// compile-time change everywhere a step type is matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Wait,
    Email,
    WhatsApp,
    Action,
}

impl StepType {
    pub const ALL: [StepType; 4] = [
        StepType::Wait,
        StepType::Email,
        StepType::WhatsApp,
        StepType::Action,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepType::Wait => "wait",
            StepType::Email => "email",
            StepType::WhatsApp => "whatsapp",
            StepType::Action => "action",
        }
    }

    /// Whether the step carries a message body.
    pub fn has_content(self) -> bool {
        !matches!(self, StepType::Wait)
    }

    /// Whether the step's `delay` is meaningful.
    pub fn has_delay(self) -> bool {
        matches!(self, StepType::Wait)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepType {
    type Err = StudioError;

    fn from_str(s: &str) -> StudioResult<Self> {
        StepType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudioError::UnknownStepType(s.to_string()))
    }
}

/// Opaque step identifier. Freshly generated ids are random v4 UUIDs and are
/// never handed out twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(Uuid);

impl StepId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StepId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A point in canvas space (pixels, origin at the canvas' top-left corner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Component-wise difference `self - other`.
    pub fn minus(self, other: Position) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A single node in a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Days to wait. Only read for `Wait` steps.
    #[serde(default)]
    pub delay: u32,
    pub position: Position,
}

/// Partial update merged into a step by `JourneyGraph::update_step`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub delay: Option<u32>,
    pub position: Option<Position>,
}

impl StepPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn delay(days: u32) -> Self {
        Self {
            delay: Some(days),
            ..Self::default()
        }
    }

    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.delay.is_none()
            && self.position.is_none()
    }
}

/// Lifecycle status of a journey definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    #[default]
    Draft,
    Active,
    Paused,
}

/// Business purpose of a journey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyKind {
    #[default]
    Onboarding,
    Engagement,
    Renewal,
    Offer,
}

/// A named, ordered sequence of steps. Sequence order is execution order;
/// canvas positions are independent of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: JourneyKind,
    #[serde(default)]
    pub status: JourneyStatus,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub is_shareable: bool,
    #[serde(default)]
    pub original_template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Journey {
    /// Creates an empty draft journey.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            kind: JourneyKind::default(),
            status: JourneyStatus::Draft,
            steps: Vec::new(),
            is_template: false,
            is_shareable: false,
            original_template_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The three-step onboarding journey a fresh editor starts with.
    pub fn sample_onboarding() -> Self {
        let mut journey = Self::new("New Onboarding Journey", "Journey for new users");
        journey.steps = vec![
            Step {
                id: StepId::new(),
                step_type: StepType::Email,
                title: "Welcome Email".to_string(),
                content: "Hello {name}, welcome to our system!".to_string(),
                delay: 0,
                position: Position::new(100.0, 100.0),
            },
            Step {
                id: StepId::new(),
                step_type: StepType::Wait,
                title: "Wait 2 days".to_string(),
                content: String::new(),
                delay: 2,
                position: Position::new(300.0, 100.0),
            },
            Step {
                id: StepId::new(),
                step_type: StepType::WhatsApp,
                title: "WhatsApp Follow-up".to_string(),
                content: "How is your experience with our product so far?".to_string(),
                delay: 0,
                position: Position::new(500.0, 100.0),
            },
        ];
        journey
    }

    /// Creates a business-owned draft from a shareable template. Step
    /// content is copied under fresh ids.
    pub fn instantiate_template(&self) -> StudioResult<Journey> {
        if !self.is_template || !self.is_shareable {
            return Err(StudioError::NotShareableTemplate(self.id.to_string()));
        }

        let now = Utc::now();
        Ok(Journey {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            status: JourneyStatus::Draft,
            steps: self
                .steps
                .iter()
                .map(|s| Step {
                    id: StepId::new(),
                    ..s.clone()
                })
                .collect(),
            is_template: false,
            is_shareable: false,
            original_template_id: Some(self.id),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_shareable_template(&self) -> bool {
        self.is_template && self.is_shareable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_type_parse() {
        assert_eq!("email".parse::<StepType>().unwrap(), StepType::Email);
        assert_eq!(" WhatsApp ".parse::<StepType>().unwrap(), StepType::WhatsApp);
        assert!(matches!(
            "sms".parse::<StepType>(),
            Err(StudioError::UnknownStepType(_))
        ));
    }

    #[test]
    fn test_step_serializes_type_tag() {
        let step = Step {
            id: StepId::new(),
            step_type: StepType::WhatsApp,
            title: "Ping".to_string(),
            content: "hi".to_string(),
            delay: 0,
            position: Position::new(1.0, 2.0),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["type"], "whatsapp");
        assert_eq!(value["position"]["x"], 1.0);
    }

    #[test]
    fn test_wait_step_without_content_deserializes() {
        let raw = serde_json::json!({
            "id": "6f1c1a7e-2d1b-4c55-9a0f-4c1f3f0a9b10",
            "type": "wait",
            "title": "Wait 1 day",
            "delay": 1,
            "position": {"x": 300.0, "y": 150.0}
        });
        let step: Step = serde_json::from_value(raw).unwrap();
        assert_eq!(step.content, "");
        assert_eq!(step.delay, 1);
    }

    #[test]
    fn test_instantiate_template() {
        let mut template = Journey::sample_onboarding();
        template.is_template = true;
        template.is_shareable = true;

        let instance = template.instantiate_template().unwrap();
        assert_ne!(instance.id, template.id);
        assert_eq!(instance.original_template_id, Some(template.id));
        assert!(!instance.is_template);
        assert_eq!(instance.status, JourneyStatus::Draft);
        assert_eq!(instance.steps.len(), 3);
        for (copy, original) in instance.steps.iter().zip(&template.steps) {
            assert_ne!(copy.id, original.id);
            assert_eq!(copy.title, original.title);
            assert_eq!(copy.position, original.position);
        }
    }

    #[test]
    fn test_private_template_cannot_be_instantiated() {
        let mut template = Journey::sample_onboarding();
        template.is_template = true;
        assert!(matches!(
            template.instantiate_template(),
            Err(StudioError::NotShareableTemplate(_))
        ));
    }
}
