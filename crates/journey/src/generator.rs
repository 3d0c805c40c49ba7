//! Prompt-to-journey generation. The only backend shipped here is a stub
//! that waits out a simulated latency and returns a fixed sequence.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use studio_core::config::GeneratorConfig;
use studio_core::{StudioError, StudioResult};

use crate::types::{Position, Step, StepId, StepType};

/// Prompts offered as starting points in the generation dialog.
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Create an onboarding journey for new users with a welcome, a tutorial and a follow-up",
    "Abandoned cart recovery journey with 3 spaced reminders",
    "Nurture sequence for leads interested in premium products",
    "Reactivation journey for users inactive for more than 30 days",
];

/// A generated journey body: its name and the full replacement step list.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedJourney {
    pub name: String,
    pub steps: Vec<Step>,
}

#[async_trait]
pub trait JourneyGenerator: Send + Sync {
    /// Plans a journey for `prompt`. Failures leave the caller's journey
    /// untouched.
    async fn generate(&self, prompt: &str) -> StudioResult<GeneratedJourney>;
}

/// Stand-in planner: Email, Wait, WhatsApp regardless of the prompt.
#[derive(Debug, Clone)]
pub struct StubGenerator {
    latency: Duration,
    name_prefix_chars: usize,
}

impl StubGenerator {
    pub fn new(latency: Duration, name_prefix_chars: usize) -> Self {
        Self {
            latency,
            name_prefix_chars,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            Duration::from_millis(config.latency_ms),
            config.name_prefix_chars,
        )
    }

    fn journey_name(&self, prompt: &str) -> String {
        let prefix: String = prompt.chars().take(self.name_prefix_chars).collect();
        format!("Journey: {prefix}...")
    }

    fn canned_steps() -> Vec<Step> {
        vec![
            Step {
                id: StepId::new(),
                step_type: StepType::Email,
                title: "Welcome Email".to_string(),
                content: "Hello! Welcome to our platform.".to_string(),
                delay: 0,
                position: Position::new(100.0, 150.0),
            },
            Step {
                id: StepId::new(),
                step_type: StepType::Wait,
                title: "Wait 1 day".to_string(),
                content: String::new(),
                delay: 1,
                position: Position::new(300.0, 150.0),
            },
            Step {
                id: StepId::new(),
                step_type: StepType::WhatsApp,
                title: "Follow-up Message".to_string(),
                content: "How is your experience going?".to_string(),
                delay: 0,
                position: Position::new(500.0, 150.0),
            },
        ]
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

#[async_trait]
impl JourneyGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> StudioResult<GeneratedJourney> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::EmptyPrompt);
        }

        info!(prompt_len = prompt.len(), "Generating journey from prompt");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(GeneratedJourney {
            name: self.journey_name(prompt),
            steps: Self::canned_steps(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> StubGenerator {
        StubGenerator::new(Duration::ZERO, 30)
    }

    #[tokio::test]
    async fn test_generates_fixed_sequence() {
        let generated = instant().generate("Welcome flow").await.unwrap();

        let types: Vec<StepType> = generated.steps.iter().map(|s| s.step_type).collect();
        assert_eq!(types, vec![StepType::Email, StepType::Wait, StepType::WhatsApp]);
        assert_eq!(generated.steps[1].delay, 1);
        assert!(generated.name.contains("Welcome flow"));
    }

    #[tokio::test]
    async fn test_name_truncates_long_prompt() {
        let prompt = "a".repeat(100);
        let generated = instant().generate(&prompt).await.unwrap();
        assert_eq!(generated.name, format!("Journey: {}...", "a".repeat(30)));
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected() {
        let err = instant().generate("   ").await.unwrap_err();
        assert!(matches!(err, StudioError::EmptyPrompt));
    }

    #[tokio::test]
    async fn test_each_call_issues_fresh_ids() {
        let generator = instant();
        let first = generator.generate("a").await.unwrap();
        let second = generator.generate("a").await.unwrap();
        for (a, b) in first.steps.iter().zip(&second.steps) {
            assert_ne!(a.id, b.id);
        }
    }

    #[tokio::test]
    async fn test_latency_is_simulated() {
        let generator = StubGenerator::new(Duration::from_millis(20), 30);
        let started = std::time::Instant::now();
        generator.generate("slow").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
