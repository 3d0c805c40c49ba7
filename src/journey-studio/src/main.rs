//! Journey Studio — command-line driver for the journey editor.
//!
//! Loads configuration, initialises logging and edits journeys stored as JSON
//! files under the configured data directory.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use studio_core::{AppConfig, AppContext};
use studio_journey::catalog;
use studio_journey::generator::{StubGenerator, EXAMPLE_PROMPTS};
use studio_journey::session::GenerationOutcome;
use studio_journey::store::{FileJourneyStore, JourneyStore};
use studio_journey::types::{Journey, Position, StepId, StepType};
use studio_journey::EditorSession;

#[derive(Parser, Debug)]
#[command(name = "journey-studio")]
#[command(about = "Compose and edit multi-step marketing journeys")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "JOURNEY_STUDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Journey data directory (overrides config)
    #[arg(long, env = "JOURNEY_STUDIO__STORAGE__DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Simulated generation latency in milliseconds (overrides config)
    #[arg(long)]
    latency_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a journey, optionally seeded with the onboarding sample
    New {
        #[arg(long, default_value = "Untitled Journey")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = false)]
        sample: bool,
        /// Store as a shareable template
        #[arg(long, default_value_t = false)]
        template: bool,
    },
    /// Append a step of the given type (wait, email, whatsapp, action)
    Add {
        journey: Uuid,
        step_type: StepType,
        #[arg(long, requires = "y")]
        x: Option<f64>,
        #[arg(long, requires = "x")]
        y: Option<f64>,
    },
    /// Drag a step so its top-left corner lands at (x, y)
    Drag {
        journey: Uuid,
        step: StepId,
        x: f64,
        y: f64,
    },
    /// Duplicate a step
    Duplicate { journey: Uuid, step: StepId },
    /// Delete a step
    Delete { journey: Uuid, step: StepId },
    /// Generate a journey from a prompt
    Generate {
        prompt: Option<String>,
        /// Replace the steps of an existing journey instead of creating one
        #[arg(long)]
        journey: Option<Uuid>,
    },
    /// Print the canvas render model of a journey
    Show { journey: Uuid },
    /// List shareable templates
    Templates,
    /// Create a draft journey from a shareable template
    Instantiate { template: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) if cli.config.is_some() => return Err(e).context("loading config file"),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Apply CLI overrides
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(latency) = cli.latency_ms {
        config.generator.latency_ms = latency;
    }

    init_tracing(config.log.json);
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let ctx = AppContext::new(config);
    info!(
        data_dir = %ctx.config.storage.data_dir.display(),
        theme = ?ctx.preferences.theme,
        "Configuration loaded"
    );

    let store = FileJourneyStore::new(&ctx.config.storage.data_dir);
    run(cli.command, &ctx, &store).await
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "journey_studio=info,studio_journey=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(command: Command, ctx: &AppContext, store: &FileJourneyStore) -> anyhow::Result<()> {
    let canvas = &ctx.config.canvas;

    match command {
        Command::New {
            name,
            description,
            sample,
            template,
        } => {
            let mut journey = if sample {
                Journey::sample_onboarding()
            } else {
                Journey::new("", "")
            };
            journey.name = name;
            journey.description = description;
            journey.is_template = template;
            journey.is_shareable = template;

            let session = EditorSession::new(journey, canvas);
            session.save(store).await?;
            print_json(session.journey())
        }
        Command::Add {
            journey,
            step_type,
            x,
            y,
        } => {
            let mut session = EditorSession::open(store, journey, canvas).await?;
            let step = match x.zip(y) {
                Some((x, y)) => session.add_at(step_type, Position::new(x, y)),
                None => session.add_from_palette(step_type),
            };
            session.save(store).await?;
            print_json(&step)
        }
        Command::Drag { journey, step, x, y } => {
            let mut session = EditorSession::open(store, journey, canvas).await?;
            if !session.drag_step_to(step, Position::new(x, y)) {
                return Err(anyhow!("step {step} not found"));
            }

            session.save(store).await?;
            print_json(&session.graph().step(step))
        }
        Command::Duplicate { journey, step } => {
            let mut session = EditorSession::open(store, journey, canvas).await?;
            let copy = session
                .graph_mut()
                .duplicate_step(step)
                .ok_or_else(|| anyhow!("step {step} not found"))?;
            session.save(store).await?;
            print_json(&copy)
        }
        Command::Delete { journey, step } => {
            let mut session = EditorSession::open(store, journey, canvas).await?;
            if !session.graph_mut().delete_step(step) {
                return Err(anyhow!("step {step} not found"));
            }
            session.save(store).await?;
            print_json(session.journey())
        }
        Command::Generate { prompt, journey } => {
            let Some(prompt) = prompt else {
                println!("Example prompts:");
                for example in EXAMPLE_PROMPTS {
                    println!("  - {example}");
                }
                return Ok(());
            };

            let mut session = match journey {
                Some(id) => EditorSession::open(store, id, canvas).await?,
                None => EditorSession::new(Journey::new("Generated Journey", ""), canvas),
            };
            let generator = StubGenerator::from_config(&ctx.config.generator);
            match session.generate(&generator, &prompt).await? {
                GenerationOutcome::Applied => {
                    session.save(store).await?;
                    print_json(session.journey())
                }
                GenerationOutcome::Discarded => Err(anyhow!("generation result was discarded")),
            }
        }
        Command::Show { journey } => {
            let session = EditorSession::open(store, journey, canvas).await?;
            #[derive(Serialize)]
            struct Summary<'a> {
                name: &'a str,
                description: &'a str,
                palette: Vec<catalog::StepDescriptor>,
                nodes: Vec<studio_journey::canvas::NodeView>,
            }
            print_json(&Summary {
                name: &session.journey().name,
                description: &session.journey().description,
                palette: catalog::palette().collect(),
                nodes: session.render(),
            })
        }
        Command::Templates => {
            let templates = store.list_templates().await?;
            for template in &templates {
                println!("{}  {} ({} steps)", template.id, template.name, template.steps.len());
            }
            Ok(())
        }
        Command::Instantiate { template } => {
            let source = store.load(template).await?;
            let journey = source.instantiate_template()?;
            store.save(&journey).await?;
            print_json(&journey)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
