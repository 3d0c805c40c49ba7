pub mod config;
pub mod context;
pub mod error;

pub use crate::config::AppConfig;
pub use crate::context::{AppContext, Theme, UiPreferences};
pub use crate::error::{StudioError, StudioResult};
