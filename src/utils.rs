//! Utility functions and helpers.

pub mod preflight;
pub mod settings;
pub mod workday;

pub use preflight::{check_ai_credentials, AiCredentialInfo, AiProvider};
pub use settings::Settings;
pub use workday::{day_window, previous_workday};
