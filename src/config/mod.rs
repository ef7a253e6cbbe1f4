//! Configuration module for bupstats.
//!
//! Handles the settings file, environment variables and the default
//! database location.

mod settings;

pub use settings::{
    default_dataset_path, expand_env_vars, DatasetSettings, ReportSettings, ServerSettings,
    Settings, SettingsError,
};
