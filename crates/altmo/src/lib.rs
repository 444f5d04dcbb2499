//! Command line front end for computing network distances between the
//! residences and amenities of a study area.

pub mod cli;
pub mod commands;
pub mod settings;

pub use settings::{Settings, SettingsError};
