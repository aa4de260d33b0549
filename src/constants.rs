// Runtime settings loaded from the environment, plus the fixed values of the .smbp export.

use std::env;

lazy_static::lazy_static! {
    // API_KEY is accepted for compatibility with existing .env files.
    pub static ref GEMINI_API_KEY: String = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("API_KEY"))
        .unwrap_or_default();
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
    pub static ref GEMINI_API_URL: String = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string());
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 9900;

/// Message shown to the user for any generation failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Generation failed. Please try a different description.";

/// Example prompts offered next to the form.
pub const EXAMPLE_PROMPTS: [&str; 2] = [
    "Tank level control with high/low alarms and 2 pumps.",
    "Star-Delta motor starting logic for a 15kW motor.",
];

// Ladder grid
pub const GRID_COLUMNS: u32 = 11;
pub const COIL_COLUMN: u32 = GRID_COLUMNS - 1;

// .smbp document metadata, identical for every export
pub const SMBP_FILE_NAME: &str = "M221_Project.smbp";
pub const SMBP_MIME_TYPE: &str = "application/xml; charset=utf-8";
pub const SMBP_PROJECT_VERSION: &str = "3.0.0.0";
pub const SMBP_MANAGEMENT_LEVEL: &str = "FunctLevelMan21_0";
pub const SMBP_PROJECT_NAME: &str = "AI_Generated_M221";
pub const SMBP_POU_NAME: &str = "MainProgram";
pub const SMBP_SECTION_NUMBER: &str = "1";
pub const SMBP_CPU_REFERENCE: &str = "TM221CE16T";
pub const SMBP_HARDWARE_ID: &str = "1929";
