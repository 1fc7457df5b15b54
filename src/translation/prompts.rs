/*!
 * Prompt configuration and prompt builders.
 *
 * The system instruction is built once per run from `prompts.json`; the user
 * prompt is built per chunk from the context window, the part label and the
 * chunk text.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::AppError;
use crate::language_utils;

/// Opens the per-chunk user prompt
pub const BEGIN_MARKER: &str = "---BEGIN---";

/// Closes the per-chunk user prompt
pub const END_MARKER: &str = "---END---";

/// Line introducing the chunk body
pub const TRANSLATE_LEAD: &str = "Now translate the following";

/// Style rule used verbatim when present
const NOVEL_STYLE_KEY: &str = "novel";

/// Language pair and optional genre/vibe selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSettings {
    /// ISO 639 code or free-form name
    pub source_language: String,
    /// ISO 639 code or free-form name
    pub target_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vibe: Option<String>,
}

/// Contents of `config/prompts.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptConfig {
    pub project_settings: ProjectSettings,
    pub base_instructions: Vec<String>,
    pub style_rules: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub genre_rules: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vibe_rules: BTreeMap<String, String>,
}

impl PromptConfig {
    /// Load and validate the prompt configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Prompt config missing at {}: {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            AppError::Configuration(message) => {
                AppError::Configuration(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Parse and validate a prompt configuration document
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: PromptConfig = serde_json::from_str(json)
            .map_err(|e| AppError::Configuration(format!("Invalid prompt config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check required values and that selections name existing rules
    pub fn validate(&self) -> Result<(), AppError> {
        let settings = &self.project_settings;
        language_utils::display_language(&settings.source_language)
            .map_err(|e| AppError::Configuration(format!("project_settings.source_language: {}", e)))?;
        language_utils::display_language(&settings.target_language)
            .map_err(|e| AppError::Configuration(format!("project_settings.target_language: {}", e)))?;

        if let Some(genre) = &settings.selected_genre {
            if !self.genre_rules.contains_key(genre) {
                return Err(AppError::Configuration(format!("Unknown genre '{}' in genre_rules", genre)));
            }
        }
        if let Some(vibe) = &settings.selected_vibe {
            if !self.vibe_rules.contains_key(vibe) {
                return Err(AppError::Configuration(format!("Unknown vibe '{}' in vibe_rules", vibe)));
            }
        }

        Ok(())
    }

    /// Minimal working configuration, also the template for new projects
    pub fn sample() -> Self {
        let mut style_rules = BTreeMap::new();
        style_rules.insert(
            NOVEL_STYLE_KEY.to_string(),
            "Keep the narrative voice, tense and paragraph breaks of the original.".to_string(),
        );

        Self {
            project_settings: ProjectSettings {
                source_language: "English".to_string(),
                target_language: "hi".to_string(),
                selected_genre: None,
                selected_vibe: None,
            },
            base_instructions: vec![
                "Translate faithfully; do not summarize or skip sentences.".to_string(),
                "Keep character names consistent across chapters.".to_string(),
            ],
            style_rules,
            genre_rules: BTreeMap::new(),
            vibe_rules: BTreeMap::new(),
        }
    }
}

/// Build the run-wide system instruction
pub fn build_system_instruction(config: &PromptConfig) -> Result<String, AppError> {
    config.validate()?;
    let settings = &config.project_settings;
    let source = language_utils::display_language(&settings.source_language)?;
    let target = language_utils::display_language(&settings.target_language)?;

    let style_text = match config.style_rules.get(NOVEL_STYLE_KEY) {
        Some(novel) => novel.clone(),
        None => config
            .style_rules
            .iter()
            .map(|(key, value)| format!("- **{}**: {}\n", capitalize(key), value))
            .collect(),
    };

    let mut instruction = format!(
        "Role: Professional Literary Translator\n\n\
         Project Settings:\n\
         - Source: {}\n\
         - Target: {}\n\n\
         Base Instructions:\n{}\n\n\
         Style Guidelines:\n{}\n\n",
        source,
        target,
        config.base_instructions.join("\n"),
        style_text.trim_end()
    );

    if let Some((genre, rule)) = selected_rule(&settings.selected_genre, &config.genre_rules) {
        instruction.push_str(&format!("Genre ({}): {}\n\n", genre, rule));
    }
    if let Some((vibe, rule)) = selected_rule(&settings.selected_vibe, &config.vibe_rules) {
        instruction.push_str(&format!("Vibe ({}): {}\n\n", vibe, rule));
    }

    instruction.push_str("Output Requirement:\nReturn ONLY the translated text in clean Markdown format.");
    Ok(instruction)
}

/// Build the prompt for one chunk
pub fn build_user_prompt(original_tail: &str, translated_tail: &str, part_label: &str, chunk: &str) -> String {
    format!(
        "{BEGIN_MARKER}\n\
         Previous Original Context:\n{original_tail}\n\n\
         Previous Translated Context:\n{translated_tail}\n\n\
         {TRANSLATE_LEAD} {part_label}:\n\n\
         {chunk}\n\
         {END_MARKER}"
    )
}

fn selected_rule<'a>(
    selection: &'a Option<String>,
    rules: &'a BTreeMap<String, String>,
) -> Option<(&'a str, &'a str)> {
    let key = selection.as_deref()?;
    rules.get(key).map(|rule| (key, rule.as_str()))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
