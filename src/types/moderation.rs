//! Content moderation types

use std::collections::HashMap;

/// Moderation request
#[derive(Debug, Clone)]
pub struct ModerationRequest {
    /// Input text to moderate.
    pub input: String,
    /// Model to use for moderation, if the collaborator supports a choice.
    pub model: Option<String>,
}

impl ModerationRequest {
    /// Moderate a single text input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: None,
        }
    }
}

/// Moderation response
#[derive(Debug, Clone)]
pub struct ModerationResponse {
    /// Moderation results
    pub results: Vec<ModerationResult>,
    /// Model used
    pub model: String,
}

impl ModerationResponse {
    /// Whether any result flagged the input.
    pub fn flagged(&self) -> bool {
        self.results.iter().any(|r| r.flagged)
    }

    /// Names of all categories flagged across results.
    pub fn flagged_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .results
            .iter()
            .flat_map(|r| {
                r.categories
                    .iter()
                    .filter(|(_, flagged)| **flagged)
                    .map(|(name, _)| name.clone())
            })
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Individual moderation result
#[derive(Debug, Clone)]
pub struct ModerationResult {
    /// Whether content was flagged
    pub flagged: bool,
    /// Category scores
    pub categories: HashMap<String, bool>,
    /// Category confidence scores
    pub category_scores: HashMap<String, f32>,
}
