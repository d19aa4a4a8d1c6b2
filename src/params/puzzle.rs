//! Entry-lock puzzle content.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One numeric verification challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Heading shown above the question
    pub title: String,

    /// Question text
    pub prompt: String,

    /// Expected integer answer
    pub answer: i64,
}

impl Challenge {
    fn new(title: &str, prompt: &str, answer: i64) -> Self {
        Self {
            title: title.to_string(),
            prompt: prompt.to_string(),
            answer,
        }
    }
}

/// Puzzle configuration consumed by the entry-lock stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Numeric challenges, attempted strictly in order (steps 1-3)
    pub challenges: Vec<Challenge>,

    /// Heading for the final code step
    pub final_title: String,

    /// Prompt for the final code step
    pub final_prompt: String,

    /// Final alphanumeric code, compared exactly (step 4)
    pub final_code: String,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            challenges: vec![
                Challenge::new("Verification 1/3", "(4 x 6) - 1 =", 23),
                Challenge::new("Verification 2/3", "Shirt number of the defender?", 23),
                Challenge::new("Verification 3/3", "Year of the reunion (2 digits):", 23),
            ],
            final_title: "SECURITY ACCESS".to_string(),
            final_prompt: "OPENING CODE".to_string(),
            final_code: "232323".to_string(),
        }
    }
}

impl PuzzleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.challenges.len() != 3 {
            return Err(ConfigError::Invalid(format!(
                "expected 3 numeric challenges, got {}",
                self.challenges.len()
            )));
        }
        if self.final_code.is_empty() {
            return Err(ConfigError::Invalid("final code must not be empty".to_string()));
        }
        Ok(())
    }
}
