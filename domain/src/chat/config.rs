//! Chat configuration: model plus sampling and penalty parameters.

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Sampling configuration attached to a chat session.
///
/// Bounds:
/// - `temperature` in `[0, 2]`
/// - `top_p` in `[0, 1]`
/// - `n >= 1`
/// - `presence_penalty` and `frequency_penalty` in `[-2, 2]`
///
/// `max_output_tokens == 0` means "let the provider decide".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    model: Model,
    temperature: f32,
    top_p: f32,
    n: u32,
    stop: Vec<String>,
    max_output_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

impl ChatConfig {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_output_tokens: 0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }

    // ==================== Accessors ====================

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn stop(&self) -> &[String] {
        &self.stop
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn presence_penalty(&self) -> f32 {
        self.presence_penalty
    }

    pub fn frequency_penalty(&self) -> f32 {
        self.frequency_penalty
    }

    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    // ==================== Validation ====================

    /// Validate the configuration, returning a list of issues.
    ///
    /// NaN values fail every range check.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(format!(
                "invalid temperature {} (expected 0.0 to 2.0)",
                self.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            issues.push(format!("invalid top_p {} (expected 0.0 to 1.0)", self.top_p));
        }
        if self.n < 1 {
            issues.push("invalid n 0 (expected at least 1)".to_string());
        }
        if !(-2.0..=2.0).contains(&self.presence_penalty) {
            issues.push(format!(
                "invalid presence_penalty {} (expected -2.0 to 2.0)",
                self.presence_penalty
            ));
        }
        if !(-2.0..=2.0).contains(&self.frequency_penalty) {
            issues.push(format!(
                "invalid frequency_penalty {} (expected -2.0 to 2.0)",
                self.frequency_penalty
            ));
        }
        if self.model.max_tokens() == 0 {
            issues.push("model max tokens must be positive".to_string());
        }
        issues
    }
}
