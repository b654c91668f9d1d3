// ABOUTME: LLM completion collaborator used as a secondary parser and venue source
// ABOUTME: Any failure surfaces as None so callers fall back to rule-based paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Completion
//!
//! The conversation engine only ever asks for a single completion of a
//! prompt. The model never touches the store; its output is validated by
//! the same rules the rule-based parsers apply before anything is kept.

/// OpenAI-compatible `/chat/completions` client
pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleClient;

use async_trait::async_trait;

/// Completion collaborator
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete `prompt`. `None` means "use the fallback": the endpoint
    /// failed, timed out, or returned nothing.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Option<String>;

    /// Name for logs
    fn name(&self) -> &'static str;
}

/// Strip a Markdown code fence the model may wrap JSON in
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  [1] "), "[1]");
    }
}
