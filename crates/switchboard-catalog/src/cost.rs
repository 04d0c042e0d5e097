//! Pure cost arithmetic over model descriptors
//!
//! `estimate` approximates spend before a call; `actual` settles it from
//! returned token counts. Every component that needs a dollar figure
//! goes through these two functions.

use crate::ModelDescriptor;

/// Rough tokens-per-word ratio for English text
const TOKENS_PER_WORD: f64 = 1.3;

/// Assumed output length relative to input when estimating
const OUTPUT_INPUT_RATIO: f64 = 0.5;

/// Estimate the cost of sending `text` to `model` before calling it
///
/// Input tokens are approximated from the word count; the response is
/// assumed to run at half the input length, capped at the model's
/// output limit.
pub fn estimate(text: &str, model: &ModelDescriptor) -> f64 {
    let input_tokens = text.split_whitespace().count() as f64 * TOKENS_PER_WORD;
    let output_tokens = (input_tokens * OUTPUT_INPUT_RATIO).min(f64::from(model.max_output_tokens));

    (input_tokens / 1000.0).mul_add(
        model.cost_per_1k_input,
        (output_tokens / 1000.0) * model.cost_per_1k_output,
    )
}

/// Exact cost of a completed exchange from reported token counts
pub fn actual(input_tokens: u32, output_tokens: u32, model: &ModelDescriptor) -> f64 {
    (f64::from(input_tokens) / 1000.0).mul_add(
        model.cost_per_1k_input,
        (f64::from(output_tokens) / 1000.0) * model.cost_per_1k_output,
    )
}
