//! Pulling answers and code out of free-text completions.

use puzzlebot_config::SolutionFilter;

const FENCE_OPEN: &str = "```rust";
const FENCE_CLOSE: &str = "```";

/// The text between the last two backticks of `completion`.
///
/// Models are asked to end with the answer in backticks, so the final
/// pair wins over anything quoted earlier in the reasoning.
pub fn backtick_answer(completion: &str) -> Option<&str> {
    let end = completion.rfind('`')?;
    let start = completion[..end].rfind('`')?;
    Some(&completion[start + 1..end])
}

/// The body of the first ```` ```rust ```` block in `completion`.
///
/// The marker only counts when nothing but spaces or tabs follow it on its
/// line, so tags such as `rustc` or `rust,ignore` are skipped. One line
/// break right after the opening marker and one right before the closing
/// fence are dropped. A block that is never closed runs to the end of the
/// completion.
pub fn code_block(completion: &str) -> Option<&str> {
    let rest = completion
        .match_indices(FENCE_OPEN)
        .map(|(i, _)| completion[i + FENCE_OPEN.len()..].trim_start_matches([' ', '\t']))
        .find(|after| after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n"))?;
    let body = match rest.find(FENCE_CLOSE) {
        Some(end) => &rest[..end],
        None => rest,
    };

    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let body = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);
    Some(body)
}

/// Reduce a program's stdout to the submitted answer.
pub fn apply_filter(stdout: &str, filter: SolutionFilter) -> String {
    let trimmed = stdout.trim();
    match filter {
        SolutionFilter::Digits => trimmed.chars().filter(|c| c.is_ascii_digit()).collect(),
        SolutionFilter::Raw => trimmed.to_string(),
    }
}
