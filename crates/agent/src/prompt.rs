//! Prompt builders for each task kind.

use puzzlebot_core::task::CodePart;

/// Prompt for a question the model answers directly.
pub fn plain_question(description: &str) -> String {
    format!(
        "You are a puzzle/task solver bot. You are given a task to solve. \
         Think out step-by-step and put the final solution in backticks at the end of your response.\n\
         For example, if the solution is 42, you should return `42`. The task is: {description}"
    )
}

/// Prompt asking for a complete Rust program that solves one part of a
/// code challenge, written into `template`.
///
/// Windows line endings are normalized so the template and description
/// reach the model with `\n` only.
pub fn generated_code(part: CodePart, template: &str, description: &str) -> String {
    let restriction = match part {
        CodePart::One => "",
        CodePart::Two => "You must only solve the task from \"Part Two\" of the challenge. ",
    };

    let prompt = format!(
        "You are an expert \"Advent of code\" challenge solver. You are given a coding puzzle \
         and you generate correct (compilable), efficient and idiomatic Rust code which solves \
         the puzzle for a\ngiven input. {restriction}Think out step-by-step first, then output \
         the Rust code in the following template format:\n\n\
         ```rust\n{template}\n```\n\n\
         The challenge is:\n{description}"
    );

    prompt.replace("\r\n", "\n")
}
