//! Common API for CLI interactions.

use std::fmt::Display;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// Print a question and check whether the answer is exactly `expected`.
///
/// Only the line terminator is dropped from the answer, so `" yes"` is not `"yes"`.
/// An empty input (or end of input) counts as a refusal.
pub(crate) fn confirm_exact<Q, R, W>(
    question: Q,
    expected: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool>
where
    Q: Display,
    R: BufRead,
    W: Write,
{
    write!(output, "{question}")?;
    _ = output.flush();

    let answer = readline(input)?;
    Ok(answer == expected)
}

fn readline<R: BufRead>(input: &mut R) -> Result<String> {
    let mut input_buf = String::new();
    input
        .read_line(&mut input_buf)
        .context("unable to read from standard input")?;
    Ok(input_buf.trim_end_matches(['\r', '\n']).to_string())
}
