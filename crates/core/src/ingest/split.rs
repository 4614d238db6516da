//! Heuristic splitting of an uploaded text blob into individual tickets.
//!
//! Two delimiter conventions are tried in order:
//! 1. A horizontal rule: a line made only of three or more `-`, anywhere in
//!    the text. Used when it yields at least two tickets.
//! 2. A blank line followed by a line that starts with a letter. Indented
//!    paragraphs stay attached to the ticket above them. Rule lines still
//!    bound paragraphs here, so they never end up inside a ticket.
//!
//! The second rule splits a multi-paragraph ticket whenever a later paragraph
//! starts at column zero with a letter. Uploads with such tickets should use
//! horizontal rules between tickets.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*\r?$").unwrap());

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split raw text into trimmed ticket candidates, in input order.
///
/// Never fails: text with nothing but separators or whitespace yields an
/// empty vector, which callers treat as "nothing to submit".
pub fn split(text: &str) -> Vec<String> {
    let sections: Vec<&str> = RULE_LINE.split(text).collect();

    let by_rule: Vec<String> = sections.iter().copied().filter_map(clean_candidate).collect();
    if by_rule.len() >= 2 {
        return by_rule;
    }

    sections
        .into_iter()
        .flat_map(split_on_paragraphs)
        .filter_map(clean_candidate)
        .collect()
}

/// Split at blank lines whose next line begins with a letter.
fn split_on_paragraphs(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    // The greedy match ends at the last newline of a whitespace run, which is
    // the only position that can be followed by a non-blank character.
    for gap in BLANK_LINE.find_iter(text) {
        let next_is_letter = text[gap.end()..]
            .chars()
            .next()
            .is_some_and(char::is_alphabetic);
        if next_is_letter {
            pieces.push(&text[start..gap.start()]);
            start = gap.end();
        }
    }
    pieces.push(&text[start..]);

    pieces
}

fn clean_candidate(piece: &str) -> Option<String> {
    let trimmed = piece.trim();
    if trimmed.is_empty()
        || trimmed.chars().all(|c| c == '-')
        || !trimmed.chars().any(char::is_alphabetic)
    {
        return None;
    }
    Some(trimmed.to_string())
}
