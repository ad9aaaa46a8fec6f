//! Splits a freeform model answer into a summary and key takeaways

use once_cell::sync::Lazy;
use regex::Regex;

use crate::summary::SummarizationResult;

/// Takeaways header at a line start: optional heading hashes, numbering and bold markup.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?(?:\*\*|__)?[ \t]*(?:key[ \t]+takeaways?|main[ \t]+takeaways?|important[ \t]+points?|key[ \t]+points?)\b",
    )
    .expect("static regex compile")
});

/// Bullet (`•`, `-`, `*`) or numbered (`1.`, `1)`) list item.
static BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:•\s*|[-*]\s+|\d+[.)]\s+)(.*)$").expect("static regex compile")
});

/// Leading restatement label such as `Summary:` or `**Overview**`.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\A[ \t]*(?:#{1,6}[ \t]+)?(?:\*\*|__)?[ \t]*(?:summary|overview|main[ \t]+points)\b[ \t]*(:)?[ \t]*(?:\*\*|__)?[ \t]*(:)?[ \t]*",
    )
    .expect("static regex compile")
});

/// Parse a raw provider answer.
///
/// Text before the first takeaways header is the summary, bullet lines after
/// it are the takeaways. A missing header yields the whole text as summary and
/// no takeaways.
pub fn parse_response(raw: &str) -> SummarizationResult {
    let Some((start, end)) = find_marker(raw) else {
        return SummarizationResult {
            summary: strip_summary_label(raw.trim()),
            takeaways: Vec::new(),
        };
    };

    let summary = strip_summary_label(raw[..start].trim());
    let takeaways = extract_takeaways(&raw[end..]);

    SummarizationResult { summary, takeaways }
}

/// Byte range of the first takeaways header that is not an item label like `Key Takeaway 1`.
fn find_marker(raw: &str) -> Option<(usize, usize)> {
    MARKER_RE
        .find_iter(raw)
        .find(|m| {
            !raw[m.end()..]
                .trim_start_matches(|c: char| c == ' ' || c == '\t')
                .starts_with(|c: char| c.is_ascii_digit())
        })
        .map(|m| (m.start(), m.end()))
}

fn extract_takeaways(section: &str) -> Vec<String> {
    section
        .lines()
        .filter_map(|line| BULLET_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|item| item.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn strip_summary_label(summary: &str) -> String {
    if let Some(caps) = LABEL_RE.captures(summary) {
        if let Some(label) = caps.get(0) {
            let rest = &summary[label.end()..];
            let has_colon = caps.get(1).is_some() || caps.get(2).is_some();
            if has_colon || rest.is_empty() || rest.starts_with('\n') || rest.starts_with('\r') {
                return rest.trim().to_string();
            }
        }
    }
    summary.to_string()
}
