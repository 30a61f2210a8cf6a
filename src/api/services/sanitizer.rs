//! Cleanup of model output into renderable Mermaid source.
//!
//! The model does not reliably answer with markup only, so the raw completion
//! goes through fence extraction, leading-prose removal and an edge-label
//! repair pass. None of the steps fail: when no diagram keyword is found the
//! best-effort text is returned and the caller decides what to do with it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Diagram type keywords that may open a Mermaid document.
pub const DIAGRAM_KEYWORDS: [&str; 6] = [
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "flowchart",
    "erDiagram",
    "gantt",
];

static MERMAID_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*mermaid[^\n]*\n(.*?)```").expect("mermaid fence pattern")
});

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("fence pattern"));

// An edge label is a pipe-delimited segment directly after an arrow token.
static EDGE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<arrow><?(?:-\.+-|-{2,}|={2,})[>ox]?)(?P<gap>[ \t]*)\|(?P<label>[^|\n]*)\|")
        .expect("edge label pattern")
});

/// Result of sanitizing one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedDiagram {
    pub text: String,
    /// Keyword of the first diagram line, if one was recognised
    pub diagram_type: Option<&'static str>,
}

/// Run every cleanup step over a raw completion.
pub fn sanitize_diagram(raw: &str) -> SanitizedDiagram {
    let extracted = extract_code_block(raw);
    let (text, diagram_type) = strip_leading_prose(&extracted);
    let repaired = repair_edge_labels(&text);
    SanitizedDiagram {
        text: repaired.trim().to_string(),
        diagram_type,
    }
}

/// Interior of a ```mermaid block, else of any fenced block, else the raw text.
/// Stray fence lines from an unterminated block are dropped.
pub fn extract_code_block(raw: &str) -> String {
    let body = MERMAID_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    if body.contains("```") {
        body.lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    } else {
        body.trim().to_string()
    }
}

/// Keyword that opens `line`, if any. The keyword must end at a word
/// boundary, so `flowchart-elk TD` and `graph;` match while prose like
/// "graphs are..." does not.
pub fn diagram_keyword(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    DIAGRAM_KEYWORDS.into_iter().find(|keyword| {
        line.strip_prefix(keyword).is_some_and(|rest| {
            rest.chars()
                .next()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
        })
    })
}

/// Drop every line before the first diagram keyword line. Mermaid directive
/// lines (`%%...`) directly above the keyword line are kept with it.
pub fn strip_leading_prose(text: &str) -> (String, Option<&'static str>) {
    let lines: Vec<&str> = text.lines().collect();
    let Some((index, keyword)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| diagram_keyword(line).map(|k| (i, k)))
    else {
        return (text.to_string(), None);
    };

    let mut start = index;
    while start > 0 && lines[start - 1].trim_start().starts_with("%%") {
        start -= 1;
    }

    if start == 0 {
        (text.to_string(), Some(keyword))
    } else {
        (lines[start..].join("\n"), Some(keyword))
    }
}

/// Remove parentheses from edge labels, which the renderer cannot parse there.
///
/// `-->|Notify (e.g., signup)|` becomes `-->|Notify e.g., signup|`.
pub fn repair_edge_labels(text: &str) -> String {
    EDGE_LABEL
        .replace_all(text, |caps: &Captures| {
            let label = &caps["label"];
            if !label.contains(['(', ')']) {
                return caps[0].to_string();
            }
            let cleaned = label
                .replace(['(', ')'], " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}{}|{}|", &caps["arrow"], &caps["gap"], cleaned)
        })
        .into_owned()
}
