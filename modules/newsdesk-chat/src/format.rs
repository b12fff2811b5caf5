//! Deterministic cleanup of synthesized answers. Models do not reliably obey
//! "no tables" or "no markup", so both rules are enforced here.

use std::sync::LazyLock;

use regex::Regex;

static RE_TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").unwrap());
static RE_MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]\(([^()\s]+)\)").unwrap());
static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+•]\s+(.*)$").unwrap());
static RE_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)[.)]\s+").unwrap());
static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

const PLAIN_FORBIDDEN: [char; 4] = ['*', '#', '[', ']'];

/// Apply the rules for the requested output mode.
pub fn finalize_answer(raw: &str, markdown: bool) -> String {
    let text = flatten_tables(raw);
    let text = if markdown { text } else { to_plain(&text) };
    RE_BLANK_RUNS
        .replace_all(text.trim(), "\n\n")
        .into_owned()
}

/// Rewrite pipe-table rows as `cell - cell` lines and drop separator rows.
pub fn flatten_tables(text: &str) -> String {
    text.lines()
        .filter_map(|line| match table_cells(line) {
            None => Some(line.to_string()),
            Some(cells) if cells.iter().all(|c| RE_TABLE_SEPARATOR.is_match(c)) => None,
            Some(cells) => Some(
                cells
                    .into_iter()
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join(" - "),
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_cells(line: &str) -> Option<Vec<&str>> {
    let trimmed = line.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return None;
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    Some(inner.split('|').map(str::trim).collect())
}

/// Strip every markup character. Links become `text (url)` and bullets
/// become numbered items, continuing any numbered list they follow and
/// restarting after prose.
pub fn to_plain(text: &str) -> String {
    let text = RE_MARKDOWN_LINK.replace_all(text, "$1 ($2)");

    let mut counter: u32 = 0;
    let mut lines = Vec::new();
    for line in text.lines() {
        if let Some(caps) = RE_BULLET.captures(line) {
            counter = counter.saturating_add(1);
            lines.push(format!("{counter}. {}", &caps[1]));
        } else {
            if let Some(caps) = RE_NUMBERED.captures(line) {
                counter = caps[1].parse().unwrap_or(counter);
            } else if !line.trim().is_empty() {
                counter = 0;
            }
            lines.push(line.to_string());
        }
    }

    lines
        .join("\n")
        .chars()
        .filter(|c| !PLAIN_FORBIDDEN.contains(c))
        .collect::<String>()
        .lines()
        .map(str::trim_end)
        .map(|l| l.trim_start_matches(' ').to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
