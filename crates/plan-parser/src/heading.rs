//! Line classification for the feature-plan grammar.

/// A recognised `**Key:** value` field line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Priority,
    Labels,
    Assignee,
    Sprint,
    TechnicalStack,
}

const FIELD_PREFIXES: [(&str, Field); 5] = [
    ("**Priority:**", Field::Priority),
    ("**Labels:**", Field::Labels),
    ("**Assignee:**", Field::Assignee),
    ("**Sprint:**", Field::Sprint),
    ("**Technical Stack:**", Field::TechnicalStack),
];

/// What a single line of the plan means to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Blank,
    /// `## Epic ...` or `### Epic ...`, carrying the epic name.
    Epic(&'a str),
    /// Any other `## ` heading.
    Milestone(&'a str),
    /// Any other `### ` heading, carrying the title without its ordinal.
    Task(&'a str),
    Field(Field, &'a str),
    /// A bold line that is not one of the recognised fields.
    OtherBold,
    /// `- item` (dash then whitespace), carrying the item text.
    Bullet(&'a str),
    Text,
}

impl Line<'_> {
    /// Lines that end a technical-stack bullet list.
    pub(crate) const fn ends_stack(self) -> bool {
        matches!(
            self,
            Self::Blank
                | Self::Field(..)
                | Self::OtherBold
                | Self::Epic(_)
                | Self::Milestone(_)
                | Self::Task(_)
        )
    }
}

pub(crate) fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(rest) = line.strip_prefix("### ").or_else(|| line.strip_prefix("## ")) {
        if let Some(epic) = epic_name(rest) {
            return Line::Epic(epic);
        }
        return if line.starts_with("### ") {
            Line::Task(strip_ordinal(rest.trim()))
        } else {
            Line::Milestone(rest.trim())
        };
    }

    if trimmed.starts_with("**") {
        return FIELD_PREFIXES
            .iter()
            .find_map(|(prefix, field)| {
                trimmed
                    .strip_prefix(prefix)
                    .map(|value| Line::Field(*field, value.trim()))
            })
            .unwrap_or(Line::OtherBold);
    }

    if let Some(item) = trimmed.strip_prefix('-')
        && item.starts_with(char::is_whitespace)
    {
        return Line::Bullet(item.trim());
    }

    Line::Text
}

/// Epic name from heading text, or `None` if the heading is not an epic.
///
/// Accepts `Epic: Name`, `Epic #2 Name`, `Epic 3: Name` and `Epic Name`.
fn epic_name(heading: &str) -> Option<&str> {
    let rest = heading.trim_start().strip_prefix("Epic")?;
    if rest.starts_with(|c: char| c.is_alphanumeric() && !c.is_ascii_digit()) {
        // "Epics", "Epicenter"
        return None;
    }

    let rest = rest.trim_start();
    let rest = strip_numeral(rest.strip_prefix([':', '#']).unwrap_or(rest).trim_start());
    let rest = rest.strip_prefix([':', '.', '-']).unwrap_or(rest);
    Some(rest.trim())
}

/// Strip an epic numeral, but only when it stands alone (`2 `, `2:`, `2-`).
fn strip_numeral(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == text.len() {
        return text;
    }
    let standalone = rest.is_empty()
        || rest.starts_with(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | '-'));
    if standalone {
        rest.trim_start()
    } else {
        text
    }
}

/// Strip a leading `"12. "` ordinal from a task title.
fn strip_ordinal(title: &str) -> &str {
    let digits = title.len() - title.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return title;
    }
    match title[digits..].strip_prefix('.') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => title,
    }
}
