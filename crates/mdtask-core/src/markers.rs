//! The one grammar for metadata tokens.
//!
//! The parser and the clean-description stripper both compile their patterns
//! from the tables here, so anything the parser accepts can also be stripped.

use std::sync::LazyLock;

use regex::Regex;

use crate::Priority;

/// Recurrence marker; the rule text follows it.
pub const RECURRENCE_MARKER: &str = "🔁";

/// Priority markers in lookup order. The first entry for a level is canonical.
pub const PRIORITY_MARKERS: [(&str, Priority); 6] = [
    ("🔺", Priority::Highest),
    ("🔝", Priority::Highest),
    ("⏫", Priority::High),
    ("🔼", Priority::Medium),
    ("🔽", Priority::Low),
    ("⏬", Priority::Lowest),
];

/// Dated metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    /// 📅
    Due,
    /// ⏳
    Scheduled,
    /// 🛫
    Start,
    /// ➕
    Created,
    /// ✅
    Done,
}

impl DateField {
    /// Every dated field.
    pub const ALL: [Self; 5] = [
        Self::Due,
        Self::Scheduled,
        Self::Start,
        Self::Created,
        Self::Done,
    ];

    /// Accepted markers, canonical first.
    #[must_use]
    pub const fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Due => &["📅", "📆", "🗓"],
            Self::Scheduled => &["⏳", "⌛"],
            Self::Start => &["🛫"],
            Self::Created => &["➕"],
            Self::Done => &["✅"],
        }
    }

    /// Marker used when rendering.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        self.markers()[0]
    }

    /// Keyword used for the field in query text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Scheduled => "scheduled",
            Self::Start => "start",
            Self::Created => "created",
            Self::Done => "done",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Due => 0,
            Self::Scheduled => 1,
            Self::Start => 2,
            Self::Created => 3,
            Self::Done => 4,
        }
    }
}

/// Canonical marker for a priority level.
#[must_use]
pub const fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Highest => PRIORITY_MARKERS[0].0,
        Priority::High => PRIORITY_MARKERS[2].0,
        Priority::Medium => PRIORITY_MARKERS[3].0,
        Priority::Low => PRIORITY_MARKERS[4].0,
        Priority::Lowest => PRIORITY_MARKERS[5].0,
    }
}

/// Level for the priority marker at the start of `token`.
#[must_use]
pub fn priority_for(token: &str) -> Option<Priority> {
    PRIORITY_MARKERS
        .iter()
        .find(|(marker, _)| token.starts_with(marker))
        .map(|(_, priority)| *priority)
}

const DATE_LITERAL: &str = r"(\d{4}-\d{2}-\d{2})";
const TAG_BODY: &str = r#"#[^\s!@#$%^&*(),.?":{}|<>]+"#;

#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("marker patterns are static and valid")
}

/// Alternation over `markers`, tolerating a trailing emoji variation selector.
fn alternation<'a>(markers: impl IntoIterator<Item = &'a str>) -> String {
    let alts: Vec<String> = markers.into_iter().map(regex::escape).collect();
    format!(r"(?:{})\x{{FE0F}}?", alts.join("|"))
}

fn priority_alternation() -> String {
    alternation(PRIORITY_MARKERS.iter().map(|(marker, _)| *marker))
}

fn any_marker_alternation() -> String {
    let mut markers: Vec<&str> = DateField::ALL
        .iter()
        .flat_map(|field| field.markers().iter().copied())
        .collect();
    markers.extend(PRIORITY_MARKERS.iter().map(|(marker, _)| *marker));
    markers.push(RECURRENCE_MARKER);
    alternation(markers)
}

/// Checklist line shape: indent/blockquote prefix, list marker, `[s]`, body.
pub(crate) static LINE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?P<indent>[\s>]*)(?P<marker>[-*+]|\d+[.)])\s+\[(?P<status>.)\](?:\s+(?P<body>.*?))?\s*$")
});

/// A `#tag` preceded by whitespace or the start of the text.
pub(crate) static TAG: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"(?:^|\s)({TAG_BODY})")));

/// A `#tag` at the very end of the text.
pub(crate) static TRAILING_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?:^|\s)({TAG_BODY})\s*$")));

/// Any priority marker.
pub(crate) static PRIORITY: LazyLock<Regex> = LazyLock::new(|| compile(&priority_alternation()));

/// A priority marker at the very end of the text.
pub(crate) static TRAILING_PRIORITY: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"\s*{}\s*$", priority_alternation())));

/// The recurrence marker.
pub(crate) static RECURRENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(&alternation([RECURRENCE_MARKER])));

/// Where recurrence text ends: the next marker of any kind, or a tag.
pub(crate) static RECURRENCE_STOP: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"{}|\s#", any_marker_alternation())));

static DATE_TOKENS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DateField::ALL
        .iter()
        .map(|field| {
            compile(&format!(
                r"{}\s*{DATE_LITERAL}",
                alternation(field.markers().iter().copied())
            ))
        })
        .collect()
});

static TRAILING_DATE_TOKENS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DateField::ALL
        .iter()
        .map(|field| {
            compile(&format!(
                r"\s*{}\s*{DATE_LITERAL}\s*$",
                alternation(field.markers().iter().copied())
            ))
        })
        .collect()
});

/// Pattern for `<marker> YYYY-MM-DD` of one field; group 1 holds the date.
pub(crate) fn date_token(field: DateField) -> &'static Regex {
    &DATE_TOKENS[field.index()]
}

/// Same as [`date_token`] but anchored at the end of the text.
pub(crate) fn trailing_date_token(field: DateField) -> &'static Regex {
    &TRAILING_DATE_TOKENS[field.index()]
}
