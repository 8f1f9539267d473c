//! Diagnostics and source spans.
//!
//! A [`Diagnostic`] is one compiler message: severity, rendered text, an
//! optional error code, an ordered collection of source [`Span`]s, and nested
//! child diagnostics. Spans and children arrive on the wire as JSON arrays but
//! are held as insertion-ordered maps ([`SpanMap`], [`ChildMap`]) so that
//! incremental updates can address entries by id while display order stays
//! the order of arrival.
//!
//! Only one level of nesting is merge-addressable: children are full
//! diagnostics, but their own children are never targeted by updates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{DiagnosticId, SpanId};
use crate::update::Highlight;

/// Insertion-ordered span collection. Replacement keeps position, new-key
/// insertion appends.
pub type SpanMap = IndexMap<SpanId, Span>;

/// Insertion-ordered child-diagnostic collection.
pub type ChildMap = IndexMap<DiagnosticId, Diagnostic>;

/// Severity of a diagnostic.
///
/// Serializes as the compiler's level string (`"error"`, `"warning"`, …).
/// Unknown levels pass through untouched via [`Level::Other`].
#[derive(Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    #[strum(serialize = "error")]
    Error,
    #[strum(serialize = "warning")]
    Warning,
    #[strum(serialize = "note")]
    Note,
    #[strum(serialize = "help")]
    Help,
    #[strum(serialize = "error: internal compiler error")]
    InternalCompilerError,
    /// Passthrough for level strings this crate doesn't know about.
    #[strum(default)]
    Other(String),
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_else(|_| Level::Other(s))
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

/// An error code with its optional long-form explanation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The code itself, e.g. `"E0308"`.
    pub code: String,
    /// Explanation text for the code, when the compiler provides one.
    pub explanation: Option<String>,
}

/// One source-code excerpt attached to a diagnostic.
///
/// A span's identity is fixed once created; the merge engine replaces span
/// values wholesale, never field-by-field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub id: SpanId,
    pub file_name: String,
    /// Extent of the fetched excerpt, 1-based.
    pub block_line_start: usize,
    pub block_line_end: usize,
    /// The primary highlighted range within the excerpt, 1-based.
    pub line_start: usize,
    pub line_end: usize,
    /// 1-based, character offset.
    pub column_start: usize,
    pub column_end: usize,
    /// Source lines of the excerpt (may carry markup).
    pub text: Vec<String>,
    pub plain_text: String,
    pub label: String,
    /// Secondary sub-ranges with their labels.
    pub highlights: Vec<(Highlight, String)>,
}

impl keyed_seq::Keyed for Span {
    type Key = SpanId;

    fn key(&self) -> SpanId {
        self.id
    }
}

/// One compiler message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub level: Level,
    /// Rendered message text (may embed markup).
    pub message: String,
    pub code: Option<DiagnosticCode>,
    /// Ordered spans, keyed by span id. Wire form is an array.
    #[serde(with = "keyed_seq")]
    pub spans: SpanMap,
    /// Ordered child diagnostics, keyed by child id. Wire form is an array.
    #[serde(with = "keyed_seq")]
    pub children: ChildMap,
    /// UI visibility of the children group. Mutated only by toggles.
    #[serde(default = "default_true")]
    pub show_children: bool,
    /// UI visibility of the span group. Mutated only by toggles.
    #[serde(default = "default_true")]
    pub show_spans: bool,
}

impl keyed_seq::Keyed for Diagnostic {
    type Key = DiagnosticId;

    fn key(&self) -> DiagnosticId {
        self.id
    }
}

fn default_true() -> bool {
    true
}

/// Serde adapter: an insertion-ordered map that travels as a JSON sequence.
///
/// Deserialization keys each element by its own id; a duplicate id keeps the
/// first element's position and the last element's value, so decoded maps
/// always satisfy the no-duplicate-keys invariant.
mod keyed_seq {
    use std::hash::Hash;

    use indexmap::IndexMap;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub trait Keyed {
        type Key: Hash + Eq;

        fn key(&self) -> Self::Key;
    }

    pub fn serialize<T, S>(map: &IndexMap<T::Key, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + Keyed,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for value in map.values() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<IndexMap<T::Key, T>, D::Error>
    where
        T: Deserialize<'de> + Keyed,
        D: Deserializer<'de>,
    {
        let values = Vec::<T>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(values.len());
        for value in values {
            map.insert(value.key(), value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(id: u32) -> Span {
        Span {
            id: SpanId::new(id),
            file_name: "src/main.rs".into(),
            block_line_start: 1,
            block_line_end: 5,
            line_start: 2,
            line_end: 2,
            column_start: 9,
            column_end: 16,
            text: vec!["let x = 0;".into()],
            plain_text: "let x = 0;".into(),
            label: String::new(),
            highlights: Vec::new(),
        }
    }

    #[test]
    fn level_round_trips_through_strings() {
        for (s, level) in [
            ("error", Level::Error),
            ("warning", Level::Warning),
            ("note", Level::Note),
            ("help", Level::Help),
            ("error: internal compiler error", Level::InternalCompilerError),
        ] {
            assert_eq!(Level::from(s.to_string()), level);
            assert_eq!(String::from(level), s);
        }
    }

    #[test]
    fn unknown_level_passes_through() {
        let level = Level::from("lint".to_string());
        assert_eq!(level, Level::Other("lint".into()));
        assert_eq!(String::from(level), "lint");
    }

    #[test]
    fn spans_decode_as_ordered_map() {
        let json = r#"{
            "id": 1,
            "level": "warning",
            "message": "unused variable: `matches`",
            "code": null,
            "spans": [
                {"id": 12, "file_name": "src/main.rs", "block_line_start": 47,
                 "block_line_end": 51, "line_start": 49, "line_end": 49,
                 "column_start": 9, "column_end": 16, "text": ["..."],
                 "plain_text": "...", "label": "", "highlights": []},
                {"id": 10, "file_name": "src/main.rs", "block_line_start": 1,
                 "block_line_end": 3, "line_start": 2, "line_end": 2,
                 "column_start": 1, "column_end": 4, "text": ["..."],
                 "plain_text": "...", "label": "", "highlights": []}
            ],
            "children": []
        }"#;

        let d: Diagnostic = serde_json::from_str(json).expect("deserialize");
        let keys: Vec<SpanId> = d.spans.keys().copied().collect();
        assert_eq!(keys, vec![SpanId::new(12), SpanId::new(10)]);
        assert!(d.show_children, "visibility defaults on");
        assert!(d.show_spans);
        assert!(d.children.is_empty());
    }

    #[test]
    fn duplicate_wire_ids_collapse_to_one_entry() {
        let mut a = span(10);
        a.label = "first".into();
        let mut b = span(10);
        b.label = "second".into();

        let wire = serde_json::json!({
            "id": 1,
            "level": "error",
            "message": "",
            "code": null,
            "spans": [a, b],
            "children": []
        });

        let back: Diagnostic = serde_json::from_value(wire).expect("deserialize");
        assert_eq!(back.spans.len(), 1);
        assert_eq!(back.spans[&SpanId::new(10)].label, "second");
    }
}
