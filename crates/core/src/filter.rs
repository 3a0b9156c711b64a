use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldRef, FieldSchema};

/// Placeholder the form may carry in place of an empty exact-text box.
pub const NONE_SENTINEL: &str = "None";
/// Matches the `maxlength` of the rendered exact-text input.
pub const EXACT_TEXT_MAX_LEN: usize = 30;
pub const UPDATE_FIELD: &str = "update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterMode {
    Ignore,
    ByValue,
    ExactText,
    IndependentVariable,
}

impl FilterMode {
    /// Option order in the mode dropdown.
    pub const ALL: [FilterMode; 4] = [
        FilterMode::Ignore,
        FilterMode::ByValue,
        FilterMode::ExactText,
        FilterMode::IndependentVariable,
    ];

    pub fn wire_value(self) -> &'static str {
        match self {
            FilterMode::Ignore => "False",
            FilterMode::ByValue => "None",
            FilterMode::ExactText => "Exact",
            FilterMode::IndependentVariable => "True",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::Ignore => "Ignore",
            FilterMode::ByValue => "By Value",
            FilterMode::ExactText => "Exact (Text)",
            FilterMode::IndependentVariable => "Ind. Variable",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.wire_value() == value)
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

/// Mode as submitted. Unknown values are kept verbatim and forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmittedMode {
    Known(FilterMode),
    Unrecognized(String),
}

impl SubmittedMode {
    pub fn parse(raw: &str) -> Self {
        match FilterMode::from_wire(raw) {
            Some(mode) => SubmittedMode::Known(mode),
            None => SubmittedMode::Unrecognized(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<FilterMode> {
        match self {
            SubmittedMode::Known(mode) => Some(*mode),
            SubmittedMode::Unrecognized(_) => None,
        }
    }

    pub fn wire_value(&self) -> &str {
        match self {
            SubmittedMode::Known(mode) => mode.wire_value(),
            SubmittedMode::Unrecognized(raw) => raw,
        }
    }
}

impl Default for SubmittedMode {
    fn default() -> Self {
        SubmittedMode::Known(FilterMode::Ignore)
    }
}

/// Decoded filter state for one field, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    field_id: String,
    mode: SubmittedMode,
    text: String,
    forced_exact: bool,
}

impl FilterDescriptor {
    /// Decodes one field. Never fails: whatever was submitted is carried through.
    pub fn decode(
        field: FieldRef<'_>,
        submitted_mode: Option<&str>,
        submitted_exact: Option<&str>,
    ) -> Self {
        let forced_exact = field.is_forced_exact();
        let mode = if forced_exact {
            SubmittedMode::Known(FilterMode::ExactText)
        } else {
            submitted_mode.map(SubmittedMode::parse).unwrap_or_default()
        };
        Self {
            field_id: field.id(),
            mode,
            text: normalize_exact(submitted_exact.unwrap_or_default()),
            forced_exact,
        }
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn mode(&self) -> &SubmittedMode {
        &self.mode
    }

    pub fn is_forced_exact(&self) -> bool {
        self.forced_exact
    }

    /// Exact text, present only in exact-text mode.
    pub fn exact_text(&self) -> Option<&str> {
        match self.mode {
            SubmittedMode::Known(FilterMode::ExactText) => Some(&self.text),
            _ => None,
        }
    }

    /// Token handed to the lookup tool for this field.
    pub fn effective_value(&self) -> &str {
        self.exact_text().unwrap_or_else(|| self.mode.wire_value())
    }

    /// Text shown in the exact-text box, kept even while the box is hidden.
    pub fn display_text(&self) -> &str {
        &self.text
    }

    /// The option a browser would show as selected.
    pub fn selected_mode(&self) -> FilterMode {
        self.mode.known().unwrap_or(FilterMode::Ignore)
    }

    pub fn exact_visible(&self) -> bool {
        self.mode.known() == Some(FilterMode::ExactText)
    }
}

fn normalize_exact(raw: &str) -> String {
    if raw == NONE_SENTINEL {
        return String::new();
    }
    match raw.char_indices().nth(EXACT_TEXT_MAX_LEN) {
        Some((cut, _)) => raw[..cut].to_string(),
        None => raw.to_string(),
    }
}

/// Raw form values from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Submission {
    values: HashMap<String, String>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nothing submitted: the page is being opened, not refreshed.
    pub fn is_first_visit(&self) -> bool {
        self.is_empty()
    }

    pub fn update_requested(&self) -> bool {
        self.values.contains_key(UPDATE_FIELD)
    }

    pub fn decode_field(&self, field: FieldRef<'_>) -> FilterDescriptor {
        FilterDescriptor::decode(
            field,
            self.get(&field.id()),
            self.get(&field.exact_id()),
        )
    }

    /// One descriptor per schema field, in schema order.
    pub fn decode_all(&self, schema: &FieldSchema) -> Vec<FilterDescriptor> {
        schema.fields().map(|field| self.decode_field(field)).collect()
    }
}
