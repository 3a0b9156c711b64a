use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{LibrarianError, Result};

/// Category whose fields always filter by exact text.
pub const VARIABLES_CATEGORY: &str = "variables";

/// Positional order consumed by the lookup tool. Do not reorder.
const LIBRARIAN_FIELDS: &[(&str, &[&str])] = &[
    ("profile", &["user", "machine", "run_date"]),
    ("build", &["commit", "last_author", "build_date"]),
    (
        "test",
        &["configuration", "command", "packets", "rules", "policies"],
    ),
    ("result", &["total", "user", "system"]),
    (VARIABLES_CATEGORY, &["independent", "dependent"]),
];

static GLOBAL_SCHEMA: Lazy<FieldSchema> = Lazy::new(FieldSchema::librarian);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    name: String,
    fields: Vec<String>,
}

impl Category {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_forced_exact(&self) -> bool {
        self.name == VARIABLES_CATEGORY
    }
}

/// Ordered catalog of filterable fields. Order defines argument position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    categories: Vec<Category>,
}

impl FieldSchema {
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.is_empty() {
                return Err(LibrarianError::EmptyName);
            }
            if !seen.insert(category.name.as_str()) {
                return Err(LibrarianError::DuplicateCategory(category.name.clone()));
            }
            let mut fields = HashSet::new();
            for field in &category.fields {
                if field.is_empty() {
                    return Err(LibrarianError::EmptyName);
                }
                if !fields.insert(field.as_str()) {
                    return Err(LibrarianError::DuplicateField {
                        category: category.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        let schema = Self { categories };
        let mut wire_keys = HashSet::new();
        for field in schema.fields() {
            for key in [field.id(), field.exact_id()] {
                if !wire_keys.insert(key.clone()) {
                    return Err(LibrarianError::DuplicateWireKey(key));
                }
            }
        }
        Ok(schema)
    }

    /// The built-in archive schema.
    pub fn librarian() -> Self {
        Self {
            categories: LIBRARIAN_FIELDS
                .iter()
                .map(|(name, fields)| Category::new(*name, fields.iter().copied()))
                .collect(),
        }
    }

    pub fn global() -> &'static FieldSchema {
        &GLOBAL_SCHEMA
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> + '_ {
        self.categories.iter().flat_map(|category| {
            category.fields.iter().map(move |name| FieldRef {
                category: category.name.as_str(),
                name: name.as_str(),
            })
        })
    }

    pub fn field_count(&self) -> usize {
        self.categories.iter().map(|c| c.fields.len()).sum()
    }

    pub fn field_ids(&self) -> Vec<String> {
        self.fields().map(|field| field.id()).collect()
    }
}

/// A borrowed view of one field within a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub category: &'a str,
    pub name: &'a str,
}

impl FieldRef<'_> {
    pub fn id(&self) -> String {
        format!("{}_{}", self.category, self.name)
    }

    pub fn exact_id(&self) -> String {
        format!("{}_{}_exact", self.category, self.name)
    }

    pub fn is_forced_exact(&self) -> bool {
        self.category == VARIABLES_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn librarian_schema_keeps_positional_order() {
        let schema = FieldSchema::librarian();
        assert_eq!(schema.field_count(), 16);
        let ids = schema.field_ids();
        assert_eq!(ids.first().map(String::as_str), Some("profile_user"));
        assert_eq!(ids[3], "build_commit");
        assert_eq!(ids[7], "test_command");
        assert_eq!(ids[12], "result_user");
        assert_eq!(ids.last().map(String::as_str), Some("variables_dependent"));
    }

    #[test]
    fn same_field_name_allowed_across_categories() {
        let schema = FieldSchema::global();
        let users: Vec<_> = schema.fields().filter(|f| f.name == "user").collect();
        assert_eq!(users.len(), 2);
        assert_ne!(users[0].id(), users[1].id());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = FieldSchema::new(vec![
            Category::new("build", ["commit"]),
            Category::new("build", ["build_date"]),
        ])
        .unwrap_err();
        assert!(matches!(err, LibrarianError::DuplicateCategory(name) if name == "build"));

        let err = FieldSchema::new(vec![Category::new("test", ["rules", "rules"])]).unwrap_err();
        assert!(matches!(err, LibrarianError::DuplicateField { .. }));

        let err = FieldSchema::new(vec![Category::new("test", [""])]).unwrap_err();
        assert!(matches!(err, LibrarianError::EmptyName));
    }

    #[test]
    fn rejects_colliding_wire_keys() {
        let err = FieldSchema::new(vec![
            Category::new("a", ["b_c"]),
            Category::new("a_b", ["c"]),
        ])
        .unwrap_err();
        assert!(matches!(err, LibrarianError::DuplicateWireKey(key) if key == "a_b_c"));

        let err =
            FieldSchema::new(vec![Category::new("test", ["command", "command_exact"])]).unwrap_err();
        assert!(
            matches!(err, LibrarianError::DuplicateWireKey(key) if key == "test_command_exact")
        );

        let builtin = FieldSchema::librarian();
        assert_eq!(FieldSchema::new(builtin.categories().to_vec()).unwrap(), builtin);
    }

    #[test]
    fn only_variables_are_forced_exact() {
        let schema = FieldSchema::librarian();
        let forced: Vec<_> = schema
            .fields()
            .filter(|f| f.is_forced_exact())
            .map(|f| f.id())
            .collect();
        assert_eq!(forced, vec!["variables_independent", "variables_dependent"]);
        assert!(schema.categories().last().unwrap().is_forced_exact());
    }

    #[test]
    fn exact_id_appends_suffix() {
        let field = FieldRef {
            category: "test",
            name: "command",
        };
        assert_eq!(field.id(), "test_command");
        assert_eq!(field.exact_id(), "test_command_exact");
    }
}
