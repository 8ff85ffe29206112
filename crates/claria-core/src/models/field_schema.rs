use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Type tag of a schema-described field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FieldType {
    String,
    Boolean,
    Number,
    Array,
    Object,
    Date,
    #[serde(alias = "select")]
    Enum,
    Paragraph,
    Table,
}

/// One addressable field in a section schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldSchema {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Child fields. Describes the object's members for `Object` nodes and
    /// the item shape for `Array` nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldSchema>>,
    /// Allowed values for `Enum` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldSchema {
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: None,
            required: false,
            children: None,
            options: None,
        }
    }

    pub fn with_children(mut self, children: Vec<FieldSchema>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Look up a direct child by key.
    pub fn child(&self, key: &str) -> Option<&FieldSchema> {
        self.children.as_deref()?.iter().find(|c| c.key == key)
    }

    /// Check a value against this field's constraints.
    ///
    /// Only enum options are enforced; `null` is always accepted so a field
    /// can be cleared.
    pub fn allows(&self, value: &serde_json::Value) -> bool {
        match (&self.options, value) {
            (_, serde_json::Value::Null) => true,
            (Some(options), serde_json::Value::String(s)) if self.field_type == FieldType::Enum => {
                options.iter().any(|o| o == s)
            }
            (Some(_), _) if self.field_type == FieldType::Enum => false,
            _ => true,
        }
    }
}

/// A named root list of fields describing one report section's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SectionSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    /// Prose rendering template with `{field.path}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prose_template: Option<String>,
}

impl SectionSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
            prose_template: None,
        }
    }

    pub fn with_prose_template(mut self, template: impl Into<String>) -> Self {
        self.prose_template = Some(template.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Verify that every key is unique among its siblings.
    pub fn check_unique_keys(&self) -> Result<(), CoreError> {
        check_siblings(&self.fields, &self.name)
    }
}

fn check_siblings(fields: &[FieldSchema], parent: &str) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.key.as_str()) {
            return Err(CoreError::DuplicateFieldKey {
                parent: parent.to_string(),
                key: field.key.clone(),
            });
        }
        if let Some(children) = &field.children {
            check_siblings(children, &format!("{parent}.{}", field.key))?;
        }
    }
    Ok(())
}
