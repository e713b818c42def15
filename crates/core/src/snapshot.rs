//! Versioned form snapshot model.
//!
//! A snapshot is the immutable `(form_id, version)` publication of a form:
//! its ordered field list, submit policy, and supported locales. Snapshots
//! are written by the admin surface (out of scope here) and stored as JSON
//! columns; this module decodes that JSON into closed types exactly once so
//! validation and rendering never probe untyped maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{resolve_locale, LocaleString};

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// The closed set of field types a snapshot may contain.
///
/// Anything else decodes to [`FieldType::Unknown`], which (like `Info`)
/// carries no validation or rendering semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    Switch,
    Email,
    Phone,
    FileUpload,
    Date,
    Time,
    Datetime,
    Info,
    #[serde(other)]
    Unknown,
}

/// Lifecycle status of a field within a snapshot. Only active fields are
/// validated and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    Active,
    Inactive,
}

/// One entry of a select/multiselect/radio option list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default)]
    pub label: LocaleString,
}

/// Type-specific field configuration, decoded from the open `props` JSON.
///
/// Irrelevant keys for a given field type are simply never read; unknown
/// keys are dropped at decode time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldProps {
    pub required: bool,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: Vec<FieldOption>,
    pub allow_custom: bool,
    pub e164_required: bool,
    pub max_files: Option<u32>,
    pub mx_check: bool,
}

/// One field of a form snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: LocaleString,
    #[serde(default, deserialize_with = "nullable_props")]
    pub props: FieldProps,
    #[serde(default)]
    pub status: FieldStatus,
}

impl FieldSchema {
    pub fn is_active(&self) -> bool {
        self.status == FieldStatus::Active
    }

    /// The question text shown to the user, resolved for `locale` with
    /// fallback to English and finally to the field name.
    pub fn label_for<'a>(&'a self, locale: &str) -> &'a str {
        resolve_locale(&self.label, locale, &self.name)
    }

    /// Whether `value` is one of the configured option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.props.options.iter().any(|o| o.value == value)
    }
}

/// Stored snapshots may carry `props: null`; treat that as defaults.
fn nullable_props<'de, D: Deserializer<'de>>(d: D) -> Result<FieldProps, D::Error> {
    Ok(Option::<FieldProps>::deserialize(d)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Submit policy
// ---------------------------------------------------------------------------

/// The closed set of submit pipeline actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    NativeBridge,
    ServerPersist,
    Webhooks,
    NextjsPost,
    Redirect,
}

/// One configured action of the submit pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Dedupe configuration: when enabled, the meta value named by `key`
/// becomes the submission's idempotency key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdempotencyPolicy {
    pub enabled: bool,
    #[serde(default)]
    pub key: String,
}

/// What the client-side pipeline does when an action fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    #[default]
    Continue,
    Stop,
    ShowError,
}

/// The snapshot's submit pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitPolicy {
    pub actions: Vec<SubmitAction>,
    pub ordering: Vec<ActionType>,
    pub idempotency: Option<IdempotencyPolicy>,
    pub timeout_ms: Option<u64>,
    pub on_error: OnError,
}

impl SubmitPolicy {
    /// Check the ordering invariant: a unique subset of the declared actions.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, a) in self.ordering.iter().enumerate() {
            if self.ordering[..i].contains(a) {
                return Err(CoreError::Validation(format!(
                    "Duplicate action in submit ordering: {a:?}"
                )));
            }
            if !self.actions.iter().any(|act| act.action_type == *a) {
                return Err(CoreError::Validation(format!(
                    "Submit ordering references undeclared action: {a:?}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a given action is declared and enabled.
    pub fn action_enabled(&self, action: ActionType) -> bool {
        self.actions
            .iter()
            .any(|a| a.action_type == action && a.enabled)
    }
}

// ---------------------------------------------------------------------------
// FormSnapshot
// ---------------------------------------------------------------------------

/// An immutable published form: fields + submit policy + locales.
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub form_id: String,
    pub version: i32,
    pub fields: Vec<FieldSchema>,
    pub submit: SubmitPolicy,
    pub supported_locales: Vec<String>,
    pub default_locale: String,
}

impl FormSnapshot {
    /// Decode a snapshot from its stored JSON columns.
    pub fn from_stored(
        form_id: String,
        version: i32,
        fields_json: &serde_json::Value,
        submit_json: &serde_json::Value,
        locales_json: &serde_json::Value,
    ) -> Result<Self, CoreError> {
        let fields: Vec<FieldSchema> = serde_json::from_value(fields_json.clone())
            .map_err(|e| CoreError::Validation(format!("Malformed fields_json: {e}")))?;
        let submit: SubmitPolicy = if submit_json.is_null() {
            SubmitPolicy::default()
        } else {
            serde_json::from_value(submit_json.clone())
                .map_err(|e| CoreError::Validation(format!("Malformed submit_json: {e}")))?
        };
        submit.validate()?;
        let supported_locales: Vec<String> =
            serde_json::from_value(locales_json.clone()).unwrap_or_else(|_| vec!["en".into()]);
        let default_locale = supported_locales.first().cloned().unwrap_or_else(|| "en".into());

        Ok(Self {
            form_id,
            version,
            fields,
            submit,
            supported_locales,
            default_locale,
        })
    }

    /// Active fields in schema order.
    pub fn active_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.is_active())
    }

    /// Map of field name to question label, resolved for `locale`.
    pub fn field_labels(&self, locale: &str) -> BTreeMap<String, String> {
        self.active_fields()
            .map(|f| (f.name.clone(), f.label_for(locale).to_string()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
