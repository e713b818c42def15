//! Error codes, bilingual messages, and the MX lookup seam.

use serde::Serialize;
use serde_json::Value;

use crate::types::LocaleString;

/// The closed set of validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Required,
    Invalid,
    TooLong,
    Pattern,
    Min,
    Max,
    NotAllowed,
    InvalidEmail,
    NoMx,
    E164,
    TooMany,
    MissingMeta,
}

impl ErrorCode {
    /// The fixed bilingual message for this code, matching the wire
    /// strings clients already localize against.
    fn message(self) -> (&'static str, &'static str) {
        match self {
            ErrorCode::Required => ("Required", "مطلوب"),
            ErrorCode::Invalid => ("Invalid value", "قيمة غير صالحة"),
            ErrorCode::TooLong => ("Too long", "طويل جداً"),
            ErrorCode::Pattern => ("Does not match pattern", "لا يطابق النمط"),
            ErrorCode::Min => ("Too small", "صغير جداً"),
            ErrorCode::Max => ("Too large", "كبير جداً"),
            ErrorCode::NotAllowed => ("Not in options", "غير موجود ضمن الخيارات"),
            ErrorCode::InvalidEmail => ("Invalid email", "بريد إلكتروني غير صالح"),
            ErrorCode::NoMx => ("No MX records", "لا توجد سجلات MX"),
            ErrorCode::E164 => ("Invalid E.164", "تنسيق E.164 غير صالح"),
            ErrorCode::TooMany => ("Too many files", "عدد ملفات كبير"),
            ErrorCode::MissingMeta => ("Missing file metadata", "بيانات الملف ناقصة"),
        }
    }
}

/// One structured validation violation for a single field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: ErrorCode,
    pub message: LocaleString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl FieldError {
    pub fn new(field: &str, code: ErrorCode) -> Self {
        let (en, ar) = code.message();
        let mut message = LocaleString::new();
        message.insert("en".into(), en.into());
        message.insert("ar".into(), ar.into());
        Self {
            field: field.to_string(),
            code,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

// ---------------------------------------------------------------------------
// MX lookup seam
// ---------------------------------------------------------------------------

/// Seam for the optional `mx_check` email rule.
///
/// Validation itself stays pure: the production wiring uses
/// [`NoopMxResolver`], which reports every domain as unknown so no DNS
/// happens on the intake path. A resolver that affirmatively returns
/// `Some(false)` (no MX records) triggers a `NO_MX` violation.
pub trait MxResolver {
    /// `Some(true)` = domain has MX records, `Some(false)` = it has none,
    /// `None` = unknown (the check is skipped).
    fn has_mx(&self, domain: &str) -> Option<bool>;
}

/// Resolver that never answers; `mx_check` becomes a soft pass.
pub struct NoopMxResolver;

impl MxResolver for NoopMxResolver {
    fn has_mx(&self, _domain: &str) -> Option<bool> {
        None
    }
}
