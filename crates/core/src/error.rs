#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown form snapshot: {form_id} v{version}")]
    UnknownForm { form_id: String, version: i32 },

    #[error("Validation failed: {0}")]
    Validation(String),
}
