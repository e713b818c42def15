//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus the create DTOs used by the
//! repository and API layers.

pub mod form;
pub mod submission;
pub mod webhook;
