//! Small helpers shared by services and handlers.

pub mod password;
pub mod validate;

pub use validate::ValidatedJson;
