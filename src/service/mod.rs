//! Operations exposed to the web-layer collaborator.
//!
//! Each function is one request's worth of work: the caller supplies the
//! authenticated user id (authentication itself lives in the identity
//! collaborator) and a store, and gets back either a response value or a
//! [`crate::error::CoreError`] for the web layer to map — form errors to an
//! annotated 200, `NotFound`/`Forbidden` to their status codes, `Storage`
//! to a generic failure.

pub mod organisations;
pub mod projects;
pub mod tasks;
