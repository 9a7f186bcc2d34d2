//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own SQL and business rules so route handlers can stay
//! focused on protocol translation and auth extraction.

pub mod auth;
pub mod competition;
pub mod discovery;
pub mod events;
pub mod forms;
pub mod import;
pub mod inquiries;
pub mod reviews;
pub mod settings;
