//! Glyco tools module
//!
//! One module per user-facing concern; the MCP layer stays a thin router.

pub mod chat;
pub mod history;
pub mod profile;
pub mod recommend;
pub mod status;
