//! Domain services used by HTTP routes and the editor websocket.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and state mutation so route handlers
//! can stay focused on protocol translation and status mapping.

pub mod export;
pub mod extract;
pub mod generate;
pub mod project;
pub mod storage;
