//! portal-release - staged-to-production promotion for a GIS content portal
//!
//! Promotes staged services into their production slots: archives the
//! predecessor, carries descriptive metadata forward, and applies the
//! release sharing and lifecycle policy. Built to run unattended; failures
//! are unit-local and the batch always finishes.

pub mod authoring;
pub mod cli;
pub mod config;
pub mod directory;
pub mod observability;
pub mod promotion;
pub mod session;
pub mod sharing;
pub mod staging;
