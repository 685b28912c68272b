//! Staged-to-production promotion
//!
//! A promotion unit names a staged item and the production title it should
//! end up under. The engine classifies each unit from two catalog lookups,
//! performs the matching action (first publish, replace with archive, or
//! package conversion), and hands the promoted item to the sharing policy.

mod archive;
mod engine;
mod errors;
mod outcome;
mod state;
mod unit;

pub use archive::archive_name;
pub use engine::PromotionEngine;
pub use errors::{PromotionError, PromotionResult, PromotionWarning};
pub use outcome::{BatchReport, PromotionOutcome, UnitReport};
pub use state::UnitState;
pub use unit::{PromotionUnit, ReleaseContext};
