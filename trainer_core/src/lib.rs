#![forbid(unsafe_code)]

//! Core domain model and progress evaluation engine for SmartARTrainer.
//!
//! This crate provides:
//! - Domain types (exercises, session records, plans, scorecards)
//! - Plan catalog
//! - Session aggregation, scoring and success rates
//! - Promotion / reset decision and its application
//! - Persistence (session journal, trainee profiles, activity dates)
//! - CSV import and export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod aggregate;
pub mod scoring;
pub mod rates;
pub mod promotion;
pub mod journal;
pub mod profile;
pub mod activity;
pub mod store;
pub mod report;
pub mod import;
pub mod evaluation;

// Re-export commonly used types
pub use error::{Error, Result, StorageOp};
pub use types::*;
pub use catalog::{default_catalog, PlanCatalog};
pub use config::Config;
pub use promotion::PromotionRules;
pub use store::{FileStore, TraineeStore};
pub use report::AnalyticsSummary;
pub use evaluation::{Evaluation, ImportSummary, ProgressEngine};
