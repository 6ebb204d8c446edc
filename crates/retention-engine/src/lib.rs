//! Release retention decisions.
//!
//! A [`RetentionService`] runs a [`retention_core::RetentionStrategy`] over
//! every (project, environment) pair of its inputs and unions what each pair
//! keeps. The engine only classifies releases; deleting the rest is left to
//! the caller.

#![forbid(unsafe_code)]

pub mod observe;
pub mod partition;
pub mod report;
pub mod service;
pub mod strategy;

pub use observe::{CollectingObserver, TracingObserver};
pub use report::{RetentionReport, ScopeDecision};
pub use service::RetentionService;
pub use strategy::{KeepDeployedWithinStrategy, KeepMostRecentStrategy};
