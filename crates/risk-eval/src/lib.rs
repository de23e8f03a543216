//! Credit-risk assessment core.
//!
//! Collects applicant attributes through a sectioned form session, turns them into the
//! canonical feature vector expected by the external scoring model, and interprets the
//! returned risk classification for presentation.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
