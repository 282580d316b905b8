//! Shared data model for the sqsmon plugin: metric and graph definitions and
//! the static SQS catalog.

pub mod catalog;
pub mod types;
