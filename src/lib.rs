//! Client for the EcoMedAI analysis service.
//!
//! A file goes through an [`controller::UploadController`], which validates it,
//! runs one request through a [`lifecycle::RequestLifecycle`], then turns the
//! body into a table ([`projection`]) or a bin diagnosis ([`dispatch`]).

pub mod client;
pub mod controller;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod lifecycle;
pub mod projection;
pub mod render;
pub mod settings;
pub mod upload;

pub use client::{AnalysisClient, Endpoint};
pub use controller::{AnalysisView, BomAnalysis, UploadController, WasteClassification};
pub use error::AnalysisError;
