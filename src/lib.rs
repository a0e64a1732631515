//! klc-check: convention checker for KiCad library components
//!
//! This library checks footprints and schematic symbols against the KiCad
//! Library Conventions and fixes what can be fixed automatically.
//!
//! # Architecture
//!
//! - A component is loaded into the in-memory [`model`].
//! - A rule from the [`rules`] catalog is bound to it, checked, and
//!   optionally fixed. Rules report messages to a [`rules::Reporter`].
//! - The [`runner`] sequences this over whole [`library`] documents.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types
//! - [`library`] - JSON library documents
//! - [`model`] - Footprint and symbol object model
//! - [`rules`] - Rule contract and the rule catalog
//! - [`runner`] - Check/fix driver

pub mod config;
pub mod error;
pub mod library;
pub mod model;
pub mod rules;
pub mod runner;
