//! # Domain layer
//!
//! Core entities, value objects, ports, and the error taxonomy for the
//! coordinator. No infrastructure concerns live here: every external
//! dependency (vector store, meta store, embedding service, LLM provider,
//! UI transport) is represented only as a trait in [`ports`].

pub mod constants;
pub mod entities;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;
