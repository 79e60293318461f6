//! Feishu Docs Agent - document orchestration for AI agents
//!
//! This crate lists, reads, outlines and writes Feishu cloud documents
//! through a small set of named actions, each answering with a uniform
//! JSON envelope.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
