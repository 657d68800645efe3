//! BlogForge Library
//!
//! Core library for the BlogForge desktop application: a local-LLM blog
//! generator built on llama.cpp.

pub mod app;
pub mod export;
pub mod inference;
pub mod prompt;
pub mod report;
pub mod request;
pub mod ui;
