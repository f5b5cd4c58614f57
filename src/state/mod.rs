/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The capture-to-result pipeline and its generation tokens (pipeline.rs)

pub mod data;
pub mod pipeline;
