// Litmus: behavioral scoring and generation gating for community posts.
//
// This is the library root. Each module corresponds to a stage of the
// analysis pipeline or a supporting subsystem.

pub mod config;
pub mod db;
pub mod error;
pub mod gating;
pub mod nlp;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod scoring;
pub mod style;
