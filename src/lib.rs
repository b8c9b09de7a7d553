#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]

//! # bpm-lifecycle
//!
//! Walk a business process description through the five stages of the BPM
//! lifecycle with a large language model: identification, discovery,
//! analysis, redesign and monitoring.
//!
//! Discovery and redesign results are turned into an ordered task list, a
//! linear flow diagram (Graphviz DOT) and a BPMN 2.0 process definition
//! that can be imported into process modelling tools.
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//!
//! # Analyze a built-in scenario
//! bpml run --scenario procurement --output-dir exports
//!
//! # Or your own description
//! bpml run --file my_process.txt --name "Claims Handling"
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::future_not_send)]

pub mod bpm;
pub mod core;
pub mod lifecycle;
pub mod llm;
pub mod output;

// Re-export commonly used types
pub use bpm::{extract_tasks, FlowDiagram, ProcessDefinition, Scenario, Stage};
pub use crate::core::Config;
pub use lifecycle::{
    Lifecycle, LifecycleError, LifecycleReport, ProcessArtifacts, ProcessRequest, StageOutcome,
    StageOutput, StageReport,
};
pub use llm::{Credential, LanguageModel, LlmError, OpenAIProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "bpm-lifecycle";

/// Short alias
pub const APP_ALIAS: &str = "bpml";
