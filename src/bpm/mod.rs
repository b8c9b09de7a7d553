//! Business process artifacts.
//!
//! Everything computed locally from model output lives here: task
//! extraction, linear flow diagrams, BPMN process definitions, the stage
//! prompt templates and the built-in scenario catalog.

mod definition;
mod diagram;
mod extract;
mod prompts;
mod scenarios;

pub use definition::{
    DefinitionError, ProcessDefinition, SequenceFlow, TaskElement, END_EVENT_ID, START_EVENT_ID,
    TASK_NAME_BUDGET,
};
pub use diagram::{DiagramEdge, DiagramNode, FlowDiagram, NodeKind, NODE_LABEL_BUDGET};
pub use extract::extract_tasks;
pub use prompts::{Stage, StageInputs};
pub use scenarios::{Complexity, Scenario, SCENARIOS};

/// Marker appended to truncated labels.
pub const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `budget` characters followed by [`ELLIPSIS`].
///
/// Text within the budget is returned unchanged.
pub fn truncate_label(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_within_budget() {
        assert_eq!(truncate_label("short", 30), "short");
        assert_eq!(truncate_label(&"a".repeat(30), 30), "a".repeat(30));
    }

    #[test]
    fn test_truncate_over_budget() {
        let label = truncate_label(&"a".repeat(31), 30);
        assert_eq!(label, format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "Überprüfung der Lieferantenangebote und Auswahl";
        let label = truncate_label(text, 10);
        assert_eq!(label, "Überprüfun...");
        assert_eq!(label.chars().count(), 13);
    }

    #[test]
    fn test_truncate_never_exceeds_budget_plus_marker() {
        for len in 0..80 {
            let text = "é".repeat(len);
            let label = truncate_label(&text, 30);
            assert!(label.chars().count() <= 30 + ELLIPSIS.len());
            if len > 30 {
                assert!(label.ends_with(ELLIPSIS));
            } else {
                assert_eq!(label, text);
            }
        }
    }
}
