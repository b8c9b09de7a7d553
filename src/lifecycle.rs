//! Runs a process description through the five lifecycle stages.
//!
//! Stages run one after another. A stage only runs when every stage it
//! depends on has completed; otherwise it is recorded as skipped. Model
//! failures are captured per stage and never abort the run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bpm::{extract_tasks, FlowDiagram, ProcessDefinition, Scenario, Stage, StageInputs};
use crate::llm::LanguageModel;

/// Process name used when the user supplies their own description.
pub const CUSTOM_PROCESS_NAME: &str = "Custom Business Process";

/// Errors that stop a run before any stage executes.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Please provide a process description")]
    EmptyDescription,

    #[error("Unknown scenario '{key}'. Available: {available}")]
    UnknownScenario { key: String, available: String },
}

/// The process to analyze.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    /// Process name used in exported documents and file names
    pub name: String,

    /// Free-text description of the process
    pub description: String,
}

impl ProcessRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into() }
    }

    /// A user-written description under the default process name.
    pub fn custom(description: impl Into<String>) -> Self {
        Self::new(CUSTOM_PROCESS_NAME, description)
    }

    /// The description of a catalog scenario.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.title, scenario.description)
    }

    /// Look up a scenario by key.
    pub fn for_scenario(key: &str) -> Result<Self, LifecycleError> {
        Scenario::find(key).map(Self::from_scenario).ok_or_else(|| {
            LifecycleError::UnknownScenario {
                key: key.to_string(),
                available: Scenario::available_keys(),
            }
        })
    }

    /// Base for export file names.
    ///
    /// Lowercased; every run of characters other than letters, digits and `-`
    /// becomes a single `_`, so the stem never contains a path separator.
    pub fn export_stem(&self) -> String {
        let mut stem = String::with_capacity(self.name.len());
        for c in self.name.to_lowercase().chars() {
            if c.is_alphanumeric() || c == '-' {
                stem.push(c);
            } else if !stem.is_empty() && !stem.ends_with('_') {
                stem.push('_');
            }
        }
        let stem = stem.trim_end_matches('_');
        if stem.is_empty() {
            "process".to_string()
        } else {
            stem.to_string()
        }
    }

    /// Reject blank descriptions.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.description.trim().is_empty() {
            return Err(LifecycleError::EmptyDescription);
        }
        Ok(())
    }
}

/// Diagram and process definition derived from a stage's output.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessArtifacts {
    /// Extracted tasks, in order
    pub tasks: Vec<String>,

    pub diagram: FlowDiagram,

    pub definition: ProcessDefinition,

    /// Serialized BPMN document
    pub xml: String,

    /// Suggested export file name (`<process>_as_is.bpmn`)
    pub file_name: String,
}

/// Output of a completed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    /// Prompt sent to the model
    pub prompt: String,

    /// Model response
    pub text: String,

    /// Present for discovery and redesign when tasks could be extracted
    pub artifacts: Option<ProcessArtifacts>,
}

/// What happened to a stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageOutcome {
    Completed(StageOutput),
    Failed { prompt: String, error: String },
    Skipped { requires: Stage },
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A stage and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Result of a full lifecycle run.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReport {
    pub request: ProcessRequest,

    /// One entry per stage, in stage order
    pub stages: Vec<StageReport>,
}

impl LifecycleReport {
    /// Outcome of a stage.
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|r| r.stage == stage).map(|r| &r.outcome)
    }

    /// Output of a stage, if it completed.
    pub fn output(&self, stage: Stage) -> Option<&StageOutput> {
        match self.outcome(stage)? {
            StageOutcome::Completed(output) => Some(output),
            _ => None,
        }
    }

    /// Artifacts of every stage that produced them.
    pub fn artifacts(&self) -> impl Iterator<Item = (Stage, &ProcessArtifacts)> {
        self.stages.iter().filter_map(|r| match &r.outcome {
            StageOutcome::Completed(StageOutput { artifacts: Some(a), .. }) => Some((r.stage, a)),
            _ => None,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|r| r.outcome.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|r| matches!(r.outcome, StageOutcome::Failed { .. })).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.stages.iter().filter(|r| matches!(r.outcome, StageOutcome::Skipped { .. })).count()
    }

    /// Whether every stage completed.
    pub fn is_complete(&self) -> bool {
        self.completed_count() == Stage::ALL.len()
    }
}

/// Stage runner bound to a language model.
pub struct Lifecycle<M> {
    model: M,
}

impl<M: LanguageModel> Lifecycle<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Get the underlying model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run all five stages.
    pub async fn run(&self, request: &ProcessRequest) -> Result<LifecycleReport, LifecycleError> {
        self.run_with(request, |_| {}).await
    }

    /// Run all five stages, calling `on_stage` as each one finishes.
    pub async fn run_with<F>(
        &self,
        request: &ProcessRequest,
        mut on_stage: F,
    ) -> Result<LifecycleReport, LifecycleError>
    where
        F: FnMut(&StageReport),
    {
        request.validate()?;

        tracing::info!(
            process = %request.name,
            provider = self.model.name(),
            model = self.model.model(),
            "Starting lifecycle run"
        );

        let mut texts: BTreeMap<Stage, String> = BTreeMap::new();
        let mut stages = Vec::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            let outcome = match stage.dependencies().iter().find(|dep| !texts.contains_key(*dep)) {
                Some(&requires) => {
                    tracing::info!(%stage, %requires, "Skipping stage, dependency not completed");
                    StageOutcome::Skipped { requires }
                }
                None => {
                    let inputs = StageInputs {
                        description: &request.description,
                        steps: texts.get(&Stage::Discovery).map(String::as_str),
                        analysis: texts.get(&Stage::Analysis).map(String::as_str),
                        redesigned_process: texts.get(&Stage::Redesign).map(String::as_str),
                    };
                    self.run_stage(stage, &inputs, request).await
                }
            };

            if let StageOutcome::Completed(output) = &outcome {
                texts.insert(stage, output.text.clone());
            }

            let report = StageReport { stage, outcome };
            on_stage(&report);
            stages.push(report);
        }

        let report = LifecycleReport { request: request.clone(), stages };
        tracing::info!(
            completed = report.completed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "Lifecycle run finished"
        );

        Ok(report)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        inputs: &StageInputs<'_>,
        request: &ProcessRequest,
    ) -> StageOutcome {
        let prompt = stage.render(inputs);
        tracing::debug!(%stage, prompt_len = prompt.len(), "Running stage");

        let text = match self.model.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%stage, error = %e, "Stage failed");
                return StageOutcome::Failed {
                    prompt,
                    error: format!("Error in {} stage: {e}", stage.label().to_lowercase()),
                };
            }
        };

        let artifacts = match stage.variant() {
            Some(variant) => match build_artifacts(&text, stage, variant, request) {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    tracing::warn!(%stage, error = %e, "Process export failed");
                    return StageOutcome::Failed {
                        prompt,
                        error: format!("Error in {} stage: {e}", stage.label().to_lowercase()),
                    };
                }
            },
            None => None,
        };

        tracing::info!(%stage, "Stage completed");
        StageOutcome::Completed(StageOutput { prompt, text, artifacts })
    }
}

/// Extract tasks from `text` and build the diagram and definition.
///
/// Returns `None` when no task could be extracted.
fn build_artifacts(
    text: &str,
    stage: Stage,
    variant: &str,
    request: &ProcessRequest,
) -> anyhow::Result<Option<ProcessArtifacts>> {
    let tasks = extract_tasks(text);
    if tasks.is_empty() {
        return Ok(None);
    }
    tracing::debug!(%stage, tasks = tasks.len(), "Extracted tasks");

    let title = match stage {
        Stage::Redesign => "Redesigned Process",
        _ => "Current Process",
    };
    let diagram = FlowDiagram::build(&tasks, title);
    let definition = ProcessDefinition::build(&tasks, format!("{} - {variant}", request.name));
    let xml = definition.to_xml()?;
    let file_name = format!(
        "{}_{}.bpmn",
        request.export_stem(),
        variant.to_lowercase().replace('-', "_")
    );

    Ok(Some(ProcessArtifacts { tasks, diagram, definition, xml, file_name }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Answers by stage, recognised from the prompt's opening words.
    struct ScriptedModel {
        fail: Vec<Stage>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(fail: &[Stage]) -> Self {
            Self { fail: fail.to_vec(), prompts: Mutex::new(Vec::new()) }
        }
    }

    fn stage_of(prompt: &str) -> Stage {
        Stage::ALL
            .into_iter()
            .find(|s| prompt.starts_with(&s.template()[..40]))
            .expect("prompt matches a template")
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let stage = stage_of(prompt);
            if self.fail.contains(&stage) {
                anyhow::bail!("service unavailable");
            }
            Ok(match stage {
                Stage::Discovery => "1. Receive order\n2. Check stock\n3. Ship order".to_string(),
                Stage::Redesign => "1. Auto-check stock\n2. Ship order\n\nThe key change is automation.".to_string(),
                other => format!("{other} findings"),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn request() -> ProcessRequest {
        ProcessRequest::new("Order Fulfilment", "Orders are received, checked and shipped.")
    }

    #[tokio::test]
    async fn test_full_run() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[]));
        let report = lifecycle.run(&request()).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.stages.len(), 5);

        let discovery = report.output(Stage::Discovery).unwrap();
        let artifacts = discovery.artifacts.as_ref().unwrap();
        assert_eq!(artifacts.tasks, vec!["Receive order", "Check stock", "Ship order"]);
        assert_eq!(artifacts.definition.flows.len(), 4);
        assert_eq!(artifacts.file_name, "order_fulfilment_as_is.bpmn");
        assert_eq!(artifacts.definition.name, "Order Fulfilment - As-Is");

        let redesign = report.output(Stage::Redesign).unwrap();
        let artifacts = redesign.artifacts.as_ref().unwrap();
        assert_eq!(artifacts.tasks, vec!["Auto-check stock", "Ship order"]);
        assert_eq!(artifacts.file_name, "order_fulfilment_to_be.bpmn");
        assert_eq!(artifacts.diagram.title, "Redesigned Process");

        assert!(report.output(Stage::Analysis).unwrap().artifacts.is_none());
        assert_eq!(report.artifacts().count(), 2);
    }

    #[tokio::test]
    async fn test_outputs_feed_later_stages() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[]));
        lifecycle.run(&request()).await.unwrap();

        let prompts = lifecycle.model().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 5);
        assert!(prompts[0].contains("Orders are received, checked and shipped."));
        assert!(prompts[2].contains("1. Receive order"));
        assert!(prompts[3].contains("1. Receive order"));
        assert!(prompts[3].contains("Analysis findings"));
        assert!(prompts[4].contains("1. Auto-check stock"));
    }

    #[tokio::test]
    async fn test_empty_description_rejected() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[]));
        let err = lifecycle.run(&ProcessRequest::custom("  \n ")).await.unwrap_err();

        assert!(matches!(err, LifecycleError::EmptyDescription));
        assert!(lifecycle.model().prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_failure_skips_dependents() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[Stage::Discovery]));
        let report = lifecycle.run(&request()).await.unwrap();

        assert!(report.outcome(Stage::Identification).unwrap().is_completed());
        assert!(matches!(report.outcome(Stage::Discovery), Some(StageOutcome::Failed { .. })));
        assert!(matches!(
            report.outcome(Stage::Analysis),
            Some(StageOutcome::Skipped { requires: Stage::Discovery })
        ));
        assert!(matches!(
            report.outcome(Stage::Redesign),
            Some(StageOutcome::Skipped { requires: Stage::Discovery })
        ));
        assert!(matches!(
            report.outcome(Stage::Monitoring),
            Some(StageOutcome::Skipped { requires: Stage::Redesign })
        ));
        assert_eq!(lifecycle.model().prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_identification_failure_is_independent() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[Stage::Identification]));
        let report = lifecycle.run(&request()).await.unwrap();

        match report.outcome(Stage::Identification).unwrap() {
            StageOutcome::Failed { error, .. } => {
                assert!(error.contains("Error in identification stage"));
                assert!(error.contains("service unavailable"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(report.completed_count(), 4);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_skips_redesign_with_reason() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[Stage::Analysis]));
        let report = lifecycle.run(&request()).await.unwrap();

        assert!(report.outcome(Stage::Discovery).unwrap().is_completed());
        assert!(matches!(
            report.outcome(Stage::Redesign),
            Some(StageOutcome::Skipped { requires: Stage::Analysis })
        ));
        assert_eq!(report.artifacts().count(), 1);
    }

    #[tokio::test]
    async fn test_callback_sees_stages_in_order() {
        let lifecycle = Lifecycle::new(ScriptedModel::new(&[]));
        let mut seen = Vec::new();
        lifecycle.run_with(&request(), |r| seen.push(r.stage)).await.unwrap();

        assert_eq!(seen, Stage::ALL.to_vec());
    }

    #[test]
    fn test_request_helpers() {
        assert_eq!(ProcessRequest::custom("x").name, CUSTOM_PROCESS_NAME);
        assert_eq!(
            ProcessRequest::new("Supply Chain Procurement", "x").export_stem(),
            "supply_chain_procurement"
        );

        let request = ProcessRequest::for_scenario("rnd").unwrap();
        assert!(request.description.contains("prototype"));

        let err = ProcessRequest::for_scenario("payroll").unwrap_err();
        assert!(err.to_string().contains("procurement, rnd, enrollment"));
    }

    #[test]
    fn test_export_stem_is_a_plain_file_name() {
        let stem = |name: &str| ProcessRequest::new(name, "x").export_stem();

        assert_eq!(stem("../Sales/Returns"), "sales_returns");
        assert_eq!(stem(r"C:\Claims\2024"), "c_claims_2024");
        assert_eq!(stem("Order-to-Cash  (v2)"), "order-to-cash_v2");
        assert_eq!(stem("/// ..."), "process");
        assert!(!stem("..").contains('.'));
    }
}
