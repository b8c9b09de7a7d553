//! Terminal rendering of lifecycle results and artifact export.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::bpm::Stage;
use crate::lifecycle::{LifecycleReport, ProcessArtifacts, StageOutcome, StageReport};

/// Rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Print the prompt sent for each stage
    pub show_prompts: bool,

    /// Print the BPMN XML of each exported process
    pub show_xml: bool,
}

/// Writes stage results as plain text.
pub struct Reporter<W: Write> {
    out: W,
    options: RenderOptions,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, options: RenderOptions) -> Self {
        Self { out, options }
    }

    /// Consume the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the run header.
    pub fn header(&mut self, process_name: &str, provider: &str, model: &str) -> io::Result<()> {
        writeln!(self.out, "BPM lifecycle analysis: {process_name}")?;
        writeln!(self.out, "Using {provider} ({model})")?;
        writeln!(self.out)
    }

    /// Print one stage.
    pub fn stage(&mut self, report: &StageReport) -> io::Result<()> {
        let stage = report.stage;
        let title = format!("{}. {} - {}", stage.number(), stage.label(), stage.heading());
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{}", "=".repeat(title.chars().count()))?;
        writeln!(self.out, "{}", stage.tagline())?;
        writeln!(self.out)?;

        match &report.outcome {
            StageOutcome::Completed(output) => {
                self.prompt(&output.prompt)?;
                writeln!(self.out, "{}", output.text.trim_end())?;
                writeln!(self.out)?;
                if let Some(artifacts) = &output.artifacts {
                    self.artifacts(stage, artifacts)?;
                }
            }
            StageOutcome::Failed { prompt, error } => {
                self.prompt(prompt)?;
                writeln!(self.out, "[error] {error}")?;
                writeln!(self.out)?;
            }
            StageOutcome::Skipped { requires } => {
                writeln!(self.out, "[skipped] Please complete the {requires} stage first.")?;
                writeln!(self.out)?;
            }
        }

        Ok(())
    }

    /// Print the closing summary.
    pub fn summary(&mut self, report: &LifecycleReport) -> io::Result<()> {
        if report.is_complete() {
            writeln!(self.out, "Complete BPM lifecycle analysis generated successfully.")
        } else {
            writeln!(
                self.out,
                "Lifecycle analysis finished: {} completed, {} failed, {} skipped.",
                report.completed_count(),
                report.failed_count(),
                report.skipped_count()
            )
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Print every stage followed by the summary.
    pub fn report(&mut self, report: &LifecycleReport) -> io::Result<()> {
        for stage in &report.stages {
            self.stage(stage)?;
        }
        self.summary(report)
    }

    fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        if self.options.show_prompts {
            writeln!(self.out, "--- prompt ---")?;
            writeln!(self.out, "{}", prompt.trim_end())?;
            writeln!(self.out, "--------------")?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn artifacts(&mut self, stage: Stage, artifacts: &ProcessArtifacts) -> io::Result<()> {
        let variant = stage.variant().unwrap_or("Process");
        writeln!(self.out, "{variant} process flow ({} tasks):", artifacts.tasks.len())?;
        for (i, task) in artifacts.tasks.iter().enumerate() {
            writeln!(self.out, "  {}. {task}", i + 1)?;
        }
        writeln!(self.out)?;
        write!(self.out, "{}", artifacts.diagram.to_dot())?;
        writeln!(self.out)?;
        writeln!(self.out, "BPMN export: {}", artifacts.file_name)?;
        if self.options.show_xml {
            writeln!(self.out)?;
            write!(self.out, "{}", artifacts.xml)?;
        }
        writeln!(self.out)
    }
}

/// Write each exported process as `<file>.bpmn`, plus `<file>.dot` when `with_diagrams` is set.
///
/// Creates `dir` if needed and returns the written paths.
pub fn write_artifacts(
    report: &LifecycleReport,
    dir: &Path,
    with_diagrams: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (stage, artifacts) in report.artifacts() {
        let path = dir.join(&artifacts.file_name);
        std::fs::write(&path, &artifacts.xml)?;
        tracing::info!(%stage, path = %path.display(), "Wrote process definition");
        written.push(path.clone());

        if with_diagrams {
            let dot_path = path.with_extension("dot");
            std::fs::write(&dot_path, artifacts.diagram.to_dot())?;
            written.push(dot_path);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpm::{FlowDiagram, ProcessDefinition};
    use crate::lifecycle::{ProcessRequest, StageOutput};

    fn artifacts(name: &str) -> ProcessArtifacts {
        let tasks = vec!["Receive order".to_string(), "Ship order".to_string()];
        let definition = ProcessDefinition::build(&tasks, "Shop - As-Is");
        ProcessArtifacts {
            diagram: FlowDiagram::build(&tasks, "Current Process"),
            xml: definition.to_xml().unwrap(),
            definition,
            tasks,
            file_name: name.to_string(),
        }
    }

    fn sample_report() -> LifecycleReport {
        let completed = |text: &str, artifacts: Option<ProcessArtifacts>| {
            StageOutcome::Completed(StageOutput {
                prompt: "PROMPT".to_string(),
                text: text.to_string(),
                artifacts,
            })
        };

        LifecycleReport {
            request: ProcessRequest::new("Shop", "Orders are shipped."),
            stages: vec![
                StageReport { stage: Stage::Identification, outcome: completed("Purpose", None) },
                StageReport {
                    stage: Stage::Discovery,
                    outcome: completed("1. Receive order\n2. Ship order", Some(artifacts("shop_as_is.bpmn"))),
                },
                StageReport {
                    stage: Stage::Analysis,
                    outcome: StageOutcome::Failed {
                        prompt: "PROMPT".to_string(),
                        error: "Error in analysis stage: timeout".to_string(),
                    },
                },
                StageReport {
                    stage: Stage::Redesign,
                    outcome: StageOutcome::Skipped { requires: Stage::Analysis },
                },
                StageReport {
                    stage: Stage::Monitoring,
                    outcome: StageOutcome::Skipped { requires: Stage::Redesign },
                },
            ],
        }
    }

    fn render(options: RenderOptions) -> String {
        let mut reporter = Reporter::new(Vec::new(), options);
        reporter.report(&sample_report()).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_render_report() {
        let text = render(RenderOptions::default());

        assert!(text.contains("1. Identification - Process Identification"));
        assert!(text.contains("Mapping out the current state process flow"));
        assert!(text.contains("As-Is process flow (2 tasks):"));
        assert!(text.contains("  2. Ship order"));
        assert!(text.contains("digraph {"));
        assert!(text.contains("BPMN export: shop_as_is.bpmn"));
        assert!(text.contains("[error] Error in analysis stage: timeout"));
        assert!(text.contains("[skipped] Please complete the Analysis stage first."));
        assert!(text.contains("1 failed, 2 skipped"));
        assert!(!text.contains("PROMPT"));
        assert!(!text.contains("<definitions"));
    }

    #[test]
    fn test_render_with_prompts_and_xml() {
        let text = render(RenderOptions { show_prompts: true, show_xml: true });

        assert!(text.contains("--- prompt ---\nPROMPT"));
        assert!(text.contains("<definitions"));
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");

        let written = write_artifacts(&sample_report(), &out, true).unwrap();

        assert_eq!(written, vec![out.join("shop_as_is.bpmn"), out.join("shop_as_is.dot")]);
        let xml = std::fs::read_to_string(out.join("shop_as_is.bpmn")).unwrap();
        assert!(xml.contains("<task id=\"Task_2\" name=\"Ship order\"/>"));
        let dot = std::fs::read_to_string(out.join("shop_as_is.dot")).unwrap();
        assert!(dot.contains("task_1 -> end;"));
    }

    #[test]
    fn test_write_artifacts_without_diagrams() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_artifacts(&sample_report(), dir.path(), false).unwrap();
        assert_eq!(written.len(), 1);
    }
}
