//! The five BPM lifecycle stages and their prompt templates.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

const IDENTIFICATION_PROMPT: &str = r"As a Business Process Management expert, analyze this business process description:

{description}

Provide a comprehensive analysis covering:
1. **Business Purpose**: What is the core objective of this process?
2. **Key Stakeholders**: Who are the main participants and beneficiaries?
3. **Current Pain Points**: What inefficiencies, bottlenecks, or problems do you identify?
4. **Business Value**: What value does this process deliver to the organization?
5. **Improvement Potential**: What are the key areas for optimization?

Keep your response structured and professional.";

const DISCOVERY_PROMPT: &str = r#"As a Business Process Analyst, break down this process into clear, sequential steps:

{description}

Requirements:
- Extract the main tasks/activities in chronological order
- Use clear, action-oriented language
- Include decision points where applicable
- Focus on "what" is done, not "how"
- Number each step for clarity

Format your response as a numbered list of process steps."#;

const ANALYSIS_PROMPT: &str = r"As a Process Improvement Consultant, analyze these process steps for optimization opportunities:

{steps}

Provide analysis on:
1. **Bottlenecks**: Which steps cause delays or capacity constraints?
2. **Redundancies**: Are there duplicate or unnecessary activities?
3. **Risk Points**: Where are the highest risks of errors or failures?
4. **Automation Opportunities**: Which steps could be automated?
5. **Resource Utilization**: Are resources being used efficiently?
6. **Quality Issues**: Where might quality problems occur?

Be specific and actionable in your recommendations.";

const REDESIGN_PROMPT: &str = r"As a Digital Transformation Specialist, redesign this process to be more efficient:

Original Process Steps:
{steps}

Analysis Findings:
{analysis}

Create an optimized process that:
- Eliminates waste and redundancy
- Introduces automation where beneficial
- Improves parallel processing opportunities
- Reduces handoffs and delays
- Enhances quality and consistency

Provide the redesigned process as a numbered list of steps, followed by a brief explanation of key improvements made.";

const MONITORING_PROMPT: &str = r"As a Process Excellence Manager, design a monitoring and optimization framework for this redesigned process:

Redesigned Process:
{redesigned_process}

Provide:
1. **Key Performance Indicators (KPIs)**: 5-7 metrics to track process performance
2. **Target Values**: Specific targets for each KPI
3. **Alert Thresholds**: When to trigger alerts or interventions
4. **Monitoring Frequency**: How often to measure each KPI
5. **Continuous Improvement**: Suggestions for ongoing optimization
6. **Technology Enablers**: Tools or systems that could support monitoring

Focus on measurable, actionable metrics that drive business value.";

/// A stage of the BPM lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Identification,
    Discovery,
    Analysis,
    Redesign,
    Monitoring,
}

/// Text available to fill a stage template.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageInputs<'a> {
    /// The user's process description
    pub description: &'a str,
    /// Discovery output
    pub steps: Option<&'a str>,
    /// Analysis output
    pub analysis: Option<&'a str>,
    /// Redesign output
    pub redesigned_process: Option<&'a str>,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Self; 5] =
        [Self::Identification, Self::Discovery, Self::Analysis, Self::Redesign, Self::Monitoring];

    /// 1-based position in the lifecycle.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Short label ("Discovery").
    pub fn label(self) -> &'static str {
        match self {
            Self::Identification => "Identification",
            Self::Discovery => "Discovery",
            Self::Analysis => "Analysis",
            Self::Redesign => "Redesign",
            Self::Monitoring => "Monitoring",
        }
    }

    /// Section heading.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Identification => "Process Identification",
            Self::Discovery => "Process Discovery",
            Self::Analysis => "Process Analysis",
            Self::Redesign => "Process Redesign",
            Self::Monitoring => "Process Monitoring & Optimization",
        }
    }

    /// One-line summary of what the stage produces.
    pub fn tagline(self) -> &'static str {
        match self {
            Self::Identification => "Understanding the business context and value proposition",
            Self::Discovery => "Mapping out the current state process flow",
            Self::Analysis => "Identifying bottlenecks, risks, and improvement opportunities",
            Self::Redesign => "Creating an optimized future state process",
            Self::Monitoring => "Establishing KPIs and continuous improvement framework",
        }
    }

    /// Stages whose output this stage consumes, in order.
    pub fn dependencies(self) -> &'static [Self] {
        match self {
            Self::Identification | Self::Discovery => &[],
            Self::Analysis => &[Self::Discovery],
            Self::Redesign => &[Self::Discovery, Self::Analysis],
            Self::Monitoring => &[Self::Redesign],
        }
    }

    /// Whether the stage output is turned into a diagram and process definition.
    pub fn produces_process(self) -> bool {
        matches!(self, Self::Discovery | Self::Redesign)
    }

    /// Suffix for exported artifacts ("As-Is" for discovery, "To-Be" for redesign).
    pub fn variant(self) -> Option<&'static str> {
        match self {
            Self::Discovery => Some("As-Is"),
            Self::Redesign => Some("To-Be"),
            _ => None,
        }
    }

    /// The raw prompt template with `{placeholder}` markers.
    pub fn template(self) -> &'static str {
        match self {
            Self::Identification => IDENTIFICATION_PROMPT,
            Self::Discovery => DISCOVERY_PROMPT,
            Self::Analysis => ANALYSIS_PROMPT,
            Self::Redesign => REDESIGN_PROMPT,
            Self::Monitoring => MONITORING_PROMPT,
        }
    }

    /// Fill the template. Missing inputs render as empty text.
    ///
    /// Each placeholder is filled once; braces inside the inputs are left as they are.
    pub fn render(self, inputs: &StageInputs<'_>) -> String {
        PLACEHOLDER
            .replace_all(self.template(), |caps: &Captures<'_>| {
                let value = match &caps[1] {
                    "description" => Some(inputs.description),
                    "steps" => inputs.steps,
                    "analysis" => inputs.analysis,
                    "redesigned_process" => inputs.redesigned_process,
                    _ => return caps[0].to_string(),
                };
                value.unwrap_or_default().to_string()
            })
            .into_owned()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if let Ok(n) = wanted.parse::<usize>() {
            return Self::ALL
                .get(n.wrapping_sub(1))
                .copied()
                .ok_or_else(|| format!("Stage number must be 1-5, got {n}"));
        }
        Self::ALL
            .into_iter()
            .find(|stage| stage.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown stage: {s}"))
    }
}
