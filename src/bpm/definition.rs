//! BPMN 2.0 process-definition documents.
//!
//! Produces the minimal `definitions/process` document that process
//! modelling tools (bpmn.io, Camunda Modeler) import: one start event, one
//! task per step, one end event and a sequence flow between each neighbour.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use super::truncate_label;

/// Maximum characters of a task name in the exported document.
pub const TASK_NAME_BUDGET: usize = 50;

pub const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const TARGET_NS: &str = "http://bpmn.io/schema/bpmn";

pub const START_EVENT_ID: &str = "StartEvent_1";
pub const END_EVENT_ID: &str = "EndEvent_1";
const PROCESS_ID: &str = "Process_1";

/// Errors raised while serializing a definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("XML write failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generated XML is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A task element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskElement {
    pub id: String,
    pub name: String,
}

/// A sequence flow between two elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFlow {
    pub id: String,
    pub source_ref: String,
    pub target_ref: String,
}

/// A linear BPMN process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Process name attribute
    pub name: String,

    /// Tasks in execution order (`Task_1` ..)
    pub tasks: Vec<TaskElement>,

    /// Flows in chain order (`Flow_1` .. `Flow_{n+1}`)
    pub flows: Vec<SequenceFlow>,
}

impl ProcessDefinition {
    /// Build a definition chaining `tasks` from the start event to the end event.
    ///
    /// There is always one more flow than there are tasks; with no tasks the
    /// single flow joins the start event directly to the end event.
    pub fn build(tasks: &[String], process_name: impl Into<String>) -> Self {
        let elements: Vec<TaskElement> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| TaskElement {
                id: format!("Task_{}", i + 1),
                name: truncate_label(task, TASK_NAME_BUDGET),
            })
            .collect();

        let mut flows = Vec::with_capacity(elements.len() + 1);
        let mut prev = START_EVENT_ID.to_string();
        for task in &elements {
            flows.push(SequenceFlow {
                id: format!("Flow_{}", flows.len() + 1),
                source_ref: prev,
                target_ref: task.id.clone(),
            });
            prev = task.id.clone();
        }
        flows.push(SequenceFlow {
            id: format!("Flow_{}", flows.len() + 1),
            source_ref: prev,
            target_ref: END_EVENT_ID.to_string(),
        });

        Self { name: process_name.into(), tasks: elements, flows }
    }

    /// Serialize as pretty-printed BPMN XML.
    pub fn to_xml(&self) -> Result<String, DefinitionError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut definitions = BytesStart::new("definitions");
        definitions.push_attribute(("xmlns", BPMN_MODEL_NS));
        definitions.push_attribute(("xmlns:xsi", XSI_NS));
        definitions.push_attribute(("targetNamespace", TARGET_NS));
        writer.write_event(Event::Start(definitions))?;

        let mut process = BytesStart::new("process");
        process.push_attribute(("id", PROCESS_ID));
        process.push_attribute(("isExecutable", "true"));
        process.push_attribute(("name", self.name.as_str()));
        writer.write_event(Event::Start(process))?;

        write_empty(&mut writer, "startEvent", &[("id", START_EVENT_ID), ("name", "Start")])?;
        for task in &self.tasks {
            write_empty(&mut writer, "task", &[("id", task.id.as_str()), ("name", task.name.as_str())])?;
        }
        write_empty(&mut writer, "endEvent", &[("id", END_EVENT_ID), ("name", "End")])?;

        for flow in &self.flows {
            write_empty(
                &mut writer,
                "sequenceFlow",
                &[
                    ("id", flow.id.as_str()),
                    ("sourceRef", flow.source_ref.as_str()),
                    ("targetRef", flow.target_ref.as_str()),
                ],
            )?;
        }

        writer.write_event(Event::End(BytesEnd::new("process")))?;
        writer.write_event(Event::End(BytesEnd::new("definitions")))?;

        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }
}

fn write_empty(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<(), DefinitionError> {
    let mut element = BytesStart::new(tag);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(element))?;
    Ok(())
}
