// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Assessment XML node processors.
//!
//! An assessment dump nests `part` elements under `assessment` elements
//! whose `xsi:type` names the assessment; identically-named child tags
//! under different assessments are told apart by that ancestor-derived
//! name.

use crate::core::context::{ContentsContext, TopicData};
use crate::core::time::TimeFieldParser;
use crate::core::value::{record_struct, RecordValue};
use crate::formats::xml::tree::{XmlElement, XmlError};
use crate::formats::xml::{XmlNodeProcessor, XmlNodeProcessorFactory};

fn require_assessment(element: &XmlElement, assessment: Option<&str>) -> Result<String, XmlError> {
    assessment
        .map(str::to_string)
        .ok_or_else(|| XmlError::MissingAttribute {
            element: element.name.clone(),
            attribute: "xsi:type".to_string(),
        })
}

fn parse_start_time(element: &XmlElement) -> Result<f64, XmlError> {
    let raw = element.require_attribute("start")?;
    TimeFieldParser::epoch_millis()
        .parse(raw)
        .map_err(|e| XmlError::Malformed(e.to_string()))
}

/// Factory for `screen_elements` nodes, one record per child element.
pub struct ScreenElementsFactory {
    topic: String,
}

impl ScreenElementsFactory {
    /// Create a factory publishing to the given topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl XmlNodeProcessorFactory for ScreenElementsFactory {
    fn node_name(&self) -> &str {
        "screen_elements"
    }

    fn create_node_processor(&self, context: &ContentsContext) -> Box<dyn XmlNodeProcessor> {
        Box::new(ScreenElementsProcessor {
            topic: self.topic.clone(),
            time_received: context.time_received,
        })
    }
}

struct ScreenElementsProcessor {
    topic: String,
    time_received: f64,
}

impl XmlNodeProcessor for ScreenElementsProcessor {
    fn convert_node(
        &mut self,
        element: &XmlElement,
        assessment: Option<&str>,
        records: &mut Vec<TopicData>,
    ) -> Result<(), XmlError> {
        let assessment = require_assessment(element, assessment)?;
        let time = parse_start_time(element)?;
        for child in &element.children {
            let x: f64 = child
                .require_attribute("x")?
                .parse()
                .map_err(|_| XmlError::Malformed(format!("non-numeric x on '{}'", child.name)))?;
            let y: f64 = child
                .require_attribute("y")?
                .parse()
                .map_err(|_| XmlError::Malformed(format!("non-numeric y on '{}'", child.name)))?;
            records.push(TopicData::new(
                &self.topic,
                record_struct([
                    ("time", RecordValue::Timestamp(time)),
                    ("time_received", RecordValue::Timestamp(self.time_received)),
                    ("assessment", RecordValue::String(assessment.clone())),
                    ("element", RecordValue::String(child.text.clone())),
                    ("x", RecordValue::Float(x)),
                    ("y", RecordValue::Float(y)),
                ]),
            ));
        }
        Ok(())
    }
}

/// Factory for `summary` nodes: score and duration child tags.
pub struct AssessmentSummaryFactory {
    topic: String,
}

impl AssessmentSummaryFactory {
    /// Create a factory publishing to the given topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl XmlNodeProcessorFactory for AssessmentSummaryFactory {
    fn node_name(&self) -> &str {
        "summary"
    }

    fn create_node_processor(&self, context: &ContentsContext) -> Box<dyn XmlNodeProcessor> {
        Box::new(AssessmentSummaryProcessor {
            topic: self.topic.clone(),
            time_received: context.time_received,
        })
    }
}

struct AssessmentSummaryProcessor {
    topic: String,
    time_received: f64,
}

impl XmlNodeProcessor for AssessmentSummaryProcessor {
    fn convert_node(
        &mut self,
        element: &XmlElement,
        assessment: Option<&str>,
        records: &mut Vec<TopicData>,
    ) -> Result<(), XmlError> {
        let assessment = require_assessment(element, assessment)?;
        let time = parse_start_time(element)?;
        let score: f64 = element
            .require_child_text("score")?
            .parse()
            .map_err(|_| XmlError::Malformed("non-numeric score".to_string()))?;
        let duration: f64 = element
            .require_child_text("duration")?
            .parse()
            .map_err(|_| XmlError::Malformed("non-numeric duration".to_string()))?;
        records.push(TopicData::new(
            &self.topic,
            record_struct([
                ("time", RecordValue::Timestamp(time)),
                ("time_received", RecordValue::Timestamp(self.time_received)),
                ("assessment", RecordValue::String(assessment)),
                ("score", RecordValue::Float(score)),
                ("duration", RecordValue::Float(duration)),
            ]),
        ));
        Ok(())
    }
}
