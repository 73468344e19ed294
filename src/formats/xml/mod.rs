// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XML decode engine.
//!
//! Parses one document into an owned element tree and walks it
//! recursively. At each element with children whose tag matches a
//! registered node processor, that processor converts the subtree,
//! possibly recursing over the element's own children, and may consult
//! the assessment name threaded down from an ancestor's `xsi:type`
//! attribute to disambiguate identically-named child tags.
//!
//! One document is one atomic record source: records are buffered during
//! the walk and only released once the whole document converted, so a
//! missing required tag or attribute produces no partial emission.

pub mod tree;

pub use tree::{parse_document, XmlElement, XmlError};

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use crate::convert::processor::{
    ContentPipeline, FileProcessor, FileProcessorFactory, RecordSink,
};
use crate::core::context::{ContentsContext, TopicData};
use crate::core::error::{ConvertError, Result};

/// Factory for one kind of XML node conversion, keyed by tag name.
pub trait XmlNodeProcessorFactory: Send + Sync {
    /// Tag name this factory converts.
    fn node_name(&self) -> &str;

    /// Create a node processor for this record.
    fn create_node_processor(&self, context: &ContentsContext) -> Box<dyn XmlNodeProcessor>;
}

/// Converts one matched element (and its subtree) into records.
pub trait XmlNodeProcessor {
    /// Convert the element, appending records to the buffer.
    ///
    /// `assessment` is the nearest ancestor's `xsi:type`-derived name,
    /// if any.
    fn convert_node(
        &mut self,
        element: &XmlElement,
        assessment: Option<&str>,
        records: &mut Vec<TopicData>,
    ) -> std::result::Result<(), XmlError>;
}

/// File-level factory wrapping a set of XML node-processor factories.
pub struct XmlFileProcessorFactory {
    node_factories: Vec<Arc<dyn XmlNodeProcessorFactory>>,
    suffixes: Vec<String>,
}

impl XmlFileProcessorFactory {
    /// Create a factory matching `.xml` files.
    pub fn new(node_factories: Vec<Arc<dyn XmlNodeProcessorFactory>>) -> Self {
        Self::with_suffixes(node_factories, vec![".xml".to_string()])
    }

    /// Create a factory matching the given file-name suffixes.
    pub fn with_suffixes(
        node_factories: Vec<Arc<dyn XmlNodeProcessorFactory>>,
        suffixes: Vec<String>,
    ) -> Self {
        Self {
            node_factories,
            suffixes,
        }
    }
}

impl FileProcessorFactory for XmlFileProcessorFactory {
    fn matches(&self, context: &ContentsContext) -> bool {
        self.suffixes.iter().any(|s| context.has_suffix(s))
    }

    fn create_processor(&self, context: &ContentsContext) -> Box<dyn FileProcessor> {
        let processors = self
            .node_factories
            .iter()
            .map(|f| (f.node_name().to_string(), f.create_node_processor(context)))
            .collect();
        Box::new(XmlFileProcessor { processors })
    }
}

/// Decoder for one XML content item.
pub struct XmlFileProcessor {
    processors: BTreeMap<String, Box<dyn XmlNodeProcessor>>,
}

impl XmlFileProcessor {
    fn walk(
        &mut self,
        element: &XmlElement,
        assessment: Option<&str>,
        records: &mut Vec<TopicData>,
    ) -> std::result::Result<(), XmlError> {
        // An xsi:type on the way down renames the assessment scope for
        // everything beneath it.
        let derived;
        let assessment = match element.attribute("xsi:type") {
            Some(declared) => {
                derived = assessment_name(declared).to_string();
                Some(derived.as_str())
            }
            None => assessment,
        };

        if !element.children.is_empty() {
            if let Some(processor) = self.processors.get_mut(&element.name) {
                // The matched processor owns this subtree.
                return processor.convert_node(element, assessment, records);
            }
        }
        for child in &element.children {
            self.walk(child, assessment, records)?;
        }
        Ok(())
    }
}

impl FileProcessor for XmlFileProcessor {
    fn process(
        &mut self,
        context: &ContentsContext,
        input: &mut dyn Read,
        sink: &mut dyn RecordSink,
        _pipeline: &dyn ContentPipeline,
    ) -> Result<()> {
        let mut contents = Vec::new();
        input.read_to_end(&mut contents).map_err(|e| {
            ConvertError::io(context.record_id, &context.file_name, "reading XML document", &e)
        })?;
        if contents.is_empty() {
            return Err(ConvertError::invalid_format(
                context.record_id,
                &context.file_name,
                "zero-byte XML file",
            ));
        }

        let root = parse_document(&mut contents.as_slice()).map_err(|e| {
            ConvertError::invalid_format(context.record_id, &context.file_name, e.to_string())
        })?;

        let mut records = Vec::new();
        self.walk(&root, None, &mut records).map_err(|e| {
            ConvertError::failed_with(
                context.record_id,
                &context.file_name,
                "XML document conversion failed",
                &e,
            )
        })?;

        for record in records {
            sink.produce(record)?;
        }
        Ok(())
    }
}

/// Strip a namespace prefix from an `xsi:type` value.
fn assessment_name(declared: &str) -> &str {
    declared.rsplit(':').next().unwrap_or(declared)
}
