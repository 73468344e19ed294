// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Static source-type registry.
//!
//! Maps a source-type name to the constructor that assembles its
//! converter, so behavior is still selected by configuration string but
//! the name-to-code binding is a compile-time table instead of runtime
//! reflection.

use std::sync::Arc;

use crate::convert::{RecordConverter, TempFileCache};
use crate::core::config::SourceTypeConfig;
use crate::formats::archive::ArchiveProcessorFactory;
use crate::formats::csv::CsvFileProcessorFactory;
use crate::formats::cwa::CwaProcessorFactory;
use crate::formats::xml::XmlFileProcessorFactory;
use crate::sources::{
    AccelerationCsvFactory, AssessmentSummaryFactory, ScreenElementsFactory,
};

/// Constructor assembling one source type's converter.
pub type ConverterConstructor = fn(&SourceTypeConfig, TempFileCache) -> RecordConverter;

/// The compile-time source-type table.
const SOURCE_TYPES: &[(&str, ConverterConstructor)] = &[
    ("phone-acceleration", phone_acceleration),
    ("acceleration-zip", acceleration_zip),
    ("assessment-xml", assessment_xml),
    ("axivity", axivity),
];

/// Names of all registered source types.
pub fn source_type_names() -> Vec<&'static str> {
    SOURCE_TYPES.iter().map(|(name, _)| *name).collect()
}

/// Assemble the converter for the named source type, if registered.
///
/// The `allow_unmapped` configuration key applies to every source type.
pub fn converter_for(
    config: &SourceTypeConfig,
    staging: TempFileCache,
) -> Option<RecordConverter> {
    let constructor = SOURCE_TYPES
        .iter()
        .find(|(name, _)| *name == config.name)
        .map(|(_, constructor)| *constructor)?;
    let mut converter = constructor(config, staging);
    converter.set_allow_unmapped(config.flag("allow_unmapped", false));
    Some(converter)
}

fn acceleration_csv_factory(config: &SourceTypeConfig) -> AccelerationCsvFactory {
    let mut factory = AccelerationCsvFactory::new(
        config
            .get("acceleration_topic")
            .unwrap_or("phone_acceleration"),
    );
    if let Some(usage_topic) = config.get("usage_event_topic") {
        factory = factory.with_usage_events(usage_topic);
    }
    if config.flag("optional", false) {
        factory = factory.optional();
    }
    factory
}

fn phone_acceleration(config: &SourceTypeConfig, staging: TempFileCache) -> RecordConverter {
    let mut converter = RecordConverter::new(staging);
    converter.add_factory(Box::new(CsvFileProcessorFactory::new(vec![Arc::new(
        acceleration_csv_factory(config),
    )])));
    converter
}

fn acceleration_zip(config: &SourceTypeConfig, staging: TempFileCache) -> RecordConverter {
    let mut converter = RecordConverter::new(staging.clone());
    converter.add_factory(Box::new(
        ArchiveProcessorFactory::new(staging).exclude_path("thumbnails/"),
    ));
    converter.add_factory(Box::new(CsvFileProcessorFactory::new(vec![Arc::new(
        acceleration_csv_factory(config),
    )])));
    converter
}

fn assessment_xml(config: &SourceTypeConfig, staging: TempFileCache) -> RecordConverter {
    let mut converter = RecordConverter::new(staging);
    converter.add_factory(Box::new(XmlFileProcessorFactory::new(vec![
        Arc::new(ScreenElementsFactory::new(
            config
                .get("screen_element_topic")
                .unwrap_or("assessment_screen_element"),
        )),
        Arc::new(AssessmentSummaryFactory::new(
            config
                .get("summary_topic")
                .unwrap_or("assessment_summary"),
        )),
    ])));
    converter
}

fn axivity(config: &SourceTypeConfig, staging: TempFileCache) -> RecordConverter {
    let mut converter = RecordConverter::new(staging.clone());
    converter.add_factory(Box::new(
        ArchiveProcessorFactory::new(staging).exclude_path("thumbnails/"),
    ));
    converter.add_factory(Box::new(CwaProcessorFactory::from_config(config)));
    converter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_names() {
        let names = source_type_names();
        assert!(names.contains(&"phone-acceleration"));
        assert!(names.contains(&"axivity"));
    }

    #[test]
    fn test_unknown_source_type() {
        let config = SourceTypeConfig::named("not-a-source");
        assert!(converter_for(&config, TempFileCache::system_default()).is_none());
    }

    #[test]
    fn test_allow_unmapped_flag_applies() {
        let config = SourceTypeConfig::named("axivity").with("allow_unmapped", "true");
        let converter = converter_for(&config, TempFileCache::system_default()).unwrap();
        assert!(converter.delegating().allow_unmapped());
    }
}
