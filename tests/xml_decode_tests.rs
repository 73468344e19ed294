// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tests for the XML decode engine.
//!
//! Run with: cargo test --test xml_decode_tests

mod common;

use common::{assert_end_marker, convert_err, convert_ok};

use uploadcodec::convert::TempFileCache;
use uploadcodec::core::{ConvertError, RecordValue, SourceTypeConfig};
use uploadcodec::registry::converter_for;

fn assessment_converter() -> uploadcodec::convert::RecordConverter {
    let config = SourceTypeConfig::named("assessment-xml");
    converter_for(&config, TempFileCache::system_default()).unwrap()
}

const TWO_ASSESSMENTS: &str = r#"<?xml version="1.0"?>
<assessments>
  <assessment xsi:type="ns:MotorTest">
    <part>
      <screen_elements start="1000">
        <element x="0.1" y="0.2">start_button</element>
        <element x="0.5" y="0.5">target</element>
      </screen_elements>
    </part>
  </assessment>
  <assessment xsi:type="ns:MemoryTest">
    <part>
      <screen_elements start="2000">
        <element x="0.9" y="0.9">start_button</element>
      </screen_elements>
      <summary start="2000">
        <score>0.75</score>
        <duration>31.5</duration>
      </summary>
    </part>
  </assessment>
</assessments>
"#;

#[test]
fn test_assessment_names_disambiguate_identical_tags() {
    let records = convert_ok(&assessment_converter(), "session.xml", TWO_ASSESSMENTS.as_bytes());
    assert_eq!(records.len(), 4);
    assert_end_marker(&records);

    let assessments: Vec<&str> = records
        .iter()
        .filter(|r| r.data.topic == "assessment_screen_element")
        .map(|r| {
            r.data.value.as_struct().unwrap()["assessment"]
                .as_str()
                .unwrap()
        })
        .collect();
    assert_eq!(assessments, ["MotorTest", "MotorTest", "MemoryTest"]);

    let summary = records
        .iter()
        .find(|r| r.data.topic == "assessment_summary")
        .unwrap();
    let fields = summary.data.value.as_struct().unwrap();
    assert_eq!(fields["assessment"], RecordValue::String("MemoryTest".into()));
    assert_eq!(fields["score"], RecordValue::Float(0.75));
    assert_eq!(fields["duration"], RecordValue::Float(31.5));
    assert_eq!(fields["time"], RecordValue::Timestamp(2.0));
}

#[test]
fn test_zero_byte_file_rejected_before_parsing() {
    let (err, _) = convert_err(&assessment_converter(), "session.xml", b"");
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn test_malformed_document_is_invalid_format() {
    let (err, _) = convert_err(
        &assessment_converter(),
        "session.xml",
        b"<assessments><part></assessments>",
    );
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn test_missing_required_attribute_emits_nothing() {
    // Second screen_elements lacks its start attribute: the whole file
    // fails and the valid first group must not leak out.
    let contents = r#"
<assessments>
  <assessment xsi:type="ns:MotorTest">
    <screen_elements start="1000">
      <element x="0.1" y="0.2">ok</element>
    </screen_elements>
    <screen_elements>
      <element x="0.1" y="0.2">broken</element>
    </screen_elements>
  </assessment>
</assessments>
"#;
    let (err, records) = convert_err(&assessment_converter(), "session.xml", contents.as_bytes());
    assert!(matches!(err, ConvertError::ConversionFailed { .. }));
    assert!(err.to_string().contains("start"));
    assert!(records.is_empty(), "atomic documents must not emit partially");
}

#[test]
fn test_node_without_matching_processor_is_descended_past() {
    let contents = r#"
<assessments>
  <wrapper>
    <assessment xsi:type="ns:MotorTest">
      <screen_elements start="1000">
        <element x="0.0" y="0.0">only</element>
      </screen_elements>
    </assessment>
  </wrapper>
</assessments>
"#;
    let records = convert_ok(&assessment_converter(), "session.xml", contents.as_bytes());
    assert_eq!(records.len(), 1);
    assert_end_marker(&records);
}
