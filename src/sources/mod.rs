// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Concrete source types.
//!
//! Thin instantiations of the decode engines: each module wires one
//! upload family's topics and field mappings into the shared factory
//! traits. The long tail of per-domain converters lives outside this
//! crate; these exist to populate the registry and exercise every
//! engine end to end.

pub mod acceleration;
pub mod assessment;

pub use acceleration::AccelerationCsvFactory;
pub use assessment::{AssessmentSummaryFactory, ScreenElementsFactory};
