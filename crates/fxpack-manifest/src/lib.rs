//! fxpack manifest engine
//!
//! This crate owns everything that decides what ends up in the generated
//! resource manifest: the section model, validation of raw section
//! declarations, the line renderer, the manifest generator, and the package
//! metadata document that feeds `package_metadata` sections.

pub mod errors;
pub mod generator;
pub mod metadata;
pub mod render;
pub mod section_spec;
pub mod types;

pub use errors::ManifestError;
pub use generator::{generate, write_manifest};
pub use metadata::{MetadataDocument, MetadataStore};
pub use render::render;
pub use section_spec::{validate_sections, CategoryHeaderSpec, SectionSpec};
pub use types::{
    CategoryHeader, Convar, KeyValueEntry, MetadataProjection, Section, SectionBody, SectionKind,
};
