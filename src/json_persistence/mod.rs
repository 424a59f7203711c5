//! Whole-document JSON persistence.
//!
//! Every store in this crate keeps its data as a single JSON document per
//! collection. Reads load the full document, writes replace it atomically by
//! writing a sibling temp file and renaming it over the target.

mod json_file;

pub use json_file::JsonFile;
