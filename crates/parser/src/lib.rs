//! Descriptor document loading for Kure API specifications
//!
//! This crate reads `spec.kure.sh/v1alpha1` documents into the IR defined by
//! `kure-spec-common`, and writes them back out.
//!
//! ## Formats
//! - **JSON**: one document per file
//! - **YAML**: one or more documents per file, separated by `---`
//!
//! ## Strictness
//! Documents are checked before they are decoded: a wrong `apiVersion`, an
//! unknown `kind`, or a `type` tag outside the closed set is rejected with the
//! location of the offending node rather than guessed at.
//!
//! ## Usage
//! ```rust,ignore
//! use kure_spec_parser::DescriptorLoader;
//!
//! let loader = DescriptorLoader::from_file("apps-v1.yaml")?;
//! for gv in loader.group_versions() {
//!     println!("{}/{}: {} definitions", gv.group, gv.version, gv.definitions.len());
//! }
//! ```

mod loader;
mod tags;

pub use loader::{encode, DescriptorLoader, DocumentFormat};

use kure_spec_common::{Document, Result};
use std::path::Path;

/// Load every document in a file, detecting the format from its extension
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    Ok(DescriptorLoader::from_file(path)?.into_documents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"apiVersion": "spec.kure.sh/v1alpha1", "kind": "API", "name": "kubernetes", "version": null, "groups": []}}"#
        )
        .unwrap();

        let documents = load_file(file.path()).unwrap();
        assert_eq!(documents.len(), 1);
    }
}
