//! Descriptor file loader

use crate::tags::check_document;
use kure_spec_common::{
    Api, ApiGroup, ApiGroupVersion, Descriptor, Document, Result, SpecError,
};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialization format of a descriptor file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// A single JSON document
    Json,
    /// One or more YAML documents
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file extension, defaulting to YAML
    ///
    /// YAML is a superset of JSON, so the fallback still reads JSON content.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Loads `spec.kure.sh` descriptor documents
///
/// Every document is checked for its `apiVersion`, `kind`, and the `type`
/// tags of its definitions before being decoded into the typed IR.
#[derive(Debug, Clone)]
pub struct DescriptorLoader {
    /// Decoded documents, in source order
    documents: Vec<Document>,

    /// Where the documents came from, for error messages
    source: String,
}

impl DescriptorLoader {
    /// Load descriptors from a file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let loader = DescriptorLoader::from_file("apps-v1.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SpecError::Parse(format!(
                "Failed to read descriptor file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str_with_source(
            &content,
            DocumentFormat::detect(path),
            &path.display().to_string(),
        )
    }

    /// Parse a single descriptor from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_str_with_source(json, DocumentFormat::Json, "<json>")
    }

    /// Parse one or more descriptors from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_str_with_source(yaml, DocumentFormat::Yaml, "<yaml>")
    }

    fn from_str_with_source(content: &str, format: DocumentFormat, source: &str) -> Result<Self> {
        let raw = match format {
            DocumentFormat::Json => vec![serde_json::from_str::<Value>(content).map_err(|e| {
                SpecError::Parse(format!("Failed to parse descriptor JSON {}: {}", source, e))
            })?],
            DocumentFormat::Yaml => read_yaml_stream(content, source)?,
        };

        let mut documents = Vec::with_capacity(raw.len());
        for (i, value) in raw.into_iter().enumerate() {
            let location = if format == DocumentFormat::Yaml && i > 0 {
                format!("{}[{}]", source, i)
            } else {
                source.to_string()
            };

            let kind = check_document(&value, &location)?;
            let document: Document = serde_json::from_value(value).map_err(|e| {
                SpecError::Parse(format!("Invalid {} document {}: {}", kind, location, e))
            })?;

            debug!(source = %location, kind = %kind, "loaded descriptor");
            documents.push(document);
        }

        Ok(Self {
            documents,
            source: source.to_string(),
        })
    }

    /// Where these documents were read from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// The `API` descriptors among the loaded documents
    pub fn apis(&self) -> impl Iterator<Item = &Api> {
        self.documents.iter().filter_map(|d| match &d.descriptor {
            Descriptor::Api(api) => Some(api),
            _ => None,
        })
    }

    /// The `APIGroup` descriptors among the loaded documents
    pub fn groups(&self) -> impl Iterator<Item = &ApiGroup> {
        self.documents.iter().filter_map(|d| match &d.descriptor {
            Descriptor::ApiGroup(group) => Some(group),
            _ => None,
        })
    }

    /// The `APIGroupVersion` descriptors among the loaded documents
    pub fn group_versions(&self) -> impl Iterator<Item = &ApiGroupVersion> {
        self.documents.iter().filter_map(|d| match &d.descriptor {
            Descriptor::ApiGroupVersion(gv) => Some(gv),
            _ => None,
        })
    }
}

/// Split a YAML stream into raw documents, skipping empty ones
fn read_yaml_stream(content: &str, source: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).map_err(|e| {
            SpecError::Parse(format!("Failed to parse descriptor YAML {}: {}", source, e))
        })?;
        if !value.is_null() {
            values.push(value);
        }
    }
    Ok(values)
}

/// Encoding of documents back to text
pub mod encode {
    use kure_spec_common::{Document, Result};

    /// Encode one document as pretty-printed JSON
    pub fn to_json(document: &Document) -> Result<String> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    /// Encode documents as a YAML stream
    pub fn to_yaml(documents: &[Document]) -> Result<String> {
        let mut out = String::new();
        for (i, document) in documents.iter().enumerate() {
            if i > 0 {
                out.push_str("---\n");
            }
            out.push_str(&serde_yaml::to_string(document)?);
        }
        Ok(out)
    }
}
