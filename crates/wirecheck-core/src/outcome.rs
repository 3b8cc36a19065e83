//! # Validation Outcomes
//!
//! The result of checking one encoded document against a validator, and
//! the media types a document can be written in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Document flavor a validator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// Strict JSON. Scalars, arrays and objects are encoded as JSON literals.
    #[serde(rename = "application/json")]
    Json,
    /// Structure-preserving YAML. Raw values are submitted as-is.
    #[serde(rename = "application/yaml")]
    Yaml,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// JSON Pointer to the violating location in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed, if any.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// A finding about the document as a whole.
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Whether a document conforms, with diagnostics in validator order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub conforms: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn conforming() -> Self {
        Self {
            conforms: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn rejected(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            conforms: false,
            diagnostics,
        }
    }

    /// First diagnostic message, or `"OK"` when there is none.
    pub fn message(&self) -> String {
        self.diagnostics
            .first()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "OK".to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conforms {
            return f.write_str("conforms");
        }
        f.write_str("does not conform")?;
        for d in &self.diagnostics {
            write!(f, "\n  {d}")?;
        }
        Ok(())
    }
}
