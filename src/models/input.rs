use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The source a piece of raw input came from.
///
/// `Text` and `Voice` inputs already carry their text (voice is a transcript);
/// `Photo` and `Camera` inputs reference an image that must go through text
/// recognition before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Voice,
    Photo,
    Camera,
}

impl InputType {
    /// Returns the wire label used in prompts and storage (`"text"`, etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Voice => "voice",
            InputType::Photo => "photo",
            InputType::Camera => "camera",
        }
    }

    /// Returns true when this input references an image rather than text.
    pub fn is_image(self) -> bool {
        matches!(self, InputType::Photo | InputType::Camera)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InputType::Text),
            "voice" => Ok(InputType::Voice),
            "photo" => Ok(InputType::Photo),
            "camera" => Ok(InputType::Camera),
            other => Err(format!(
                "unknown input type '{other}' (expected text, voice, photo or camera)"
            )),
        }
    }
}

/// One user parse action: the raw material handed to the pipeline.
///
/// Created once per action and never mutated. For image input types `text`
/// is typically empty and `source_uri` points at the image to recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionInput {
    text: String,
    input_type: InputType,
    source_uri: Option<String>,
}

impl ExtractionInput {
    /// Creates a plain text (or transcript) input.
    pub fn text(text: impl Into<String>, input_type: InputType) -> Self {
        Self {
            text: text.into(),
            input_type,
            source_uri: None,
        }
    }

    /// Creates an input that also carries a source locator (e.g. an image path).
    pub fn with_source(
        text: impl Into<String>,
        input_type: InputType,
        source_uri: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            input_type,
            source_uri: Some(source_uri.into()),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.text
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }
}
