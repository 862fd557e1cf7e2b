// Handles wire types exchanged with the handwriting backend

use serde::{Deserialize, Serialize};

pub const STATUS_ERROR: &str = "error";

/// Body of `POST /handwriting/generate`.
///
/// Every optional per-line array, when present, has one entry per line.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineRequest {
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biases: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_widths: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResponse {
    pub status: String,
    #[serde(default)]
    pub svg_content: String,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /handwriting/a4page`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PageRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub status: String,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub line_count: u32,
    /// Reported page count; when present it equals `pages.len()`.
    #[serde(default)]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleList {
    pub status: String,
    pub styles: Vec<u32>,
    pub count: u32,
}

/// One entry of the backend's fixed style catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDetail {
    pub status: String,
    pub style_id: u32,
    pub stroke_count: u32,
    pub sample_text: String,
    /// SVG preview of the style.
    pub preview: String,
}

/// Response of the unversioned service root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
}

/// Implemented by responses that carry a status tag and message.
pub trait Tagged {
    fn status(&self) -> &str;
    fn message(&self) -> &str;

    fn is_error(&self) -> bool {
        self.status().eq_ignore_ascii_case(STATUS_ERROR)
    }
}

impl Tagged for LineResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }
}

impl Tagged for PageResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }
}
