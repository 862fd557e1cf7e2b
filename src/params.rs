// Handles user-editable generation parameters and request building

use serde::{Deserialize, Serialize};

use crate::types::{LineRequest, PageRequest};

pub const DEFAULT_BIAS: f32 = 0.5;
pub const DEFAULT_STROKE_COLOR: &str = "black";
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 60.0;
pub const DEFAULT_PARAGRAPH_SPACING: f32 = 1.0;
pub const DEFAULT_LINES_PER_PAGE: u32 = 25;

/// Line-mode form state: one setting applied to every line of `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    pub text: String,
    pub bias: f32,
    pub style_id: Option<u32>,
    pub stroke_color: String,
    pub stroke_width: f32,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            bias: DEFAULT_BIAS,
            style_id: None,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl LineParams {
    /// Splits the text into lines and fills each per-line array to the line count.
    ///
    /// Returns `None` when there is nothing to write.
    pub fn to_request(&self) -> Option<LineRequest> {
        let lines: Vec<String> = self.text.lines().map(str::to_string).collect();
        if is_blank(&lines) {
            return None;
        }

        let n = lines.len();
        Some(LineRequest {
            biases: Some(vec![self.bias; n]),
            styles: self.style_id.map(|id| vec![id; n]),
            stroke_colors: Some(vec![self.stroke_color.clone(); n]),
            stroke_widths: Some(vec![self.stroke_width; n]),
            lines,
        })
    }
}

/// Page-mode form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub text: String,
    pub style_id: Option<u32>,
    pub bias: f32,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub line_height: f32,
    pub paragraph_spacing: f32,
    pub lines_per_page: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            style_id: None,
            bias: DEFAULT_BIAS,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
            paragraph_spacing: DEFAULT_PARAGRAPH_SPACING,
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}

impl PageParams {
    /// Returns `None` when the text is empty or whitespace only.
    pub fn to_request(&self) -> Option<PageRequest> {
        if self.text.trim().is_empty() {
            return None;
        }

        Some(PageRequest {
            text: self.text.clone(),
            style_id: self.style_id,
            bias: Some(self.bias),
            stroke_color: Some(self.stroke_color.clone()),
            stroke_width: Some(self.stroke_width),
            line_height: Some(self.line_height),
            paragraph_spacing: Some(self.paragraph_spacing),
            lines_per_page: Some(self.lines_per_page),
        })
    }
}

/// True when the joined lines hold no visible text.
pub fn is_blank(lines: &[String]) -> bool {
    lines.iter().all(|line| line.trim().is_empty())
}
