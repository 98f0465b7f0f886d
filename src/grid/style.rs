use serde::{Deserialize, Serialize};

/// Opaque presentation attributes carried through the pipeline unchanged.
///
/// Stages never branch on style content — they either copy it verbatim or
/// write the fixed attributes of the target layout (header fills, the
/// rotated article labels). Everything is optional so a bare value cell
/// costs nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellStyle {
    /// ARGB fill color, e.g. "00FF0000".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontStyle {
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    pub wrap_text: bool,
    /// Text rotation in degrees (90 = reading bottom-to-top).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u16>,
}

impl CellStyle {
    /// Solid fill with the given ARGB color.
    pub fn filled(color: &str) -> Self {
        Self {
            fill: Some(color.to_string()),
            ..Self::default()
        }
    }

    pub fn with_font(mut self, bold: bool, color: &str) -> Self {
        self.font = Some(FontStyle {
            bold,
            color: Some(color.to_string()),
        });
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentStyle) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

impl AlignmentStyle {
    pub fn centered() -> Self {
        Self {
            horizontal: Some("center".to_string()),
            vertical: Some("center".to_string()),
            wrap_text: true,
            rotation: None,
        }
    }

    pub fn rotated(degrees: u16) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::centered()
        }
    }
}
