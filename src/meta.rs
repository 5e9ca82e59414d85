//! Animation metadata documents
//!
//! Two document shapes are accepted:
//!
//! * a sprite-sheet description in the Aseprite export shape: a top-level
//!   `frames` array of rectangles with millisecond durations plus a `meta`
//!   object, consumed by the PGA/NGA/AGA encoders;
//! * a hierarchical pattern document: `patterns` holding `frames` holding
//!   `parts`, each part referencing a named source image, consumed by the
//!   AGE encoder.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// One source rectangle in a sheet document.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SheetRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// One frame entry: a source rectangle plus its display duration.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetFrame {
    #[serde(default)]
    pub filename: Option<String>,
    pub frame: SheetRect,
    /// Display duration in milliseconds.
    pub duration: u32,
}

/// Sheet document root. `frames` and `meta` are both required; their absence
/// is reported by key name.
#[derive(Debug, Clone)]
pub struct SheetDoc {
    pub frames: Vec<SheetFrame>,
}

/// Load and validate a sheet document.
pub fn load_sheet(path: &Path) -> Result<SheetDoc> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Metadata(format!("unable to read {}: {}", path.display(), e)))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::Metadata(format!("{}: {}", path.display(), e)))?;

    for key in ["frames", "meta"] {
        if value.get(key).is_none() {
            return Err(Error::Metadata(format!(
                "{}: missing required key '{}'",
                path.display(),
                key
            )));
        }
    }

    let frames: Vec<SheetFrame> = serde_json::from_value(value["frames"].clone())
        .map_err(|e| Error::Metadata(format!("{}: bad 'frames' entry: {}", path.display(), e)))?;
    Ok(SheetDoc { frames })
}

/// One placed piece of a hierarchical frame: a rectangle of a named source
/// image, blitted at a destination offset.
#[derive(Debug, Clone, Deserialize)]
pub struct PartDoc {
    /// Path of the source image, relative to the document.
    pub image: String,
    /// Source rectangle as [x, y, w, h].
    pub rect: [u32; 4],
    /// Destination offset as [x, y].
    #[serde(default)]
    pub dest: [i32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameDoc {
    #[serde(default)]
    pub name: Option<String>,
    /// Duration in 60 Hz ticks.
    pub delay: u32,
    #[serde(default)]
    pub dest: [i32; 2],
    pub parts: Vec<PartDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternDoc {
    pub name: String,
    #[serde(default)]
    pub dest: [i32; 2],
    pub frames: Vec<FrameDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternSetDoc {
    pub patterns: Vec<PatternDoc>,
}

/// Load and validate a hierarchical pattern document.
pub fn load_patterns(path: &Path) -> Result<PatternSetDoc> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Metadata(format!("unable to read {}: {}", path.display(), e)))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::Metadata(format!("{}: {}", path.display(), e)))?;

    if value.get("patterns").is_none() {
        return Err(Error::Metadata(format!(
            "{}: missing required key 'patterns'",
            path.display()
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::Metadata(format!("{}: bad pattern document: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_sheet_parses_frames() {
        let f = write_temp(
            r#"{"frames":[{"filename":"a","frame":{"x":0,"y":0,"w":8,"h":8},"duration":100}],
                "meta":{"app":"x"}}"#,
        );
        let doc = load_sheet(f.path()).unwrap();
        assert_eq!(doc.frames.len(), 1);
        assert_eq!(doc.frames[0].duration, 100);
        assert_eq!(doc.frames[0].frame.w, 8);
    }

    #[test]
    fn test_sheet_missing_key_is_named() {
        let f = write_temp(r#"{"frames":[]}"#);
        let err = load_sheet(f.path()).unwrap_err();
        assert!(err.to_string().contains("'meta'"));
    }

    #[test]
    fn test_patterns_parse() {
        let f = write_temp(
            r#"{"patterns":[{"name":"walk","frames":[
                {"delay":4,"parts":[{"image":"body.png","rect":[0,0,16,16],"dest":[-8,-8]}]}
            ]}]}"#,
        );
        let doc = load_patterns(f.path()).unwrap();
        assert_eq!(doc.patterns.len(), 1);
        assert_eq!(doc.patterns[0].frames[0].parts[0].rect, [0, 0, 16, 16]);
        assert_eq!(doc.patterns[0].frames[0].parts[0].dest, [-8, -8]);
    }

    #[test]
    fn test_patterns_missing_key_is_named() {
        let f = write_temp(r#"{}"#);
        let err = load_patterns(f.path()).unwrap_err();
        assert!(err.to_string().contains("'patterns'"));
    }
}
