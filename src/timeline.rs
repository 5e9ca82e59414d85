//! Animation timeline construction
//!
//! Builds the ordered frame list the animated encoders consume. Frames come
//! either from a rectangle-list sheet document (one cropped subframe per
//! entry) or from a hierarchical pattern document whose parts share and
//! deduplicate source crops through a `CelBank`.

use std::collections::HashMap;
use std::path::Path;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::loader;
use crate::meta::{PatternSetDoc, SheetDoc};

/// Display rate the tick unit is derived against.
const TICK_RATE: f64 = 60.0;

/// A warning generated while building a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A placed sub-image within a frame.
#[derive(Debug)]
pub struct Subframe {
    pub canvas: Canvas,
    pub pos_x: i32,
    pub pos_y: i32,
}

/// One animation frame: a duration plus an ordered list of subframes.
#[derive(Debug)]
pub struct Frame {
    pub duration_ms: u32,
    pub duration_ticks: u32,
    pub subframes: Vec<Subframe>,
}

#[derive(Debug, Default)]
pub struct Timeline {
    pub frames: Vec<Frame>,
}

/// Convert a millisecond duration to 60 Hz ticks by truncation, clamped to a
/// minimum of one tick. Returns the tick count and whether clamping fired.
pub fn ms_to_ticks(ms: u32) -> (u32, bool) {
    let ticks = ((ms as f64 / 1000.0) / (1.0 / TICK_RATE)) as u32;
    if ticks == 0 {
        (1, true)
    } else {
        (ticks, false)
    }
}

impl Timeline {
    /// Rectangle-list construction: crop one subframe per sheet entry out of
    /// `base`, placed at (0,0).
    pub fn from_sheet(base: &Canvas, doc: &SheetDoc) -> Result<(Timeline, Vec<Warning>)> {
        let mut warnings = Vec::new();
        let mut frames = Vec::with_capacity(doc.frames.len());

        for (i, entry) in doc.frames.iter().enumerate() {
            let r = entry.frame;
            let crop = base.rect_get(r.x as usize, r.y as usize, r.w as usize, r.h as usize)?;

            let (ticks, clamped) = ms_to_ticks(entry.duration);
            if clamped {
                let name = entry.filename.as_deref().unwrap_or("frame");
                warnings.push(Warning::new(format!(
                    "duration for {}[{}] corrected to 1 tick",
                    name, i
                )));
            }

            frames.push(Frame {
                duration_ms: entry.duration,
                duration_ticks: ticks,
                subframes: vec![Subframe { canvas: crop, pos_x: 0, pos_y: 0 }],
            });
        }

        Ok((Timeline { frames }, warnings))
    }
}

/// A deduplicated source crop ("cel") shared across hierarchical frames.
#[derive(Debug)]
pub struct Cel {
    pub canvas: Canvas,
}

/// Deduplicating store of source crops. Cel ids are assigned strictly in
/// first-seen order, so identical input always produces identical ids.
#[derive(Debug, Default)]
pub struct CelBank {
    cels: Vec<Cel>,
    by_hash: HashMap<u64, u16>,
}

impl CelBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cels(&self) -> &[Cel] {
        &self.cels
    }

    pub fn len(&self) -> usize {
        self.cels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cels.is_empty()
    }

    /// Intern a crop: an exact index-hash match reuses the existing id,
    /// otherwise the crop is adopted under a fresh id.
    pub fn intern(&mut self, canvas: Canvas) -> Result<u16> {
        let hash = canvas.hash_indexed(0);
        if let Some(&id) = self.by_hash.get(&hash) {
            return Ok(id);
        }
        if self.cels.len() > u16::MAX as usize {
            return Err(Error::FormatLimit("cel count exceeds 65536".into()));
        }
        let id = self.cels.len() as u16;
        self.cels.push(Cel { canvas });
        self.by_hash.insert(hash, id);
        Ok(id)
    }
}

/// One part of a hierarchical frame after cel interning.
#[derive(Debug, Clone)]
pub struct PatternPart {
    pub cel_id: u16,
    pub dest_x: i32,
    pub dest_y: i32,
}

#[derive(Debug)]
pub struct PatternFrame {
    pub duration_ticks: u32,
    pub parts: Vec<PatternPart>,
    /// Cel ids first referenced by this frame, in first-reference order.
    pub load_list: Vec<u16>,
}

#[derive(Debug)]
pub struct Pattern {
    pub name: String,
    pub frames: Vec<PatternFrame>,
    /// Union of the frames' referenced cel ids, in first-reference order.
    pub load_list: Vec<u16>,
}

/// A fully resolved hierarchical animation: patterns over a shared cel bank.
#[derive(Debug)]
pub struct PatternSet {
    pub bank: CelBank,
    pub patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Build from a pattern document. Each distinct source image is loaded
    /// once (cached by filename, relative to `base_dir`); every referenced
    /// rectangle is cropped and interned into the cel bank.
    pub fn build(doc: &PatternSetDoc, base_dir: &Path, indexed: bool) -> Result<PatternSet> {
        let mut bank = CelBank::new();
        let mut image_cache: HashMap<String, Canvas> = HashMap::new();
        let mut patterns = Vec::with_capacity(doc.patterns.len());

        for pat in &doc.patterns {
            let mut frames = Vec::with_capacity(pat.frames.len());
            let mut pattern_loads: Vec<u16> = Vec::new();

            for frame in &pat.frames {
                let mut parts = Vec::with_capacity(frame.parts.len());
                let mut frame_loads: Vec<u16> = Vec::new();

                for part in &frame.parts {
                    let source = match image_cache.get(&part.image) {
                        Some(c) => c,
                        None => {
                            let canvas = loader::load(&base_dir.join(&part.image), indexed)?;
                            image_cache.entry(part.image.clone()).or_insert(canvas)
                        }
                    };

                    let [x, y, w, h] = part.rect;
                    let crop =
                        source.rect_get(x as usize, y as usize, w as usize, h as usize)?;
                    let cel_id = bank.intern(crop)?;

                    if !frame_loads.contains(&cel_id) {
                        frame_loads.push(cel_id);
                    }
                    if !pattern_loads.contains(&cel_id) {
                        pattern_loads.push(cel_id);
                    }
                    parts.push(PatternPart {
                        cel_id,
                        dest_x: pat.dest[0] + frame.dest[0] + part.dest[0],
                        dest_y: pat.dest[1] + frame.dest[1] + part.dest[1],
                    });
                }

                frames.push(PatternFrame {
                    duration_ticks: frame.delay.max(1),
                    parts,
                    load_list: frame_loads,
                });
            }

            patterns.push(Pattern {
                name: pat.name.clone(),
                frames,
                load_list: pattern_loads,
            });
        }

        Ok(PatternSet { bank, patterns })
    }
}
