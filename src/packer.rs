//! Greedy hardware-object packing
//!
//! Covers the non-empty 8x8 tiles of a canvas with variable-size hardware
//! objects drawn from a fixed catalogue. The catalogue table and its order
//! are behavior-determining: ties in area are broken by table position, and
//! two different greedy choices produce different but equally valid
//! packings, so compatibility requires this exact order.

use crate::canvas::Canvas;
use crate::color::ColorSample;
use crate::error::{Error, Result};

/// Tile edge in pixels. Occupancy is tracked at this granularity.
pub const TILE: usize = 8;

/// Shape class of a hardware object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Square,
    Horizontal,
    Vertical,
}

impl Shape {
    pub fn id(self) -> u16 {
        match self {
            Shape::Square => 0,
            Shape::Horizontal => 1,
            Shape::Vertical => 2,
        }
    }
}

/// One catalogue entry: object extent in tiles plus its shape/size classes.
#[derive(Debug, Clone, Copy)]
pub struct ObjectClass {
    pub tiles_w: usize,
    pub tiles_h: usize,
    pub shape: Shape,
    pub size_class: u16,
}

/// The object catalogue, in tie-break order.
pub const CATALOGUE: [ObjectClass; 12] = [
    ObjectClass { tiles_w: 1, tiles_h: 1, shape: Shape::Square, size_class: 0 },
    ObjectClass { tiles_w: 2, tiles_h: 1, shape: Shape::Horizontal, size_class: 0 },
    ObjectClass { tiles_w: 4, tiles_h: 1, shape: Shape::Horizontal, size_class: 1 },
    ObjectClass { tiles_w: 1, tiles_h: 2, shape: Shape::Vertical, size_class: 0 },
    ObjectClass { tiles_w: 2, tiles_h: 2, shape: Shape::Square, size_class: 1 },
    ObjectClass { tiles_w: 4, tiles_h: 2, shape: Shape::Horizontal, size_class: 2 },
    ObjectClass { tiles_w: 1, tiles_h: 4, shape: Shape::Vertical, size_class: 1 },
    ObjectClass { tiles_w: 2, tiles_h: 4, shape: Shape::Vertical, size_class: 2 },
    ObjectClass { tiles_w: 4, tiles_h: 4, shape: Shape::Square, size_class: 2 },
    ObjectClass { tiles_w: 8, tiles_h: 4, shape: Shape::Horizontal, size_class: 3 },
    ObjectClass { tiles_w: 4, tiles_h: 8, shape: Shape::Vertical, size_class: 3 },
    ObjectClass { tiles_w: 8, tiles_h: 8, shape: Shape::Square, size_class: 3 },
];

/// One placed object. Lives only as long as the frame that produced it.
#[derive(Debug, Clone, Copy)]
pub struct PlacedObject {
    /// Position in tile units.
    pub tile_x: usize,
    pub tile_y: usize,
    pub tiles_w: usize,
    pub tiles_h: usize,
    pub shape: Shape,
    pub size_class: u16,
}

/// Cover the non-empty tiles of `canvas` with catalogue objects.
///
/// `leniency` is the number of empty tiles an object may swallow before the
/// candidate is rejected. A chosen region consisting purely of empty tiles
/// is skipped without marking its tiles used, leaving them for a later,
/// possibly smaller placement.
pub fn pack(canvas: &Canvas, leniency: usize) -> Result<Vec<PlacedObject>> {
    if canvas.width() % TILE != 0 || canvas.height() % TILE != 0 {
        return Err(Error::Validation(format!(
            "packer input {}x{} is not a multiple of {}",
            canvas.width(),
            canvas.height(),
            TILE
        )));
    }

    let grid_w = canvas.width() / TILE;
    let grid_h = canvas.height() / TILE;
    let tiles = canvas.rect_split(TILE, TILE, None)?;

    let transparent = ColorSample::default();
    let empty: Vec<bool> = tiles.iter().map(|t| t.all_equals(transparent)).collect();
    let mut used = vec![false; grid_w * grid_h];

    let mut placed = Vec::new();

    for iy in 0..grid_h {
        for ix in 0..grid_w {
            // largest usable catalogue entry; later equal-area entries win
            let mut best_area = 0;
            let mut best: Option<ObjectClass> = None;

            for class in CATALOGUE {
                let area = class.tiles_w * class.tiles_h;
                if best_area > area {
                    continue;
                }
                if iy + class.tiles_h > grid_h || ix + class.tiles_w > grid_w {
                    continue;
                }

                let mut num_empty = 0;
                let mut usable = true;
                'scan: for y in 0..class.tiles_h {
                    for x in 0..class.tiles_w {
                        let idx = (ix + x) + (iy + y) * grid_w;
                        if used[idx] {
                            usable = false;
                            break 'scan;
                        }
                        if empty[idx] {
                            num_empty += 1;
                        }
                        if num_empty > leniency {
                            usable = false;
                            break 'scan;
                        }
                    }
                }
                if !usable {
                    continue;
                }
                best_area = area;
                best = Some(class);
            }

            let Some(class) = best else { continue };

            let all_empty = (0..class.tiles_h).all(|y| {
                (0..class.tiles_w).all(|x| empty[(ix + x) + (iy + y) * grid_w])
            });
            if all_empty {
                continue;
            }

            for y in 0..class.tiles_h {
                for x in 0..class.tiles_w {
                    used[(ix + x) + (iy + y) * grid_w] = true;
                }
            }

            placed.push(PlacedObject {
                tile_x: ix,
                tile_y: iy,
                tiles_w: class.tiles_w,
                tiles_h: class.tiles_h,
                shape: class.shape,
                size_class: class.size_class,
            });
        }
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_canvas(w: usize, h: usize) -> Canvas {
        let mut c = Canvas::new(w, h).unwrap();
        c.clear(ColorSample::new(255, 255, 255, 255));
        c
    }

    #[test]
    fn test_all_empty_grid_places_nothing() {
        let c = Canvas::new(128, 128).unwrap();
        let placed = pack(&c, 0).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn test_full_64x64_is_one_largest_object() {
        let c = opaque_canvas(64, 64);
        let placed = pack(&c, 0).unwrap();
        assert_eq!(placed.len(), 1);
        let obj = placed[0];
        assert_eq!((obj.tiles_w, obj.tiles_h), (8, 8));
        assert_eq!(obj.shape, Shape::Square);
        assert_eq!(obj.size_class, 3);
    }

    #[test]
    fn test_single_tile_uses_smallest_object() {
        let mut c = Canvas::new(32, 32).unwrap();
        c.dot_set(0, 0, ColorSample::new(255, 1, 1, 1));
        let placed = pack(&c, 0).unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!((placed[0].tiles_w, placed[0].tiles_h), (1, 1));
        assert_eq!((placed[0].tile_x, placed[0].tile_y), (0, 0));
    }

    #[test]
    fn test_leniency_admits_empty_tiles() {
        // top-left and bottom-right tiles of a 16x16 are opaque
        let mut c = Canvas::new(16, 16).unwrap();
        let white = ColorSample::new(255, 255, 255, 255);
        c.dot_set(0, 0, white);
        c.dot_set(15, 15, white);

        // no leniency: two 1x1 objects
        let strict = pack(&c, 0).unwrap();
        assert_eq!(strict.len(), 2);

        // leniency 2: one 2x2 object swallowing the empty pair
        let lenient = pack(&c, 2).unwrap();
        assert_eq!(lenient.len(), 1);
        assert_eq!((lenient[0].tiles_w, lenient[0].tiles_h), (2, 2));
    }

    #[test]
    fn test_rejects_unaligned_canvas() {
        let c = Canvas::new(12, 8).unwrap();
        assert!(pack(&c, 0).is_err());
    }

    #[test]
    fn test_wide_strip_prefers_horizontal_objects() {
        let c = opaque_canvas(64, 8);
        let placed = pack(&c, 0).unwrap();
        assert_eq!(placed.len(), 2);
        for obj in placed {
            assert_eq!((obj.tiles_w, obj.tiles_h), (4, 1));
            assert_eq!(obj.shape, Shape::Horizontal);
        }
    }
}
