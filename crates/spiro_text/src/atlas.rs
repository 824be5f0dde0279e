//! Single-channel glyph atlas
//!
//! Glyph bitmaps are packed into one coverage texture with a shelf packer.
//! Every region keeps `padding` empty pixels to its right and bottom so
//! linear filtering never bleeds a neighbour into a glyph edge.

use crate::{Result, TextError};

/// Region in the atlas texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRegion {
    /// X position in atlas (pixels)
    pub x: u32,
    /// Y position in atlas (pixels)
    pub y: u32,
    /// Width in atlas (pixels)
    pub width: u32,
    /// Height in atlas (pixels)
    pub height: u32,
}

impl AtlasRegion {
    /// UV bounds `[u_min, v_min, u_max, v_max]` for the given atlas dimensions
    pub fn uv_bounds(&self, atlas_width: u32, atlas_height: u32) -> [f32; 4] {
        let u_min = self.x as f32 / atlas_width as f32;
        let v_min = self.y as f32 / atlas_height as f32;
        let u_max = (self.x + self.width) as f32 / atlas_width as f32;
        let v_max = (self.y + self.height) as f32 / atlas_height as f32;
        [u_min, v_min, u_max, v_max]
    }
}

/// A shelf in the packing algorithm
#[derive(Debug, Clone)]
struct Shelf {
    /// Y position of this shelf
    y: u32,
    /// Height of this shelf (padding included)
    height: u32,
    /// Next free X position
    x: u32,
}

/// Coverage atlas backing a baked font
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    /// One coverage byte per pixel
    pixels: Vec<u8>,
    shelves: Vec<Shelf>,
    padding: u32,
}

impl GlyphAtlas {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            shelves: Vec::new(),
            padding,
        }
    }

    /// Wrap an existing coverage bitmap (no further allocation is possible)
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(TextError::InvalidBakeConfig(format!(
                "atlas pixel length {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            // One full shelf so every allocation is rejected
            shelves: vec![Shelf {
                y: 0,
                height,
                x: width,
            }],
            padding: 0,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Coverage bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Expand coverage into straight-alpha RGBA texels `(255, 255, 255, coverage)`
    ///
    /// Sampling the result and multiplying by a vertex color yields that color
    /// masked by glyph coverage.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for &coverage in &self.pixels {
            rgba.extend_from_slice(&[255, 255, 255, coverage]);
        }
        rgba
    }

    /// Allocate a region, opening a new shelf when no existing one fits
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<AtlasRegion> {
        let padded_width = width + self.padding;
        let padded_height = height + self.padding;

        if padded_width > self.width {
            return Err(TextError::AtlasFull);
        }

        // Lowest shelf that fits
        let fits = self
            .shelves
            .iter()
            .position(|s| s.height >= padded_height && s.x + padded_width <= self.width);

        if let Some(index) = fits {
            let shelf = &mut self.shelves[index];
            let region = AtlasRegion {
                x: shelf.x,
                y: shelf.y,
                width,
                height,
            };
            shelf.x += padded_width;
            return Ok(region);
        }

        let new_y = self.shelves.last().map(|s| s.y + s.height).unwrap_or(0);

        if new_y + padded_height > self.height {
            return Err(TextError::AtlasFull);
        }

        self.shelves.push(Shelf {
            y: new_y,
            height: padded_height,
            x: padded_width,
        });

        Ok(AtlasRegion {
            x: 0,
            y: new_y,
            width,
            height,
        })
    }

    /// Copy a coverage bitmap into a previously allocated region
    pub fn write(&mut self, region: AtlasRegion, bitmap: &[u8]) {
        let row_len = region.width as usize;
        let rows = bitmap
            .chunks_exact(row_len.max(1))
            .take(region.height as usize);
        for (row, src) in rows.enumerate() {
            let start = (region.y as usize + row) * self.width as usize + region.x as usize;
            self.pixels[start..start + row_len].copy_from_slice(&src[..row_len]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shelf_packing() {
        let mut atlas = GlyphAtlas::new(16, 16, 1);
        let a = atlas.allocate(4, 4).unwrap();
        let b = atlas.allocate(4, 3).unwrap();
        let c = atlas.allocate(10, 4).unwrap();

        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (5, 0));
        // Does not fit beside b on the first shelf
        assert_eq!((c.x, c.y), (0, 5));
    }

    #[test]
    fn test_atlas_full() {
        let mut atlas = GlyphAtlas::new(8, 8, 0);
        atlas.allocate(8, 8).unwrap();
        assert!(matches!(atlas.allocate(1, 1), Err(TextError::AtlasFull)));
        assert!(matches!(
            GlyphAtlas::new(8, 8, 0).allocate(9, 1),
            Err(TextError::AtlasFull)
        ));
    }

    #[test]
    fn test_write_and_expand() {
        let mut atlas = GlyphAtlas::new(4, 2, 0);
        let region = atlas.allocate(2, 2).unwrap();
        atlas.write(region, &[10, 20, 30, 40]);
        assert_eq!(atlas.pixels(), &[10, 20, 0, 0, 30, 40, 0, 0]);

        let rgba = atlas.to_rgba();
        assert_eq!(&rgba[0..4], &[255, 255, 255, 10]);
        assert_eq!(&rgba[20..24], &[255, 255, 255, 40]);
    }

    #[test]
    fn test_uv_bounds() {
        let region = AtlasRegion {
            x: 64,
            y: 0,
            width: 64,
            height: 128,
        };
        assert_eq!(region.uv_bounds(256, 256), [0.25, 0.0, 0.5, 0.5]);
    }
}
