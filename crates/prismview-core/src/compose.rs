//! Mirror tiling layouts.
//!
//! A layout paints the source next to reflected copies of itself on a
//! larger RGBA canvas:
//!
//! ```text
//! Dual          Triple             Quad            VerticalDual
//! +---+---+     +---+---+---+      +---+---+       +---+
//! | O | H |     | O | H | O |      | O | H |       | O |
//! +---+---+     +---+---+---+      +---+---+       +---+
//!                                  | V |HV |       | V |
//!                                  +---+---+       +---+
//! ```
//! `O` = original, `H` = mirrored horizontally, `V` = vertically.

use serde::{Deserialize, Serialize};

use crate::decode::{PixelBuffer, PixelFormat};
use crate::transform::mirror;

/// Tiled mirror layout for the rendered image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorLayout {
    #[default]
    None,
    Dual,
    Triple,
    Quad,
    VerticalDual,
}

/// One tile: grid column, grid row, horizontal flip, vertical flip.
type Tile = (u32, u32, bool, bool);

impl MirrorLayout {
    /// Canvas multiplier as (columns, rows)
    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            MirrorLayout::None => (1, 1),
            MirrorLayout::Dual => (2, 1),
            MirrorLayout::Triple => (3, 1),
            MirrorLayout::Quad => (2, 2),
            MirrorLayout::VerticalDual => (1, 2),
        }
    }

    fn tiles(self) -> &'static [Tile] {
        match self {
            MirrorLayout::None => &[(0, 0, false, false)],
            MirrorLayout::Dual => &[(0, 0, false, false), (1, 0, true, false)],
            MirrorLayout::Triple => &[
                (0, 0, false, false),
                (1, 0, true, false),
                (2, 0, false, false),
            ],
            MirrorLayout::Quad => &[
                (0, 0, false, false),
                (1, 0, true, false),
                (0, 1, false, true),
                (1, 1, true, true),
            ],
            MirrorLayout::VerticalDual => &[(0, 0, false, false), (0, 1, false, true)],
        }
    }
}

/// Compose `buffer` into `layout`.
///
/// `MirrorLayout::None` returns the input unchanged. Every other layout
/// produces an [`PixelFormat::Rgba8`] canvas.
pub fn composite(buffer: &PixelBuffer, layout: MirrorLayout) -> PixelBuffer {
    if layout == MirrorLayout::None {
        return buffer.clone();
    }

    let (cols, rows) = layout.canvas_size();
    let (tile_w, tile_h) = (buffer.width as usize, buffer.height as usize);
    let canvas_w = tile_w * cols as usize;
    let canvas_h = tile_h * rows as usize;
    let mut canvas = vec![0u8; canvas_w * canvas_h * 4];

    let source = buffer.to_rgba();
    let row_len = tile_w * 4;

    for &(col, row, flip_h, flip_v) in layout.tiles() {
        let tile = mirror(&source, flip_h, flip_v);
        let x0 = col as usize * tile_w;
        let y0 = row as usize * tile_h;

        for (y, src_row) in tile.pixels.chunks_exact(row_len.max(1)).enumerate() {
            let start = ((y0 + y) * canvas_w + x0) * 4;
            canvas[start..start + row_len].copy_from_slice(src_row);
        }
    }

    tracing::debug!(?layout, width = canvas_w, height = canvas_h, "Composited mirror layout");
    PixelBuffer::new(canvas_w as u32, canvas_h as u32, PixelFormat::Rgba8, canvas)
}
