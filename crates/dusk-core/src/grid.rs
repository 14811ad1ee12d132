use crate::constants::{GRID_POINTS, GRID_SIZE};
use crate::types::Rgb;

/// Height and colour samples of one landscape tile.
///
/// Both arrays are row-major with `GRID_SIZE` points per row. The first index
/// `i` runs along world X, the second index `j` along world Z. Valid indices
/// are `0..=64` on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    heights: Vec<f32>,
    colours: Vec<Rgb>,
}

impl Default for HeightGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl HeightGrid {
    /// All heights zero, all colours black.
    pub fn new() -> Self {
        Self {
            heights: vec![0.0; GRID_POINTS],
            colours: vec![[0, 0, 0]; GRID_POINTS],
        }
    }

    #[inline]
    fn index(i: usize, j: usize) -> usize {
        debug_assert!(i < GRID_SIZE && j < GRID_SIZE, "grid index ({i}, {j})");
        i * GRID_SIZE + j
    }

    pub fn height(&self, i: usize, j: usize) -> f32 {
        self.heights[Self::index(i, j)]
    }

    pub fn set_height(&mut self, i: usize, j: usize, value: f32) {
        self.heights[Self::index(i, j)] = value;
    }

    pub fn colour(&self, i: usize, j: usize) -> Rgb {
        self.colours[Self::index(i, j)]
    }

    pub fn set_colour(&mut self, i: usize, j: usize, rgb: Rgb) {
        self.colours[Self::index(i, j)] = rgb;
    }

    /// All heights, row-major, length `GRID_POINTS`.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// All colours, row-major, length `GRID_POINTS`.
    pub fn colours(&self) -> &[Rgb] {
        &self.colours
    }

    pub fn colours_mut(&mut self) -> &mut [Rgb] {
        &mut self.colours
    }

    /// Set every height sample to `value`.
    pub fn fill_heights(&mut self, value: f32) {
        self.heights.fill(value);
    }

    /// Apply `f` to every height sample in place.
    pub fn map_heights(&mut self, f: impl Fn(f32) -> f32) {
        for h in &mut self.heights {
            *h = f(*h);
        }
    }

    /// Lowest and highest sample, in that order.
    pub fn min_max(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }
}
