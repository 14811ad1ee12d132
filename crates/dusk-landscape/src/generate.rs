use dusk_core::Rgb;

/// Height source evaluated over a record's normalized domain `[0, 1] x [0, 1]`.
///
/// `x` runs along the record's first grid axis (world X), `z` along the second
/// (world Z). Any `FnMut(f32, f32) -> f32` closure is a height function.
pub trait HeightFunction {
    fn height(&mut self, x: f32, z: f32) -> f32;
}

impl<F: FnMut(f32, f32) -> f32> HeightFunction for F {
    fn height(&mut self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Colour source over the same normalized domain as [`HeightFunction`].
pub trait ColourFunction {
    fn colour(&mut self, x: f32, z: f32) -> Rgb;
}

impl<F: FnMut(f32, f32) -> Rgb> ColourFunction for F {
    fn colour(&mut self, x: f32, z: f32) -> Rgb {
        self(x, z)
    }
}

const SKEW: f64 = 0.366_025_403_784_438_6; // (sqrt(3) - 1) / 2
const UNSKEW: f64 = 0.211_324_865_405_187_1; // (3 - sqrt(3)) / 6

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// (input scale, weight, input shift) per octave.
const OCTAVES: [(f64, f64, f64); 3] = [(1.0, 1.0, 0.0), (2.0, 0.5, 100.0), (4.0, 0.25, 200.0)];

/// Seeded gradient lattice for 2D simplex noise.
#[derive(Clone)]
struct SimplexLattice {
    /// Shuffled 0..=255, repeated so a two-level lookup never wraps.
    hash: [u8; 512],
}

impl SimplexLattice {
    fn shuffled(seed: u64) -> Self {
        let mut order: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 1;
        }
        for i in (1..order.len()).rev() {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            order.swap(i, (state % (i as u64 + 1)) as usize);
        }
        Self {
            hash: std::array::from_fn(|i| order[i & 255]),
        }
    }

    fn gradient(&self, cell_x: i64, cell_z: i64) -> (f64, f64) {
        let row = self.hash[(cell_z & 255) as usize] as usize;
        GRADIENTS[(self.hash[(cell_x & 255) as usize + row] & 7) as usize]
    }

    /// One octave of noise, roughly within [-1, 1].
    fn sample(&self, x: f64, z: f64) -> f64 {
        let skew = (x + z) * SKEW;
        let cell_x = (x + skew).floor();
        let cell_z = (z + skew).floor();
        let unskew = (cell_x + cell_z) * UNSKEW;
        let dx = x - cell_x + unskew;
        let dz = z - cell_z + unskew;

        // Middle corner of the simplex containing the point.
        let step = if dx > dz { (1, 0) } else { (0, 1) };
        let (cx, cz) = (cell_x as i64, cell_z as i64);

        let total: f64 = [(0, 0), step, (1, 1)]
            .iter()
            .map(|&(ox, oz)| {
                let back = (ox + oz) as f64 * UNSKEW;
                let px = dx - ox as f64 + back;
                let pz = dz - oz as f64 + back;
                let falloff = 0.5 - px * px - pz * pz;
                if falloff <= 0.0 {
                    return 0.0;
                }
                let (gx, gz) = self.gradient(cx + ox, cz + oz);
                falloff.powi(4) * (gx * px + gz * pz)
            })
            .sum();
        70.0 * total
    }
}

/// Rolling hills from three octaves of seeded 2D simplex noise.
///
/// The generator is placed on a tile with [`SimplexHills::at_tile`], which maps
/// the normalized record domain back to world coordinates so neighbouring
/// tiles share their edges.
#[derive(Clone)]
pub struct SimplexHills {
    lattice: SimplexLattice,
    /// Noise frequency in cycles per world unit.
    pub frequency: f64,
    /// Height of the first octave.
    pub amplitude: f32,
    /// Height added to every sample.
    pub base_height: f32,
    origin: (f64, f64),
    extent: f64,
}

impl SimplexHills {
    pub fn new(seed: u64) -> Self {
        Self {
            lattice: SimplexLattice::shuffled(seed),
            frequency: 0.004,
            amplitude: 40.0,
            base_height: 0.0,
            origin: (0.0, 0.0),
            extent: 1.0,
        }
    }

    /// Place the generator on a tile starting at `(offset_x, offset_y)` and
    /// spanning `extent` world units per axis.
    pub fn at_tile(mut self, offset_x: f32, offset_y: f32, extent: f32) -> Self {
        self.origin = (offset_x as f64, offset_y as f64);
        self.extent = extent as f64;
        self
    }

    /// Height at a world-space position.
    pub fn world_height(&self, wx: f64, wz: f64) -> f32 {
        let x = wx * self.frequency;
        let z = wz * self.frequency;
        let h: f64 = OCTAVES
            .iter()
            .map(|&(scale, weight, shift)| self.lattice.sample(x * scale + shift, z * scale + shift) * weight)
            .sum();
        self.base_height + h as f32 * self.amplitude
    }
}

impl HeightFunction for SimplexHills {
    fn height(&mut self, x: f32, z: f32) -> f32 {
        let wx = self.origin.0 + x as f64 * self.extent;
        let wz = self.origin.1 + z as f64 * self.extent;
        self.world_height(wx, wz)
    }
}

/// Colours a tile by the height another generator produces at each point.
///
/// `bands` are `(upper_bound, colour)` pairs in ascending order; heights above
/// the last bound take the last colour.
pub struct HeightBands<H> {
    source: H,
    bands: Vec<(f32, Rgb)>,
}

impl<H: HeightFunction> HeightBands<H> {
    pub fn new(source: H, bands: Vec<(f32, Rgb)>) -> Self {
        Self { source, bands }
    }

    /// Sand, grass, rock and snow around `base`, each band `step` high.
    pub fn terrain(source: H, base: f32, step: f32) -> Self {
        Self::new(
            source,
            vec![
                (base, [194, 178, 128]),
                (base + step, [86, 140, 54]),
                (base + 2.0 * step, [120, 110, 100]),
                (f32::INFINITY, [240, 240, 245]),
            ],
        )
    }
}

impl<H: HeightFunction> ColourFunction for HeightBands<H> {
    fn colour(&mut self, x: f32, z: f32) -> Rgb {
        let h = self.source.height(x, z);
        self.bands
            .iter()
            .find(|(bound, _)| h <= *bound)
            .or(self.bands.last())
            .map(|(_, rgb)| *rgb)
            .unwrap_or([0, 0, 0])
    }
}
