use dusk_core::constants::{GRID_CELLS, GRID_POINTS, GRID_SIZE, GRID_TRIANGLES};
use dusk_core::HeightGrid;
use glam::Vec3;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub colour: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: Vec3, colour: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            colour,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

/// A named manual renderable handed to the scene graph.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub topology: Topology,
    /// Material name; empty for wireframes, which carry vertex colour only.
    pub material: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::TriangleList => self.indices.len() / 3,
            Topology::LineList => self.indices.len() / 2,
        }
    }

    /// Vertex data as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// World placement of a height grid: the geometry a record renders and picks.
#[derive(Debug, Clone, Copy)]
pub struct TileView<'a> {
    pub offset_x: f32,
    pub offset_y: f32,
    pub stride: f32,
    pub grid: &'a HeightGrid,
}

impl TileView<'_> {
    /// World position of grid point `[i][j]`.
    pub fn point(&self, i: usize, j: usize) -> Vec3 {
        Vec3::new(
            self.offset_x + self.stride * i as f32,
            self.grid.height(i, j),
            self.offset_y + self.stride * j as f32,
        )
    }

    /// Every triangle of the solid tessellation, two per cell.
    ///
    /// Winding: `[i][j], [i][j+1], [i+1][j]` then `[i+1][j], [i][j+1], [i+1][j+1]`.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..GRID_CELLS).flat_map(move |i| {
            (0..GRID_CELLS).flat_map(move |j| {
                let p00 = self.point(i, j);
                let p01 = self.point(i, j + 1);
                let p10 = self.point(i + 1, j);
                let p11 = self.point(i + 1, j + 1);
                [[p00, p01, p10], [p10, p01, p11]]
            })
        })
    }
}

#[inline]
fn vertex_index(i: usize, j: usize) -> u32 {
    (i * GRID_SIZE + j) as u32
}

/// Build the solid, vertex-coloured surface of a tile.
pub fn build_solid(name: String, material: &str, tile: &TileView) -> Mesh {
    let mut vertices = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_SIZE {
        for j in 0..GRID_SIZE {
            let [r, g, b] = tile.grid.colour(i, j);
            let colour = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0];
            vertices.push(MeshVertex::new(tile.point(i, j), colour));
        }
    }

    let mut indices = Vec::with_capacity(GRID_TRIANGLES * 3);
    for i in 0..GRID_CELLS {
        for j in 0..GRID_CELLS {
            indices.extend_from_slice(&[
                vertex_index(i, j),
                vertex_index(i, j + 1),
                vertex_index(i + 1, j),
                vertex_index(i + 1, j),
                vertex_index(i, j + 1),
                vertex_index(i + 1, j + 1),
            ]);
        }
    }

    Mesh {
        name,
        topology: Topology::TriangleList,
        material: material.to_string(),
        vertices,
        indices,
    }
}

/// Build a line grid connecting each point to its +j and +i neighbours.
pub fn build_wireframe(name: String, colour: [f32; 4], tile: &TileView) -> Mesh {
    let mut vertices = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_SIZE {
        for j in 0..GRID_SIZE {
            vertices.push(MeshVertex::new(tile.point(i, j), colour));
        }
    }

    let mut indices = Vec::with_capacity(GRID_SIZE * GRID_CELLS * 4);
    for i in 0..GRID_SIZE {
        for j in 0..GRID_CELLS {
            indices.extend_from_slice(&[vertex_index(i, j), vertex_index(i, j + 1)]);
        }
    }
    for i in 0..GRID_CELLS {
        for j in 0..GRID_SIZE {
            indices.extend_from_slice(&[vertex_index(i, j), vertex_index(i + 1, j)]);
        }
    }

    Mesh {
        name,
        topology: Topology::LineList,
        material: String::new(),
        vertices,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped_grid() -> HeightGrid {
        let mut grid = HeightGrid::new();
        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                grid.set_height(i, j, i as f32);
                grid.set_colour(i, j, [255, 0, 51]);
            }
        }
        grid
    }

    #[test]
    fn test_solid_mesh_counts() {
        let grid = sloped_grid();
        let tile = TileView {
            offset_x: 10.0,
            offset_y: 20.0,
            stride: 5.0,
            grid: &grid,
        };
        let mesh = build_solid("Landscape1".into(), "Landscape/Green", &tile);
        assert_eq!(mesh.vertices.len(), 4225);
        assert_eq!(mesh.primitive_count(), 64 * 64 * 2);
        assert_eq!(mesh.topology, Topology::TriangleList);
        assert_eq!(mesh.vertex_bytes().len(), 4225 * 28);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_solid_mesh_positions_and_colour() {
        let grid = sloped_grid();
        let tile = TileView {
            offset_x: 10.0,
            offset_y: 20.0,
            stride: 5.0,
            grid: &grid,
        };
        let mesh = build_solid("Landscape1".into(), "m", &tile);
        // [2][3] -> x = 10 + 2*5, y = 2, z = 20 + 3*5
        let v = mesh.vertices[2 * 65 + 3];
        assert_eq!(v.position, [20.0, 2.0, 35.0]);
        assert_eq!(v.colour, [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn test_solid_mesh_winding() {
        let grid = HeightGrid::new();
        let tile = TileView {
            offset_x: 0.0,
            offset_y: 0.0,
            stride: 1.0,
            grid: &grid,
        };
        let mesh = build_solid("Landscape1".into(), "m", &tile);
        assert_eq!(&mesh.indices[0..6], &[0, 1, 65, 65, 1, 66]);
    }

    #[test]
    fn test_wireframe_mesh_counts() {
        let grid = sloped_grid();
        let tile = TileView {
            offset_x: 0.0,
            offset_y: 0.0,
            stride: 5.0,
            grid: &grid,
        };
        let mesh = build_wireframe("Landscape2".into(), [0.0, 1.0, 0.0, 1.0], &tile);
        assert_eq!(mesh.topology, Topology::LineList);
        assert_eq!(mesh.primitive_count(), 2 * 65 * 64);
        assert!(mesh.vertices.iter().all(|v| v.colour == [0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_wireframe_segments_join_neighbours() {
        let grid = sloped_grid();
        let tile = TileView {
            offset_x: 0.0,
            offset_y: 0.0,
            stride: 1.0,
            grid: &grid,
        };
        let mesh = build_wireframe("Landscape4".into(), [1.0; 4], &tile);
        let segments: Vec<[u32; 2]> = mesh.indices.chunks_exact(2).map(|s| [s[0], s[1]]).collect();
        let row = GRID_SIZE as u32;

        for &[a, b] in &segments {
            assert!((b as usize) < GRID_POINTS, "index {b} out of range");
            match b - a {
                1 => assert_ne!(a % row, row - 1, "segment {a}-{b} wraps a row"),
                d if d == row => {}
                d => panic!("segment {a}-{b} spans {d} vertices"),
            }
        }

        let along_rows = GRID_SIZE * GRID_CELLS;
        assert_eq!(segments[0], [0, 1]);
        assert_eq!(segments[along_rows - 1], [64 * 65 + 63, 64 * 65 + 64]);
        assert_eq!(segments[along_rows], [0, 65]);
        assert_eq!(segments[segments.len() - 1], [63 * 65 + 64, 64 * 65 + 64]);

        let mut unique = segments.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), segments.len());
    }

    #[test]
    fn test_triangles_match_solid_indices() {
        let grid = sloped_grid();
        let tile = TileView {
            offset_x: 3.0,
            offset_y: 4.0,
            stride: 2.0,
            grid: &grid,
        };
        let mesh = build_solid("Landscape3".into(), "m", &tile);
        let from_mesh: Vec<[Vec3; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|t| {
                let p = |k: u32| Vec3::from_array(mesh.vertices[k as usize].position);
                [p(t[0]), p(t[1]), p(t[2])]
            })
            .collect();
        let from_view: Vec<[Vec3; 3]> = tile.triangles().collect();
        assert_eq!(from_view.len(), GRID_TRIANGLES);
        assert_eq!(from_mesh, from_view);
    }
}
