pub mod error;
pub mod generate;
pub mod mesh;
pub mod naming;
pub mod record;
pub mod scene;
pub mod sync;
pub mod table;

pub use error::LandscapeError;
pub use generate::{ColourFunction, HeightBands, HeightFunction, SimplexHills};
pub use mesh::{Mesh, MeshVertex, TileView, Topology};
pub use naming::{is_landscape_mesh, mesh_name, parse_mesh_name};
pub use record::LandscapeRecord;
pub use scene::{MemoryScene, SceneGraph};
pub use sync::RenderSyncQueue;
pub use table::{Landscape, PickHit, SyncReport};
