use std::collections::HashMap;

use crate::mesh::Mesh;

/// The part of a scene graph the landscape layer drives.
///
/// Meshes are registered by name, then attached to a named child node of the
/// scene root. Node creation is idempotent and node removal is safe when the
/// node is absent.
pub trait SceneGraph {
    fn has_node(&self, name: &str) -> bool;

    /// Create a child of the root node. Does nothing if it already exists.
    fn create_child_node(&mut self, name: &str);

    /// Remove a child of the root node. Meshes attached to it become detached.
    fn remove_child_node(&mut self, name: &str);

    /// Register a manual renderable under `mesh.name`, replacing any previous one.
    fn create_mesh(&mut self, mesh: Mesh);

    /// Attach a registered mesh to a node. Returns false if either is unknown.
    fn attach_mesh(&mut self, node: &str, mesh_name: &str) -> bool;

    fn detach_mesh(&mut self, node: &str, mesh_name: &str);

    /// Unregister a mesh, detaching it from wherever it is attached.
    fn destroy_mesh(&mut self, mesh_name: &str);
}

/// In-process scene graph holding meshes in memory.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<String, Vec<String>>,
    meshes: HashMap<String, Mesh>,
    meshes_created: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the meshes attached to `node`, in attach order.
    pub fn attached(&self, node: &str) -> &[String] {
        self.nodes.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.get(name)
    }

    /// Number of meshes currently registered.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total number of meshes ever registered, counting rebuilds.
    pub fn meshes_created(&self) -> usize {
        self.meshes_created
    }
}

impl SceneGraph for MemoryScene {
    fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    fn create_child_node(&mut self, name: &str) {
        self.nodes.entry(name.to_string()).or_default();
    }

    fn remove_child_node(&mut self, name: &str) {
        self.nodes.remove(name);
    }

    fn create_mesh(&mut self, mesh: Mesh) {
        self.meshes_created += 1;
        self.meshes.insert(mesh.name.clone(), mesh);
    }

    fn attach_mesh(&mut self, node: &str, mesh_name: &str) -> bool {
        if !self.meshes.contains_key(mesh_name) {
            return false;
        }
        match self.nodes.get_mut(node) {
            Some(attached) => {
                if !attached.iter().any(|m| m == mesh_name) {
                    attached.push(mesh_name.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn detach_mesh(&mut self, node: &str, mesh_name: &str) {
        if let Some(attached) = self.nodes.get_mut(node) {
            attached.retain(|m| m != mesh_name);
        }
    }

    fn destroy_mesh(&mut self, mesh_name: &str) {
        for attached in self.nodes.values_mut() {
            attached.retain(|m| m != mesh_name);
        }
        self.meshes.remove(mesh_name);
    }
}
