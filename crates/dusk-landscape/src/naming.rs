use dusk_core::constants::MESH_NAME_PREFIX;
use dusk_core::RecordId;

/// Scene name of the mesh generated for record `id`.
pub fn mesh_name(id: RecordId) -> String {
    format!("{MESH_NAME_PREFIX}{id}")
}

/// Recover the record id from a landscape mesh name.
///
/// Only the exact form produced by [`mesh_name`] is accepted: the prefix
/// followed by one or more ASCII digits that fit a `u32`.
pub fn parse_mesh_name(name: &str) -> Option<RecordId> {
    let digits = name.strip_prefix(MESH_NAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().map(RecordId)
}

/// Whether `name` looks like a landscape mesh name.
pub fn is_landscape_mesh(name: &str) -> bool {
    parse_mesh_name(name).is_some()
}
