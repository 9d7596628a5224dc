//! Ghost-layer depths stored in a mesh object's info map.

use crate::data::info::HasInfo;

/// Info key holding the number of ghost cell layers.
pub const GHOST_CELL_LAYERS_KEY: &str = "mesh_insitu:ghost_cell_layers";
/// Info key holding the number of ghost node layers.
pub const GHOST_NODE_LAYERS_KEY: &str = "mesh_insitu:ghost_node_layers";

/// Ghost layer depths of a mesh.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GhostLayers {
    pub cells: u32,
    pub nodes: u32,
}

/// Record ghost-layer depths on `mesh`, replacing any earlier values.
pub fn set_ghost_layer_metadata<M: HasInfo + ?Sized>(mesh: &mut M, cells: u32, nodes: u32) {
    let info = mesh.info_mut();
    info.set(GHOST_CELL_LAYERS_KEY, i64::from(cells));
    info.set(GHOST_NODE_LAYERS_KEY, i64::from(nodes));
}

/// Ghost-layer depths of `mesh`, or `None` unless both were recorded.
pub fn get_ghost_layer_metadata<M: HasInfo + ?Sized>(mesh: &M) -> Option<GhostLayers> {
    let info = mesh.info();
    let read = |key: &str| {
        let raw = info.get(key)?;
        u32::try_from(raw)
            .map_err(|_| log::error!("{key} holds {raw}, which is not a layer count"))
            .ok()
    };
    Some(GhostLayers {
        cells: read(GHOST_CELL_LAYERS_KEY)?,
        nodes: read(GHOST_NODE_LAYERS_KEY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::info::InfoMap;

    #[test]
    fn absent_differs_from_zero() {
        let mut info = InfoMap::new();
        assert_eq!(get_ghost_layer_metadata(&info), None);
        set_ghost_layer_metadata(&mut info, 0, 0);
        assert_eq!(get_ghost_layer_metadata(&info), Some(GhostLayers::default()));
    }

    #[test]
    fn half_written_or_out_of_range_is_not_found() {
        let mut info = InfoMap::new();
        info.set(GHOST_CELL_LAYERS_KEY, 1);
        assert_eq!(get_ghost_layer_metadata(&info), None);
        info.set(GHOST_NODE_LAYERS_KEY, -2);
        assert_eq!(get_ghost_layer_metadata(&info), None);
    }
}
