//! Context extensions the scatter batches depend on.

use bitflags::bitflags;

bitflags! {
    /// Optional rendering-context capabilities.
    ///
    /// The marker and line batches draw every point as an instance and index
    /// past 65 535 vertices, so both of the default flags must be present
    /// before any batch is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GlExtensions: u32 {
        /// Instanced drawing (`ANGLE_instanced_arrays`).
        const INSTANCED_ARRAYS = 1 << 0;

        /// 32-bit element indices (`OES_element_index_uint`).
        const ELEMENT_INDEX_UINT = 1 << 1;
    }
}

impl GlExtensions {
    /// What the scatter scene requires by default.
    pub const SCATTER: GlExtensions =
        GlExtensions::INSTANCED_ARRAYS.union(GlExtensions::ELEMENT_INDEX_UINT);

    /// Extension names as exposed by WebGL-style contexts.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::INSTANCED_ARRAYS) {
            names.push("ANGLE_instanced_arrays");
        }
        if self.contains(Self::ELEMENT_INDEX_UINT) {
            names.push("OES_element_index_uint");
        }
        names
    }
}

impl Default for GlExtensions {
    fn default() -> Self {
        Self::SCATTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_extensions() {
        let ext = GlExtensions::default();
        assert!(ext.contains(GlExtensions::INSTANCED_ARRAYS));
        assert!(ext.contains(GlExtensions::ELEMENT_INDEX_UINT));
        assert_eq!(
            ext.names(),
            vec!["ANGLE_instanced_arrays", "OES_element_index_uint"]
        );
    }
}
