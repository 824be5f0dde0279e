//! Texture slot table for the pending batch

use smallvec::SmallVec;
use spiro_core::TextureId;

use crate::vertex::MAX_TEXTURES;

/// Textures bound to the pending batch, in sampler order
///
/// A texture's position in the table is the slot index its vertices carry.
/// Entries are unique.
#[derive(Debug, Default, Clone)]
pub struct TextureSlotTable {
    slots: SmallVec<[TextureId; MAX_TEXTURES]>,
}

impl TextureSlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `texture`, binding it to the next free slot when needed
    ///
    /// Returns `None` when the texture is not bound and every slot is taken.
    pub fn resolve(&mut self, texture: TextureId) -> Option<u32> {
        if let Some(index) = self.index_of(texture) {
            return Some(index);
        }
        if self.is_full() {
            return None;
        }
        self.slots.push(texture);
        Some(self.slots.len() as u32 - 1)
    }

    pub fn index_of(&self, texture: TextureId) -> Option<u32> {
        self.slots
            .iter()
            .position(|&t| t == texture)
            .map(|i| i as u32)
    }

    pub fn contains(&self, texture: TextureId) -> bool {
        self.slots.contains(&texture)
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_TEXTURES
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bound textures, indexed by slot
    pub fn textures(&self) -> &[TextureId] {
        &self.slots
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn textures(n: usize) -> Vec<TextureId> {
        let mut map: SlotMap<TextureId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let ids = textures(2);
        let mut table = TextureSlotTable::new();
        assert_eq!(table.resolve(ids[0]), Some(0));
        assert_eq!(table.resolve(ids[1]), Some(1));
        assert_eq!(table.resolve(ids[0]), Some(0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_full_table_rejects_new_texture() {
        let ids = textures(MAX_TEXTURES + 1);
        let mut table = TextureSlotTable::new();
        for (i, &id) in ids[..MAX_TEXTURES].iter().enumerate() {
            assert_eq!(table.resolve(id), Some(i as u32));
        }
        assert!(table.is_full());
        assert_eq!(table.resolve(ids[MAX_TEXTURES]), None);
        // Already bound textures still resolve
        assert_eq!(table.resolve(ids[7]), Some(7));

        table.clear();
        assert_eq!(table.resolve(ids[MAX_TEXTURES]), Some(0));
    }
}
