//! Symbol instances and the fixed-capacity ring that holds them

use rf_slot::SymbolId;

use crate::assets::TextureHandle;

/// One visual symbol on a reel
///
/// Rebound in place when recycled; never reallocated while the reel lives.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInstance {
    /// Bound catalog entry
    pub symbol_id: SymbolId,
    /// Reel-local vertical position of the instance's top edge
    pub position: f64,
    /// Texture currently displayed
    pub texture: TextureHandle,
}

impl SymbolInstance {
    pub fn new(symbol_id: SymbolId, position: f64, texture: TextureHandle) -> Self {
        Self {
            symbol_id,
            position,
            texture,
        }
    }

    /// Bind to a different catalog entry
    #[inline]
    pub fn rebind(&mut self, symbol_id: SymbolId, texture: TextureHandle) {
        self.symbol_id = symbol_id;
        self.texture = texture;
    }
}

/// Fixed-capacity ring of instances, ordered top to bottom
///
/// Moving an instance from one end to the other only shifts the head index;
/// the slot itself is reused.
#[derive(Debug, Clone)]
pub struct InstanceRing {
    slots: Vec<SymbolInstance>,
    head: usize,
}

impl InstanceRing {
    pub fn new(slots: Vec<SymbolInstance>) -> Self {
        Self { slots, head: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.head + index) % self.slots.len()
    }

    /// Instance at logical index (0 = top)
    pub fn get(&self, index: usize) -> Option<&SymbolInstance> {
        if index >= self.slots.len() {
            return None;
        }
        Some(&self.slots[self.physical(index)])
    }

    pub fn front(&self) -> Option<&SymbolInstance> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&SymbolInstance> {
        self.slots.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &SymbolInstance> {
        let (tail, head) = self.slots.split_at(self.head);
        head.iter().chain(tail.iter())
    }

    /// Iterate top to bottom, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SymbolInstance> {
        let (tail, head) = self.slots.split_at_mut(self.head);
        head.iter_mut().chain(tail.iter_mut())
    }

    /// Move the bottom instance to the top and return it for rebinding
    pub fn rotate_to_front(&mut self) -> Option<&mut SymbolInstance> {
        if self.slots.is_empty() {
            return None;
        }
        self.head = (self.head + self.slots.len() - 1) % self.slots.len();
        let idx = self.head;
        Some(&mut self.slots[idx])
    }

    /// Move the top instance to the bottom and return it for rebinding
    pub fn rotate_to_back(&mut self) -> Option<&mut SymbolInstance> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = self.head;
        self.head = (self.head + 1) % self.slots.len();
        Some(&mut self.slots[idx])
    }
}
