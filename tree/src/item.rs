use std::fmt;

/// Stable identifier of an item in the assembly tree.
///
/// Identifiers are assigned once, when the item is created or imported, and
/// are never reused for another item. History entries refer to items only
/// through their id, so an id stays meaningful for as long as any command
/// mentions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    /// Creates an id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh [`ItemId`]s.
///
/// Ids supplied from outside (e.g. by an importer) are [reserved](Self::reserve)
/// so the allocator never produces them again.
#[derive(Debug, Clone, Default)]
pub struct ItemIdAllocator {
    next: u64,
}

impl ItemIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id that has never been returned or reserved before.
    pub fn allocate(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }

    /// Marks `id` as used.
    pub fn reserve(&mut self, id: ItemId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}

/// A node of the domain tree: a component, a group or a station.
///
/// Stations are simply the groups sitting directly under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) is_group: bool,
    pub(crate) is_fused: bool,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
}

impl Item {
    pub(crate) fn new(id: ItemId, name: impl Into<String>, is_group: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_group,
            is_fused: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display name; user-editable and distinct from the id.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }

    /// Whether consumers treat this group as one atomic unit.
    ///
    /// Always `false` for components.
    pub fn is_fused(&self) -> bool {
        self.is_group && self.is_fused
    }

    /// Parent id, `None` only for the root.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Child ids in sibling order.
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_repeats() {
        let mut alloc = ItemIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn reserve_skips_external_ids() {
        let mut alloc = ItemIdAllocator::new();
        alloc.reserve(ItemId::new(41));
        assert_eq!(alloc.allocate(), ItemId::new(42));

        // Reserving something lower does not rewind.
        alloc.reserve(ItemId::new(3));
        assert_eq!(alloc.allocate(), ItemId::new(43));
    }

    #[test]
    fn display_format() {
        assert_eq!(ItemId::new(7).to_string(), "#7");
    }

    #[test]
    fn component_is_never_fused() {
        let mut item = Item::new(ItemId::new(1), "Bolt", false);
        item.is_fused = true;
        assert!(!item.is_fused());
    }
}
