use crate::node::Node;

/// Handle to a node slot in the [`Arena`]. The generation counter makes stale
/// handles detectable: freeing a slot bumps its generation, so a handle taken
/// before the free no longer matches and checked access fails instead of
/// reaching recycled memory.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId {
    index_: usize,
    generation_: u64,
}

/// Handle to an element payload in the value slab. Every vertical copy of one
/// element shares a single `ValueKey`, so the payload is stored and released
/// exactly once no matter how many levels the element was promoted to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct ValueKey(usize);

struct Slot {
    generation_: u64,
    node_: Option<Node>,
}

/// Owns every node and every element payload of a skip list. Links between
/// nodes are `NodeId` relations rather than pointers; dropping the arena drops
/// all of it in one go.
pub(crate) struct Arena<T> {
    slots_: Vec<Slot>,
    free_slots_: Vec<usize>,
    values_: Vec<Option<T>>,
    free_values_: Vec<usize>,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Arena<T> {
        Arena {
            slots_: Vec::new(),
            free_slots_: Vec::new(),
            values_: Vec::new(),
            free_values_: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free_slots_.pop() {
            Some(index) => {
                let slot = &mut self.slots_[index];
                slot.node_ = Some(node);
                NodeId {
                    index_: index,
                    generation_: slot.generation_,
                }
            }
            None => {
                let index = self.slots_.len();
                self.slots_.push(Slot {
                    generation_: 0,
                    node_: Some(node),
                });
                NodeId {
                    index_: index,
                    generation_: 0,
                }
            }
        }
    }

    /// Releases a node slot and bumps its generation, invalidating every
    /// outstanding handle to it.
    pub(crate) fn free(&mut self, id: NodeId) {
        let slot = &mut self.slots_[id.index_];
        debug_assert_eq!(slot.generation_, id.generation_);
        debug_assert!(slot.node_.is_some());
        slot.generation_ += 1;
        slot.node_ = None;
        self.free_slots_.push(id.index_);
    }

    /// Unchecked access for internal link traversal. Every `NodeId` the list
    /// follows through `next`/`prev`/`up`/`down` is live by construction, so a
    /// miss here is a structural bug, not a caller mistake.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        debug_assert_eq!(self.slots_[id.index_].generation_, id.generation_);
        match self.slots_[id.index_].node_ {
            Some(ref node) => node,
            None => panic!("dangling internal node handle"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        debug_assert_eq!(self.slots_[id.index_].generation_, id.generation_);
        match self.slots_[id.index_].node_ {
            Some(ref mut node) => node,
            None => panic!("dangling internal node handle"),
        }
    }

    /// Generation-checked access for handles held by callers. Returns `None`
    /// when the slot was freed (or freed and recycled) since the handle was
    /// taken.
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots_.get(id.index_)?;
        if slot.generation_ != id.generation_ {
            return None;
        }
        slot.node_.as_ref()
    }

    pub(crate) fn store_value(&mut self, value: T) -> ValueKey {
        match self.free_values_.pop() {
            Some(index) => {
                self.values_[index] = Some(value);
                ValueKey(index)
            }
            None => {
                self.values_.push(Some(value));
                ValueKey(self.values_.len() - 1)
            }
        }
    }

    pub(crate) fn value(&self, key: ValueKey) -> &T {
        match self.values_[key.0] {
            Some(ref value) => value,
            None => panic!("dangling value key"),
        }
    }

    /// Drops the payload and recycles its slot. Called once per removed
    /// element, at the base-level copy.
    pub(crate) fn take_value(&mut self, key: ValueKey) -> T {
        match self.values_[key.0].take() {
            Some(value) => {
                self.free_values_.push(key.0);
                value
            }
            None => panic!("dangling value key"),
        }
    }
}
