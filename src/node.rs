use crate::arena::{NodeId, ValueKey};

/// One occurrence of a value at one level, or a sentinel bounding a level.
///
/// A node carries a value key if and only if it is not a head or tail
/// sentinel. `next`/`prev` order nodes within a level; `up`/`down` align the
/// copies of the same element (or the same sentinel) across adjacent levels.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) value_: Option<ValueKey>,
    pub(crate) next_: Option<NodeId>,
    pub(crate) prev_: Option<NodeId>,
    pub(crate) up_: Option<NodeId>,
    pub(crate) down_: Option<NodeId>,
}

impl Node {
    pub(crate) fn sentinel() -> Node {
        Node {
            value_: None,
            next_: None,
            prev_: None,
            up_: None,
            down_: None,
        }
    }

    pub(crate) fn element(value: ValueKey) -> Node {
        Node {
            value_: Some(value),
            next_: None,
            prev_: None,
            up_: None,
            down_: None,
        }
    }

    /// A head has no predecessor and no value.
    #[inline(always)]
    pub(crate) fn is_head(&self) -> bool {
        self.prev_.is_none() && self.value_.is_none()
    }

    /// A tail has no successor and no value.
    #[inline(always)]
    pub(crate) fn is_tail(&self) -> bool {
        self.next_.is_none() && self.value_.is_none()
    }

    #[inline(always)]
    pub(crate) fn is_element(&self) -> bool {
        self.value_.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn fresh_sentinel_is_both_head_and_tail() {
        let node = Node::sentinel();
        assert!(node.is_head());
        assert!(node.is_tail());
        assert!(!node.is_element());
    }

    #[test]
    fn element_is_neither_sentinel() {
        let mut arena: Arena<i32> = Arena::new();
        let key = arena.store_value(7);
        let node = Node::element(key);
        assert!(node.is_element());
        assert!(!node.is_head());
        assert!(!node.is_tail());
    }

    #[test]
    fn linked_sentinels_keep_their_roles() {
        let mut arena: Arena<i32> = Arena::new();
        let head = arena.alloc(Node::sentinel());
        let tail = arena.alloc(Node::sentinel());
        arena.node_mut(head).next_ = Some(tail);
        arena.node_mut(tail).prev_ = Some(head);

        assert!(arena.node(head).is_head());
        assert!(!arena.node(head).is_tail());
        assert!(arena.node(tail).is_tail());
        assert!(!arena.node(tail).is_head());
    }
}
