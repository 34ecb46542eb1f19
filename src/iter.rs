use crate::arena::NodeId;
use crate::error::Error;
use crate::skiplist::SkipList;

/// A non-owning position over the base level of a [`SkipList`].
///
/// A cursor is a generation-checked handle, not a borrow: the list can be
/// mutated while cursors are held, and a cursor whose node has since been
/// removed fails checked access with [`Error::InvalidatedIterator`] instead
/// of dangling. Each cursor is also stamped with the identity of the list it
/// was taken from; presenting it to a different list fails the same way
/// rather than resolving against an unrelated arena. Two cursors are equal
/// iff they reference the identical node of the same list.
///
/// The canonical past-the-end position is [`SkipList::end`], the base tail
/// sentinel; it is a valid position to hold and to step back from, but not to
/// dereference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cursor {
    pub(crate) node_: NodeId,
    pub(crate) list_: u64,
}

impl<T> SkipList<T> {
    /// Cursor at the first element, or at [`end`](Self::end) when the list is
    /// empty.
    pub fn begin(&self) -> Cursor {
        match self.arena_.node(self.base_head()).next_ {
            Some(next) => Cursor {
                node_: next,
                list_: self.list_id(),
            },
            None => self.end(),
        }
    }

    /// Cursor at the base tail sentinel. Never invalidated.
    #[inline(always)]
    pub fn end(&self) -> Cursor {
        Cursor {
            node_: self.base_tail(),
            list_: self.list_id(),
        }
    }

    /// Resolves a cursor against this list: the cursor must have been taken
    /// from this list and its node must still be present.
    fn resolve(&self, cursor: Cursor) -> Result<&crate::node::Node, Error> {
        if cursor.list_ != self.list_id() {
            return Err(Error::InvalidatedIterator);
        }
        self.arena_
            .get(cursor.node_)
            .ok_or(Error::InvalidatedIterator)
    }

    /// Steps `cursor` forward one element. Stepping from the last element
    /// lands on [`end`](Self::end); stepping from `end` is out of bounds.
    pub fn next(&self, cursor: Cursor) -> Result<Cursor, Error> {
        match self.resolve(cursor)?.next_ {
            Some(next) => Ok(Cursor {
                node_: next,
                list_: cursor.list_,
            }),
            None => Err(Error::OutOfBounds),
        }
    }

    /// Steps `cursor` back one element. Stepping from [`end`](Self::end)
    /// lands on the last element; stepping from the first element is out of
    /// bounds.
    pub fn prev(&self, cursor: Cursor) -> Result<Cursor, Error> {
        match self.resolve(cursor)?.prev_ {
            Some(prev) if self.arena_.node(prev).is_element() => Ok(Cursor {
                node_: prev,
                list_: cursor.list_,
            }),
            _ => Err(Error::OutOfBounds),
        }
    }

    /// Dereferences `cursor`.
    pub fn value(&self, cursor: Cursor) -> Result<&T, Error> {
        match self.resolve(cursor)?.value_ {
            Some(key) => Ok(self.arena_.value(key)),
            None => Err(Error::OutOfBounds),
        }
    }

    /// Borrowing in-order traversal of the base level.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }
}

/// Double-ended borrowing iterator over the elements of a [`SkipList`], in
/// order. Walks the base level only.
pub struct Iter<'a, T> {
    list_: &'a SkipList<T>,
    front_: Option<NodeId>,
    back_: Option<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    fn new(list: &'a SkipList<T>) -> Iter<'a, T> {
        let front = list
            .arena_
            .node(list.base_head())
            .next_
            .filter(|&id| list.arena_.node(id).is_element());
        let back = list
            .arena_
            .node(list.base_tail())
            .prev_
            .filter(|&id| list.arena_.node(id).is_element());

        Iter {
            list_: list,
            front_: front,
            back_: back,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.front_?;
        let node = self.list_.arena_.node(id);

        if self.back_ == Some(id) {
            self.front_ = None;
            self.back_ = None;
        } else {
            self.front_ = node.next_;
        }

        node.value_.map(|key| self.list_.arena_.value(key))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        let id = self.back_?;
        let node = self.list_.arena_.node(id);

        if self.front_ == Some(id) {
            self.front_ = None;
            self.back_ = None;
        } else {
            self.back_ = node.prev_;
        }

        node.value_.map(|key| self.list_.arena_.value(key))
    }
}
