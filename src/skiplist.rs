use crate::arena::{Arena, NodeId};
use crate::iter::Cursor;
use crate::node::Node;
use crate::promotion::{CoinFlip, RandomCoin};

use std::fmt;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-list identities; see `SkipList::id_`.
static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(0);

/// An ordered multiset backed by a skip list.
///
/// The list owns a fixed number of levels, each a doubly-linked sequence
/// bounded by a head and a tail sentinel and chained to the level above
/// through `up`/`down` links at the sentinels. Level 0 holds every element;
/// each higher level holds a probabilistic sample of the one below it.
/// Equal elements are kept in arrival order, oldest first.
pub struct SkipList<T> {
    /// Arena owning every node across all levels plus every element payload.
    pub(crate) arena_: Arena<T>,

    /// Head sentinel of each level; index 0 is the base level.
    heads_: Vec<NodeId>,

    /// Tail sentinel of each level, aligned with `heads_`.
    tails_: Vec<NodeId>,

    /// Identity of this list, stamped into every cursor it hands out. A
    /// cursor presented to a list it was not taken from fails checked access
    /// instead of resolving against an unrelated arena.
    id_: u64,

    /// Number of elements at the base level.
    length_: usize,

    /// Number of levels, fixed at construction. Promotion stops silently at
    /// the topmost level rather than growing the structure.
    height_: usize,

    /// The ordering relation: `comp(a, b)` means "a strictly precedes b".
    /// Equality is derived: `a == b` iff `!comp(a, b) && !comp(b, a)`.
    comp_: Box<dyn Fn(&T, &T) -> bool>,

    /// Coin flip source consulted once per candidate promotion.
    coin_: Box<dyn CoinFlip>,
}

impl<T: Ord> SkipList<T> {
    /// Creates an empty list of the given height under the natural ordering
    /// of `T`, with an entropy-seeded fair coin.
    ///
    /// Panics if `height` is zero.
    pub fn new(height: usize) -> SkipList<T> {
        Self::with_ordering(height, |a: &T, b: &T| a < b)
    }

    /// Natural ordering with a caller-supplied flip source. Seed the coin (or
    /// script it) to make the produced level structure reproducible.
    pub fn with_coin(height: usize, coin: Box<dyn CoinFlip>) -> SkipList<T> {
        Self::assemble(height, Box::new(|a: &T, b: &T| a < b), coin)
    }
}

impl<T> SkipList<T> {
    /// Creates an empty list ordered by `comp`, a "strictly precedes"
    /// relation.
    pub fn with_ordering<F>(height: usize, comp: F) -> SkipList<T>
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        Self::assemble(height, Box::new(comp), Box::new(RandomCoin::new()))
    }

    /// Fully explicit constructor: ordering relation and flip source.
    pub fn with_ordering_and_coin<F>(
        height: usize,
        comp: F,
        coin: Box<dyn CoinFlip>,
    ) -> SkipList<T>
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        Self::assemble(height, Box::new(comp), coin)
    }

    fn assemble(
        height: usize,
        comp: Box<dyn Fn(&T, &T) -> bool>,
        coin: Box<dyn CoinFlip>,
    ) -> SkipList<T> {
        assert!(height >= 1, "a skip list needs at least its base level");

        let mut arena = Arena::new();
        let mut heads = Vec::with_capacity(height);
        let mut tails = Vec::with_capacity(height);

        // One head/tail pair per level, linked horizontally within the level
        // and vertically to the pair below.
        for level in 0..height {
            let head = arena.alloc(Node::sentinel());
            let tail = arena.alloc(Node::sentinel());
            arena.node_mut(head).next_ = Some(tail);
            arena.node_mut(tail).prev_ = Some(head);

            if level > 0 {
                let head_below = heads[level - 1];
                let tail_below = tails[level - 1];
                arena.node_mut(head).down_ = Some(head_below);
                arena.node_mut(head_below).up_ = Some(head);
                arena.node_mut(tail).down_ = Some(tail_below);
                arena.node_mut(tail_below).up_ = Some(tail);
            }

            heads.push(head);
            tails.push(tail);
        }

        SkipList {
            arena_: arena,
            heads_: heads,
            tails_: tails,
            id_: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            length_: 0,
            height_: height,
            comp_: comp,
            coin_: coin,
        }
    }

    /// Returns the number of elements stored in the structure.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length_
    }

    /// Returns `true` if there are no elements stored within the structure.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length_ == 0
    }

    /// Returns the number of levels, as fixed at construction.
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height_
    }

    #[inline(always)]
    pub(crate) fn base_head(&self) -> NodeId {
        self.heads_[0]
    }

    #[inline(always)]
    pub(crate) fn base_tail(&self) -> NodeId {
        self.tails_[0]
    }

    #[inline(always)]
    pub(crate) fn list_id(&self) -> u64 {
        self.id_
    }

    /// Does the node at `id` strictly precede `probe`? Heads precede
    /// everything and tails precede nothing, so the descent never has to
    /// special-case the ends of a level.
    fn precedes(&self, id: NodeId, probe: &T) -> bool {
        let node = self.arena_.node(id);
        match node.value_ {
            Some(key) => (self.comp_)(self.arena_.value(key), probe),
            None => node.prev_.is_none(),
        }
    }

    /// Is the node at `id` an element equal to `probe`? Symmetric double
    /// check; sentinels are never equal to anything.
    fn element_equals(&self, id: NodeId, probe: &T) -> bool {
        match self.arena_.node(id).value_ {
            Some(key) => {
                let value = self.arena_.value(key);
                !(self.comp_)(value, probe) && !(self.comp_)(probe, value)
            }
            None => false,
        }
    }

    /// Finds the base-level node immediately preceding the first position
    /// where `probe` would be inserted.
    ///
    /// Starts at the top level's head. While the next node strictly precedes
    /// `probe`, advance; otherwise drop a level. Reaching a node with no
    /// `down` link means the base level, where only horizontal advancement
    /// remains. Shared by insertion, lookup and removal.
    fn find_lower_bound(&self, probe: &T) -> NodeId {
        let mut current = self.heads_[self.height_ - 1];

        loop {
            let node = self.arena_.node(current);
            match node.next_ {
                // Tails precede nothing, so the walk never stands on one.
                None => unreachable!("descent walked onto a tail sentinel"),
                Some(next) => {
                    if self.precedes(next, probe) {
                        current = next;
                    } else {
                        match node.down_ {
                            Some(down) => current = down,
                            None => return current,
                        }
                    }
                }
            }
        }
    }

    /// Splices `node` between `pred` and `pred`'s successor on `pred`'s
    /// level. `pred` is never a tail, so a successor always exists.
    fn splice_after(&mut self, pred: NodeId, node: NodeId) {
        let next = self.arena_.node(pred).next_;
        self.arena_.node_mut(node).next_ = next;
        self.arena_.node_mut(node).prev_ = Some(pred);
        if let Some(next) = next {
            self.arena_.node_mut(next).prev_ = Some(node);
        }
        self.arena_.node_mut(pred).next_ = Some(node);
    }

    /// Inserts `value`. Always succeeds; equal duplicates are kept and the
    /// new occurrence is placed after every equal element already present.
    pub fn insert(&mut self, value: T) {
        let mut pred = self.find_lower_bound(&value);

        // The lower bound precedes the first equal element, if any. Walk past
        // the equal run so arrival order is preserved, oldest first.
        loop {
            match self.arena_.node(pred).next_ {
                Some(next) if self.element_equals(next, &value) => pred = next,
                _ => break,
            }
        }

        let key = self.arena_.store_value(value);
        let node = self.arena_.alloc(Node::element(key));
        self.splice_after(pred, node);
        self.length_ += 1;

        // Promotion: while the coin lands heads, climb one level. The nearest
        // ancestor with an `up` link marks where the copy goes; every head
        // has one except at the topmost level, so running out of ancestors
        // means the top of the structure was reached.
        let mut newest = node;
        let mut probe = Some(pred);
        while self.coin_.flip() {
            let upper_pred = loop {
                match probe {
                    None => break None,
                    Some(id) => match self.arena_.node(id).up_ {
                        Some(up) => break Some(up),
                        None => probe = self.arena_.node(id).prev_,
                    },
                }
            };

            let upper_pred = match upper_pred {
                Some(id) => id,
                None => break,
            };

            let copy = self.arena_.alloc(Node::element(key));
            self.splice_after(upper_pred, copy);
            self.arena_.node_mut(copy).down_ = Some(newest);
            self.arena_.node_mut(newest).up_ = Some(copy);

            newest = copy;
            probe = Some(upper_pred);
        }
    }

    /// Returns a cursor at a base-level element equal to `probe`, or a cursor
    /// equal to [`end`](Self::end) if there is none. With equal duplicates
    /// present, the oldest occurrence is found.
    pub fn find(&self, probe: &T) -> Cursor {
        let pred = self.find_lower_bound(probe);
        match self.arena_.node(pred).next_ {
            Some(next) if self.element_equals(next, probe) => Cursor {
                node_: next,
                list_: self.id_,
            },
            _ => self.end(),
        }
    }

    /// Returns `true` if some element equals `probe`.
    #[inline(always)]
    pub fn contains(&self, probe: &T) -> bool {
        self.find(probe) != self.end()
    }

    /// Removes one occurrence equal to `probe` (the oldest, with duplicates
    /// present), unlinking every vertical copy the element was promoted to.
    /// Returns `false` without touching the structure if no element matches.
    pub fn remove(&mut self, probe: &T) -> bool {
        let pred = self.find_lower_bound(probe);
        let victim = match self.arena_.node(pred).next_ {
            Some(next) if self.element_equals(next, probe) => next,
            _ => return false,
        };

        // The payload lives once in the arena, keyed from every vertical
        // copy; release it at the base copy only.
        if let Some(key) = self.arena_.node(victim).value_ {
            self.arena_.take_value(key);
        }

        let mut current = Some(victim);
        while let Some(id) = current {
            let (prev, next, up) = {
                let node = self.arena_.node(id);
                (node.prev_, node.next_, node.up_)
            };
            if let Some(prev) = prev {
                self.arena_.node_mut(prev).next_ = next;
            }
            if let Some(next) = next {
                self.arena_.node_mut(next).prev_ = prev;
            }
            self.arena_.free(id);
            current = up;
        }

        self.length_ -= 1;
        true
    }

    /// First element of `level`, if the level holds any.
    fn first_element(&self, level: usize) -> Option<NodeId> {
        self.arena_
            .node(self.heads_[level])
            .next_
            .filter(|&id| self.arena_.node(id).is_element())
    }

    /// Successor of `id` on its own level, skipping the tail sentinel.
    fn next_element(&self, id: NodeId) -> Option<NodeId> {
        self.arena_
            .node(id)
            .next_
            .filter(|&next| self.arena_.node(next).is_element())
    }

    /// Base-level copy of the element at `id`.
    fn base_of(&self, mut id: NodeId) -> NodeId {
        while let Some(down) = self.arena_.node(id).down_ {
            id = down;
        }
        id
    }
}

impl<T: fmt::Display> SkipList<T> {
    /// Renders every level, sparsest first, with columns aligned to the base
    /// sequence and `-` marking elements absent from a level. Diagnostic
    /// only; the format is not stable.
    pub fn dump(&self) -> String {
        let mut base_ids = Vec::with_capacity(self.length_);
        let mut walk = self.first_element(0);
        while let Some(id) = walk {
            base_ids.push(id);
            walk = self.next_element(id);
        }

        let mut out = String::new();
        for level in (0..self.height_).rev() {
            out.push_str("[h]");
            let mut level_walk = self.first_element(level);
            for &base_id in &base_ids {
                let present = matches!(level_walk, Some(copy) if self.base_of(copy) == base_id);
                if present {
                    if let Some(key) = self.arena_.node(base_id).value_ {
                        let _ = write!(out, "\t{}", self.arena_.value(key));
                    }
                    level_walk = level_walk.and_then(|copy| self.next_element(copy));
                } else {
                    out.push_str("\t-");
                }
            }
            out.push_str("\t[t]\n");
        }
        out
    }
}

impl<T: fmt::Display> fmt::Display for SkipList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        for value in self.iter() {
            write!(f, "{} ", value)?;
        }
        write!(f, "]")
    }
}

impl<T: Ord> Default for SkipList<T> {
    #[inline(always)]
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
impl<T> SkipList<T> {
    /// Asserts every structural invariant: per-level link symmetry and
    /// ordering, vertical alignment, and counter accuracy.
    pub(crate) fn verify(&self) {
        let mut base_population = 0;

        for level in 0..self.height_ {
            let head = self.heads_[level];
            let tail = self.tails_[level];
            assert!(self.arena_.node(head).is_head());
            assert!(self.arena_.node(tail).is_tail());

            let mut current = head;
            while let Some(next) = self.arena_.node(current).next_ {
                // Doubly-linked symmetry.
                assert_eq!(self.arena_.node(next).prev_, Some(current));

                // Ordering: a successor never strictly precedes its
                // predecessor (equal runs are allowed).
                if let (Some(a), Some(b)) =
                    (self.arena_.node(current).value_, self.arena_.node(next).value_)
                {
                    assert!(!(self.comp_)(self.arena_.value(b), self.arena_.value(a)));
                }

                if level == 0 && self.arena_.node(next).is_element() {
                    base_population += 1;
                }

                current = next;
            }
            assert_eq!(current, tail);
        }

        assert_eq!(base_population, self.length_);

        // Vertical consistency: every element above the base aligns, through
        // reciprocal up/down links, with a copy of the same payload below.
        for level in 1..self.height_ {
            let mut walk = self.first_element(level);
            while let Some(id) = walk {
                let node = self.arena_.node(id);
                let down = match node.down_ {
                    Some(down) => down,
                    None => panic!("element above the base level lacks a down link"),
                };
                let below = self.arena_.node(down);
                assert_eq!(below.up_, Some(id));
                assert_eq!(below.value_, node.value_);
                walk = self.next_element(id);
            }
        }

        // Base elements sit at the bottom of their towers.
        let mut walk = self.first_element(0);
        while let Some(id) = walk {
            assert!(self.arena_.node(id).down_.is_none());
            walk = self.next_element(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::promotion::ScriptedCoin;
    use quickcheck::quickcheck;

    fn seeded(height: usize, seed: u64) -> SkipList<i32> {
        SkipList::with_coin(height, Box::new(RandomCoin::seeded(seed)))
    }

    #[test]
    fn new() {
        let list: SkipList<i32> = SkipList::new(4);
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.height(), 4);
        list.verify();
    }

    #[test]
    #[should_panic]
    fn zero_height_rejected() {
        let _list: SkipList<i32> = SkipList::new(0);
    }

    #[test]
    fn insert_find_single() {
        let value = 34;
        let mut list = seeded(8, 1);
        list.insert(value);

        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
        list.verify();

        let cursor = list.find(&value);
        assert_ne!(cursor, list.end());
        assert_eq!(list.value(cursor), Ok(&value));
    }

    #[test]
    fn insert_remove() {
        let value = 12;
        let mut list = seeded(8, 2);

        list.insert(value);
        assert_eq!(list.len(), 1);
        assert!(list.contains(&value));

        assert!(list.remove(&value));
        assert_eq!(list.len(), 0);
        assert!(!list.contains(&value));
        list.verify();
    }

    #[test]
    fn insert_two_remove() {
        let value_1 = 435;
        let value_2 = 555;
        let mut list = seeded(8, 3);

        list.insert(value_1);
        assert_eq!(list.len(), 1);
        assert!(list.contains(&value_1));
        assert!(!list.contains(&value_2));

        list.insert(value_2);
        assert_eq!(list.len(), 2);

        assert!(list.remove(&value_1));
        assert_eq!(list.len(), 1);
        assert!(!list.contains(&value_1));
        assert!(list.contains(&value_2));

        list.insert(value_1);
        assert_eq!(list.len(), 2);

        assert!(list.remove(&value_2));
        assert!(list.remove(&value_1));
        assert_eq!(list.len(), 0);
        list.verify();
    }

    #[test]
    fn remove_empty() {
        let mut list = seeded(8, 4);
        assert!(list.is_empty());
        assert!(!list.remove(&3));
        assert!(!list.remove(&32));
        assert!(!list.remove(&22));
        list.verify();
    }

    #[test]
    fn remove_absent_leaves_structure_intact() {
        let mut list = seeded(8, 5);
        for value in [10, 20, 30] {
            list.insert(value);
        }

        assert!(!list.remove(&25));
        assert_eq!(list.len(), 3);
        list.verify();
        for value in [10, 20, 30] {
            assert!(list.contains(&value));
        }
    }

    #[test]
    fn ints_in_order() {
        let mut list = seeded(5, 6);
        for value in [9, 7, 8, 1, 4, 3, 5] {
            list.insert(value);
        }

        assert_eq!(list.len(), 7);
        let collected: Vec<i32> = list.iter().copied().collect();
        assert_eq!(collected, vec![1, 3, 4, 5, 7, 8, 9]);
        list.verify();
    }

    #[test]
    fn strings_in_order() {
        let mut list: SkipList<String> =
            SkipList::with_ordering_and_coin(10, |a, b| a < b, Box::new(RandomCoin::seeded(7)));
        for value in ["c", "a", "d", "b"] {
            list.insert(value.to_string());
        }

        let collected: Vec<&String> = list.iter().collect();
        assert_eq!(collected, vec!["a", "b", "c", "d"]);
        list.verify();
    }

    #[test]
    fn duplicates_form_stable_multiset() {
        // Distinguish equal values by ordering on the first tuple field only.
        let mut list: SkipList<(i32, &str)> =
            SkipList::with_ordering(8, |a: &(i32, &str), b: &(i32, &str)| a.0 < b.0);

        list.insert((5, "first"));
        list.insert((3, "low"));
        list.insert((5, "second"));
        list.insert((5, "third"));
        assert_eq!(list.len(), 4);
        list.verify();

        let labels: Vec<&str> = list.iter().map(|v| v.1).collect();
        assert_eq!(labels, vec!["low", "first", "second", "third"]);
    }

    #[test]
    fn remove_takes_oldest_duplicate_first() {
        let mut list: SkipList<(i32, &str)> =
            SkipList::with_ordering(8, |a: &(i32, &str), b: &(i32, &str)| a.0 < b.0);

        list.insert((5, "first"));
        list.insert((5, "second"));

        assert!(list.remove(&(5, "")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().map(|v| v.1), Some("second"));
        list.verify();

        assert!(list.remove(&(5, "")));
        assert!(!list.remove(&(5, "")));
        assert!(list.is_empty());
        list.verify();
    }

    #[test]
    fn remove_then_find_with_remaining_duplicate() {
        let mut list = seeded(8, 8);
        list.insert(7);
        list.insert(7);

        assert!(list.remove(&7));
        assert_ne!(list.find(&7), list.end());

        assert!(list.remove(&7));
        assert_eq!(list.find(&7), list.end());
    }

    #[test]
    fn duplicate_heavy_stress_removes_oldest_first() {
        // Arrival stamp in the second field; ordering looks at the first
        // field only, so every key forms a ten-deep equal run.
        let mut list: SkipList<(i32, usize)> = SkipList::with_ordering_and_coin(
            6,
            |a: &(i32, usize), b: &(i32, usize)| a.0 < b.0,
            Box::new(RandomCoin::seeded(21)),
        );
        for stamp in 0..100usize {
            list.insert((stamp as i32 % 10, stamp));
        }
        list.verify();

        for round in 0..10usize {
            for key in 0..10i32 {
                let cursor = list.find(&(key, 0));
                assert_eq!(
                    list.value(cursor).map(|v| v.1),
                    Ok(round * 10 + key as usize)
                );

                assert!(list.remove(&(key, 0)));
                assert_eq!(list.value(cursor), Err(Error::InvalidatedIterator));
            }
            list.verify();
        }
        assert!(list.is_empty());
    }

    #[test]
    fn promotion_follows_the_coin() {
        // Two heads then tails: the single element climbs exactly two levels.
        let script = ScriptedCoin::new([true, true, false]);
        let mut list: SkipList<i32> = SkipList::with_coin(4, Box::new(script));
        list.insert(42);
        list.verify();

        assert_eq!(
            list.dump(),
            "[h]\t-\t[t]\n[h]\t42\t[t]\n[h]\t42\t[t]\n[h]\t42\t[t]\n"
        );
    }

    #[test]
    fn promotion_stops_at_the_top() {
        // The script never stops flipping heads, the height cap does.
        let script = ScriptedCoin::new(std::iter::repeat(true).take(64).collect::<Vec<_>>());
        let mut list: SkipList<i32> = SkipList::with_coin(3, Box::new(script));
        list.insert(1);
        list.verify();

        assert_eq!(list.dump(), "[h]\t1\t[t]\n[h]\t1\t[t]\n[h]\t1\t[t]\n");
    }

    #[test]
    fn same_seed_same_structure() {
        let build = || {
            let mut list = seeded(6, 99);
            for value in [9, 7, 8, 1, 4, 3, 5, 2, 6] {
                list.insert(value);
            }
            list
        };

        assert_eq!(build().dump(), build().dump());
    }

    #[test]
    fn interleaved_operations_keep_invariants() {
        let mut list = seeded(6, 10);
        for value in 0..64 {
            list.insert(value * 7 % 64);
        }
        list.verify();

        for value in (0..64).step_by(3) {
            assert!(list.remove(&value));
        }
        list.verify();

        for value in 0..64 {
            assert_eq!(list.contains(&value), value % 3 != 0);
        }
    }

    #[test]
    fn display_lists_in_order() {
        let mut list = seeded(4, 11);
        for value in [3, 1, 2] {
            list.insert(value);
        }
        assert_eq!(format!("{}", list), "[ 1 2 3 ]");
    }

    quickcheck! {
        fn traversal_is_sorted(values: Vec<i32>, seed: u64) -> bool {
            let mut list = SkipList::with_coin(8, Box::new(RandomCoin::seeded(seed)));
            for &value in &values {
                list.insert(value);
            }
            list.verify();

            let collected: Vec<i32> = list.iter().copied().collect();
            let mut expected = values;
            expected.sort_unstable();
            collected == expected
        }

        fn length_tracks_inserts_and_removes(values: Vec<i8>, seed: u64) -> bool {
            let mut list = SkipList::with_coin(8, Box::new(RandomCoin::seeded(seed)));
            for &value in &values {
                list.insert(value);
            }

            let mut remaining = values.len();
            for &value in &values {
                if list.remove(&value) {
                    remaining -= 1;
                }
            }

            list.verify();
            remaining == 0 && list.is_empty()
        }

        fn find_after_insert(values: Vec<i16>, probe: i16, seed: u64) -> bool {
            let mut list = SkipList::with_coin(8, Box::new(RandomCoin::seeded(seed)));
            for &value in &values {
                list.insert(value);
            }
            list.insert(probe);

            let cursor = list.find(&probe);
            list.value(cursor) == Ok(&probe)
        }

        fn remove_then_find(values: Vec<i8>, probe: i8, seed: u64) -> bool {
            let mut list = SkipList::with_coin(8, Box::new(RandomCoin::seeded(seed)));
            for &value in &values {
                list.insert(value);
            }

            let occurrences = values.iter().filter(|&&v| v == probe).count();
            let removed = list.remove(&probe);
            list.verify();

            let found = list.find(&probe) != list.end();
            match occurrences {
                0 => !removed && !found,
                1 => removed && !found,
                _ => removed && found,
            }
        }
    }
}
