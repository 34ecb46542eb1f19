//! An ordered multiset skip list.
//!
//! Expected-logarithmic insertion, lookup and removal over a multi-level
//! doubly-linked structure. All nodes live in a generational arena, so the
//! structure has no raw pointers and removed positions are detectable: a
//! [`Cursor`] held across a removal fails with
//! [`Error::InvalidatedIterator`] instead of dangling.
//!
//! Equal elements are kept in arrival order (stable multiset). The ordering
//! relation and the randomness driving level promotion are both injectable;
//! see [`SkipList::with_ordering`] and [`SkipList::with_coin`].

mod arena;
mod error;
mod iter;
mod node;
mod promotion;
mod skiplist;

pub use crate::error::Error;
pub use crate::iter::{Cursor, Iter};
pub use crate::promotion::{CoinFlip, RandomCoin, ScriptedCoin};
pub use crate::skiplist::SkipList;
