//! This crate provides a doubly-linked list with owned nodes, node handles and
//! per-list value hooks.
//!
//! A [`List`] owns its values, each in a heap node linked to its two
//! neighbours. Holding a [`NodeRef`] to a node lets you insert next to it or
//! remove it in *O*(1); looking a node up by position or by key is a walk,
//! *O*(*n*).
//!
//! ```
//! use hooked_list::{List, Side};
//! use std::iter::FromIterator;
//!
//! let mut list = List::from_iter([1, 2, 4]);
//!
//! let node = list.search_key_or_eq(&2).unwrap();
//! unsafe { list.insert_node(node, 3, Side::After)? };
//! assert_eq!(list, List::from_iter([1, 2, 3, 4]));
//!
//! list.rotate_tail_to_head();
//! assert_eq!(list.get(0), Some(&4));
//! assert_eq!(list.get(-1), Some(&3));
//! # Ok::<(), hooked_list::Error>(())
//! ```
//!
//! # Sentinel
//!
//! The nodes form a ring through one extra node owned by the list, the
//! sentinel, which holds no value:
//!
//! ```text
//! List { sentinel, len: 3, hooks }
//!           |
//!           v
//!     +-> [sentinel] <-> [a] <-> [b] <-> [c] <-+
//!     |                                        |
//!     +------------------- ring ---------------+
//! ```
//!
//! `sentinel.next` is the head and `sentinel.prev` the tail, so an empty list
//! is the sentinel linked to itself and no insertion or removal has a special
//! case. The sentinel never reaches the API: past either end a navigation
//! method returns `None`.
//!
//! # Hooks
//!
//! Each list carries [`Hooks`]: an optional `dup` hook used by [`List::dup`], an
//! optional `free` hook receiving every value the list disposes of ([`clear`],
//! [`del_node`], dropping the list), and an optional `matcher` used by
//! [`search_key`], which otherwise compares by identity. Values handed back to
//! the caller ([`pop_front`], [`unlink_node`], [`IntoIter`]) do not go through
//! `free`. No hook puts a trait bound on the value type.
//!
//! ```
//! use hooked_list::{Hooks, List};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let hooks = Hooks::new().with_free({
//!     let log = Rc::clone(&log);
//!     move |v: &'static str| log.borrow_mut().push(v)
//! });
//!
//! let mut list = List::with_hooks(hooks);
//! list.push_back("kept");
//! list.push_back("freed");
//! assert_eq!(list.pop_front(), Some("kept"));
//! drop(list);
//! assert_eq!(*log.borrow(), vec!["freed"]);
//! ```
//!
//! # Node Handles and Iteration
//!
//! [`Iter`] and [`IterMut`] iterate over the values like the iterators of the
//! standard collections (double-ended, exact-size, fused).
//!
//! A [`NodeIter`] yields node handles instead, in a given [`Direction`]. It moves
//! on before yielding, so the node just yielded may be deleted:
//!
//! ```
//! use hooked_list::{Direction, List};
//! use std::iter::FromIterator;
//!
//! let mut list = List::from_iter(1..=6);
//! let mut iter = list.node_iter(Direction::Forward);
//! unsafe {
//!     while let Some(node) = iter.next() {
//!         if list.value(node) % 2 == 0 {
//!             list.del_node(node);
//!         }
//!     }
//! }
//! assert_eq!(Vec::from_iter(list), vec![1, 3, 5]);
//! ```
//!
//! Handles do not borrow the list, so the operations using them are `unsafe`:
//! a handle must designate a node currently linked in the list it is used with.
//! Enabling the `debug-checks` feature makes debug builds check this on every
//! handle operation, at *O*(*n*) cost, and panic on a foreign or stale handle.
//!
//! [`clear`]: List::clear
//! [`del_node`]: List::del_node
//! [`search_key`]: List::search_key
//! [`pop_front`]: List::pop_front
//! [`unlink_node`]: List::unlink_node

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use list::hooks::{DupFn, FreeFn, Hooks, MatchFn};
#[doc(inline)]
pub use list::iterator::{Direction, IntoIter, Iter, IterMut, NodeIter};
#[doc(inline)]
pub use list::{List, NodeRef, Side};

mod error;
pub mod list;
