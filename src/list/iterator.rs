use crate::list::{List, Node, NodeRef};
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// The direction a [`NodeIter`] walks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the head to the tail.
    Forward,
    /// From the tail to the head.
    Backward,
}

/// A node iterator over a `List`, yielding [`NodeRef`] handles.
///
/// Unlike [`Iter`], a `NodeIter` does not borrow the list. This is what makes
/// it possible to delete the nodes it yields while iterating; in exchange,
/// stepping it is `unsafe` (see [`NodeIter::next`]).
///
/// A `NodeIter` owns nothing: dropping it releases it. It can be reset in place
/// with [`List::rewind`] and [`List::rewind_tail`].
pub struct NodeIter<T> {
    next: Option<NonNull<Node<T>>>,
    sentinel: NonNull<Node<T>>,
    direction: Direction,
}

impl<T> NodeIter<T> {
    pub(crate) fn new(list: &List<T>, direction: Direction) -> Self {
        let start = match direction {
            Direction::Forward => list.head_ptr(),
            Direction::Backward => list.tail_ptr(),
        };
        Self {
            next: list.handle(start).map(|node| node.ptr),
            sentinel: list.sentinel(),
            direction,
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the node under the cursor and moves the cursor on, or returns
    /// `None` once the iteration is exhausted (and keeps returning `None`).
    ///
    /// The cursor moves to the following node *before* the current one is
    /// returned, so the caller may delete the returned node (and only that one)
    /// before calling `next` again.
    ///
    /// # Safety
    ///
    /// The list this iterator was created from (or last rewound with) must be
    /// alive, and since the previous call no node of it may have been removed
    /// except the one returned by that call.
    pub unsafe fn next(&mut self) -> Option<NodeRef<T>> {
        let current = self.next?;
        let following = match self.direction {
            Direction::Forward => current.as_ref().next,
            Direction::Backward => current.as_ref().prev,
        };
        self.next = Some(following).filter(|&node| node != self.sentinel);
        Some(NodeRef { ptr: current })
    }
}

impl<T> fmt::Debug for NodeIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeIter")
            .field("next", &self.next)
            .field("direction", &self.direction)
            .finish()
    }
}

/// The not yet visited nodes of a value iterator: `remaining` nodes starting
/// at `head` and ending at `tail`. Counting, not comparing the ends, tells when
/// the walk is over, so both ends can be consumed.
struct Walk<T> {
    head: NonNull<Node<T>>,
    tail: NonNull<Node<T>>,
    remaining: usize,
}

impl<T> Walk<T> {
    fn over(list: &List<T>) -> Self {
        Self {
            head: list.head_ptr(),
            tail: list.tail_ptr(),
            remaining: list.len,
        }
    }

    /// The caller must keep the walked list alive and its links untouched.
    unsafe fn pop_head(&mut self) -> Option<NonNull<Node<T>>> {
        self.remaining = self.remaining.checked_sub(1)?;
        let node = self.head;
        self.head = node.as_ref().next;
        Some(node)
    }

    unsafe fn pop_tail(&mut self) -> Option<NonNull<Node<T>>> {
        self.remaining = self.remaining.checked_sub(1)?;
        let node = self.tail;
        self.tail = node.as_ref().prev;
        Some(node)
    }
}

impl<T> Clone for Walk<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            remaining: self.remaining,
        }
    }
}

/// Shared references to the values of a [`List`], from either end.
///
/// Created by [`List::iter`].
pub struct Iter<'a, T> {
    walk: Walk<T>,
    _list: PhantomData<&'a List<T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(list: &'a List<T>) -> Self {
        Self {
            walk: Walk::over(list),
            _list: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            walk: self.walk.clone(),
            _list: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        // SAFETY: the list is borrowed for `'a`, so its nodes stay put.
        unsafe { self.walk.pop_head().map(|node| &(*node.as_ptr()).value) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        // SAFETY: as in `next`.
        unsafe { self.walk.pop_tail().map(|node| &(*node.as_ptr()).value) }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable references to the values of a [`List`]. The links cannot change
/// while it is alive.
///
/// Created by [`List::iter_mut`].
pub struct IterMut<'a, T> {
    walk: Walk<T>,
    _list: PhantomData<&'a mut List<T>>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(list: &'a mut List<T>) -> Self {
        Self {
            walk: Walk::over(list),
            _list: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        // SAFETY: the list is borrowed mutably for `'a` and the walk hands out
        // every node at most once.
        unsafe { self.walk.pop_head().map(|node| &mut (*node.as_ptr()).value) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        // SAFETY: as in `next`.
        unsafe { self.walk.pop_tail().map(|node| &mut (*node.as_ptr()).value) }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Moves the values out of a [`List`].
///
/// Yielded values bypass the `free` hook; the ones still inside when the
/// iterator is dropped go through it as usual.
#[derive(Debug)]
pub struct IntoIter<T>(List<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        Iter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a mut List<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        IterMut::new(self)
    }
}

/// Collects into a list without hooks. Aborts on allocation failure.
impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut list = Self::new();
        list.extend(values);
        list
    }
}

/// Appends at the tail. Aborts on allocation failure.
impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for List<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, values: I) {
        for &value in values {
            self.push_back(value);
        }
    }
}
