use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use crate::error::Error;
use crate::list::hooks::Hooks;
use crate::list::iterator::{Direction, Iter, IterMut, NodeIter};

pub mod hooks;
pub mod iterator;

mod algorithms;

/// A doubly-linked list of owned nodes, closed into a ring by a sentinel node.
///
/// Besides the usual value-level API, every node of the list can be designated by a
/// [`NodeRef`] handle, returned by [`first`], [`last`], [`index`], [`search_key`] and
/// the [`NodeIter`] node iterator. Handles allow inserting next to and deleting any
/// node in constant time.
///
/// A list carries [`Hooks`] that customize how its values are duplicated
/// ([`dup`]), released when the list disposes of them, and matched by
/// [`search_key`].
///
/// [`first`]: List::first
/// [`last`]: List::last
/// [`index`]: List::index
/// [`search_key`]: List::search_key
/// [`dup`]: List::dup
pub struct List<T> {
    sentinel: NonNull<Node<T>>,
    pub(crate) len: usize,
    pub(crate) hooks: Hooks<T>,
    _owns: PhantomData<Box<Node<T>>>,
}

/// A link cell. The sentinel is a `Node` whose `value` is never initialized.
#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) next: NonNull<Node<T>>,
    pub(crate) prev: NonNull<Node<T>>,
    pub(crate) value: T,
}

/// A handle to a node of a [`List`].
///
/// A `NodeRef` is a plain copyable pointer: it does not borrow the list and it
/// does not own the node. It stays valid as long as the node is linked in a list,
/// including after the node moves to another list by [`List::join`].
///
/// Obtaining a handle is safe; using one is not. Every operation dereferencing a
/// handle is an `unsafe fn` whose contract is that the handle designates a node
/// currently linked in the list it is passed to. With the opt-in `debug-checks`
/// feature, debug builds verify the contract and panic on violation.
pub struct NodeRef<T> {
    pub(crate) ptr: NonNull<Node<T>>,
}

/// Where [`List::insert_node`] puts the new node relative to the given one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Between the given node and its predecessor (or the head position).
    Before,
    /// Between the given node and its successor (or the tail position).
    After,
}

/// A run of nodes `first..=last` cut out of a list.
///
/// `first.prev` and `last.next` are stale until the run is spliced in again.
pub(crate) struct Span<T> {
    first: NonNull<Node<T>>,
    last: NonNull<Node<T>>,
    len: usize,
}

// link surgery, shared by every mutation
impl<T> List<T> {
    #[inline]
    pub(crate) fn sentinel(&self) -> NonNull<Node<T>> {
        self.sentinel
    }

    #[inline]
    pub(crate) fn head_ptr(&self) -> NonNull<Node<T>> {
        // SAFETY: the sentinel lives as long as the list and its links are always set.
        unsafe { self.sentinel.as_ref().next }
    }

    #[inline]
    pub(crate) fn tail_ptr(&self) -> NonNull<Node<T>> {
        // SAFETY: as in `head_ptr`.
        unsafe { self.sentinel.as_ref().prev }
    }

    /// Wraps `node` into a handle; the sentinel maps to `None`.
    pub(crate) fn handle(&self, node: NonNull<Node<T>>) -> Option<NodeRef<T>> {
        if node == self.sentinel {
            None
        } else {
            Some(NodeRef { ptr: node })
        }
    }

    /// Takes `node` out of the ring. The node keeps its value and its memory.
    ///
    /// `node` must be an element node of this list.
    pub(crate) unsafe fn unlink(&mut self, node: NonNull<Node<T>>) -> NonNull<Node<T>> {
        let Node { prev, next, .. } = *node.as_ptr();
        connect(prev, next);
        self.len -= 1;
        node
    }

    /// Puts the free-standing `node` between `prev` and `next`.
    ///
    /// `prev` and `next` must be neighbours in this list (the sentinel counts).
    pub(crate) unsafe fn link(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        node: NonNull<Node<T>>,
    ) {
        debug_check_neighbours(prev, next);
        connect(prev, node);
        connect(node, next);
        self.len += 1;
    }

    /// Allocates a node for `value` and links it between `prev` and `next`.
    /// When the allocation fails the list is unchanged and `value` comes back.
    ///
    /// Same requirement as [`List::link`].
    pub(crate) unsafe fn link_value(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        value: T,
    ) -> Result<NonNull<Node<T>>, T> {
        let node = Node::boxed(value)?;
        self.link(prev, next, node);
        Ok(node)
    }

    /// Puts a whole span between the neighbours `prev` and `next`.
    pub(crate) unsafe fn splice(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        span: Span<T>,
    ) {
        debug_check_neighbours(prev, next);
        connect(prev, span.first);
        connect(span.last, next);
        self.len += span.len;
    }

    /// Cuts every element node out of the list, or returns `None` if there is none.
    pub(crate) fn take_all(&mut self) -> Option<Span<T>> {
        if self.len == 0 {
            return None;
        }
        let span = Span {
            first: self.head_ptr(),
            last: self.tail_ptr(),
            len: self.len,
        };
        // SAFETY: a sentinel linked to itself is a well-formed empty ring.
        unsafe { connect(self.sentinel, self.sentinel) };
        self.len = 0;
        Some(span)
    }

    #[cfg(all(debug_assertions, feature = "debug-checks"))]
    fn assert_owned(&self, node: NodeRef<T>) {
        let mut cursor = self.head_ptr();
        while cursor != self.sentinel {
            if cursor == node.ptr {
                return;
            }
            // SAFETY: every node reached from the sentinel is alive.
            cursor = unsafe { cursor.as_ref().next };
        }
        panic!("node handle does not belong to this list");
    }

    #[cfg(not(all(debug_assertions, feature = "debug-checks")))]
    #[inline(always)]
    fn assert_owned(&self, _node: NodeRef<T>) {}
}

impl<T> List<T> {
    /// An empty list without hooks.
    ///
    /// Aborts through [`handle_alloc_error`] if the sentinel node cannot be
    /// allocated; see [`List::try_new`] for the fallible version.
    #[inline]
    pub fn new() -> Self {
        Self::with_hooks(Hooks::new())
    }

    /// An empty list without hooks, or the allocation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    ///
    /// let list = List::<String>::try_new()?;
    /// assert_eq!((list.len(), list.first()), (0, None));
    /// # Ok::<(), hooked_list::Error>(())
    /// ```
    #[inline]
    pub fn try_new() -> Result<Self, Error> {
        Self::try_with_hooks(Hooks::new())
    }

    /// An empty list governed by `hooks`.
    pub fn with_hooks(hooks: Hooks<T>) -> Self {
        match Self::try_with_hooks(hooks) {
            Ok(list) => list,
            Err(_) => handle_alloc_error(Node::<T>::layout()),
        }
    }

    /// An empty list governed by `hooks`, or the allocation failure.
    pub fn try_with_hooks(hooks: Hooks<T>) -> Result<Self, Error> {
        Ok(Self {
            sentinel: new_sentinel()?,
            len: 0,
            hooks,
            _owns: PhantomData,
        })
    }

    #[inline]
    pub fn hooks(&self) -> &Hooks<T> {
        &self.hooks
    }

    /// Mutable access to the hooks, e.g. to remove one of them.
    #[inline]
    pub fn hooks_mut(&mut self) -> &mut Hooks<T> {
        &mut self.hooks
    }

    /// Installs the duplicate hook used by [`List::dup`].
    pub fn set_dup<F>(&mut self, dup: F) -> &mut Self
    where
        F: Fn(&T) -> Option<T> + 'static,
    {
        self.hooks.dup = Some(Rc::new(dup));
        self
    }

    /// Installs the hook receiving every value the list disposes of.
    pub fn set_free<F>(&mut self, free: F) -> &mut Self
    where
        F: Fn(T) + 'static,
    {
        self.hooks.free = Some(Rc::new(free));
        self
    }

    /// Installs the matcher used by [`List::search_key`].
    pub fn set_matcher<F>(&mut self, matcher: F) -> &mut Self
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        self.hooks.matcher = Some(Rc::new(matcher));
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of values, kept up to date by every operation. *O*(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Disposes of every value, head first, through the `free` hook when there
    /// is one. The list stays usable; clearing it again does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let freed = Rc::new(Cell::new(0));
    /// let mut list = List::new();
    /// list.set_free({
    ///     let freed = Rc::clone(&freed);
    ///     move |v: u8| freed.set(freed.get() + v)
    /// });
    ///
    /// list.extend([3, 4]);
    /// list.clear();
    /// assert_eq!((list.len(), freed.get()), (0, 7));
    /// ```
    pub fn clear(&mut self) {
        while let Some(head) = self.first() {
            // SAFETY: `head` is linked in this list.
            let value = unsafe { Node::unbox(self.unlink(head.ptr)) };
            self.hooks.release(value);
        }
    }

    /// The head node, or `None` if the list is empty.
    #[inline]
    pub fn first(&self) -> Option<NodeRef<T>> {
        self.handle(self.head_ptr())
    }

    /// The tail node, or `None` if the list is empty.
    #[inline]
    pub fn last(&self) -> Option<NodeRef<T>> {
        self.handle(self.tail_ptr())
    }

    /// The head value.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        // SAFETY: the handle was just taken from this list.
        self.first().map(|node| unsafe { &(*node.ptr.as_ptr()).value })
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the handle was just taken from this list, which is borrowed mutably.
        self.first().map(|node| unsafe { &mut (*node.ptr.as_ptr()).value })
    }

    /// The tail value.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        // SAFETY: the handle was just taken from this list.
        self.last().map(|node| unsafe { &(*node.ptr.as_ptr()).value })
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the handle was just taken from this list, which is borrowed mutably.
        self.last().map(|node| unsafe { &mut (*node.ptr.as_ptr()).value })
    }

    /// Makes `value` the new head, in *O*(1).
    ///
    /// Returns the list for chaining. If the node cannot be allocated the list
    /// is left unmodified, `value` is dropped and [`Error::Alloc`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    ///
    /// let mut list = List::new();
    /// list.add_node_head('b')?.add_node_head('a')?.add_node_tail('c')?;
    /// assert_eq!(list.iter().collect::<String>(), "abc");
    /// # Ok::<(), hooked_list::Error>(())
    /// ```
    pub fn add_node_head(&mut self, value: T) -> Result<&mut Self, Error> {
        // SAFETY: the sentinel and the head are neighbours.
        unsafe { self.link_value(self.sentinel, self.head_ptr(), value) }
            .map_err(|_| Node::<T>::alloc_error())?;
        Ok(self)
    }

    /// Makes `value` the new tail, in *O*(1). Failure behaves as in
    /// [`List::add_node_head`].
    pub fn add_node_tail(&mut self, value: T) -> Result<&mut Self, Error> {
        // SAFETY: the tail and the sentinel are neighbours.
        unsafe { self.link_value(self.tail_ptr(), self.sentinel, value) }
            .map_err(|_| Node::<T>::alloc_error())?;
        Ok(self)
    }

    /// Inserts a new node holding `value` right before or right after `node`.
    ///
    /// Inserting before the head or after the tail makes the new node the new
    /// head or tail. Returns the list for chaining; on allocation failure the
    /// list is left unmodified and `value` is dropped.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::{List, Side};
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([10, 30]);
    /// let anchor = list.first().unwrap();
    /// unsafe {
    ///     list.insert_node(anchor, 20, Side::After)?;
    ///     list.insert_node(anchor, 0, Side::Before)?;
    /// }
    /// assert!(list.iter().eq(&[0, 10, 20, 30]));
    /// # Ok::<(), hooked_list::Error>(())
    /// ```
    pub unsafe fn insert_node(
        &mut self,
        node: NodeRef<T>,
        value: T,
        side: Side,
    ) -> Result<&mut Self, Error> {
        self.assert_owned(node);
        let anchor = node.ptr;
        let (prev, next) = match side {
            Side::Before => (anchor.as_ref().prev, anchor),
            Side::After => (anchor, anchor.as_ref().next),
        };
        self.link_value(prev, next, value)
            .map_err(|_| Node::<T>::alloc_error())?;
        Ok(self)
    }

    /// Removes `node` from the list, hands its value to the `free` hook (or
    /// drops it) and frees the node.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list. The handle is
    /// dangling afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(["keep", "drop", "keep"]);
    /// let node = list.index(1).unwrap();
    /// unsafe { list.del_node(node) };
    /// assert_eq!(format!("{:?}", list), r#"["keep", "keep"]"#);
    /// ```
    pub unsafe fn del_node(&mut self, node: NodeRef<T>) {
        let value = self.unlink_node(node);
        self.hooks.release(value);
    }

    /// Removes `node` from the list and returns its value to the caller,
    /// without going through the `free` hook.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list. The handle is
    /// dangling afterwards.
    pub unsafe fn unlink_node(&mut self, node: NodeRef<T>) -> T {
        self.assert_owned(node);
        Node::unbox(self.unlink(node.ptr))
    }

    /// The value held by `node`.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list.
    pub unsafe fn value(&self, node: NodeRef<T>) -> &T {
        self.assert_owned(node);
        &(*node.ptr.as_ptr()).value
    }

    /// The value held by `node`, mutably.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list.
    pub unsafe fn value_mut(&mut self, node: NodeRef<T>) -> &mut T {
        self.assert_owned(node);
        &mut (*node.ptr.as_ptr()).value
    }

    /// The node after `node`, or `None` if `node` is the tail.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list.
    pub unsafe fn next_node(&self, node: NodeRef<T>) -> Option<NodeRef<T>> {
        self.assert_owned(node);
        self.handle(node.ptr.as_ref().next)
    }

    /// The node before `node`, or `None` if `node` is the head.
    ///
    /// # Safety
    ///
    /// `node` must be a node currently linked in this list.
    pub unsafe fn prev_node(&self, node: NodeRef<T>) -> Option<NodeRef<T>> {
        self.assert_owned(node);
        self.handle(node.ptr.as_ref().prev)
    }

    /// [`List::add_node_head`] that aborts on allocation failure.
    pub fn push_front(&mut self, value: T) {
        if self.add_node_head(value).is_err() {
            handle_alloc_error(Node::<T>::layout());
        }
    }

    /// [`List::add_node_tail`] that aborts on allocation failure.
    pub fn push_back(&mut self, value: T) {
        if self.add_node_tail(value).is_err() {
            handle_alloc_error(Node::<T>::layout());
        }
    }

    /// Takes the head value out of the list. It goes to the caller, not to the
    /// `free` hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2]);
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_back(), Some(2));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.first()?;
        // SAFETY: `head` is linked in this list.
        Some(unsafe { Node::unbox(self.unlink(head.ptr)) })
    }

    /// Takes the tail value out of the list, like [`List::pop_front`].
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.last()?;
        // SAFETY: `tail` is linked in this list.
        Some(unsafe { Node::unbox(self.unlink(tail.ptr)) })
    }

    /// Borrows the values, head to tail. The iterator is double-ended.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Borrows the values mutably, head to tail.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Provides a node iterator starting at the head (`Direction::Forward`)
    /// or at the tail (`Direction::Backward`).
    ///
    /// See [`NodeIter::next`] for the deletion-while-iterating contract.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::{Direction, List};
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(0..6);
    /// let mut iter = list.node_iter(Direction::Backward);
    /// unsafe {
    ///     while let Some(node) = iter.next() {
    ///         if list.value(node) % 2 == 1 {
    ///             list.del_node(node);
    ///         }
    ///     }
    /// }
    /// assert!(list.iter().eq(&[0, 2, 4]));
    /// ```
    #[inline]
    pub fn node_iter(&self, direction: Direction) -> NodeIter<T> {
        NodeIter::new(self, direction)
    }

    /// Resets `iter` to walk this list from the head, forwards.
    pub fn rewind(&self, iter: &mut NodeIter<T>) {
        *iter = NodeIter::new(self, Direction::Forward);
    }

    /// Resets `iter` to walk this list from the tail, backwards.
    pub fn rewind_tail(&self, iter: &mut NodeIter<T>) {
        *iter = NodeIter::new(self, Direction::Backward);
    }

    /// Moves every node of `other` after the tail of `self`, in *O*(1), leaving
    /// `other` empty.
    ///
    /// Nodes are relinked, not reallocated: no value is copied or released and
    /// handles to the moved nodes are now handles of `self`. From then on the
    /// moved values are governed by the hooks of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut words = List::from_iter(["x"]);
    /// let mut more = List::from_iter(["y", "z"]);
    /// let y = more.first();
    ///
    /// words.join(&mut more);
    /// assert!(more.is_empty());
    /// assert_eq!(words.index(1), y);
    /// assert_eq!(words.len(), 3);
    /// ```
    pub fn join(&mut self, other: &mut Self) {
        if let Some(span) = other.take_all() {
            // SAFETY: the tail and the sentinel of `self` are neighbours.
            unsafe { self.splice(self.tail_ptr(), self.sentinel, span) }
        }
    }
}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: `new_sentinel` allocated it with this layout, and it holds no value.
        unsafe { dealloc(self.sentinel.as_ptr().cast(), Node::<T>::layout()) }
    }
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<T> {}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for NodeRef<T> {}

impl<T> Hash for NodeRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state)
    }
}

impl<T> Debug for NodeRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.ptr).finish()
    }
}

impl<T> Node<T> {
    pub(crate) fn layout() -> Layout {
        Layout::new::<Self>()
    }

    pub(crate) fn alloc_error() -> Error {
        Error::Alloc {
            size: Self::layout().size(),
        }
    }

    /// A free-standing node holding `value`, or `value` back if there is no
    /// memory. Its links dangle until it is linked.
    pub(crate) fn boxed(value: T) -> Result<NonNull<Self>, T> {
        let node = match allocate::<T>() {
            Some(node) => node,
            None => return Err(value),
        };
        // SAFETY: fresh memory with the layout of `Node<T>`.
        unsafe {
            node.as_ptr().write(Node {
                next: NonNull::dangling(),
                prev: NonNull::dangling(),
                value,
            })
        };
        Ok(node)
    }

    /// Frees an unlinked node made by [`Node::boxed`] and returns its value.
    pub(crate) unsafe fn unbox(node: NonNull<Self>) -> T {
        // `allocate` uses the global allocator with `Layout::new::<Node<T>>()`,
        // which is what `Box<Node<T>>` expects.
        Box::from_raw(node.as_ptr()).value
    }
}

fn allocate<T>() -> Option<NonNull<Node<T>>> {
    #[cfg(test)]
    if fault::should_fail() {
        return None;
    }
    // SAFETY: `Node<T>` holds two pointers, so its size is never zero.
    NonNull::new(unsafe { alloc(Node::<T>::layout()) }.cast())
}

/// Allocates a sentinel: a node whose links point at itself and whose value
/// slot stays uninitialized.
fn new_sentinel<T>() -> Result<NonNull<Node<T>>, Error> {
    let sentinel = allocate::<T>().ok_or_else(Node::<T>::alloc_error)?;
    // SAFETY: only the link fields are written; `value` is never read.
    unsafe {
        ptr::addr_of_mut!((*sentinel.as_ptr()).next).write(sentinel);
        ptr::addr_of_mut!((*sentinel.as_ptr()).prev).write(sentinel);
    }
    Ok(sentinel)
}

#[inline]
pub(crate) unsafe fn connect<T>(mut prev: NonNull<Node<T>>, mut next: NonNull<Node<T>>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

#[inline]
unsafe fn debug_check_neighbours<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    debug_assert!(
        prev.as_ref().next == next && next.as_ref().prev == prev,
        "nodes are not neighbours"
    );
}
