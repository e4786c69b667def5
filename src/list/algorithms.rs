use crate::error::Error;
use crate::list::iterator::Direction;
use crate::list::{List, Node, NodeRef};
use std::hash::{Hash, Hasher};
use std::ptr;

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other)
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: Hash> Hash for List<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T> List<T> {
    /// Whether some value equals `x`. The matcher hook is not consulted.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|value| value == x)
    }

    /// Returns the first node, from the head, whose value matches `key`.
    ///
    /// Values are compared with the matcher hook. Without one, a value matches
    /// only if it *is* `key`, i.e. `key` refers to that very value; use
    /// [`List::search_key_or_eq`] to fall back to `==` instead. Not finding
    /// anything is not an error. *O*(*n*).
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(["a", "bb", "ccc"]);
    /// let bb = list.get(1).unwrap();
    /// assert_eq!(list.search_key(bb), list.index(1));
    /// assert_eq!(list.search_key(&"bb"), None);
    ///
    /// list.set_matcher(|value, key| value.len() == key.len());
    /// assert_eq!(list.search_key(&"dd"), list.index(1));
    /// ```
    pub fn search_key(&self, key: &T) -> Option<NodeRef<T>> {
        self.find_node(key, |value, key| ptr::eq(value, key))
    }

    /// Like [`List::search_key`], but without a matcher hook values are
    /// compared with `==`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let list = List::from_iter([1, 2, 3]);
    /// assert_eq!(list.search_key_or_eq(&2), list.index(1));
    /// assert_eq!(list.search_key_or_eq(&9), None);
    /// ```
    pub fn search_key_or_eq(&self, key: &T) -> Option<NodeRef<T>>
    where
        T: PartialEq,
    {
        self.find_node(key, |value, key| value == key)
    }

    fn find_node(&self, key: &T, fallback: fn(&T, &T) -> bool) -> Option<NodeRef<T>> {
        let mut iter = self.node_iter(Direction::Forward);
        // SAFETY: the iterator walks this list, which is not modified meanwhile.
        while let Some(node) = unsafe { iter.next() } {
            let value = unsafe { &(*node.ptr.as_ptr()).value };
            if self.hooks.matches_or(value, key, fallback) {
                return Some(node);
            }
        }
        None
    }

    /// Returns the node at `position`.
    ///
    /// A non-negative `position` counts from the head (`0` is the head); a
    /// negative one counts from the tail (`-1` is the tail). Out of range
    /// positions give `None`. The walk starts from the end the sign selects,
    /// so it takes *O*(*n*).
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let list = List::from_iter('a'..='c');
    /// assert_eq!(list.index(-3), list.first());
    /// assert_eq!(list.index(2), list.last());
    /// assert_eq!((list.index(3), list.index(-4)), (None, None));
    /// ```
    pub fn index(&self, position: isize) -> Option<NodeRef<T>> {
        let (direction, skip) = if position < 0 {
            (Direction::Backward, position.unsigned_abs() - 1)
        } else {
            (Direction::Forward, position.unsigned_abs())
        };
        if skip >= self.len {
            return None;
        }
        let mut iter = self.node_iter(direction);
        // SAFETY: the iterator walks this list, which is not modified meanwhile,
        // and `skip < len` nodes are left to visit.
        unsafe {
            for _ in 0..skip {
                iter.next();
            }
            iter.next()
        }
    }

    /// The value at `position`, with the signed positions of [`List::index`].
    pub fn get(&self, position: isize) -> Option<&T> {
        // SAFETY: the handle was just taken from this list.
        self.index(position)
            .map(|node| unsafe { &(*node.ptr.as_ptr()).value })
    }

    /// The value at `position`, mutably.
    pub fn get_mut(&mut self, position: isize) -> Option<&mut T> {
        // SAFETY: the handle was just taken from this list, which is borrowed mutably.
        self.index(position)
            .map(|node| unsafe { &mut (*node.ptr.as_ptr()).value })
    }

    /// Relinks the tail node in front of the head, in *O*(1). Lists shorter
    /// than two are left as they are. Handles stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3]);
    /// list.rotate_tail_to_head();
    /// assert!(list.iter().eq(&[3, 1, 2]));
    /// list.rotate_head_to_tail();
    /// assert!(list.iter().eq(&[1, 2, 3]));
    /// ```
    pub fn rotate_tail_to_head(&mut self) {
        if self.len < 2 {
            return;
        }
        // SAFETY: the tail is an element node; once it is out, the sentinel
        // and the head are neighbours.
        unsafe {
            let tail = self.unlink(self.tail_ptr());
            self.link(self.sentinel(), self.head_ptr(), tail);
        }
    }

    /// Relinks the head node after the tail, in *O*(1).
    pub fn rotate_head_to_tail(&mut self) {
        if self.len < 2 {
            return;
        }
        // SAFETY: the head is an element node; once it is out, the tail and the
        // sentinel are neighbours.
        unsafe {
            let head = self.unlink(self.head_ptr());
            self.link(self.tail_ptr(), self.sentinel(), head);
        }
    }

    /// Copies the list through its duplicate hook. The copy shares the hooks.
    ///
    /// Fails with [`Error::NoDupHook`] if there is no duplicate hook (see
    /// [`List::dup_or_clone`] for a cloning fallback), with [`Error::Dup`] if
    /// the hook refuses a value and with [`Error::Alloc`] if a node cannot be
    /// allocated. On failure the partial copy is discarded: every value already
    /// copied into it goes through the `free` hook, and `self` is untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::{Error, List};
    /// use std::iter::FromIterator;
    ///
    /// struct Ticket(u32);
    ///
    /// let mut list = List::from_iter([Ticket(1), Ticket(2)]);
    /// assert_eq!(list.dup().err(), Some(Error::NoDupHook));
    ///
    /// list.set_dup(|t| Some(Ticket(t.0 + 100)));
    /// let copy = list.dup()?;
    /// assert_eq!(copy.back().map(|t| t.0), Some(102));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn dup(&self) -> Result<List<T>, Error> {
        let dup = self.hooks.dup.clone().ok_or(Error::NoDupHook)?;
        self.dup_by(&*dup)
    }

    /// Like [`List::dup`], but without a duplicate hook each value is cloned.
    /// For `Rc`-like values that shares the same pointee.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooked_list::{Error, List};
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3]);
    /// assert_eq!(list.dup_or_clone()?, list);
    ///
    /// list.set_dup(|v| if *v < 3 { Some(v * 10) } else { None });
    /// assert_eq!(list.dup_or_clone(), Err(Error::Dup { index: 2 }));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn dup_or_clone(&self) -> Result<List<T>, Error>
    where
        T: Clone,
    {
        match self.hooks.dup.clone() {
            Some(dup) => self.dup_by(&*dup),
            None => self.dup_by(&|value: &T| Some(value.clone())),
        }
    }

    fn dup_by(&self, copy_value: &dyn Fn(&T) -> Option<T>) -> Result<List<T>, Error> {
        let mut copy = List::try_with_hooks(self.hooks.clone())?;
        for (index, value) in self.iter().enumerate() {
            let value = copy_value(value).ok_or(Error::Dup { index })?;
            // SAFETY: the tail and the sentinel of `copy` are neighbours.
            let linked = unsafe { copy.link_value(copy.tail_ptr(), copy.sentinel(), value) };
            if let Err(value) = linked {
                copy.hooks.release(value);
                return Err(Node::<T>::alloc_error());
            }
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::list::fault;
    use crate::{Error, Hooks, List};
    use std::cell::RefCell;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::iter::FromIterator;
    use std::rc::Rc;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Neither `PartialEq` nor `Clone`: only hooks can match or copy it.
    struct Opaque(u32);

    #[test]
    fn list_eq_and_hash() {
        let a = List::from_iter([1, 2, 3]);
        let b = List::from_iter([1, 2, 3]);
        let c = List::from_iter([1, 2]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(hash_of(&a), hash_of(&c));
        assert!(a.contains(&3) && !c.contains(&3));
    }

    #[test]
    fn list_search_key_by_identity() {
        let list = List::from_iter([1, 2, 2]);
        let (first_two, second_two) = (list.get(1).unwrap(), list.get(2).unwrap());
        assert_eq!(list.search_key(first_two), list.index(1));
        assert_eq!(list.search_key(second_two), list.index(2));

        // An equal value living elsewhere is a different value.
        let outside = 2;
        assert_eq!(list.search_key(&outside), None);
        assert_eq!(List::<i32>::new().search_key(&outside), None);
    }

    #[test]
    fn list_search_key_or_eq() {
        let mut list = List::new();
        list.add_node_tail(1).unwrap();
        list.add_node_tail(2).unwrap();
        list.add_node_tail(3).unwrap();

        let found = list.search_key_or_eq(&2).unwrap();
        assert_eq!(unsafe { list.value(found) }, &2);
        assert_eq!(Some(found), list.index(1));
        assert_eq!(list.search_key_or_eq(&9), None);

        // The first match from the head wins.
        let list = List::from_iter([5, 1, 5]);
        assert_eq!(list.search_key_or_eq(&5), list.first());
    }

    #[test]
    fn list_search_key_prefers_the_matcher() {
        let shared = Rc::new(String::from("x"));
        let lookalike = Rc::new(String::from("x"));

        let mut list = List::from_iter([Rc::clone(&lookalike), Rc::clone(&shared)]);
        assert_eq!(list.search_key_or_eq(&shared), list.first());

        list.set_matcher(Rc::ptr_eq);
        assert_eq!(list.search_key(&shared), list.last());
        assert_eq!(list.search_key_or_eq(&shared), list.last());
        assert_eq!(list.search_key(&Rc::new(String::from("x"))), None);
    }

    #[test]
    fn list_hooks_work_without_trait_bounds() {
        let hooks = Hooks::new()
            .with_dup(|v: &Opaque| Some(Opaque(v.0 * 2)))
            .with_matcher(|v: &Opaque, key: &Opaque| v.0 == key.0);
        let mut list = List::with_hooks(hooks);
        list.extend([Opaque(1), Opaque(2), Opaque(3)]);

        let found = list.search_key(&Opaque(2));
        assert_eq!(found, list.index(1));
        assert!(list.search_key(&Opaque(7)).is_none());

        let copy = list.dup().unwrap();
        assert_eq!(Vec::from_iter(copy.iter().map(|v| v.0)), vec![2, 4, 6]);
        assert_eq!(copy.search_key(&Opaque(4)), copy.index(1));
    }

    #[test]
    fn list_dup_without_hook() {
        let list = List::from_iter([Opaque(1)]);
        assert_eq!(list.dup().err(), Some(Error::NoDupHook));
        assert_eq!(List::<Opaque>::new().dup().err(), Some(Error::NoDupHook));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn list_index() {
        let list = List::from_iter(0..5);
        for i in 0..5 {
            assert_eq!(list.get(i), Some(&(i as i32)));
            assert_eq!(list.get(i - 5), Some(&(i as i32)));
        }
        assert_eq!(list.index(5), None);
        assert_eq!(list.index(-6), None);
        assert_eq!(list.index(isize::MIN), None);
        assert_eq!(list.index(isize::MAX), None);

        let empty = List::<i32>::new();
        assert_eq!(empty.index(0), None);
        assert_eq!(empty.index(-1), None);
    }

    #[test]
    fn list_get_mut() {
        let mut list = List::from_iter([1, 2, 3]);
        *list.get_mut(-2).unwrap() = 20;
        assert_eq!(list.get_mut(3), None);
        assert_eq!(Vec::from_iter(list), vec![1, 20, 3]);
    }

    #[test]
    fn list_rotate() {
        let mut list = List::from_iter(['a', 'b']);
        list.rotate_tail_to_head();
        assert_eq!(Vec::from_iter(list.iter().copied()), vec!['b', 'a']);
        list.rotate_head_to_tail();
        assert_eq!(Vec::from_iter(list.iter().copied()), vec!['a', 'b']);

        let expected = Vec::from_iter(0..7);
        let mut list = List::from_iter(expected.iter().copied());
        let head = list.first();
        for _ in 0..7 {
            list.rotate_tail_to_head();
        }
        assert_eq!(Vec::from_iter(list.iter().copied()), expected);
        assert_eq!(list.first(), head);
        for _ in 0..7 {
            list.rotate_head_to_tail();
        }
        assert_eq!(Vec::from_iter(list.iter().copied()), expected);
        assert_eq!(list.len(), 7);
    }

    #[test]
    fn list_rotate_short() {
        let mut empty = List::<i32>::new();
        empty.rotate_head_to_tail();
        empty.rotate_tail_to_head();
        assert!(empty.is_empty());

        let mut single = List::from_iter([1]);
        single.rotate_tail_to_head();
        single.rotate_head_to_tail();
        assert_eq!(single.first(), single.last());
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn list_dup_or_clone_is_shallow() {
        let values = Vec::from_iter((0..3).map(|i| Rc::new(i.to_string())));
        let list = List::from_iter(values.iter().cloned());
        let copy = list.dup_or_clone().unwrap();
        assert_eq!(copy.len(), list.len());
        for (a, b) in list.iter().zip(&copy) {
            assert!(Rc::ptr_eq(a, b));
        }
        assert!(List::<u8>::new().dup_or_clone().unwrap().is_empty());
    }

    #[test]
    fn list_dup_with_hook() {
        let hooks = Hooks::new().with_dup(|v: &Rc<String>| Some(Rc::new(v.as_str().to_owned())));
        let mut list = List::with_hooks(hooks);
        list.extend((0..3).map(|i| Rc::new(i.to_string())));

        for copy in [list.dup().unwrap(), list.dup_or_clone().unwrap()] {
            assert_eq!(copy, list);
            for (a, b) in list.iter().zip(&copy) {
                assert!(!Rc::ptr_eq(a, b));
            }
            assert!(Rc::ptr_eq(
                list.hooks().dup.as_ref().unwrap(),
                copy.hooks().dup.as_ref().unwrap()
            ));
        }
    }

    #[test]
    fn list_dup_hook_failure_releases_partial_copy() {
        let freed = Rc::new(RefCell::new(Vec::new()));
        let hooks = Hooks::new()
            .with_dup(|v: &i32| if *v == 3 { None } else { Some(v + 100) })
            .with_free({
                let freed = Rc::clone(&freed);
                move |v| freed.borrow_mut().push(v)
            });
        let mut list = List::with_hooks(hooks);
        list.extend(1..=4);

        assert_eq!(list.dup(), Err(Error::Dup { index: 2 }));
        assert_eq!(freed.borrow().as_slice(), &[101, 102]);
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn list_dup_alloc_failure_releases_partial_copy() {
        let freed = Rc::new(RefCell::new(Vec::new()));
        let mut list = List::from_iter(1..=4);
        list.set_free({
            let freed = Rc::clone(&freed);
            move |v| freed.borrow_mut().push(v)
        })
        .set_dup(|v| Some(v * 10));

        // The copy's sentinel and its first two nodes succeed, the third node fails.
        fault::fail_after(3);
        assert!(matches!(list.dup(), Err(Error::Alloc { .. })));
        assert_eq!(freed.borrow().as_slice(), &[30, 10, 20]);
        assert_eq!(list.len(), 4);

        fault::fail_after(0);
        assert!(matches!(list.dup(), Err(Error::Alloc { .. })));
        assert_eq!(freed.borrow().len(), 3);
    }
}
