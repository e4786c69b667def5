use std::fmt;
use std::rc::Rc;

/// Copies a stored value, returning `None` on failure.
pub type DupFn<T> = Rc<dyn Fn(&T) -> Option<T>>;

/// Reclaims a value the list disposes of.
pub type FreeFn<T> = Rc<dyn Fn(T)>;

/// Tests a stored value (left) against a search key (right).
pub type MatchFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// The per-list customization hooks.
///
/// Every hook is optional, and none of them puts a trait bound on `T`. When a
/// hook is absent:
/// - `dup`: [`List::dup`] fails with [`Error::NoDupHook`], while
///   [`List::dup_or_clone`] clones (a shallow share for `Rc`-like values);
/// - `free`: the value is dropped;
/// - `matcher`: [`List::search_key`] compares by identity, while
///   [`List::search_key_or_eq`] uses [`PartialEq`].
///
/// The hooks are reference counted so that a duplicated list shares the very
/// same hooks.
///
/// # Examples
///
/// ```
/// use hooked_list::{Hooks, List};
/// use std::rc::Rc;
///
/// let hooks = Hooks::new()
///     .with_dup(|s: &String| Some(s.to_uppercase()))
///     .with_matcher(|a: &String, b: &String| a.eq_ignore_ascii_case(b));
///
/// let mut list = List::with_hooks(hooks);
/// list.push_back(String::from("foo"));
///
/// assert!(list.search_key(&String::from("FOO")).is_some());
/// let copy = list.dup().unwrap();
/// assert_eq!(copy.front().map(String::as_str), Some("FOO"));
/// assert!(Rc::ptr_eq(
///     list.hooks().matcher.as_ref().unwrap(),
///     copy.hooks().matcher.as_ref().unwrap(),
/// ));
/// ```
///
/// [`List::dup`]: crate::List::dup
/// [`List::dup_or_clone`]: crate::List::dup_or_clone
/// [`List::search_key`]: crate::List::search_key
/// [`List::search_key_or_eq`]: crate::List::search_key_or_eq
/// [`Error::NoDupHook`]: crate::Error::NoDupHook
pub struct Hooks<T> {
    /// Copies a value for [`List::dup`](crate::List::dup).
    pub dup: Option<DupFn<T>>,
    /// Receives the values the list disposes of.
    pub free: Option<FreeFn<T>>,
    /// Compares a stored value with a search key.
    pub matcher: Option<MatchFn<T>>,
}

impl<T> Hooks<T> {
    /// Hooks with every slot empty.
    pub fn new() -> Self {
        Self {
            dup: None,
            free: None,
            matcher: None,
        }
    }

    /// Sets the hook copying values in [`List::dup`](crate::List::dup).
    pub fn with_dup<F>(mut self, dup: F) -> Self
    where
        F: Fn(&T) -> Option<T> + 'static,
    {
        self.dup = Some(Rc::new(dup));
        self
    }

    /// Sets the hook receiving every value the list disposes of.
    pub fn with_free<F>(mut self, free: F) -> Self
    where
        F: Fn(T) + 'static,
    {
        self.free = Some(Rc::new(free));
        self
    }

    /// Sets the hook comparing stored values against search keys.
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        self.matcher = Some(Rc::new(matcher));
        self
    }

    /// Hands `value` to the `free` hook, or drops it.
    pub(crate) fn release(&self, value: T) {
        match &self.free {
            Some(free) => free(value),
            None => drop(value),
        }
    }

    /// Matches with the `matcher` hook, or with `fallback` when there is none.
    pub(crate) fn matches_or(&self, value: &T, key: &T, fallback: fn(&T, &T) -> bool) -> bool {
        match &self.matcher {
            Some(matcher) => matcher(value, key),
            None => fallback(value, key),
        }
    }
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            dup: self.dup.clone(),
            free: self.free.clone(),
            matcher: self.matcher.clone(),
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("dup", &self.dup.is_some())
            .field("free", &self.free.is_some())
            .field("matcher", &self.matcher.is_some())
            .finish()
    }
}
