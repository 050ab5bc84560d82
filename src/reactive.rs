//! Minimal reactive cell for the router store.
//!
//! `Signal<T>` holds a value behind shared ownership and notifies explicit
//! subscribers on every write. It is deliberately small: the router only
//! needs observable `path`/`query` state, not automatic dependency tracking.
//! Host frameworks with their own reactive system can bridge a `Signal`
//! through [`Signal::subscribe`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single-threaded observable value.
///
/// Clones share the same underlying value and subscriber list.
pub struct Signal<T> {
	value: Rc<RefCell<T>>,
	subscribers: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl<T: 'static> Signal<T> {
	/// Creates a new signal holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			value: Rc::new(RefCell::new(value)),
			subscribers: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Replaces the value and notifies all subscribers.
	pub fn set(&self, value: T) {
		*self.value.borrow_mut() = value;
		self.notify();
	}

	/// Mutates the value in place and notifies all subscribers once.
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
	{
		f(&mut *self.value.borrow_mut());
		self.notify();
	}

	/// Registers a callback invoked after every write.
	///
	/// Subscriptions live as long as the signal; there is no unsubscribe.
	pub fn subscribe<F>(&self, f: F)
	where
		F: Fn() + 'static,
	{
		self.subscribers.borrow_mut().push(Rc::new(f));
	}

	fn notify(&self) {
		// Subscribers may read the signal, so the borrow must end first.
		let subscribers = self.subscribers.borrow().clone();
		for subscriber in subscribers {
			subscriber();
		}
	}
}

impl<T> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			value: Rc::clone(&self.value),
			subscribers: Rc::clone(&self.subscribers),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &self.value.borrow())
			.finish()
	}
}
