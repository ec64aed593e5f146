//! Signal<T>: a shared state cell whose writes notify the render scheduler.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::scheduler::Scheduler;

/// Shared, single-threaded state. Reads are free; every write calls
/// [`Scheduler::notify_state_changed`].
pub struct Signal<T> {
    value: Rc<RefCell<T>>,
    scheduler: Scheduler,
}

// Manual impl so we don't require T: Clone for the signal itself.
impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(initial: T, scheduler: &Scheduler) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial)),
            scheduler: scheduler.clone(),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Read by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Overwrite the value and notify the scheduler.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.scheduler.notify_state_changed();
    }

    /// Mutate the value in place and notify the scheduler.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.scheduler.notify_state_changed();
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&self.value.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_notifies_scheduler() {
        let scheduler = Scheduler::new();
        let count = Signal::new(0, &scheduler);
        assert!(!scheduler.is_pending());
        count.set(1);
        assert_eq!(count.get(), 1);
        assert!(scheduler.is_pending());
    }

    #[test]
    fn update_in_place() {
        let scheduler = Scheduler::new();
        let items = Signal::new(vec![1, 2], &scheduler);
        items.update(|v| v.push(3));
        assert_eq!(items.with(Vec::len), 3);
        assert_eq!(scheduler.notifications(), 1);
    }

    #[test]
    fn clones_share_the_cell() {
        let scheduler = Scheduler::new();
        let a = Signal::new(String::from("x"), &scheduler);
        let b = a.clone();
        b.set("y".into());
        assert_eq!(a.get(), "y");
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn three_writes_one_pass() {
        let scheduler = Scheduler::new();
        let s = Signal::new(0, &scheduler);
        s.set(1);
        s.set(2);
        s.update(|v| *v += 1);
        assert_eq!(scheduler.notifications(), 3);
        assert!(scheduler.begin_pass());
        scheduler.end_pass();
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.passes_run(), 1);
    }
}
