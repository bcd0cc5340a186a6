//! Lock hierarchy.
//!
//! Every shared lock carries a [`LockLevel`]. A thread may only acquire locks
//! in non-decreasing level order:
//!
//! `Submission` -> `Hooks` -> `Resources` -> `Config` -> `Logging`
//!
//! Debug builds record the levels held by each thread and panic on an
//! out-of-order acquisition. Release builds compile the bookkeeping away.
//!
//! Poisoned locks are recovered rather than propagated: a panic on one thread
//! must not take the host process down with it.

use std::ops::{Deref, DerefMut};
use std::sync::{
    Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// Position of a lock in the global acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockLevel {
    /// Swap-chain / submission-level state.
    Submission = 0,
    /// Hook installation state.
    Hooks = 1,
    /// Resource, camera, and jitter state.
    Resources = 2,
    /// Configuration snapshots.
    Config = 3,
    /// Logging sinks.
    Logging = 4,
}

#[cfg(debug_assertions)]
mod held {
    use super::LockLevel;
    use std::cell::RefCell;

    thread_local! {
        static HELD: RefCell<Vec<LockLevel>> = const { RefCell::new(Vec::new()) };
    }

    pub(super) fn check_and_push(level: LockLevel) {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            if let Some(highest) = held.iter().max().copied() {
                assert!(
                    level >= highest,
                    "lock order violation: acquiring {level:?} while holding {highest:?}"
                );
            }
            held.push(level);
        });
    }

    pub(super) fn pop(level: LockLevel) {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            if let Some(pos) = held.iter().rposition(|l| *l == level) {
                held.remove(pos);
            }
        });
    }

    pub(super) fn snapshot() -> Vec<LockLevel> {
        HELD.with(|held| held.borrow().clone())
    }
}

/// Levels currently held by this thread (always empty in release builds).
pub fn held_levels() -> Vec<LockLevel> {
    #[cfg(debug_assertions)]
    {
        held::snapshot()
    }
    #[cfg(not(debug_assertions))]
    {
        Vec::new()
    }
}

/// Marks one held level; releases it on drop.
struct LevelToken {
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    level: LockLevel,
}

impl LevelToken {
    fn acquire(level: LockLevel) -> Self {
        #[cfg(debug_assertions)]
        held::check_and_push(level);
        Self { level }
    }
}

impl Drop for LevelToken {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        held::pop(self.level);
    }
}

/// A mutex tagged with its position in the lock hierarchy.
#[derive(Debug)]
pub struct OrderedMutex<T> {
    level: LockLevel,
    inner: Mutex<T>,
}

impl<T> OrderedMutex<T> {
    pub fn new(level: LockLevel, value: T) -> Self {
        Self {
            level,
            inner: Mutex::new(value),
        }
    }

    pub fn level(&self) -> LockLevel {
        self.level
    }

    /// Acquire the lock, checking the hierarchy in debug builds.
    pub fn lock(&self) -> OrderedMutexGuard<'_, T> {
        let token = LevelToken::acquire(self.level);
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        OrderedMutexGuard {
            guard,
            _token: token,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard returned by [`OrderedMutex::lock`].
pub struct OrderedMutexGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    _token: LevelToken,
}

impl<T> Deref for OrderedMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for OrderedMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// A reader/writer lock tagged with its position in the lock hierarchy.
#[derive(Debug)]
pub struct OrderedRwLock<T> {
    level: LockLevel,
    inner: RwLock<T>,
}

impl<T> OrderedRwLock<T> {
    pub fn new(level: LockLevel, value: T) -> Self {
        Self {
            level,
            inner: RwLock::new(value),
        }
    }

    pub fn level(&self) -> LockLevel {
        self.level
    }

    pub fn read(&self) -> OrderedReadGuard<'_, T> {
        let token = LevelToken::acquire(self.level);
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        OrderedReadGuard {
            guard,
            _token: token,
        }
    }

    pub fn write(&self) -> OrderedWriteGuard<'_, T> {
        let token = LevelToken::acquire(self.level);
        let guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        OrderedWriteGuard {
            guard,
            _token: token,
        }
    }
}

/// Shared guard returned by [`OrderedRwLock::read`].
pub struct OrderedReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, T>,
    _token: LevelToken,
}

impl<T> Deref for OrderedReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

/// Exclusive guard returned by [`OrderedRwLock::write`].
pub struct OrderedWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
    _token: LevelToken,
}

impl<T> Deref for OrderedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for OrderedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_order_is_allowed() {
        let submission = OrderedMutex::new(LockLevel::Submission, 1u32);
        let resources = OrderedRwLock::new(LockLevel::Resources, 2u32);
        let config = OrderedRwLock::new(LockLevel::Config, 3u32);

        let a = submission.lock();
        let b = resources.read();
        let c = config.read();
        assert_eq!(*a + *b + *c, 6);
    }

    #[test]
    fn test_same_level_is_allowed() {
        let first = OrderedMutex::new(LockLevel::Resources, 0u8);
        let second = OrderedRwLock::new(LockLevel::Resources, 0u8);

        let mut a = first.lock();
        let mut b = second.write();
        *a += 1;
        *b += 1;
        assert_eq!((*a, *b), (1, 1));
    }

    #[test]
    fn test_levels_are_released_on_drop() {
        let resources = OrderedMutex::new(LockLevel::Resources, ());
        let submission = OrderedMutex::new(LockLevel::Submission, ());
        {
            let _r = resources.lock();
            if cfg!(debug_assertions) {
                assert_eq!(held_levels(), vec![LockLevel::Resources]);
            }
        }
        assert!(held_levels().is_empty());
        // Now legal again: nothing above Submission is held.
        let _s = submission.lock();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "lock order violation")]
    fn test_descending_order_panics_in_debug() {
        let resources = OrderedMutex::new(LockLevel::Resources, ());
        let hooks = OrderedMutex::new(LockLevel::Hooks, ());

        let _r = resources.lock();
        let _h = hooks.lock();
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = std::sync::Arc::new(OrderedMutex::new(LockLevel::Resources, 5u32));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock();
            panic!("poison it");
        })
        .join();

        assert_eq!(*lock.lock(), 5);
    }
}
