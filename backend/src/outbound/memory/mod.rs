//! In-memory store adapters.
//!
//! Each store guards its table with a single `std::sync::RwLock`: reads share
//! the lock and writes take it exclusively. Locks are never held across an
//! `.await`. A panic while a guard is held poisons the lock; the tables are
//! only ever replaced wholesale, so the guards recover the inner value and
//! keep serving.

mod post_repository;
mod session_repository;
mod user_repository;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use post_repository::InMemoryPostRepository;
pub use session_repository::InMemorySessionRepository;
pub use user_repository::InMemoryUserRepository;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
