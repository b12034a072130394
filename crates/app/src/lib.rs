//! # smarthome-app
//!
//! Application layer: type registries, the thing lifecycle engine, and
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or consume:
//!   - `TypeProvider`: read access to thing/channel/group types and config descriptions
//!   - `TranslationProvider`: localized labels per module and locale
//!   - `ThingHandlerCallback`: the single funnel for everything a handler emits
//!   - `EventPublisher`: publish thing events
//! - Hold module-scoped **type providers** and the **registries** aggregating them
//! - Instantiate things from types (`ThingFactory`)
//! - Drive handler lifecycles (`ThingHandler`, `BaseThingHandler`,
//!   `ThingHandlerFactory`, `ThingManager`)
//! - Provide **in-process infrastructure** (event bus, scheduler) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `smarthome-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod error;
pub mod event_bus;
pub mod handler;
pub mod handler_factory;
pub mod module;
pub mod ports;
pub mod registry;
pub mod thing_factory;
pub mod thing_manager;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
