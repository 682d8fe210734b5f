//! This module contains the type definitions necessary to support the
//! monitoring functionality for the interpreter.
//!
//! # Best-Effort Monitoring
//!
//! Note that the monitoring provided by the watchdog is a best-effort
//! approach. It is not guaranteed that the watchdog is able to stop any given
//! interpretation run in synchronous execution on a thread: the interpreter
//! only polls between work items, so a single very expensive oracle query
//! runs to completion regardless.

use std::{
    fmt::Debug,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::constant::DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;

/// A dynamically dispatched [`Watchdog`] instance.
pub type DynWatchdog = Rc<dyn Watchdog>;

/// The interface to an object that can be polled to see if the interpreter
/// needs to abort processing.
///
/// The interface is simple, but it can encapsulate arbitrary logic as far as
/// the interpreter is concerned, allowing the client to implement complex
/// stop logic.
pub trait Watchdog
where
    Self: Debug,
{
    /// Checks if the interpreter should halt its exploration and return an
    /// error.
    #[must_use]
    fn should_stop(&self) -> bool;

    /// Gets the number of work items the interpreter should process between
    /// polls of the watchdog.
    ///
    /// An interval of zero is treated by the interpreter as polling on every
    /// work item.
    #[must_use]
    fn poll_every(&self) -> usize;
}

/// An implementation of the [`Watchdog`] trait that does not place any
/// restrictions on the execution of the interpreter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LazyWatchdog;

impl LazyWatchdog {
    /// Wraps `self` into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> Rc<dyn Watchdog> {
        Rc::new(self)
    }
}

impl Watchdog for LazyWatchdog {
    fn should_stop(&self) -> bool {
        false
    }

    fn poll_every(&self) -> usize {
        // Something ridiculously huge so it basically never gets checked.
        1_000_000_000_000
    }
}

/// A watchdog that tells the interpreter when to stop based on a flag in the
/// form of an atomic boolean.
///
/// By default, it requests that the interpreter poll for watchdog status
/// every [`DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS`] work items. This is
/// configurable by calling [`Self::polling_every`].
#[derive(Clone, Debug)]
pub struct FlagWatchdog {
    /// The flag that should be mutated externally to stop the interpreter by
    /// this watchdog.
    flag: Arc<AtomicBool>,

    /// The number of work items the interpreter should process between polls
    /// of the watchdog.
    poll_loop_iterations: usize,
}

impl FlagWatchdog {
    /// Constructs a new `FlagWatchdog` wrapping the provided `flag`.
    #[must_use]
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        let poll_loop_iterations = DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;
        Self {
            flag,
            poll_loop_iterations,
        }
    }

    /// Specifies the number of work items that the interpreter should process
    /// between polls of the watchdog for status.
    #[must_use]
    pub fn polling_every(mut self, iterations: usize) -> Self {
        self.poll_loop_iterations = iterations;
        self
    }

    /// Wraps the watchdog into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> Rc<dyn Watchdog> {
        Rc::new(self)
    }
}

impl Watchdog for FlagWatchdog {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn poll_every(&self) -> usize {
        self.poll_loop_iterations
    }
}
