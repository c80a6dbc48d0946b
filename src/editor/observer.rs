//! Host-wide click observation
//!
//! Overlays close when the user clicks anywhere outside them. The host owns
//! one [`ClickDispatcher`] and forwards every click that was not stopped by a
//! more specific handler (a click on a tag, a click inside an open menu).
//!
//! Subscribing returns a [`ClickSubscription`] guard. Dropping the guard
//! unsubscribes, so an editor releases its listener on every teardown path,
//! unwinding included.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Position in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned box in host coordinates, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Bounds {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// Whether a handled click should still reach the host-wide listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// A click somewhere in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerClick {
    pub position: Point,
}

impl PointerClick {
    pub fn at(x: i32, y: i32) -> Self {
        PointerClick {
            position: Point::new(x, y),
        }
    }
}

type Listener = Box<dyn FnMut(&PointerClick)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Dispatches in progress; nonzero while listeners are taken out
    dispatch_depth: usize,
    dropped_while_dispatching: Vec<u64>,
}

/// Listeners taken out of the registry for one dispatch.
///
/// Putting them back happens in `Drop`, so a panicking listener does not
/// leave the registry empty.
struct Dispatch<'a> {
    registry: &'a RefCell<Registry>,
    listeners: Vec<(u64, Listener)>,
}

impl<'a> Dispatch<'a> {
    fn begin(registry: &'a RefCell<Registry>) -> Self {
        let listeners = {
            let mut registry = registry.borrow_mut();
            registry.dispatch_depth += 1;
            std::mem::take(&mut registry.listeners)
        };
        Dispatch {
            registry,
            listeners,
        }
    }
}

impl Drop for Dispatch<'_> {
    fn drop(&mut self) {
        let mut registry = self.registry.borrow_mut();
        registry.dispatch_depth -= 1;

        let mut listeners = std::mem::take(&mut self.listeners);
        let dropped = &registry.dropped_while_dispatching;
        listeners.retain(|(id, _)| !dropped.contains(id));
        // Listeners subscribed during dispatch go after the existing ones
        listeners.append(&mut registry.listeners);
        registry.listeners = listeners;

        if registry.dispatch_depth == 0 {
            registry.dropped_while_dispatching.clear();
        }
    }
}

/// Registry of click listeners shared by everything mounted in one host
#[derive(Clone, Default)]
pub struct ClickDispatcher {
    registry: Rc<RefCell<Registry>>,
}

impl ClickDispatcher {
    pub fn new() -> Self {
        ClickDispatcher::default()
    }

    /// Register `listener` until the returned guard is dropped
    pub fn subscribe<F>(&self, listener: F) -> ClickSubscription
    where
        F: FnMut(&PointerClick) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        ClickSubscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Notify every listener. Returns how many were called.
    pub fn dispatch(&self, click: &PointerClick) -> usize {
        let mut dispatch = Dispatch::begin(&self.registry);
        for (_, listener) in dispatch.listeners.iter_mut() {
            listener(click);
        }
        dispatch.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Guard for a registered listener
#[must_use = "dropping the subscription unregisters the listener"]
pub struct ClickSubscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for ClickSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if registry.dispatch_depth > 0 {
                registry.dropped_while_dispatching.push(self.id);
            }
            let id = self.id;
            registry.listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }
}
