// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscriber registry: per-name handler lists with snapshot dispatch.
//!
//! [`Subscriptions`] maps each [`EventName`] to an ordered list of [`Handler`]s.
//! Dispatch applies simple rules:
//!
//! - Handlers run synchronously, in insertion order.
//! - The list is snapshotted first: handlers subscribed or unsubscribed while an
//!   event is being dispatched take effect from the next dispatch on.
//! - One-shot entries are removed before their handler runs.
//! - A failing handler is handled per [`FailurePolicy`].
//!
//! Handlers are compared by identity ([`Handler::ptr_eq`]), so keep a clone of the
//! [`Handler`] around to unsubscribe it later.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_pointer::buttons::Buttons;
//! use understory_pointer::event::{PointerEvent, RawPointerEvent};
//! use understory_pointer::hub::PointerState;
//! use understory_pointer::registry::{FailurePolicy, Handler, Subscriptions};
//!
//! let state = PointerState::default();
//! let mut subs = Subscriptions::new();
//! let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//! let sink = log.clone();
//! let handler = Handler::from_fn(move |e: &PointerEvent| sink.borrow_mut().push(e.name.clone()));
//!
//! subs.subscribe("mousedown mouseup", &handler);
//! let down = PointerEvent::normalize(&RawPointerEvent::press(0, Point::ORIGIN), Buttons::PRIMARY);
//! let report = subs.dispatch(&state, &down, FailurePolicy::Isolate);
//! assert_eq!(report.invoked, 1);
//!
//! subs.unsubscribe("down", &handler);
//! assert_eq!(subs.dispatch(&state, &down, FailurePolicy::Isolate).invoked, 0);
//! assert_eq!(log.borrow().len(), 1);
//! ```

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::event::PointerEvent;
use crate::hub::PointerState;
use crate::name::{EventName, parse_names};

/// Error returned by a handler to signal that it failed.
#[derive(Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: Cow<'static, str>,
}

impl HandlerError {
    /// Creates an error with a human-readable message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message this error was created with.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerError {{ message: {:?} }}", self.message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pointer handler failed: {}", self.message)
    }
}

impl core::error::Error for HandlerError {}

/// What a handler returns.
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn = dyn FnMut(&mut Subscriptions, &PointerState, &PointerEvent) -> HandlerResult;

/// A subscriber callback.
///
/// Cloning a `Handler` yields the same identity: [`Subscriptions::unsubscribe`]
/// matches any clone of the handler that was subscribed.
#[derive(Clone)]
pub struct Handler(Rc<RefCell<HandlerFn>>);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

impl Handler {
    /// Wraps a callback that may change subscriptions and may fail.
    ///
    /// The `&PointerState` argument is the hub's state, already updated for the
    /// event. Subscription changes made through the `&mut Subscriptions` argument
    /// take effect from the next dispatch on.
    pub fn new(
        f: impl FnMut(&mut Subscriptions, &PointerState, &PointerEvent) -> HandlerResult + 'static,
    ) -> Self {
        Self(Rc::new(RefCell::new(f)))
    }

    /// Wraps a plain observer that never fails.
    pub fn from_fn(mut f: impl FnMut(&PointerEvent) + 'static) -> Self {
        Self::new(move |_, _, event| {
            f(event);
            Ok(())
        })
    }

    /// Wraps an observer that also reads the pointer state and never fails.
    pub fn with_state(mut f: impl FnMut(&PointerState, &PointerEvent) + 'static) -> Self {
        Self::new(move |_, state, event| {
            f(state, event);
            Ok(())
        })
    }

    /// Returns `true` if both handles refer to the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn call(
        &self,
        subs: &mut Subscriptions,
        state: &PointerState,
        event: &PointerEvent,
    ) -> HandlerResult {
        match self.0.try_borrow_mut() {
            Ok(mut f) => f(subs, state, event),
            Err(_) => Err(HandlerError::new("handler is already running")),
        }
    }
}

/// How dispatch treats a handler that returns an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum FailurePolicy {
    /// Log the failure and keep invoking the remaining handlers.
    ///
    /// This is the default: one faulty subscriber cannot silence the others.
    #[default]
    Isolate,
    /// Stop at the first failure; remaining handlers for that event do not run.
    Propagate,
}

/// Outcome of dispatching one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    /// Canonical name the event was dispatched under.
    pub name: EventName,
    /// Handlers that were invoked, including ones that failed.
    pub invoked: usize,
    /// Handlers that returned an error.
    pub failed: usize,
    /// `true` if [`FailurePolicy::Propagate`] cut the dispatch short.
    pub aborted: bool,
}

impl DispatchReport {
    fn new(name: EventName) -> Self {
        Self {
            name,
            invoked: 0,
            failed: 0,
            aborted: false,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    id: u64,
    handler: Handler,
    once: bool,
}

/// Registry of handlers per canonical event name.
#[derive(Debug, Default)]
pub struct Subscriptions {
    lists: HashMap<EventName, Vec<Entry>>,
    next_id: u64,
}

impl Subscriptions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list of every name in `names`.
    ///
    /// `names` is a space-separated list of raw or canonical names, or `*` for the
    /// whole vocabulary. Unknown names get their own list.
    pub fn subscribe(&mut self, names: &str, handler: &Handler) {
        for name in parse_names(names) {
            self.push(name, handler, false);
        }
    }

    /// Like [`Self::subscribe`], but each entry is removed right before its first run.
    ///
    /// Names that translate to the same canonical name (`"click contextmenu"`,
    /// `"click *"`) register a single entry, so the handler runs once per name.
    pub fn subscribe_once(&mut self, names: &str, handler: &Handler) {
        let mut seen: SmallVec<[EventName; 8]> = SmallVec::new();
        for name in parse_names(names) {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name.clone());
            self.push(name, handler, true);
        }
    }

    /// Removes the first entry of `handler` from the list of every name in `names`.
    ///
    /// One-shot entries match too. Missing entries are ignored.
    /// Returns the number of entries removed.
    pub fn unsubscribe(&mut self, names: &str, handler: &Handler) -> usize {
        let mut removed = 0;
        for name in parse_names(names) {
            let Some(list) = self.lists.get_mut(&name) else {
                continue;
            };
            if let Some(pos) = list.iter().position(|e| e.handler.ptr_eq(handler)) {
                list.remove(pos);
                removed += 1;
            }
            if list.is_empty() {
                self.lists.remove(&name);
            }
        }
        removed
    }

    /// Total number of entries subscribed under the names in `names`.
    ///
    /// `names` is parsed like [`Self::subscribe`]'s, so `count("*")` counts every
    /// entry under the canonical vocabulary.
    #[must_use]
    pub fn count(&self, names: &str) -> usize {
        parse_names(names)
            .iter()
            .map(|name| self.lists.get(name).map_or(0, Vec::len))
            .sum()
    }

    /// Returns `true` if `handler` is subscribed under every name in `names`.
    ///
    /// An empty name list contains nothing.
    #[must_use]
    pub fn contains(&self, names: &str, handler: &Handler) -> bool {
        let names = parse_names(names);
        !names.is_empty()
            && names.iter().all(|name| {
                self.lists
                    .get(name)
                    .is_some_and(|list| list.iter().any(|e| e.handler.ptr_eq(handler)))
            })
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Removes every subscription.
    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Invokes every handler subscribed under `event.name`.
    ///
    /// Handlers see `self` and may change subscriptions; those changes do not
    /// affect this dispatch. They also get read access to `state`.
    pub fn dispatch(
        &mut self,
        state: &PointerState,
        event: &PointerEvent,
        policy: FailurePolicy,
    ) -> DispatchReport {
        let mut report = DispatchReport::new(event.name.clone());
        let snapshot: SmallVec<[Entry; 4]> = match self.lists.get(&event.name) {
            Some(list) => list.iter().cloned().collect(),
            None => return report,
        };

        for entry in snapshot {
            if entry.once {
                self.remove_entry(&event.name, entry.id);
            }
            report.invoked += 1;
            if let Err(err) = entry.handler.call(self, state, event) {
                report.failed += 1;
                match policy {
                    FailurePolicy::Isolate => {
                        log::warn!("[pointer] `{}` handler failed: {err}", event.name);
                    }
                    FailurePolicy::Propagate => {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }
        report
    }

    fn push(&mut self, name: EventName, handler: &Handler, once: bool) {
        let id = self.next_id;
        self.next_id += 1;
        self.lists.entry(name).or_default().push(Entry {
            id,
            handler: handler.clone(),
            once,
        });
    }

    fn remove_entry(&mut self, name: &EventName, id: u64) {
        if let Some(list) = self.lists.get_mut(name) {
            list.retain(|e| e.id != id);
            if list.is_empty() {
                self.lists.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::Buttons;
    use crate::event::RawPointerEvent;
    use alloc::vec;
    use core::cell::Cell;
    use kurbo::Point;

    fn click() -> PointerEvent {
        PointerEvent::normalize(
            &RawPointerEvent::click(0, Point::new(1.0, 2.0)),
            Buttons::empty(),
        )
    }

    fn counter() -> (Handler, Rc<Cell<usize>>) {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        (Handler::from_fn(move |_| seen.set(seen.get() + 1)), hits)
    }

    fn recorder(tag: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Handler {
        let log = Rc::clone(log);
        Handler::from_fn(move |_| log.borrow_mut().push(tag))
    }

    #[test]
    fn handlers_run_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        subs.subscribe("click", &recorder("a", &log));
        subs.subscribe("click", &recorder("b", &log));
        subs.subscribe("contextmenu", &recorder("c", &log));

        let report = subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(report.invoked, 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn unsubscribe_removes_first_match_only() {
        let (h, hits) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("click click", &h);
        assert_eq!(subs.count("click"), 2);

        assert_eq!(subs.unsubscribe("click", &h), 1);
        assert_eq!(subs.count("click"), 1);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let (h, _) = counter();
        let (other, _) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("down", &h);

        assert_eq!(subs.unsubscribe("up", &h), 0);
        assert_eq!(subs.unsubscribe("down", &other), 0);
        assert_eq!(subs.unsubscribe("never-registered", &h), 0);
        assert_eq!(subs.count("down"), 1);
        assert!(subs.contains("mousedown", &h));
    }

    #[test]
    fn clones_share_identity() {
        let (h, _) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("move", &h);
        assert!(subs.contains("move", &h.clone()));
        assert_eq!(subs.unsubscribe("move", &h.clone()), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn wildcard_registers_once_per_name() {
        let (h, _) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("*", &h);
        for name in EventName::VOCABULARY {
            assert_eq!(subs.count(name.as_str()), 1, "{name}");
        }

        subs.unsubscribe("leave", &h);
        assert_eq!(subs.count("leave"), 0);
        assert_eq!(subs.count("enter"), 1);
    }

    #[test]
    fn unknown_names_get_their_own_list() {
        let (h, hits) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("pinch", &h);
        assert_eq!(subs.count("pinch"), 1);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(hits.get(), 0);

        let mut pinch = click();
        pinch.name = EventName::translate("pinch");
        subs.dispatch(&PointerState::default(), &pinch, FailurePolicy::Isolate);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn once_runs_exactly_once() {
        let (h, hits) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe_once("click", &h);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(hits.get(), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn once_is_removed_even_if_handler_fails() {
        let mut subs = Subscriptions::new();
        let h = Handler::new(|_, _, _| Err(HandlerError::new("boom")));
        subs.subscribe_once("click", &h);

        let report = subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Propagate);
        assert_eq!(report.failed, 1);
        assert!(report.aborted);
        assert_eq!(subs.count("click"), 0);
    }

    #[test]
    fn once_handler_that_resubscribes_runs_once_per_dispatch() {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let mut subs = Subscriptions::new();
        let h = Handler::new(move |subs, _, _| {
            seen.set(seen.get() + 1);
            subs.subscribe_once("click", &Handler::from_fn(|_| {}));
            Ok(())
        });
        subs.subscribe_once("click", &h);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(hits.get(), 1);
        // The freshly added one-shot is pending for the next dispatch.
        assert_eq!(subs.count("click"), 1);
    }

    #[test]
    fn unsubscribe_also_cancels_once_entries() {
        let (h, hits) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe_once("dblclick", &h);
        assert_eq!(subs.unsubscribe("dblclick", &h), 1);
        assert!(subs.is_empty());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn changes_during_dispatch_apply_next_time() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = recorder("late", &log);
        let victim = recorder("victim", &log);

        let mut subs = Subscriptions::new();
        let adder = {
            let late = late.clone();
            let victim = victim.clone();
            let log = Rc::clone(&log);
            Handler::new(move |subs, _, _| {
                log.borrow_mut().push("adder");
                subs.subscribe("click", &late);
                subs.unsubscribe("click", &victim);
                Ok(())
            })
        };
        subs.subscribe("click", &adder);
        subs.subscribe("click", &victim);

        // Snapshot: victim still runs, late does not.
        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(*log.borrow(), vec!["adder", "victim"]);

        log.borrow_mut().clear();
        subs.unsubscribe("click", &adder);
        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn self_removing_once_handlers_do_not_skip_neighbours() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        subs.subscribe_once("click", &recorder("a", &log));
        subs.subscribe_once("click", &recorder("b", &log));
        subs.subscribe("click", &recorder("c", &log));

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(*log.borrow(), vec!["a", "b", "c", "c"]);
    }

    #[test]
    fn isolate_keeps_going_after_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        subs.subscribe("click", &Handler::new(|_, _, _| Err(HandlerError::new("boom"))));
        subs.subscribe("click", &recorder("after", &log));

        let report = subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(report.invoked, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.aborted);
        assert_eq!(*log.borrow(), vec!["after"]);
    }

    #[test]
    fn propagate_stops_at_first_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        subs.subscribe("click", &recorder("before", &log));
        subs.subscribe("click", &Handler::new(|_, _, _| Err(HandlerError::new("boom"))));
        subs.subscribe("click", &recorder("after", &log));

        let report = subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Propagate);
        assert_eq!(report.invoked, 2);
        assert_eq!(report.failed, 1);
        assert!(report.aborted);
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[test]
    fn dispatch_without_subscribers_reports_nothing() {
        let mut subs = Subscriptions::new();
        let report = subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(report, DispatchReport::new(EventName::Click));
    }

    #[test]
    fn handler_error_formats_message() {
        let err = HandlerError::new(alloc::format!("bad button {}", 7));
        assert_eq!(err.message(), "bad button 7");
        assert_eq!(
            alloc::format!("{err}"),
            "pointer handler failed: bad button 7"
        );
    }

    #[test]
    fn once_with_aliases_of_one_name_runs_once() {
        let (h, hits) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe_once("click contextmenu", &h);
        assert_eq!(subs.count("click"), 1);

        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        subs.dispatch(&PointerState::default(), &click(), FailurePolicy::Isolate);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn once_with_wildcard_and_explicit_name_registers_once_per_name() {
        let (h, _) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe_once("click *", &h);
        for name in EventName::VOCABULARY {
            assert_eq!(subs.count(name.as_str()), 1, "{name}");
        }
    }

    #[test]
    fn count_and_contains_accept_name_lists() {
        let (h, _) = counter();
        let (other, _) = counter();
        let mut subs = Subscriptions::new();
        subs.subscribe("*", &h);
        subs.subscribe("move", &other);

        assert_eq!(subs.count("*"), EventName::VOCABULARY.len() + 1);
        assert_eq!(subs.count("down up"), 2);
        assert!(subs.contains("*", &h));
        assert!(subs.contains("mousedown mouseup", &h));
        assert!(!subs.contains("move down", &other));
        assert!(!subs.contains("", &h));
    }

    #[test]
    fn handlers_read_the_state_they_are_given() {
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let mut subs = Subscriptions::new();
        subs.subscribe(
            "click",
            &Handler::with_state(move |state, _| {
                sink.set(Some((state.active, state.buttons)));
            }),
        );

        let state = PointerState {
            active: true,
            buttons: Buttons::SECONDARY,
            ..PointerState::default()
        };
        subs.dispatch(&state, &click(), FailurePolicy::Isolate);
        assert_eq!(seen.get(), Some((true, Buttons::SECONDARY)));
    }
}
