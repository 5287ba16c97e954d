// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pointer --heading-base-level=0

//! Understory Pointer: one coherent, queryable pointer state per input source.
//!
//! Windowing environments report pointer input inconsistently. Some never say which
//! buttons are held during an event; all of them use redundant, environment-specific
//! event names. This crate normalizes both:
//!
//! - [`buttons`]: Reconstruct the held-button mask from press/release transitions
//! - [`name`]: Translate raw event names onto a small canonical vocabulary
//! - [`event`]: Raw notification payloads and their normalized form
//! - [`source`]: The input-source seam and the one-time button capability probe
//! - [`registry`]: Per-name subscriber lists with snapshot dispatch
//! - [`hub`]: Tie it together: latest pointer state plus subscriptions for one source
//!
//! ## Canonical vocabulary
//!
//! Subscribers use `click`, `dblclick`, `down`, `up`, `enter`, `move`, `leave` and
//! `wheel`, or `*` for all of them. Raw names such as `mousedown` or `contextmenu`
//! are accepted and translated; names outside the table pass through unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use kurbo::Point;
//! use std::{cell::Cell, rc::Rc};
//! use understory_pointer::event::{NativeEventKind, RawPointerEvent};
//! use understory_pointer::hub::PointerHub;
//! use understory_pointer::registry::Handler;
//! use understory_pointer::source::PointerSource;
//!
//! // A source that never reports held buttons: the hub reconstructs them.
//! struct Window;
//! impl PointerSource for Window {
//!     fn listen(&mut self, _: NativeEventKind) {}
//!     fn unlisten(&mut self, _: NativeEventKind) {}
//!     fn reports_buttons(&self) -> bool { false }
//! }
//!
//! let mut window = Window;
//! let mut hub = PointerHub::with_source(&mut window);
//!
//! let clicks = Rc::new(Cell::new(0));
//! let seen = clicks.clone();
//! hub.subscribe_once("click", &Handler::from_fn(move |_| seen.set(seen.get() + 1)));
//!
//! let at = Point::new(10.0, 10.0);
//! hub.handle_event(&RawPointerEvent::press(0, at));
//! assert_eq!(hub.buttons().bits(), 1);
//!
//! hub.handle_event(&RawPointerEvent::release(0, at));
//! hub.handle_event(&RawPointerEvent::click(0, at));
//! hub.handle_event(&RawPointerEvent::click(0, at));
//! assert_eq!(clicks.get(), 1);
//! assert!(hub.buttons().is_empty());
//! ```
//!
//! ## Sharing button state
//!
//! Held buttons are a property of the device, not of one source. When several hubs
//! need reconstruction, probe once and give the other hubs [`source::ButtonMode::follow`]:
//! only the first hub feeds the tracker, the rest read it.
//!
//! ## Handler failures
//!
//! Handlers return [`registry::HandlerResult`]. With the default
//! [`registry::FailurePolicy::Isolate`] a failure is logged through the `log` facade and
//! the remaining handlers still run; [`registry::FailurePolicy::Propagate`] stops at the
//! first failure. The pointer state is updated before dispatch either way.
//!
//! ## Features
//!
//! - `std` (default): Use the standard library in dependencies.
//! - `libm`: Use `libm` for Kurbo's float math in `no_std` builds.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod buttons;
pub mod event;
pub mod hub;
pub mod name;
pub mod registry;
pub mod source;
