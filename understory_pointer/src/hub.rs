// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hub: latest pointer state plus canonical event subscriptions for one source.
//!
//! ## Usage
//!
//! 1) Pick a [`ButtonMode`] once at startup (usually with [`ButtonMode::probe`]).
//! 2) Bind a hub to a source with [`PointerHub::new`]; it asks the source to deliver
//!    every [`NativeEventKind`].
//! 3) Forward each delivered notification to [`PointerHub::handle_event`].
//! 4) Query [`PointerHub::state`] at any time, or subscribe to canonical names.
//!
//! ## Enter and leave
//!
//! Enter/leave notifications whose `related_target` is set describe the pointer
//! moving between regions inside the source. They do not change whether the pointer
//! is over the source, so the hub drops them: no state update and no dispatch.
//! A leave with no related target marks the hub inactive; every other processed
//! notification marks it active.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_pointer::event::{NativeEventKind, RawPointerEvent};
//! use understory_pointer::hub::PointerHub;
//! use understory_pointer::registry::Handler;
//! use understory_pointer::source::PointerSource;
//!
//! struct Window;
//! impl PointerSource for Window {
//!     fn listen(&mut self, _: NativeEventKind) {}
//!     fn unlisten(&mut self, _: NativeEventKind) {}
//!     fn reports_buttons(&self) -> bool { false }
//! }
//!
//! let mut window = Window;
//! let mut hub = PointerHub::with_source(&mut window);
//! hub.subscribe("down", &Handler::from_fn(|e| assert_eq!(e.left(), 10.0)));
//!
//! hub.handle_event(&RawPointerEvent::press(0, Point::new(10.0, 10.0)));
//! assert_eq!(hub.buttons().bits(), 1);
//! assert!(hub.is_active());
//! ```

use kurbo::Point;

use crate::buttons::{ButtonStates, Buttons};
use crate::event::{NativeEventKind, PointerEvent, RawPointerEvent};
use crate::registry::{DispatchReport, FailurePolicy, Handler, Subscriptions};
use crate::source::{ButtonMode, PointerSource};

/// Latest known pointer state for one source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Last known client-space position.
    pub position: Point,
    /// Last known held-button mask.
    pub buttons: Buttons,
    /// Whether the pointer is currently over or engaged with the source.
    pub active: bool,
    /// Timestamp of the last processed event; zero before the first one.
    pub last_activity: u64,
    /// The last processed event.
    pub last_event: Option<PointerEvent>,
}

impl PointerState {
    /// Vertical client coordinate.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.position.y
    }

    /// Horizontal client coordinate.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.position.x
    }

    /// Named view of the held buttons.
    #[must_use]
    pub fn button_states(&self) -> ButtonStates {
        self.buttons.into()
    }

    fn apply(&mut self, event: &PointerEvent) {
        self.position = event.position;
        self.buttons = event.buttons;
        self.last_activity = event.timestamp;
        self.active = event.kind != NativeEventKind::MouseOut;
        self.last_event = Some(event.clone());
    }
}

/// Hub configuration.
#[derive(Debug, Default)]
pub struct HubConfig {
    /// Where held-button masks come from.
    pub button_mode: ButtonMode,
    /// How failing handlers are treated during dispatch.
    pub failure_policy: FailurePolicy,
}

impl HubConfig {
    /// Configuration with the given button mode and the default failure policy.
    #[must_use]
    pub fn with_button_mode(button_mode: ButtonMode) -> Self {
        Self {
            button_mode,
            ..Self::default()
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// Latest pointer state and canonical event subscriptions for one source.
#[derive(Debug)]
pub struct PointerHub {
    config: HubConfig,
    state: PointerState,
    subscriptions: Subscriptions,
}

impl PointerHub {
    /// Binds a hub to `source`, asking it to deliver every [`NativeEventKind`].
    pub fn new<S: PointerSource + ?Sized>(source: &mut S, config: HubConfig) -> Self {
        for kind in NativeEventKind::ALL {
            source.listen(kind);
        }
        log::debug!(
            "[pointer] attached hub ({})",
            if config.button_mode.is_native() {
                "native buttons"
            } else {
                "reconstructed buttons"
            }
        );
        Self {
            config,
            state: PointerState::default(),
            subscriptions: Subscriptions::new(),
        }
    }

    /// Binds a hub to `source`, probing it for native button reporting.
    pub fn with_source<S: PointerSource + ?Sized>(source: &mut S) -> Self {
        let mode = ButtonMode::probe(&*source);
        Self::new(source, HubConfig::with_button_mode(mode))
    }

    /// Asks `source` to stop delivering the notifications this hub listened for.
    pub fn detach<S: PointerSource + ?Sized>(&self, source: &mut S) {
        for kind in NativeEventKind::ALL {
            source.unlisten(kind);
        }
        log::debug!("[pointer] detached hub");
    }

    /// Processes one notification from the source.
    ///
    /// Returns `None` when the notification was an enter/leave between regions
    /// inside the source and was dropped.
    pub fn handle_event(&mut self, raw: &RawPointerEvent) -> Option<DispatchReport> {
        let buttons = self.config.button_mode.resolve(raw);
        if raw.kind.is_transition() && raw.related_target.is_some() {
            log::trace!(
                "[pointer] dropping {} between regions ({:?})",
                raw.kind.as_str(),
                raw.related_target
            );
            return None;
        }

        let event = PointerEvent::normalize(raw, buttons);
        self.state.apply(&event);
        Some(
            self.subscriptions
                .dispatch(&self.state, &event, self.config.failure_policy),
        )
    }

    /// Subscribes `handler` to every name in `names` (space-separated, or `*`).
    pub fn subscribe(&mut self, names: &str, handler: &Handler) {
        self.subscriptions.subscribe(names, handler);
    }

    /// Subscribes `handler` for a single invocation per name.
    pub fn subscribe_once(&mut self, names: &str, handler: &Handler) {
        self.subscriptions.subscribe_once(names, handler);
    }

    /// Removes the first entry of `handler` under every name in `names`.
    pub fn unsubscribe(&mut self, names: &str, handler: &Handler) -> usize {
        self.subscriptions.unsubscribe(names, handler)
    }

    /// The subscriber registry.
    #[must_use]
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Latest known state.
    #[must_use]
    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Last known position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.state.position
    }

    /// Vertical client coordinate.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.state.top()
    }

    /// Horizontal client coordinate.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.state.left()
    }

    /// Last known held-button mask.
    #[must_use]
    pub fn buttons(&self) -> Buttons {
        self.state.buttons
    }

    /// Named view of the last known held buttons.
    #[must_use]
    pub fn button_states(&self) -> ButtonStates {
        self.state.button_states()
    }

    /// Whether the pointer is over or engaged with the source.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Timestamp of the last processed event.
    #[must_use]
    pub fn last_activity(&self) -> u64 {
        self.state.last_activity
    }

    /// The last processed event.
    #[must_use]
    pub fn last_event(&self) -> Option<&PointerEvent> {
        self.state.last_event.as_ref()
    }

    /// Where this hub reads held-button masks from.
    #[must_use]
    pub fn button_mode(&self) -> &ButtonMode {
        &self.config.button_mode
    }

    /// How this hub treats failing handlers.
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }
}
