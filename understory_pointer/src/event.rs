// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer event payloads: what the environment delivers and what subscribers see.
//!
//! A [`RawPointerEvent`] is the notification as the environment reports it. The hub
//! normalizes it into a [`PointerEvent`], which always carries a button mask (native
//! or reconstructed) and the canonical [`EventName`].

use kurbo::Point;

use crate::buttons::Buttons;
use crate::name::EventName;

/// Native notification types the hub listens for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeEventKind {
    /// A button went down.
    MouseDown,
    /// A button went up.
    MouseUp,
    /// The pointer moved.
    MouseMove,
    /// The wheel turned.
    MouseWheel,
    /// Primary click.
    Click,
    /// Double click.
    DblClick,
    /// Secondary click that would open a context menu.
    ContextMenu,
    /// The pointer moved over the source or one of its regions.
    MouseOver,
    /// The pointer moved out of the source or one of its regions.
    MouseOut,
}

impl NativeEventKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 9] = [
        Self::MouseMove,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseWheel,
        Self::Click,
        Self::DblClick,
        Self::ContextMenu,
        Self::MouseOver,
        Self::MouseOut,
    ];

    /// The environment's name for this notification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::MouseWheel => "mousewheel",
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::ContextMenu => "contextmenu",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
        }
    }

    /// Looks up a kind by its environment name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns `true` for enter/leave transitions, which carry a related target.
    #[must_use]
    pub const fn is_transition(self) -> bool {
        matches!(self, Self::MouseOver | Self::MouseOut)
    }
}

/// Opaque reference to a region of the source, as reported in `related_target`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

/// A pointer notification as delivered by the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPointerEvent {
    /// Notification type.
    pub kind: NativeEventKind,
    /// Client-space position.
    pub position: Point,
    /// Delivery timestamp, in whatever unit the environment uses.
    pub timestamp: u64,
    /// For enter/leave: the region being entered or left, `None` when leaving or
    /// entering the source as a whole.
    pub related_target: Option<TargetId>,
    /// Index of the button that changed, for press/release/click notifications.
    pub button: u8,
    /// Held-button mask, if the environment reports one.
    pub buttons: Option<Buttons>,
}

impl RawPointerEvent {
    /// Creates a notification of `kind` at `position` with no button information.
    #[must_use]
    pub fn new(kind: NativeEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            timestamp: 0,
            related_target: None,
            button: 0,
            buttons: None,
        }
    }

    /// A press of `button`.
    #[must_use]
    pub fn press(button: u8, position: Point) -> Self {
        Self::new(NativeEventKind::MouseDown, position).with_button(button)
    }

    /// A release of `button`.
    #[must_use]
    pub fn release(button: u8, position: Point) -> Self {
        Self::new(NativeEventKind::MouseUp, position).with_button(button)
    }

    /// A move to `position`.
    #[must_use]
    pub fn move_to(position: Point) -> Self {
        Self::new(NativeEventKind::MouseMove, position)
    }

    /// A wheel turn at `position`.
    #[must_use]
    pub fn wheel(position: Point) -> Self {
        Self::new(NativeEventKind::MouseWheel, position)
    }

    /// A click of `button`.
    #[must_use]
    pub fn click(button: u8, position: Point) -> Self {
        Self::new(NativeEventKind::Click, position).with_button(button)
    }

    /// A double click of `button`.
    #[must_use]
    pub fn dbl_click(button: u8, position: Point) -> Self {
        Self::new(NativeEventKind::DblClick, position).with_button(button)
    }

    /// A context-menu click (secondary button).
    #[must_use]
    pub fn context_menu(position: Point) -> Self {
        Self::new(NativeEventKind::ContextMenu, position).with_button(2)
    }

    /// The pointer entered the source (or a region, see [`Self::with_related_target`]).
    #[must_use]
    pub fn enter(position: Point) -> Self {
        Self::new(NativeEventKind::MouseOver, position)
    }

    /// The pointer left the source (or a region, see [`Self::with_related_target`]).
    #[must_use]
    pub fn leave(position: Point) -> Self {
        Self::new(NativeEventKind::MouseOut, position)
    }

    /// Sets the changed button index.
    #[must_use]
    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    /// Sets the native held-button mask.
    #[must_use]
    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Sets the related target of an enter/leave transition.
    #[must_use]
    pub fn with_related_target(mut self, target: TargetId) -> Self {
        self.related_target = Some(target);
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn at_time(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A normalized pointer event, as passed to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Canonical name this event is dispatched under.
    pub name: EventName,
    /// Original notification type.
    pub kind: NativeEventKind,
    /// Client-space position.
    pub position: Point,
    /// Delivery timestamp.
    pub timestamp: u64,
    /// Related target of an enter/leave transition.
    pub related_target: Option<TargetId>,
    /// Index of the button that changed.
    pub button: u8,
    /// Held buttons, native or reconstructed.
    pub buttons: Buttons,
}

impl PointerEvent {
    /// Normalizes `raw`, filling in the held-button mask and the canonical name.
    #[must_use]
    pub fn normalize(raw: &RawPointerEvent, buttons: Buttons) -> Self {
        Self {
            name: raw.kind.into(),
            kind: raw.kind,
            position: raw.position,
            timestamp: raw.timestamp,
            related_target: raw.related_target,
            button: raw.button,
            buttons,
        }
    }

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
}
