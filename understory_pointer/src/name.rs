// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical event names and the raw → canonical translation table.
//!
//! Environments name pointer notifications redundantly (`mousedown`, `mouseover`,
//! `contextmenu`, ...). Subscribers only ever see the small vocabulary in
//! [`EventName::VOCABULARY`]. Names the table does not know pass through unchanged
//! as [`EventName::Other`].
//!
//! ```
//! use understory_pointer::name::{EventName, parse_names};
//!
//! assert_eq!(EventName::translate("mousedown"), EventName::Down);
//! assert_eq!(EventName::translate("contextmenu"), EventName::Click);
//! assert_eq!(EventName::translate("pinch").as_str(), "pinch");
//!
//! let names = parse_names("mouseup  dblclick");
//! assert_eq!(names.as_slice(), &[EventName::Up, EventName::DblClick]);
//! assert_eq!(parse_names("*").len(), EventName::VOCABULARY.len());
//! ```

use alloc::string::String;
use core::fmt;

use smallvec::SmallVec;

use crate::event::NativeEventKind;

/// Name under which subscribers register and events are dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A click, including the secondary-button "context menu" click.
    Click,
    /// A double click.
    DblClick,
    /// A button went down.
    Down,
    /// A button went up.
    Up,
    /// The pointer entered the source.
    Enter,
    /// The pointer moved.
    Move,
    /// The pointer left the source.
    Leave,
    /// The wheel turned.
    Wheel,
    /// Any name outside the table, passed through as-is.
    Other(String),
}

/// Wildcard that expands to every member of [`EventName::VOCABULARY`].
pub const WILDCARD: &str = "*";

impl EventName {
    /// Every canonical name, in the order the wildcard expands to.
    pub const VOCABULARY: [Self; 8] = [
        Self::Click,
        Self::DblClick,
        Self::Down,
        Self::Up,
        Self::Enter,
        Self::Move,
        Self::Leave,
        Self::Wheel,
    ];

    /// Translates a raw or canonical name to its canonical form.
    #[must_use]
    pub fn translate(raw: &str) -> Self {
        match raw {
            "click" | "contextmenu" => Self::Click,
            "dblclick" => Self::DblClick,
            "mousedown" | "down" => Self::Down,
            "mouseup" | "up" => Self::Up,
            "mouseover" | "mouseenter" | "over" | "enter" => Self::Enter,
            "mousemove" | "move" => Self::Move,
            "mouseout" | "mouseleave" | "out" | "leave" => Self::Leave,
            "mousewheel" | "wheel" => Self::Wheel,
            other => Self::Other(other.into()),
        }
    }

    /// The name as subscribers spell it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::Down => "down",
            Self::Up => "up",
            Self::Enter => "enter",
            Self::Move => "move",
            Self::Leave => "leave",
            Self::Wheel => "wheel",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Returns `true` for members of [`EventName::VOCABULARY`].
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<NativeEventKind> for EventName {
    fn from(kind: NativeEventKind) -> Self {
        Self::translate(kind.as_str())
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a space-separated name list and translates each entry.
///
/// A `*` entry expands to the whole vocabulary. Empty entries are skipped.
/// Duplicates are kept: subscribing `"click click"` registers twice.
#[must_use]
pub fn parse_names(names: &str) -> SmallVec<[EventName; 8]> {
    let mut out = SmallVec::new();
    for token in names.split(' ').filter(|t| !t.is_empty()) {
        if token == WILDCARD {
            out.extend(EventName::VOCABULARY);
        } else {
            out.push(EventName::translate(token));
        }
    }
    out
}
