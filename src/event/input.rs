//! DOM events delivered to registered handlers.

/// An event forwarded from the DOM binding to a handler callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A click/tap.
    Click,
    /// The value of a text input changed.
    Input { value: String },
    /// A gesture-level event (`pointerdown`, `pointermove`, ...).
    Pointer { kind: String, x: i32, y: i32 },
    /// Any other named DOM event.
    Custom { name: String, detail: Option<String> },
}

impl Event {
    pub fn input(value: impl Into<String>) -> Self {
        Self::Input {
            value: value.into(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom {
            name: name.into(),
            detail: None,
        }
    }

    /// The DOM event name this event is delivered as.
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Input { .. } => "input",
            Self::Pointer { kind, .. } => kind,
            Self::Custom { name, .. } => name,
        }
    }

    /// Input value, for input events.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Input { value } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Event::Click.name(), "click");
        assert_eq!(Event::input("x").name(), "input");
        assert_eq!(Event::custom("scroll").name(), "scroll");
        let p = Event::Pointer {
            kind: "pointerdown".into(),
            x: 1,
            y: 2,
        };
        assert_eq!(p.name(), "pointerdown");
    }

    #[test]
    fn value_only_for_input() {
        assert_eq!(Event::input("abc").value(), Some("abc"));
        assert_eq!(Event::Click.value(), None);
    }
}
