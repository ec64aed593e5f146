//! Gesture registrations layered on top of a node's properties.

use crate::event::HandlerId;

/// How a gesture competes with gestures registered on ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum GesturePriority {
    #[default]
    Normal,
    /// Wins over descendant gestures listening to the same events.
    High,
    /// Fires alongside other gestures instead of competing.
    Simultaneous,
}

/// One gesture registration: the DOM events it listens to, its priority,
/// and the handler it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gesture {
    pub events: Vec<String>,
    pub priority: GesturePriority,
    pub handler: HandlerId,
}

impl Gesture {
    pub fn new(
        events: impl IntoIterator<Item = impl Into<String>>,
        priority: GesturePriority,
        handler: HandlerId,
    ) -> Self {
        Self {
            events: events.into_iter().map(Into::into).collect(),
            priority,
            handler,
        }
    }

    /// A tap gesture listening to `click`.
    pub fn tap(handler: HandlerId) -> Self {
        Self::new(["click"], GesturePriority::Normal, handler)
    }

    /// A long-press gesture listening to pointer down/up.
    pub fn long_press(handler: HandlerId) -> Self {
        Self::new(["pointerdown", "pointerup"], GesturePriority::Normal, handler)
    }

    /// A drag gesture listening to the pointer event sequence.
    pub fn drag(handler: HandlerId) -> Self {
        Self::new(
            ["pointerdown", "pointermove", "pointerup"],
            GesturePriority::Normal,
            handler,
        )
    }

    /// Builder: change the priority.
    pub fn with_priority(mut self, priority: GesturePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn listens_to(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_listens_to_click() {
        let g = Gesture::tap(HandlerId::from_raw(1));
        assert!(g.listens_to("click"));
        assert!(!g.listens_to("pointerdown"));
        assert_eq!(g.priority, GesturePriority::Normal);
    }

    #[test]
    fn priority_builder() {
        let g = Gesture::drag(HandlerId::from_raw(2)).with_priority(GesturePriority::High);
        assert_eq!(g.priority, GesturePriority::High);
        assert_eq!(g.events.len(), 3);
    }
}
