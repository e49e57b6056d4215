use crate::event::GameEvent;
use crate::foundation::core::Rgb8;

/// One of the two opposing participants and its display color.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Side {
    /// Human-readable name (team nickname).
    #[serde(alias = "nickname")]
    pub name: String,
    /// Fixed display color for the whole run.
    #[serde(alias = "main_color", alias = "mainColor")]
    pub color: Rgb8,
}

impl Side {
    pub fn new(name: impl Into<String>, color: Rgb8) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Names one of the two sides handed to the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SideSlot {
    A,
    #[default]
    B,
}

impl SideSlot {
    pub fn other(self) -> Self {
        match self {
            SideSlot::A => SideSlot::B,
            SideSlot::B => SideSlot::A,
        }
    }
}

/// Foreground/background colors for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Dark modules (active side).
    pub foreground: Rgb8,
    /// Light modules and quiet zone (inactive side).
    pub background: Rgb8,
}

/// Tracks which side is active and flips on transition events.
///
/// `initial_active` is the side that is active *before* the first transition event. A feed
/// normally opens with a transition (start of the first half-inning), so with the default
/// `SideSlot::B` the first transition hands the foreground to side A.
#[derive(Debug)]
pub struct PaletteTracker<'a> {
    active: &'a Side,
    inactive: &'a Side,
    transition_type: i64,
    transitions: u64,
}

impl<'a> PaletteTracker<'a> {
    pub fn new(
        side_a: &'a Side,
        side_b: &'a Side,
        initial_active: SideSlot,
        transition_type: i64,
    ) -> Self {
        let (active, inactive) = match initial_active {
            SideSlot::A => (side_a, side_b),
            SideSlot::B => (side_b, side_a),
        };
        Self {
            active,
            inactive,
            transition_type,
            transitions: 0,
        }
    }

    /// Apply `event` (swapping first if it is a transition) and return its palette.
    pub fn on_event(&mut self, event: &GameEvent) -> Palette {
        if event.kind == self.transition_type {
            std::mem::swap(&mut self.active, &mut self.inactive);
            self.transitions += 1;
        }
        self.palette()
    }

    /// Palette for the current state without consuming an event.
    pub fn palette(&self) -> Palette {
        Palette {
            foreground: self.active.color,
            background: self.inactive.color,
        }
    }

    pub fn active(&self) -> &'a Side {
        self.active
    }

    pub fn inactive(&self) -> &'a Side {
        self.inactive
    }

    /// Number of transition events seen so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sides() -> (Side, Side) {
        (
            Side::new("Away", Rgb8::new(255, 0, 0)),
            Side::new("Home", Rgb8::new(0, 0, 255)),
        )
    }

    fn ev(kind: i64) -> GameEvent {
        GameEvent::new(kind, "x")
    }

    #[test]
    fn initial_assignment_is_explicit() {
        let (a, b) = sides();
        let t = PaletteTracker::new(&a, &b, SideSlot::A, 2);
        assert_eq!(t.active().name, "Away");
        let t = PaletteTracker::new(&a, &b, SideSlot::B, 2);
        assert_eq!(t.active().name, "Home");
        assert_eq!(t.palette().background, a.color);
    }

    #[test]
    fn transition_swaps_before_returning_colors() {
        let (a, b) = sides();
        let mut t = PaletteTracker::new(&a, &b, SideSlot::B, 2);
        let p = t.on_event(&ev(2));
        assert_eq!(p.foreground, a.color);
        assert_eq!(p.background, b.color);
        assert_eq!(t.transitions(), 1);
    }

    #[test]
    fn non_transition_events_keep_state() {
        let (a, b) = sides();
        let mut t = PaletteTracker::new(&a, &b, SideSlot::A, 2);
        let before = t.palette();
        for kind in [0, 1, 3, 12, -1] {
            assert_eq!(t.on_event(&ev(kind)), before);
        }
        assert_eq!(t.transitions(), 0);
    }

    #[test]
    fn two_transitions_restore_initial_state() {
        let (a, b) = sides();
        let mut t = PaletteTracker::new(&a, &b, SideSlot::A, 2);
        let initial = t.palette();
        let once = t.on_event(&ev(2));
        assert_eq!(once.foreground, initial.background);
        assert_eq!(once.background, initial.foreground);
        assert_eq!(t.on_event(&ev(2)), initial);
    }

    #[test]
    fn transition_marker_is_configurable() {
        let (a, b) = sides();
        let mut t = PaletteTracker::new(&a, &b, SideSlot::A, 7);
        assert_eq!(t.on_event(&ev(2)).foreground, a.color);
        assert_eq!(t.on_event(&ev(7)).foreground, b.color);
    }

    #[test]
    fn side_slot_other_is_involution() {
        assert_eq!(SideSlot::A.other(), SideSlot::B);
        assert_eq!(SideSlot::B.other().other(), SideSlot::B);
    }
}
