//! Keyboard controls for the timer.
//!
//! The mapping is terminal-agnostic: front ends translate their key events
//! into characters (Esc arrives as [`Control::Quit`] directly).

use crate::controller::{FocusController, CUSTOM_STEP_MINUTES};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    StartPause,
    Reset,
    /// Digit keys 1-4, 1-based.
    Preset(usize),
    EndEarly,
    Custom,
    CustomUp,
    CustomDown,
    BonusRound,
    Quit,
}

impl Control {
    /// Map a typed character. Letters are case-insensitive.
    pub fn from_key(key: char) -> Option<Self> {
        let control = match key.to_ascii_lowercase() {
            ' ' => Control::StartPause,
            'r' => Control::Reset,
            d @ '1'..='4' => Control::Preset(d as usize - '0' as usize),
            'b' => Control::EndEarly,
            'c' => Control::Custom,
            '+' | '=' => Control::CustomUp,
            '-' | '_' => Control::CustomDown,
            'n' => Control::BonusRound,
            'q' => Control::Quit,
            _ => return None,
        };
        Some(control)
    }

    /// One-line key legend.
    pub fn help() -> &'static str {
        "1-4 presets | space start/pause | r reset | b bank | c custom | +/- custom length | n bonus round | q quit"
    }
}

/// Apply a control to the controller. `Quit` is left to the caller.
pub fn dispatch(controller: &mut FocusController, control: Control) -> Vec<Event> {
    match control {
        Control::StartPause => {
            if !controller.engine().quest_chosen() {
                return Vec::new();
            }
            controller.start_pause()
        }
        Control::Reset => controller.reset(),
        Control::Preset(n) => controller.start_preset(n),
        Control::EndEarly => controller.end_early(),
        Control::Custom => controller.start_custom(),
        Control::CustomUp => {
            controller.adjust_custom(CUSTOM_STEP_MINUTES);
            Vec::new()
        }
        Control::CustomDown => {
            controller.adjust_custom(-CUSTOM_STEP_MINUTES);
            Vec::new()
        }
        Control::BonusRound => controller.bonus_round(),
        Control::Quit => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Alerts, RecordingSink};
    use crate::storage::MemoryStore;
    use crate::timer::SessionState;

    fn controller() -> FocusController {
        FocusController::new(Box::new(MemoryStore::new()))
            .with_alerts(Alerts::new(Box::new(RecordingSink::new())))
    }

    #[test]
    fn key_map() {
        assert_eq!(Control::from_key(' '), Some(Control::StartPause));
        assert_eq!(Control::from_key('R'), Some(Control::Reset));
        assert_eq!(Control::from_key('3'), Some(Control::Preset(3)));
        assert_eq!(Control::from_key('5'), None);
        assert_eq!(Control::from_key('+'), Some(Control::CustomUp));
        assert_eq!(Control::from_key('q'), Some(Control::Quit));
        assert_eq!(Control::from_key('x'), None);
    }

    #[test]
    fn space_needs_a_chosen_quest() {
        let mut c = controller();
        assert!(dispatch(&mut c, Control::StartPause).is_empty());
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn digits_start_presets() {
        let mut c = controller();
        dispatch(&mut c, Control::Preset(4));
        assert_eq!(c.state(), SessionState::Running);
        assert_eq!(c.engine().duration_secs(), 30.0 * 60.0);

        dispatch(&mut c, Control::StartPause);
        assert_eq!(c.state(), SessionState::Ready);
        dispatch(&mut c, Control::StartPause);
        assert_eq!(c.state(), SessionState::Running);

        dispatch(&mut c, Control::Reset);
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn custom_keys() {
        let mut c = controller();
        dispatch(&mut c, Control::CustomDown);
        dispatch(&mut c, Control::Custom);
        assert_eq!(c.engine().duration_secs(), 40.0 * 60.0);
    }
}
