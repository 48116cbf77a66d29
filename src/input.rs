//! Operator triggers and manual override keys.

use crate::types::CommandAxes;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::time::Duration;

/// Edge-triggered actions for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers {
    /// Headset gaze calibration routine
    pub calibrate_gaze: bool,
    pub toggle_logging: bool,
    /// Capture the shared headset/drone origin
    pub mark_origin: bool,
    pub take_off: bool,
    pub land: bool,
}

/// Override keys held during this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualOverride {
    pub yaw_right: bool,
    pub yaw_left: bool,
    pub up: bool,
    pub down: bool,
    pub strafe_right: bool,
    pub strafe_left: bool,
    pub forward: bool,
    pub back: bool,
}

impl ManualOverride {
    /// Overwrite (not blend) each axis whose key is held. When both keys
    /// of a pair are held the negative direction wins.
    pub fn apply(&self, mut axes: CommandAxes) -> CommandAxes {
        fn overwrite(axis: &mut f64, positive: bool, negative: bool) {
            if positive {
                *axis = 1.0;
            }
            if negative {
                *axis = -1.0;
            }
        }
        overwrite(&mut axes.ry, self.forward, self.back);
        overwrite(&mut axes.lx, self.yaw_right, self.yaw_left);
        overwrite(&mut axes.rx, self.strafe_right, self.strafe_left);
        overwrite(&mut axes.ly, self.up, self.down);
        axes
    }

    pub fn is_active(&self) -> bool {
        *self != ManualOverride::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub triggers: Triggers,
    pub manual: ManualOverride,
    pub quit: bool,
}

pub trait InputSource {
    /// Non-blocking poll of everything that happened since the last tick.
    fn poll(&mut self) -> io::Result<InputFrame>;
}

/// Fold one key press into the frame.
///
/// Bindings: space gaze calibration, g logging, o origin, t take-off,
/// l land, arrows forward/back/strafe, w/s vertical, a/d yaw, q/esc quit.
pub fn apply_key(frame: &mut InputFrame, key: &KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => frame.quit = true,
        KeyCode::Char(' ') => frame.triggers.calibrate_gaze = true,
        KeyCode::Char('g') => frame.triggers.toggle_logging = true,
        KeyCode::Char('o') => frame.triggers.mark_origin = true,
        KeyCode::Char('t') => frame.triggers.take_off = true,
        KeyCode::Char('l') => frame.triggers.land = true,
        KeyCode::Up => frame.manual.forward = true,
        KeyCode::Down => frame.manual.back = true,
        KeyCode::Right => frame.manual.strafe_right = true,
        KeyCode::Left => frame.manual.strafe_left = true,
        KeyCode::Char('w') => frame.manual.up = true,
        KeyCode::Char('s') => frame.manual.down = true,
        KeyCode::Char('d') => frame.manual.yaw_right = true,
        KeyCode::Char('a') => frame.manual.yaw_left = true,
        KeyCode::Char('q') | KeyCode::Esc => frame.quit = true,
        _ => {}
    }
}

/// Terminal keyboard in raw mode. Terminals report presses and auto-repeat
/// only, so an override key counts as held on ticks where it repeats.
pub struct KeyboardInput;

impl KeyboardInput {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(KeyboardInput)
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> io::Result<InputFrame> {
        let mut frame = InputFrame::default();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                apply_key(&mut frame, &key);
            }
        }
        Ok(frame)
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedAction {
    CalibrateGaze,
    ToggleLogging,
    MarkOrigin,
    TakeOff,
    Land,
}

/// Fires triggers at fixed ticks; used when no operator is attached.
pub struct ScriptedInput {
    tick: u64,
    schedule: Vec<(u64, ScriptedAction)>,
}

impl ScriptedInput {
    pub fn new(mut schedule: Vec<(u64, ScriptedAction)>) -> Self {
        schedule.sort_by_key(|(tick, _)| *tick);
        Self { tick: 0, schedule }
    }

    /// Demo session: gaze calibration, start logging, take off, mark the
    /// origin, later land and stop logging.
    pub fn demo(tick_hz: u32) -> Self {
        let at = |secs: f64| (secs * tick_hz as f64).round() as u64;
        Self::new(vec![
            (at(0.2), ScriptedAction::CalibrateGaze),
            (at(0.5), ScriptedAction::ToggleLogging),
            (at(1.0), ScriptedAction::TakeOff),
            (at(2.0), ScriptedAction::MarkOrigin),
            (at(25.0), ScriptedAction::Land),
            (at(26.0), ScriptedAction::ToggleLogging),
        ])
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> io::Result<InputFrame> {
        let mut frame = InputFrame::default();
        for (_, action) in self.schedule.iter().filter(|(tick, _)| *tick == self.tick) {
            match action {
                ScriptedAction::CalibrateGaze => frame.triggers.calibrate_gaze = true,
                ScriptedAction::ToggleLogging => frame.triggers.toggle_logging = true,
                ScriptedAction::MarkOrigin => frame.triggers.mark_origin = true,
                ScriptedAction::TakeOff => frame.triggers.take_off = true,
                ScriptedAction::Land => frame.triggers.land = true,
            }
        }
        self.tick += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_overwrites_only_held_axes() {
        let computed = CommandAxes::new(0.3, 0.0, -0.4, 0.4);
        let manual = ManualOverride {
            back: true,
            up: true,
            ..Default::default()
        };
        let axes = manual.apply(computed);
        assert_eq!(axes, CommandAxes::new(0.3, 1.0, -0.4, -1.0));
    }

    #[test]
    fn test_override_negative_wins() {
        let manual = ManualOverride {
            yaw_left: true,
            yaw_right: true,
            ..Default::default()
        };
        assert_eq!(manual.apply(CommandAxes::default()).lx, -1.0);
    }

    #[test]
    fn test_idle_override_is_identity() {
        let axes = CommandAxes::new(1.0, 0.0, 0.4, -0.4);
        let manual = ManualOverride::default();
        assert!(!manual.is_active());
        assert_eq!(manual.apply(axes), axes);
    }

    #[test]
    fn test_key_bindings() {
        let mut frame = InputFrame::default();
        apply_key(&mut frame, &KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
        apply_key(&mut frame, &KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        assert!(frame.triggers.mark_origin);
        assert!(frame.manual.strafe_left);
        assert!(!frame.quit);

        apply_key(&mut frame, &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(frame.quit);
    }

    #[test]
    fn test_scripted_fires_once_at_tick() {
        let mut input = ScriptedInput::new(vec![(2, ScriptedAction::MarkOrigin), (0, ScriptedAction::TakeOff)]);
        assert!(input.poll().unwrap().triggers.take_off);
        assert_eq!(input.poll().unwrap(), InputFrame::default());
        assert!(input.poll().unwrap().triggers.mark_origin);
        assert_eq!(input.poll().unwrap(), InputFrame::default());
    }
}
