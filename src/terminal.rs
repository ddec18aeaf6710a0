//! Terminal input and output
//!
//! [Terminal] switches the console into raw mode on an alternate screen and
//! restores it when dropped. [Keyboard] turns key events into per-frame
//! [Controls].

use std::io::{self, BufWriter, Stdout, Write};
use std::mem;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::Print;
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
    EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use log::warn;

use crate::game::Controls;
use crate::screen::Screen;

/// Without release events, a key counts as held this long after its last
/// press or repeat
pub const HOLD_WINDOW: Duration = Duration::from_millis(150);

/// Presentation sink, standard output unless built on another writer
pub struct Terminal<W: Write = BufWriter<Stdout>> {
    out: W,
    key_release: bool,
}

impl Terminal {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // Restored on drop from here on, also if the rest of the setup fails
        let mut term = Self::with_output(BufWriter::with_capacity(16384, io::stdout()));
        term.open_screen()?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            term.report_key_release()?;
        } else {
            warn!(
                "Terminal does not report key releases, holding keys for {} ms after each press",
                HOLD_WINDOW.as_millis()
            );
        }
        Ok(term)
    }
}

impl<W: Write> Terminal<W> {
    fn with_output(out: W) -> Self {
        Self {
            out,
            key_release: false,
        }
    }

    fn open_screen(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            EnterAlternateScreen,
            Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )
    }

    fn report_key_release(&mut self) -> io::Result<()> {
        // Set first, so a half-written push is still popped
        self.key_release = true;
        execute!(
            self.out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
    }

    /// Whether key release events will arrive
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    /// Draw a sealed frame from the top-left corner
    pub fn present(&mut self, screen: &Screen) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        for (y, row) in screen.rows().enumerate() {
            queue!(self.out, MoveTo(0, y as u16), Print(row))?;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()
    }

    /// Undo every setup step, returning the first failure
    fn restore(&mut self) -> io::Result<()> {
        let flags = if self.key_release {
            execute!(self.out, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        let screen = execute!(self.out, EnableLineWrap, Show, LeaveAlternateScreen);
        let raw = terminal::disable_raw_mode();
        flags.and(screen).and(raw)
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!("Could not restore terminal: {err}");
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Held {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Hold(Held),
    ToggleMap,
    ToggleDebug,
    Confirm,
    Cancel,
}

fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Action::Hold(Held::Forward),
            's' => Action::Hold(Held::Backward),
            'a' => Action::Hold(Held::StrafeLeft),
            'd' => Action::Hold(Held::StrafeRight),
            'q' => Action::Hold(Held::TurnLeft),
            'e' => Action::Hold(Held::TurnRight),
            'm' => Action::ToggleMap,
            'i' => Action::ToggleDebug,
            _ => return None,
        },
        KeyCode::Up => Action::Hold(Held::Forward),
        KeyCode::Down => Action::Hold(Held::Backward),
        KeyCode::Left => Action::Hold(Held::TurnLeft),
        KeyCode::Right => Action::Hold(Held::TurnRight),
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Cancel,
        _ => return None,
    };
    Some(action)
}

/// Key state tracker
///
/// Movement keys are level-triggered, the rest fire once per press.
pub struct Keyboard {
    key_release: bool,
    /// Indexed by [Held] discriminant
    last_seen: [Option<Instant>; 6],
    edges: Controls,
}

impl Keyboard {
    pub fn new(key_release: bool) -> Self {
        Self {
            key_release,
            last_seen: [None; 6],
            edges: Controls::default(),
        }
    }

    /// Drain pending terminal events and return the controls for this frame
    pub fn poll(&mut self) -> io::Result<Controls> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.handle(key, Instant::now());
            }
        }
        Ok(self.controls(Instant::now()))
    }

    pub fn handle(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.edges.cancel = true;
            return;
        }
        let Some(action) = action_for(key.code) else {
            return;
        };
        match (action, key.kind) {
            (Action::Hold(held), KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.last_seen[held as usize] = Some(now);
            }
            (Action::Hold(held), KeyEventKind::Release) => {
                self.last_seen[held as usize] = None;
            }
            (_, KeyEventKind::Release | KeyEventKind::Repeat) => (),
            (Action::ToggleMap, _) => self.edges.toggle_map = true,
            (Action::ToggleDebug, _) => self.edges.toggle_debug = true,
            (Action::Confirm, _) => self.edges.confirm = true,
            (Action::Cancel, _) => self.edges.cancel = true,
        }
    }

    /// Snapshot at `now`; one-shot keys are consumed
    pub fn controls(&mut self, now: Instant) -> Controls {
        let held = |h: Held| {
            self.last_seen[h as usize].is_some_and(|seen| {
                self.key_release || now.saturating_duration_since(seen) <= HOLD_WINDOW
            })
        };
        let controls = Controls {
            forward: held(Held::Forward),
            backward: held(Held::Backward),
            strafe_left: held(Held::StrafeLeft),
            strafe_right: held(Held::StrafeRight),
            turn_left: held(Held::TurnLeft),
            turn_right: held(Held::TurnRight),
            ..Controls::default()
        };
        Controls {
            toggle_map: mem::take(&mut self.edges.toggle_map),
            toggle_debug: mem::take(&mut self.edges.toggle_debug),
            confirm: mem::take(&mut self.edges.confirm),
            cancel: mem::take(&mut self.edges.cancel),
            ..controls
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::io::{self, Write};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    use super::{Keyboard, Terminal, HOLD_WINDOW};
    use crate::screen::Screen;

    const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";
    const POP_KEYBOARD_FLAGS: &str = "\x1b[<1u";

    /// Output that keeps what was written and fails the first `failures` writes
    #[derive(Clone, Default)]
    struct Recorder {
        bytes: Rc<RefCell<Vec<u8>>>,
        failures: Rc<Cell<usize>>,
    }

    impl Recorder {
        fn failing(failures: usize) -> Self {
            let recorder = Self::default();
            recorder.failures.set(failures);
            recorder
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
        }
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.bytes.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_setup_still_restores_on_drop() {
        let out = Recorder::failing(1);
        let mut term = Terminal::with_output(out.clone());
        assert_eq!(term.open_screen().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        drop(term);
        assert!(out.text().contains(LEAVE_ALTERNATE_SCREEN));
    }

    #[test]
    fn restore_pops_keyboard_flags_after_push() {
        let out = Recorder::default();
        let mut term = Terminal::with_output(out.clone());
        term.open_screen().unwrap();
        term.report_key_release().unwrap();
        assert!(term.reports_key_release());
        drop(term);

        let text = out.text();
        assert!(text.contains(POP_KEYBOARD_FLAGS));
        assert!(text.ends_with(LEAVE_ALTERNATE_SCREEN));
    }

    #[test]
    fn restore_keeps_going_after_write_error() {
        let out = Recorder::failing(1);
        let mut term = Terminal::with_output(out.clone());
        term.key_release = true;
        assert!(term.restore().is_err());
        assert!(out.text().contains(LEAVE_ALTERNATE_SCREEN));
    }

    #[test]
    fn present_prints_rows_up_to_terminator() {
        let out = Recorder::default();
        let mut term = Terminal::with_output(out.clone());
        let mut screen = Screen::new(4, 2).unwrap();
        screen.write_str(0, 0, "ab");
        screen.seal();

        term.present(&screen).unwrap();
        let text = out.text();
        assert!(text.contains("ab  "));
        assert!(!text.contains('\0'));
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn held_until_release() {
        let mut keyboard = Keyboard::new(true);
        let t0 = Instant::now();
        keyboard.handle(press(KeyCode::Char('w')), t0);
        keyboard.handle(press(KeyCode::Left), t0);

        let later = t0 + Duration::from_secs(2);
        let controls = keyboard.controls(later);
        assert!(controls.forward && controls.turn_left);
        assert!(!controls.backward);

        keyboard.handle(release(KeyCode::Char('w')), later);
        assert!(!keyboard.controls(later).forward);
    }

    #[test]
    fn held_within_window_without_release_events() {
        let mut keyboard = Keyboard::new(false);
        let t0 = Instant::now();
        keyboard.handle(press(KeyCode::Char('D')), t0);

        assert!(keyboard.controls(t0 + HOLD_WINDOW).strafe_right);
        assert!(!keyboard.controls(t0 + HOLD_WINDOW * 2).strafe_right);
    }

    #[test]
    fn one_shot_keys_fire_once() {
        let mut keyboard = Keyboard::new(true);
        let t0 = Instant::now();
        keyboard.handle(press(KeyCode::Enter), t0);
        keyboard.handle(press(KeyCode::Char('m')), t0);
        keyboard.handle(release(KeyCode::Enter), t0);

        let first = keyboard.controls(t0);
        assert!(first.confirm && first.toggle_map);
        let second = keyboard.controls(t0);
        assert!(!second.confirm && !second.toggle_map);
    }

    #[test]
    fn ctrl_c_cancels() {
        let mut keyboard = Keyboard::new(false);
        let t0 = Instant::now();
        keyboard.handle(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), t0);
        assert!(keyboard.controls(t0).cancel);
    }
}
