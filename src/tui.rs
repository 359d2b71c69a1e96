//! Full-screen crossterm front end for the [`Dashboard`].

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::dashboard::{Action, Dashboard, Key, Screen};
use crate::error::MemfoError;

/// Raw mode plus the alternate screen, restored on drop.
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self, MemfoError> {
        enable_raw_mode().map_err(|e| MemfoError::Terminal(format!("enabling raw mode: {e}")))?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = disable_raw_mode();
            return Err(MemfoError::Terminal(format!("entering alternate screen: {e}")));
        }
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Translate a crossterm key press.
pub fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Interrupt)
        }
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Enter | KeyCode::Esc => Some(Key::Enter),
        _ => None,
    }
}

/// Run until the user quits. Each pass polls once, redraws, then waits at
/// most `poll_secs` for a key.
pub fn run(dashboard: &mut Dashboard) -> Result<(), MemfoError> {
    let mut guard = TerminalGuard::enter()?;
    let period = Duration::from_secs_f64(dashboard.settings().poll_secs);
    let result = event_loop(dashboard, &mut guard.stdout, period);
    dashboard.finish();
    result
}

fn event_loop(dashboard: &mut Dashboard, out: &mut Stdout, period: Duration) -> Result<(), MemfoError> {
    loop {
        let (width, height) = terminal::size()?;
        dashboard.tick(width as usize)?;
        draw(out, &dashboard.screen(), width, height)?;
        if let Some(key) = wait_key(period)? {
            if dashboard.handle_key(key) == Action::Quit {
                return Ok(());
            }
        }
    }
}

fn wait_key(period: Duration) -> io::Result<Option<Key>> {
    let deadline = Instant::now() + period;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !event::poll(remaining)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(k) => {
                if let Some(key) = map_key(k) {
                    return Ok(Some(key));
                }
            }
            Event::Resize(..) => return Ok(None),
            _ => {}
        }
    }
}

fn draw<W: Write>(out: &mut W, screen: &Screen, width: u16, height: u16) -> io::Result<()> {
    let width = width as usize;
    let height = height as usize;
    queue!(out, Clear(ClearType::All))?;

    let mut row = 0u16;
    for (i, line) in screen.header.iter().take(height).enumerate() {
        queue!(out, cursor::MoveTo(0, row))?;
        if i == 0 {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, Print(clip(line, width)), SetAttribute(Attribute::Reset))?;
        row += 1;
    }

    let room = height.saturating_sub(row as usize);
    let offset = match screen.cursor {
        Some(cursor) if cursor >= room => cursor + 1 - room,
        _ => 0,
    };
    for (i, line) in screen.body.iter().enumerate().skip(offset).take(room) {
        queue!(out, cursor::MoveTo(0, row))?;
        if screen.cursor == Some(i) {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(out, Print(clip(line, width)), SetAttribute(Attribute::Reset))?;
        row += 1;
    }
    out.flush()
}

fn clip(line: &str, width: usize) -> &str {
    match line.char_indices().nth(width) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}
