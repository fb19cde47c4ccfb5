//! Raw-mode line input for the chat prompt.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Restores the terminal even when a read errors out.
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Reads one line from the terminal. Returns `None` when the user cancels
/// with Esc or Ctrl+C.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    read_line_impl(prompt, true)
}

/// Reads one line without echoing typed characters. Used for secrets.
pub fn read_line_hidden(prompt: &str) -> Result<Option<String>> {
    read_line_impl(prompt, false)
}

fn read_line_impl(prompt: &str, echo: bool) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    enable_raw_mode()?;
    let _guard = RawModeGuard;

    let mut buffer = String::new();
    loop {
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        print!("\r\n");
                        io::stdout().flush().ok();
                        return Ok(None);
                    }
                    KeyCode::Esc => {
                        print!("\r\n");
                        io::stdout().flush().ok();
                        return Ok(None);
                    }
                    KeyCode::Enter => {
                        print!("\r\n");
                        io::stdout().flush().ok();
                        return Ok(Some(buffer));
                    }
                    KeyCode::Backspace => {
                        if buffer.pop().is_some() && echo {
                            print!("\u{8} \u{8}");
                            io::stdout().flush().ok();
                        }
                    }
                    KeyCode::Char(c) => {
                        buffer.push(c);
                        if echo {
                            print!("{c}");
                            io::stdout().flush().ok();
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }
}
