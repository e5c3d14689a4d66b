//! Hidden password input.

use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Prompts on stderr and reads a line without echoing it.
pub fn read_password(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    enable_raw_mode()?;
    let result = read_hidden_line();
    let _ = disable_raw_mode();
    eprintln!();

    result
}

fn read_hidden_line() -> Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };

        if kind != KeyEventKind::Press {
            continue;
        }

        match code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Esc => bail!("Password prompt cancelled"),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Password prompt cancelled")
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}
