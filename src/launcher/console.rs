use std::io::{self, IsTerminal, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

pub const PAUSE_PROMPT: &str = "Press any key to continue . . .";

/// Operator-facing output. Logging goes elsewhere; this is what the user reads.
pub trait Console {
    fn say(&mut self, line: &str);
    fn pause(&mut self, prompt: &str);
}

/// The real terminal: stdout lines and a single-key pause.
#[derive(Debug, Default)]
pub struct Terminal;

impl Console for Terminal {
    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn pause(&mut self, prompt: &str) {
        print!("{prompt}");
        let _ = io::stdout().flush();

        if !io::stdin().is_terminal() {
            println!();
            return;
        }

        if let Err(err) = wait_for_key() {
            tracing::warn!("pause failed: {err}");
        }
        println!();
    }
}

fn wait_for_key() -> io::Result<()> {
    enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(err) => break Err(err),
        }
    };
    disable_raw_mode()?;
    result
}
