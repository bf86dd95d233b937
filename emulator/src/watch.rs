//! Live channel table for the `watch` command.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{cursor, execute, queue, terminal};
use scanner_core::TOP;

use crate::harness::{CHANNELS, Harness};

const FRAME: Duration = Duration::from_millis(100);
const BAR_WIDTH: usize = 40;

/// Lines drawn per frame: header plus one row per channel.
#[allow(clippy::cast_possible_truncation)]
const FRAME_LINES: u16 = 1 + CHANNELS as u16;

/// Redraws the cache in place until `duration` elapses. Returns the last
/// frame so the caller can log it.
pub fn run(harness: &Harness, duration: Duration, out: &mut impl Write) -> io::Result<Vec<String>> {
    let deadline = Instant::now() + duration;
    let mut frame;
    let mut first = true;

    execute!(out, cursor::Hide)?;
    let outcome = loop {
        frame = render(harness);
        if !first {
            queue!(out, cursor::MoveUp(FRAME_LINES), cursor::MoveToColumn(0))?;
        }
        queue!(out, terminal::Clear(terminal::ClearType::FromCursorDown))?;
        for (index, line) in frame.iter().enumerate() {
            if index == 0 {
                queue!(
                    out,
                    SetAttribute(Attribute::Bold),
                    Print(line),
                    SetAttribute(Attribute::Reset),
                    Print("\r\n")
                )?;
            } else {
                queue!(out, Print(line), Print("\r\n"))?;
            }
        }
        if let Err(err) = out.flush() {
            break Err(err);
        }
        first = false;

        if Instant::now() >= deadline {
            break Ok(());
        }
        thread::sleep(FRAME);
    };
    execute!(out, cursor::Show)?;

    outcome.map(|()| frame)
}

/// Header and one row per channel: raw count, scaled value, bar.
pub fn render(harness: &Harness) -> Vec<String> {
    let scanner = harness.scanner();
    let cursor = harness.cursor();
    let mut raw = [0_u16; CHANNELS];
    let mut scaled = [0.0_f32; CHANNELS];
    scanner.get_all(&mut raw);
    scanner.get_all_scaled(&mut scaled);

    let mut lines = Vec::with_capacity(CHANNELS + 1);
    lines.push(format!(
        "conversions={} cursor=({}, {}) {}",
        scanner.conversions(),
        cursor.current(),
        cursor.next(),
        if harness.is_paused() { "paused" } else { "running" },
    ));
    for (channel, (value, level)) in raw.iter().zip(scaled.iter()).enumerate() {
        lines.push(format!(
            "ch{channel} {value:>4} {level:.4} |{:<width$}|",
            bar(*value),
            width = BAR_WIDTH
        ));
    }
    lines
}

fn bar(value: u16) -> String {
    let filled = usize::from(value) * BAR_WIDTH / usize::from(TOP);
    "#".repeat(filled)
}
