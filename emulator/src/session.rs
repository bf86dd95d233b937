use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant as HostInstant};

use scanner_core::ScanCursor;

use crate::command::{self, Command};
use crate::harness::{CHANNELS, Harness};

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("get", "get <channel>          - latest raw sample of one channel"),
    ("scaled", "scaled <channel>       - latest sample divided by TOP"),
    ("all", "all                    - raw samples of every channel"),
    ("all-scaled", "all-scaled             - scaled samples of every channel"),
    ("cursor", "cursor                 - channel converting now and the one queued next"),
    ("stats", "stats                  - conversion count and clock configuration"),
    ("history", "history [n]            - most recent latches, oldest first"),
    ("step", "step [n]               - fire the completion interrupt n times while paused"),
    ("pause", "pause                  - stop the interrupt thread"),
    ("resume", "resume                 - restart the interrupt thread"),
    ("watch", "watch <seconds>        - live table of every channel"),
    ("help", "help [topic]           - show help for a command"),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Interactive,
    Scan,
    Stepping,
}

impl TranscriptProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Interactive => "transcripts/emulator-session.log",
            TranscriptProfile::Scan => "transcripts/emulator-scan.log",
            TranscriptProfile::Stepping => "transcripts/emulator-stepping.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Interactive => "ADC Scanner Emulator session transcript",
            TranscriptProfile::Scan => "ADC Scanner Emulator free-running scan transcript",
            TranscriptProfile::Stepping => "ADC Scanner Emulator single-step transcript",
        }
    }
}

/// What the console should do with a command.
#[derive(Debug)]
pub enum Reply {
    Lines(Vec<String>),
    /// Draw the live table for this long, then hand the last frame to
    /// [`Session::record_watch`].
    Watch(Duration),
}

pub struct Session {
    harness: Harness,
    transcript: TranscriptLogger,
    started_at: HostInstant,
}

impl Session {
    pub fn new(profile: TranscriptProfile, harness: Harness) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(profile)?;
        let mut session = Self {
            harness,
            transcript,
            started_at: HostInstant::now(),
        };
        let banner = session.banner();
        session.record_output(Duration::ZERO, &banner)?;
        Ok(session)
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Configuration summary printed at start-up.
    pub fn banner(&self) -> Vec<String> {
        let config = self.harness.config();
        vec![
            format!(
                "scanning {CHANNELS} channels, reference {}, {} Hz CPU clock",
                config.reference(),
                config.cpu_hz()
            ),
            format!(
                "prescaler {} -> {} Hz conversion clock, interrupt rate {}/s",
                config.prescaler(),
                config.conversion_clock_hz(),
                self.harness.rate()
            ),
        ]
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Reply> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Reply::Lines(Vec::new()));
        }

        let elapsed = self.started_at.elapsed();
        self.transcript
            .append_line(elapsed, TranscriptRole::Host, trimmed)?;

        let lines = match command::parse(trimmed) {
            Ok(Command::Watch { duration }) if !duration.is_zero() => {
                return Ok(Reply::Watch(duration));
            }
            Ok(Command::Watch { .. }) => vec!["ERR watch needs a positive duration".to_string()],
            Ok(Command::Help { topic }) => help_lines(topic.as_deref()),
            Ok(command) => self.execute(&command),
            Err(err) => vec![format!("ERR syntax {err}")],
        };

        self.record_output(elapsed, &lines)?;
        Ok(Reply::Lines(lines))
    }

    /// Logs the outcome of a `watch` that the console has finished drawing.
    pub fn record_watch(&mut self, duration: Duration, frame: &[String]) -> io::Result<Vec<String>> {
        let mut lines = vec![format!("OK watched {}s, last frame:", duration.as_secs())];
        lines.extend(frame.iter().map(|row| format!("  {row}")));
        self.record_output(self.started_at.elapsed(), &lines)?;
        Ok(lines)
    }

    fn execute(&self, command: &Command) -> Vec<String> {
        let scanner = self.harness.scanner();
        match command {
            Command::Get { channel } => match scanner.try_get(*channel) {
                Some(raw) => vec![format!("OK ch{channel} raw={raw}")],
                None => vec![out_of_range(*channel)],
            },
            Command::Scaled { channel } => {
                if scanner.try_get(*channel).is_some() {
                    vec![format!(
                        "OK ch{channel} scaled={:.4}",
                        scanner.get_scaled(*channel)
                    )]
                } else {
                    vec![out_of_range(*channel)]
                }
            }
            Command::All => {
                let mut raw = [0_u16; CHANNELS];
                scanner.get_all(&mut raw);
                vec![format!("OK raw={raw:?}")]
            }
            Command::AllScaled => {
                let mut scaled = [0.0_f32; CHANNELS];
                scanner.get_all_scaled(&mut scaled);
                let values: Vec<String> = scaled.iter().map(|value| format!("{value:.4}")).collect();
                vec![format!("OK scaled=[{}]", values.join(", "))]
            }
            Command::Cursor => {
                let cursor = self.harness.cursor();
                vec![format!(
                    "OK cursor current={} next={} {}",
                    cursor.current(),
                    cursor.next(),
                    cursor_state(cursor, scanner.conversions())
                )]
            }
            Command::Stats => {
                let config = self.harness.config();
                vec![
                    format!(
                        "OK conversions={} filled={} paused={} interrupt-thread={}",
                        scanner.conversions(),
                        scanner.is_filled(),
                        self.harness.is_paused(),
                        if self.harness.is_running() { "alive" } else { "stopped" }
                    ),
                    format!(
                        "clock={}Hz prescaler={} adc-clock={}Hz rate={}/s reference={}",
                        config.cpu_hz(),
                        config.prescaler(),
                        config.conversion_clock_hz(),
                        self.harness.rate(),
                        config.reference()
                    ),
                ]
            }
            Command::History { limit } => {
                let latches = self.harness.history(*limit);
                let mut lines = vec![format!("OK history {} latches", latches.len())];
                lines.extend(latches.iter().map(|latch| {
                    format!(
                        "  seq={:>6} ch{} value={:>4}",
                        latch.sequence, latch.channel, latch.value
                    )
                }));
                lines
            }
            Command::Step { count } => self.step(*count),
            Command::Pause => {
                self.harness.pause();
                vec![format!("OK paused at conversion {}", scanner.conversions())]
            }
            Command::Resume => {
                self.harness.resume();
                vec!["OK resumed".to_string()]
            }
            Command::Watch { .. } | Command::Help { .. } => Vec::new(),
        }
    }

    fn step(&self, count: u64) -> Vec<String> {
        if !self.harness.is_paused() {
            return vec!["ERR step requires `pause` first".to_string()];
        }
        if count == 0 {
            return vec!["ERR step count must be positive".to_string()];
        }

        match self.harness.step(count) {
            Some(latch) => {
                let cursor = self.harness.cursor();
                vec![format!(
                    "OK stepped {count} last seq={} ch{} value={} cursor=({}, {})",
                    latch.sequence,
                    latch.channel,
                    latch.value,
                    cursor.current(),
                    cursor.next()
                )]
            }
            None => vec!["ERR converter is not running".to_string()],
        }
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.transcript
                .append_line(elapsed, TranscriptRole::Emulator, line)?;
        }
        Ok(())
    }
}

fn out_of_range(channel: usize) -> String {
    format!("ERR channel {channel} outside 0..{CHANNELS}")
}

fn cursor_state(cursor: ScanCursor, conversions: u32) -> &'static str {
    if conversions == 0 {
        "primed"
    } else if cursor.is_steady(CHANNELS) {
        "steady"
    } else {
        "out-of-step"
    }
}

fn help_lines(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        None => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(profile: TranscriptProfile) -> io::Result<Self> {
        let path = Path::new(profile.log_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(profile)?;
        Ok(logger)
    }

    fn write_header(&mut self, profile: TranscriptProfile) -> io::Result<()> {
        writeln!(self.writer, "# {}", profile.header())?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_help_topic() {
        for keyword in [
            "get", "scaled", "all", "all-scaled", "cursor", "stats", "history", "step", "pause",
            "resume", "watch", "help",
        ] {
            let lines = help_lines(Some(keyword));
            assert_eq!(lines.len(), 1, "missing help for {keyword}");
            assert!(lines[0].starts_with(keyword));
        }
    }

    #[test]
    fn unknown_topics_list_the_known_ones() {
        let lines = help_lines(Some("reboot"));
        assert_eq!(lines[0], "No help available for `reboot`.");
        assert!(lines[1].contains("all-scaled"));
    }

    #[test]
    fn cursor_reports_priming_until_the_first_latch() {
        assert_eq!(cursor_state(ScanCursor::PRIMED, 0), "primed");
        assert_eq!(cursor_state(ScanCursor::at(3, CHANNELS), 10), "steady");
    }
}
