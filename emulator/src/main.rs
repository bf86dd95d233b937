mod command;
mod harness;
mod options;
mod session;
mod signals;
mod watch;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use harness::Harness;
use options::{EmulatorOptions, USAGE};
use session::{Reply, Session, TranscriptProfile};

fn main() -> io::Result<()> {
    let options = EmulatorOptions::from_args(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });
    let config = options.scanner_config().unwrap_or_else(|err| {
        eprintln!("{err}");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let harness = Harness::start(config, options.rate, false);
    let mut session = Session::new(TranscriptProfile::Interactive, harness)?;
    let mut line = String::new();

    writeln!(
        writer,
        "ADC Scanner Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    for banner in session.banner() {
        writeln!(writer, "{banner}")?;
    }

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        let responses = match session.handle_command(trimmed)? {
            Reply::Lines(lines) => lines,
            Reply::Watch(duration) => {
                let frame = watch::run(session.harness(), duration, &mut writer)?;
                let mut lines = session.record_watch(duration, &frame)?;
                // The final frame is already on screen.
                lines.truncate(1);
                lines
            }
        };
        for response in responses {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
