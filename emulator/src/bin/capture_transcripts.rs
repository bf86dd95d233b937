use std::io;
use std::thread;
use std::time::Duration;

#[allow(dead_code)]
#[path = "../command.rs"]
mod command;
#[allow(dead_code)]
#[path = "../harness.rs"]
mod harness;
#[allow(dead_code)]
#[path = "../options.rs"]
mod options;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;
#[allow(dead_code)]
#[path = "../signals.rs"]
mod signals;
#[allow(dead_code)]
#[path = "../watch.rs"]
mod watch;

use harness::Harness;
use options::EmulatorOptions;
use session::{Reply, Session, TranscriptProfile};

fn main() -> io::Result<()> {
    record_profile(TranscriptProfile::Scan)?;
    record_profile(TranscriptProfile::Stepping)?;
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let config = EmulatorOptions::default()
        .scanner_config()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let paused = profile == TranscriptProfile::Stepping;
    let mut session = Session::new(profile, Harness::start(config, None, paused))?;
    match profile {
        TranscriptProfile::Scan => record_scan(&mut session),
        TranscriptProfile::Stepping => record_stepping(&mut session),
        TranscriptProfile::Interactive => Ok(()),
    }
}

fn record_scan(session: &mut Session) -> io::Result<()> {
    thread::sleep(Duration::from_millis(250));
    for line in ["stats", "all", "all-scaled", "cursor", "history 8"] {
        let _ = session.handle_command(line)?;
    }

    // No terminal here: sample one frame at the end instead of redrawing.
    if let Reply::Watch(duration) = session.handle_command("watch 1")? {
        thread::sleep(duration);
        let frame = watch::render(session.harness());
        let _ = session.record_watch(duration, &frame)?;
    }
    Ok(())
}

fn record_stepping(session: &mut Session) -> io::Result<()> {
    for line in [
        "cursor",
        "step",
        "cursor",
        "step 6",
        "stats",
        "history 7",
        "get 2",
        "scaled 0",
        "get 9",
        "step 0",
        "resume",
        "step",
        "help step",
    ] {
        let _ = session.handle_command(line)?;
    }
    Ok(())
}
