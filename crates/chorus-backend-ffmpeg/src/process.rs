//! Subprocess supervision.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How a supervised process ended.
#[derive(Debug)]
pub enum Exit {
    /// The process exited on its own.
    Finished { status: ExitStatus, stderr: String },
    /// The process outlived its timeout and was killed.
    TimedOut,
}

/// Waits for `child`, killing it once `timeout` elapses.
///
/// Stderr, if piped, is drained on a separate thread so a chatty process
/// cannot block on a full pipe.
pub fn wait_with_timeout(mut child: Child, timeout: Duration) -> std::io::Result<Exit> {
    let reader = drain_stderr(&mut child);
    let start = Instant::now();

    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(Exit::TimedOut);
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok(Exit::Finished { status, stderr })
}

fn drain_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut err = child.stderr.take()?;
    Some(std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = err.read_to_string(&mut buf);
        buf
    }))
}
