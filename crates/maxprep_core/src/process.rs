//! Synchronous runner for the analyzer executable.

use crate::error::Result;
use log::debug;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs `<exe> <request_json>` to completion, forwarding the child's
/// combined stdout/stderr to the debug log line by line, and returns the
/// exit code. A nonzero code is not an error here; the caller decides what
/// failure means.
///
/// Both child streams share one pipe so their lines interleave in the order
/// the analyzer produced them. The read blocks until the child closes its
/// end of the pipe; there is no timeout and no watchdog.
pub fn run_analyser(exe: &Path, request_json: &str) -> Result<i32> {
    let (reader, writer) = std::io::pipe()?;
    let mut child = Command::new(exe)
        .arg(request_json)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .spawn()?;
    // The parent's write ends were moved into the child; EOF on `reader`
    // means the analyzer has finished writing.
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            debug!("{}", line.trim_end());
        }
    }
    let status = child.wait()?;
    Ok(status.code().unwrap_or(-1))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn captures_exit_code() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ok = script(tmp.path(), "ok.sh", "#!/bin/sh\necho hello\nexit 0\n");
        assert_eq!(run_analyser(&ok, "{}").unwrap(), 0);

        let bad = script(tmp.path(), "bad.sh", "#!/bin/sh\necho oops >&2\nexit 3\n");
        assert_eq!(run_analyser(&bad, "{}").unwrap(), 3);
    }

    #[test]
    fn missing_executable_is_an_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gone = tmp.path().join("no-such-analyser");
        assert!(run_analyser(&gone, "{}").is_err());
    }

    #[test]
    fn drains_output_before_reporting_exit() {
        // A chatty child must not deadlock the single-threaded reader.
        let tmp = tempfile::TempDir::new().unwrap();
        let noisy = script(
            tmp.path(),
            "noisy.sh",
            "#!/bin/sh\ni=0\nwhile [ $i -lt 2000 ]; do echo line $i; i=$((i+1)); done\nexit 0\n",
        );
        assert_eq!(run_analyser(&noisy, "{}").unwrap(), 0);
    }
}
