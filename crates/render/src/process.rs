use std::io;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// SIGKILLs the tool's process group when dropped while armed. Helpers the tool
/// spawned itself (ImageMagick delegates, say) share the group and die with it.
struct GroupKill(Option<u32>);

impl GroupKill {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        let Some(pid) = self.0.take() else {
            return;
        };
        #[cfg(unix)]
        if let Ok(pgid) = i32::try_from(pid) {
            unsafe {
                let _ = libc::kill(-pgid, libc::SIGKILL);
            }
        }
        #[cfg(not(unix))]
        let _ = pid;
    }
}

/// Run an external tool to completion, optionally feeding it `input` on stdin.
///
/// The tool and anything it spawns are killed if the returned future is
/// dropped, so cancelling a request never leaves work running in the background.
pub(crate) async fn run_tool(mut cmd: Command, input: Option<&[u8]>) -> io::Result<Output> {
    #[cfg(unix)]
    cmd.process_group(0);
    cmd.kill_on_drop(true)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    let mut group = GroupKill(child.id());
    let stdin = child.stdin.take();

    let feed = async move {
        let (Some(mut stdin), Some(input)) = (stdin, input) else {
            return Ok(());
        };
        stdin.write_all(input).await?;
        stdin.shutdown().await
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    // The leader is reaped, so its pid may be reused from here on.
    group.disarm();
    let output = output?;
    match fed {
        // The tool may exit before draining stdin; its exit status tells the real story.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(output),
        Err(err) => Err(err),
        Ok(()) => Ok(output),
    }
}

/// Human-readable failure text from a tool's stderr, without the `err:` line prefixes.
pub(crate) fn failure_message(tool: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix("err:").map(str::trim_start).unwrap_or(line))
        .collect();
    if lines.is_empty() {
        format!("{tool} exited with {}", output.status)
    } else {
        lines.join("\n")
    }
}
