//! Speaks text through an external program, such as `say` on macOS or
//! `espeak` on Linux.
//!
//! The text comes from the `v` parameter. It is echoed back in the body and
//! written to the program's stdin.

use futures::future::{BoxFuture, FutureExt};
use remotecmd::{Error, Handler, Operation, Request, Result};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const NAME: &str = "/say";

/// Parameter carrying the text to speak.
pub const TEXT_PARAM: &str = "v";

pub fn operation(program: impl Into<String>) -> Operation {
    Operation::new(
        NAME,
        "Make computer \"say\" something (passed with v parameter)",
        SayHandler {
            program: program.into(),
        },
    )
}

struct SayHandler {
    program: String,
}

impl SayHandler {
    async fn speak(&self, text: &str) -> Result<()> {
        let fail = |reason: String| Error::handler(NAME, reason);

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| fail(format!("spawning {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits without reading is judged by its status.
            match stdin.write_all(text.as_bytes()).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(fail(format!("writing to {}: {e}", self.program)));
                }
                _ => {}
            }
            // Dropping stdin closes the pipe so the program sees EOF.
        }

        let status = child
            .wait()
            .await
            .map_err(|e| fail(format!("waiting for {}: {e}", self.program)))?;
        if !status.success() {
            return Err(fail(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

impl Handler for SayHandler {
    fn call(&self, request: Request) -> BoxFuture<'_, Result<String>> {
        async move {
            let text = request.param(TEXT_PARAM).unwrap_or_default();
            self.speak(text).await?;
            Ok::<_, Error>(format!("{text}\n"))
        }
        .boxed()
    }
}
