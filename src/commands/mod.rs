pub mod eksctl;
pub mod gradle;
pub mod kubectl;
pub mod previews;
pub mod pulumi;
pub mod update;

use crate::progress;
use anyhow::Result;

/// Run a container operation behind a spinner, printing captured output
/// when it succeeds.
pub(crate) fn spin(msg: &str, done: &str, op: impl FnOnce() -> Result<String>) -> Result<()> {
    let pb = progress::spinner(msg);
    match op() {
        Ok(output) => {
            progress::finish_success(&pb, done);
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(err) => {
            progress::finish_error(&pb, &format!("{msg} failed"));
            Err(err)
        }
    }
}
