//! Reports how busy the machine is, as the one-minute load average spread
//! over the available cores.

use futures::future::{BoxFuture, FutureExt};
use remotecmd::{Error, Handler, Operation, Request, Result};

pub const NAME: &str = "/cpu";

const LOADAVG_PATH: &str = "/proc/loadavg";

pub fn operation() -> Operation {
    Operation::new(
        NAME,
        "Current CPU usage",
        CpuHandler {
            path: LOADAVG_PATH,
            cpus: num_cpus::get(),
        },
    )
}

struct CpuHandler {
    path: &'static str,
    cpus: usize,
}

impl Handler for CpuHandler {
    fn call(&self, _request: Request) -> BoxFuture<'_, Result<String>> {
        async move {
            let raw = tokio::fs::read_to_string(self.path)
                .await
                .map_err(|e| Error::handler(NAME, format!("reading {}: {e}", self.path)))?;
            let usage = usage_percent(&raw, self.cpus)
                .ok_or_else(|| Error::handler(NAME, format!("malformed {}", self.path)))?;
            Ok::<_, Error>(format!("{usage:.0}\n"))
        }
        .boxed()
    }
}

/// Parses the first field of a `loadavg` line and normalizes it to a
/// percentage of `cpus` fully busy cores.
fn usage_percent(loadavg: &str, cpus: usize) -> Option<f64> {
    let load: f64 = loadavg.split_whitespace().next()?.parse().ok()?;
    if cpus == 0 || !load.is_finite() || load < 0.0 {
        return None;
    }
    Some(load / cpus as f64 * 100.0)
}
