//! Holds a request open for a caller-chosen number of seconds.

use core::time::Duration;
use futures::future::{BoxFuture, FutureExt};
use remotecmd::{Error, Handler, Operation, Request, Result};

pub const NAME: &str = "/sleep";

/// Parameter carrying the number of seconds.
pub const SECONDS_PARAM: &str = "s";

pub fn operation(max_secs: u64) -> Operation {
    Operation::new(NAME, "Sleep s number of seconds", SleepHandler { max_secs })
}

struct SleepHandler {
    max_secs: u64,
}

impl SleepHandler {
    fn duration(&self, request: &Request) -> Result<Duration> {
        let raw = request
            .param(SECONDS_PARAM)
            .ok_or_else(|| Error::invalid(format!("missing parameter {SECONDS_PARAM}")))?;
        let secs = parse_seconds(raw)
            .ok_or_else(|| Error::invalid(format!("{SECONDS_PARAM}={raw:?} is not a number")))?;
        if secs > self.max_secs {
            return Err(Error::invalid(format!(
                "{SECONDS_PARAM}={secs} exceeds the maximum of {}",
                self.max_secs
            )));
        }
        Ok(Duration::from_secs(secs))
    }
}

impl Handler for SleepHandler {
    fn validate(&self, request: &Request) -> Result<()> {
        self.duration(request).map(|_| ())
    }

    fn call(&self, request: Request) -> BoxFuture<'_, Result<String>> {
        let duration = self.duration(&request);
        async move {
            tokio::time::sleep(duration?).await;
            Ok::<_, Error>(String::new())
        }
        .boxed()
    }
}

/// Parses an unsigned integer, honoring `0x`, `0o` and `0b` prefixes.
fn parse_seconds(raw: &str) -> Option<u64> {
    let (digits, radix) = match raw.get(..2) {
        Some("0x" | "0X") => (&raw[2..], 16),
        Some("0o" | "0O") => (&raw[2..], 8),
        Some("0b" | "0B") => (&raw[2..], 2),
        _ => (raw, 10),
    };
    if digits.starts_with('+') {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(secs: &str) -> Request {
        Request::get().with_param(SECONDS_PARAM, secs)
    }

    #[test]
    fn parses_decimal_and_prefixed() {
        assert_eq!(parse_seconds("0"), Some(0));
        assert_eq!(parse_seconds("42"), Some(42));
        assert_eq!(parse_seconds("0x1f"), Some(31));
        assert_eq!(parse_seconds("0X1F"), Some(31));
        assert_eq!(parse_seconds("0o17"), Some(15));
        assert_eq!(parse_seconds("0b101"), Some(5));
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "-1", "+1", "1.5", "abc", "0x", "0b2", "18446744073709551616"] {
            assert_eq!(parse_seconds(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn validation_bounds_the_duration() {
        let op = operation(10);
        let handler = op.handler();
        assert!(handler.validate(&request("10")).is_ok());
        assert!(matches!(
            handler.validate(&request("11")),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(matches!(
            handler.validate(&Request::get()),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(matches!(
            handler.validate(&request("soon")),
            Err(Error::InvalidRequest { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_for_the_requested_time() {
        let op = operation(3600);
        let start = tokio::time::Instant::now();
        let body = op.handler().call(request("0x2")).await.unwrap();
        assert_eq!(body, "");
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
