use chrono::Utc;
use remotecmd::{Operation, Request};

pub const NAME: &str = "/time";

pub fn operation() -> Operation {
    Operation::from_fn(NAME, "Current UTC time", |_req: Request| async {
        Ok(format!("{}\n", Utc::now()))
    })
}
