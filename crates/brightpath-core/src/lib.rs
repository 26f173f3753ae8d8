pub mod error;
pub mod id;
pub mod model;
pub mod time;

pub use error::{CoreError, Result};
pub use id::new_id;
pub use time::{format_rfc3339, now_utc, time_since};
