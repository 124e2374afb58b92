pub mod mastery;

pub use mastery::{Clock, MasteryError, MasteryService, SystemClock};
