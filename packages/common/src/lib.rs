pub mod protocol;
pub mod stats;
pub mod views;

pub use protocol::{ClientMessage, ServerMessage};
pub use stats::{EventStats, OptionTally, PollTally, TopEngager};
