//! Value objects - immutable types that represent domain concepts

mod presence;
mod snowflake;

pub use presence::PresenceState;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
