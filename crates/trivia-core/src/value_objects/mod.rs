//! Value objects - small immutable types shared across the domain

mod snowflake;

pub use snowflake::{Snowflake, SnowflakeParseError};
