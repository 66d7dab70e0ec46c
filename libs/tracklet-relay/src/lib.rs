pub mod decode;
pub mod error;
pub mod project;
mod relay;
mod upstream;

pub use error::RelayError;
pub use relay::{Frame, RelayOptions, frames};
pub use upstream::{
    Cursor, RawEntry, ReadBatch, RedisConfig, RedisConnector, UpstreamConnector, UpstreamStream,
};
