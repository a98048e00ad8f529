use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UniverseError {
    #[error("channel {channel} out of range (1..={channels})")]
    ChannelOutOfRange { channel: u16, channels: u16 },
}
