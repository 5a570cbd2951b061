//! Error type for host setup.

/// Errors raised while setting up audio or MIDI plumbing. The realtime path
/// itself never surfaces errors.
#[derive(Debug)]
pub enum HostError {
    /// Failed to initialize the audio device
    DeviceInit(String),
    /// Failed to create the audio stream
    StreamCreate(String),
    /// Processor rejected the requested channel layout
    UnsupportedLayout(u16),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
    /// Failed to initialize a MIDI client
    MidiInit(String),
    /// Failed to connect to a MIDI port
    MidiConnect(String),
    /// Requested MIDI port index does not exist
    BadPort(usize),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::DeviceInit(msg) => write!(f, "Device init error: {}", msg),
            HostError::StreamCreate(msg) => write!(f, "Stream create error: {}", msg),
            HostError::UnsupportedLayout(channels) => {
                write!(f, "Unsupported channel layout: {} channel(s)", channels)
            }
            HostError::Playback(msg) => write!(f, "Playback error: {}", msg),
            HostError::NoDevice => write!(f, "No audio device available"),
            HostError::MidiInit(msg) => write!(f, "MIDI init error: {}", msg),
            HostError::MidiConnect(msg) => write!(f, "MIDI connect error: {}", msg),
            HostError::BadPort(index) => write!(f, "No MIDI port at index {}", index),
        }
    }
}

impl std::error::Error for HostError {}
