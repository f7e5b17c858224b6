use core::fmt;

use thiserror::Error;

/// A header view would have reached past the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{len} bytes at offset {offset} do not fit in a {available} byte frame")]
pub struct OutOfBounds {
    pub offset: usize,
    pub len: usize,
    pub available: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Link,
    Network,
    Transport,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Link => write!(f, "link"),
            Layer::Network => write!(f, "network"),
            Layer::Transport => write!(f, "transport"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("truncated {layer} header")]
    Truncated {
        layer: Layer,
        #[source]
        bounds: OutOfBounds,
    },
}

impl ParseError {
    pub fn layer(&self) -> Layer {
        match self {
            ParseError::Truncated { layer, .. } => *layer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("jump table slot {0} is empty")]
    EmptySlot(u32),
    #[error("index {index} is outside a jump table of {capacity} slots")]
    OutOfRange { index: u32, capacity: u32 },
}
