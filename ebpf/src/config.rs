use network_types::ip::IpProto;

use crate::{mutator, StageFn};

/// How far down the header stack the mutator swaps addressing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EchoDepth {
    /// Ethernet addresses only, then force the EtherType to IPv4.
    Link,
    /// Ethernet addresses, IPv4 addresses and UDP ports.
    Transport,
}

impl EchoDepth {
    /// The mutator entry point the loader stores in the jump table.
    pub fn entry(self) -> StageFn {
        match self {
            EchoDepth::Link => mutator::echo_link,
            EchoDepth::Transport => mutator::echo_transport,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EchoConfig {
    /// IPv4 protocol number the classifier hands to the mutator.
    pub target: IpProto,
    pub depth: EchoDepth,
}

impl EchoConfig {
    /// Bounce ICMP frames with their Ethernet addresses swapped.
    pub const ICMP: EchoConfig = EchoConfig {
        target: IpProto::Icmp,
        depth: EchoDepth::Link,
    };

    /// Bounce UDP datagrams with addresses and ports swapped on every layer.
    pub const UDP: EchoConfig = EchoConfig {
        target: IpProto::Udp,
        depth: EchoDepth::Transport,
    };

    pub fn target_proto(&self) -> u8 {
        self.target as u8
    }
}
