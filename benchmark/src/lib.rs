//! Frame workloads shared by the pipeline benchmarks.

use echo_element::fixtures;

pub struct Workload {
    pub name: &'static str,
    pub frame: Vec<u8>,
}

/// Payload size used for every generated frame, a typical small datagram.
pub const PAYLOAD_LEN: usize = 64;

/// One frame per path through the pipeline: ICMP and UDP hit the mutator
/// for their respective variants, TCP and ARP stop at the classifier.
pub fn workloads() -> Vec<Workload> {
    let payload = [0xA5u8; PAYLOAD_LEN];

    vec![
        Workload {
            name: "icmp",
            frame: fixtures::icmp_echo_request(&payload),
        },
        Workload {
            name: "udp",
            frame: fixtures::udp_datagram(5000, 6000, &payload),
        },
        Workload {
            name: "tcp",
            frame: fixtures::tcp_segment(5000, 6000, &payload),
        },
        Workload {
            name: "arp",
            frame: fixtures::ethernet_frame(0x0806, &[0; 28]),
        },
    ]
}
