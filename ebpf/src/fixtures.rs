//! Well-formed frames for tests and benchmarks.

use etherparse::PacketBuilder;

pub const CLIENT_MAC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
pub const SERVER_MAC: [u8; 6] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
pub const CLIENT_IP: [u8; 4] = [10, 0, 0, 1];
pub const SERVER_IP: [u8; 4] = [10, 0, 0, 2];
pub const TTL: u8 = 64;

/// Client to server ICMP echo request.
pub fn icmp_echo_request(payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, SERVER_MAC)
        .ipv4(CLIENT_IP, SERVER_IP, TTL)
        .icmpv4_echo_request(0x1234, 1);

    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("icmp frame fits in a Vec");
    frame
}

/// Client to server UDP datagram with a valid IPv4 and UDP checksum.
pub fn udp_datagram(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, SERVER_MAC)
        .ipv4(CLIENT_IP, SERVER_IP, TTL)
        .udp(src_port, dst_port);

    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("udp frame fits in a Vec");
    frame
}

pub fn tcp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, SERVER_MAC)
        .ipv4(CLIENT_IP, SERVER_IP, TTL)
        .tcp(src_port, dst_port, 1, 4096);

    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("tcp frame fits in a Vec");
    frame
}

/// Raw Ethernet II frame with an arbitrary EtherType.
pub fn ethernet_frame(ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(14 + payload.len());
    frame.extend_from_slice(&SERVER_MAC);
    frame.extend_from_slice(&CLIENT_MAC);
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// One's complement sum over `bytes`, folded to 16 bits. A header whose
/// checksum field is correct sums to `0xFFFF`.
pub fn ones_complement_sum(bytes: &[u8]) -> u16 {
    let mut sum: u32 = bytes
        .chunks(2)
        .map(|pair| {
            let hi = pair[0] as u32;
            let lo = pair.get(1).copied().unwrap_or(0) as u32;
            (hi << 8) | lo
        })
        .sum();

    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// UDP checksum check over the IPv4 pseudo header, header and payload of a
/// frame built by [`udp_datagram`].
pub fn udp_checksum_ok(frame: &[u8]) -> bool {
    let ip = &frame[14..34];
    let udp = &frame[34..];

    let mut pseudo = Vec::with_capacity(12 + udp.len());
    pseudo.extend_from_slice(&ip[12..20]);
    pseudo.push(0);
    pseudo.push(ip[9]);
    pseudo.extend_from_slice(&(udp.len() as u16).to_be_bytes());
    pseudo.extend_from_slice(udp);

    ones_complement_sum(&pseudo) == 0xFFFF
}

pub fn ipv4_checksum_ok(frame: &[u8]) -> bool {
    ones_complement_sum(&frame[14..34]) == 0xFFFF
}
