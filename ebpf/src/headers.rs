//! Fixed-offset header views over a [`FrameContext`].
//!
//! The views are plain byte arrays with alignment 1, so any frame offset and
//! any byte pattern is a valid view. Multi-byte fields stay in network order
//! and are decoded by the accessors. IPv4 options are not supported: the
//! transport header is always expected right after a 20 byte IPv4 header.

use core::mem;
use core::net::Ipv4Addr;

use network_types::eth::EthHdr;
use network_types::ip::Ipv4Hdr;
use network_types::udp::UdpHdr;

use crate::{FrameContext, Layer, ParseError};

pub const ETHER_TYPE_IPV4: u16 = 0x0800;
pub const ETHER_ADDR_LEN: usize = 6;

pub const ETH_OFFSET: usize = 0;
pub const IPV4_OFFSET: usize = ETH_OFFSET + EthHdr::LEN;
pub const UDP_OFFSET: usize = IPV4_OFFSET + Ipv4Hdr::LEN;

/// A header with a fixed place in the frame.
///
/// # Safety
///
/// Implementors must have alignment 1 and accept every bit pattern, so that a
/// bounds-checked pointer into the frame can be dereferenced as `Self`.
pub unsafe trait Header: Sized {
    const LAYER: Layer;
    const OFFSET: usize;
    const LEN: usize = mem::size_of::<Self>();
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthHeader {
    pub dst_addr: [u8; ETHER_ADDR_LEN],
    pub src_addr: [u8; ETHER_ADDR_LEN],
    pub ether_type: [u8; 2],
}

unsafe impl Header for EthHeader {
    const LAYER: Layer = Layer::Link;
    const OFFSET: usize = ETH_OFFSET;
}

impl EthHeader {
    #[inline(always)]
    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes(self.ether_type)
    }

    #[inline(always)]
    pub fn set_ether_type(&mut self, ether_type: u16) {
        self.ether_type = ether_type.to_be_bytes();
    }

    #[inline(always)]
    pub fn swap_addrs(&mut self) {
        mem::swap(&mut self.src_addr, &mut self.dst_addr);
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version_ihl: u8,
    pub tos: u8,
    pub tot_len: [u8; 2],
    pub id: [u8; 2],
    pub frag_off: [u8; 2],
    pub ttl: u8,
    pub proto: u8,
    pub check: [u8; 2],
    pub src_addr: [u8; 4],
    pub dst_addr: [u8; 4],
}

unsafe impl Header for Ipv4Header {
    const LAYER: Layer = Layer::Network;
    const OFFSET: usize = IPV4_OFFSET;
}

impl Ipv4Header {
    #[inline(always)]
    pub fn proto(&self) -> u8 {
        self.proto
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes(self.check)
    }

    /// The header checksum is left as is: exchanging the two addresses does
    /// not change the one's complement sum it covers.
    #[inline(always)]
    pub fn swap_addrs(&mut self) {
        mem::swap(&mut self.src_addr, &mut self.dst_addr);
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub source: [u8; 2],
    pub dest: [u8; 2],
    pub len: [u8; 2],
    pub check: [u8; 2],
}

unsafe impl Header for UdpHeader {
    const LAYER: Layer = Layer::Transport;
    const OFFSET: usize = UDP_OFFSET;
}

impl UdpHeader {
    pub fn source(&self) -> u16 {
        u16::from_be_bytes(self.source)
    }

    pub fn dest(&self) -> u16 {
        u16::from_be_bytes(self.dest)
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes(self.check)
    }

    #[inline(always)]
    pub fn swap_ports(&mut self) {
        mem::swap(&mut self.source, &mut self.dest);
    }
}

const _: () = assert!(EthHeader::LEN == EthHdr::LEN);
const _: () = assert!(Ipv4Header::LEN == Ipv4Hdr::LEN);
const _: () = assert!(UdpHeader::LEN == UdpHdr::LEN);
const _: () = assert!(mem::align_of::<EthHeader>() == 1);
const _: () = assert!(mem::align_of::<Ipv4Header>() == 1);
const _: () = assert!(mem::align_of::<UdpHeader>() == 1);

impl FrameContext<'_> {
    /// Bounds-checked view of `H` at its fixed offset.
    #[inline(always)]
    pub fn header<H: Header>(&self) -> Result<&H, ParseError> {
        let ptr: *const H = self.get_ptr(H::OFFSET).map_err(truncated::<H>)?;
        // SAFETY: in bounds per get_ptr, and `Header` guarantees any byte
        // pattern at any alignment is a valid `H`.
        Ok(unsafe { &*ptr })
    }

    #[inline(always)]
    pub fn header_mut<H: Header>(&mut self) -> Result<&mut H, ParseError> {
        let ptr = self.header_ptr_mut::<H>()?;
        // SAFETY: see `header`; the returned borrow holds `self` exclusively.
        Ok(unsafe { &mut *ptr })
    }

    /// Bounds-checked raw pointer to `H`, for holding several disjoint headers
    /// of the same frame at once.
    #[inline(always)]
    pub fn header_ptr_mut<H: Header>(&mut self) -> Result<*mut H, ParseError> {
        self.get_ptr_mut(H::OFFSET).map_err(truncated::<H>)
    }
}

#[inline(always)]
fn truncated<H: Header>(bounds: crate::OutOfBounds) -> ParseError {
    ParseError::Truncated {
        layer: H::LAYER,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn offsets_are_cumulative() {
        assert_eq!(IPV4_OFFSET, 14);
        assert_eq!(UDP_OFFSET, 34);
    }

    #[test]
    fn views_decode_a_udp_frame() {
        let mut frame = fixtures::udp_datagram(5000, 6000, b"ping");
        let ctx = FrameContext::new(&mut frame);

        let eth = ctx.header::<EthHeader>().unwrap();
        assert_eq!(eth.src_addr, fixtures::CLIENT_MAC);
        assert_eq!(eth.dst_addr, fixtures::SERVER_MAC);
        assert_eq!(eth.ether_type(), ETHER_TYPE_IPV4);

        let ip = ctx.header::<Ipv4Header>().unwrap();
        assert_eq!(ip.proto(), 17);
        assert_eq!(ip.src_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ip.dst_addr(), Ipv4Addr::new(10, 0, 0, 2));

        let udp = ctx.header::<UdpHeader>().unwrap();
        assert_eq!(udp.source(), 5000);
        assert_eq!(udp.dest(), 6000);
    }

    #[test]
    fn truncated_header_reports_its_layer() {
        let mut frame = fixtures::udp_datagram(5000, 6000, b"");
        let mut ctx = FrameContext::new(&mut frame[..UDP_OFFSET + 7]);

        assert!(ctx.header::<Ipv4Header>().is_ok());
        let err = ctx.header_mut::<UdpHeader>().unwrap_err();
        assert_eq!(err.layer(), Layer::Transport);
        assert_eq!(
            err,
            ParseError::Truncated {
                layer: Layer::Transport,
                bounds: crate::OutOfBounds {
                    offset: UDP_OFFSET,
                    len: 8,
                    available: UDP_OFFSET + 7,
                },
            }
        );
    }

    #[test]
    fn set_ether_type_writes_network_order() {
        let mut frame = fixtures::ethernet_frame(0x0806, &[0; 28]);
        let mut ctx = FrameContext::new(&mut frame);

        ctx.header_mut::<EthHeader>()
            .unwrap()
            .set_ether_type(ETHER_TYPE_IPV4);

        assert_eq!(&frame[12..14], &[0x08, 0x00]);
    }
}
