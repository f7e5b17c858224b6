//! Second stage: bounce the frame back where it came from.
//!
//! The mutator is verified on its own, so it repeats every bounds check the
//! classifier already made. Any failure fails closed with `Aborted`; there
//! is no retry.

use crate::headers::{EthHeader, Ipv4Header, UdpHeader, ETHER_TYPE_IPV4};
use crate::{Disposition, EchoDepth, FrameContext, ParseError};

#[inline(always)]
pub fn mutate(ctx: &mut FrameContext<'_>, depth: EchoDepth) -> Disposition {
    match try_mutate(ctx, depth) {
        Ok(()) => Disposition::Tx,
        Err(_) => Disposition::Aborted,
    }
}

/// Swap addressing in place. On error the frame has not been written.
#[inline(always)]
pub fn try_mutate(ctx: &mut FrameContext<'_>, depth: EchoDepth) -> Result<(), ParseError> {
    match depth {
        EchoDepth::Link => swap_link(ctx),
        EchoDepth::Transport => swap_transport(ctx),
    }
}

/// Jump table entry for [`EchoDepth::Link`].
pub fn echo_link(ctx: &mut FrameContext<'_>) -> Disposition {
    mutate(ctx, EchoDepth::Link)
}

/// Jump table entry for [`EchoDepth::Transport`].
pub fn echo_transport(ctx: &mut FrameContext<'_>) -> Disposition {
    mutate(ctx, EchoDepth::Transport)
}

#[inline(always)]
fn swap_link(ctx: &mut FrameContext<'_>) -> Result<(), ParseError> {
    let eth = ctx.header_ptr_mut::<EthHeader>()?;
    // only the Ethernet header is rewritten, but the frame must still carry
    // the IPv4 header the classifier matched on
    ctx.header_ptr_mut::<Ipv4Header>()?;

    // SAFETY: bounds checked above, no other view of the frame is live.
    let eth = unsafe { &mut *eth };
    eth.swap_addrs();
    // keep the frame from being discarded as non-IP on the way out
    eth.set_ether_type(ETHER_TYPE_IPV4);

    Ok(())
}

#[inline(always)]
fn swap_transport(ctx: &mut FrameContext<'_>) -> Result<(), ParseError> {
    let eth = ctx.header_ptr_mut::<EthHeader>()?;
    let ip = ctx.header_ptr_mut::<Ipv4Header>()?;
    let udp = ctx.header_ptr_mut::<UdpHeader>()?;

    // SAFETY: all three are bounds checked above and cover the disjoint
    // ranges 0..14, 14..34 and 34..42 of the frame.
    unsafe {
        (*ip).swap_addrs();
        (*udp).swap_ports();
        (*eth).swap_addrs();
    }

    Ok(())
}
