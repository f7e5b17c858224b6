//! First stage: decide whether a frame belongs to the echo pipeline.
//!
//! Every failure here fails open. A frame that is too short, is not IPv4 or
//! carries another protocol is simply not ours and goes to the normal stack
//! untouched.

use network_types::ip::IpProto;

use crate::headers::{EthHeader, Ipv4Header, ETHER_TYPE_IPV4};
use crate::{Disposition, FrameContext, ParseError, TailCall, MUTATOR_SLOT};

/// Classify `ctx` and, on a match, hand it to the mutator in `MUTATOR_SLOT`.
///
/// A dispatch miss (slot empty or out of range) falls back to `Pass`.
#[inline(always)]
pub fn classify<J: TailCall>(ctx: &mut FrameContext<'_>, target: IpProto, jumps: &J) -> Disposition {
    match inspect(ctx, target) {
        Disposition::TailCall => jumps
            .tail_call(ctx, MUTATOR_SLOT)
            .unwrap_or(Disposition::Pass),
        disposition => disposition,
    }
}

/// The classifier's own verdict: `TailCall` on a match, `Pass` otherwise.
/// Never writes to the frame.
#[inline(always)]
pub fn inspect(ctx: &FrameContext<'_>, target: IpProto) -> Disposition {
    try_inspect(ctx, target as u8).unwrap_or(Disposition::Pass)
}

#[inline(always)]
fn try_inspect(ctx: &FrameContext<'_>, target: u8) -> Result<Disposition, ParseError> {
    let eth = ctx.header::<EthHeader>()?;
    if eth.ether_type() != ETHER_TYPE_IPV4 {
        return Ok(Disposition::Pass);
    }

    let ip = ctx.header::<Ipv4Header>()?;
    if ip.proto() != target {
        return Ok(Disposition::Pass);
    }

    Ok(Disposition::TailCall)
}
