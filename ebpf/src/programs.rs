use core::fmt;

/// Terminal outcome of one stage, numbered like the kernel's XDP actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum Disposition {
    /// Drop and bump the driver's exception counters.
    Aborted = 0,
    Pass = 2,
    /// Send back out of the interface the frame arrived on.
    Tx = 3,
    /// Hand the frame to the program in the jump table.
    TailCall = 5,
}

impl From<Disposition> for u32 {
    #[inline(always)]
    fn from(disposition: Disposition) -> Self {
        disposition as u32
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Disposition::Aborted => "XDP_ABORTED",
            Disposition::Pass => "XDP_PASS",
            Disposition::Tx => "XDP_TX",
            Disposition::TailCall => "XDP_TAIL_CALL",
        };
        f.write_str(name)
    }
}
