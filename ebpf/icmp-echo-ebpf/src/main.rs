#![no_std]
#![no_main]

use aya_ebpf::bpf_printk;
use aya_ebpf::macros::{map, xdp};
use aya_ebpf::maps::ProgramArray;
use aya_ebpf::programs::XdpContext;

use echo_element::classifier::classify;
use echo_element::mutator::try_mutate;
use echo_element::{DispatchError, Disposition, EchoConfig, FrameContext, TailCall, JUMP_TABLE_CAPACITY};

const CONFIG: EchoConfig = EchoConfig::ICMP;

#[map(name = "JUMP_TABLE")]
static JUMP_TABLE: ProgramArray = ProgramArray::with_max_entries(JUMP_TABLE_CAPACITY, 0);

struct ProgramJumps<'a> {
    ctx: &'a XdpContext,
}

impl TailCall for ProgramJumps<'_> {
    #[inline(always)]
    fn tail_call(&self, _frame: &mut FrameContext<'_>, index: u32) -> Result<Disposition, DispatchError> {
        // only comes back if the slot is empty
        let _ = unsafe { JUMP_TABLE.tail_call(self.ctx, index) };
        Err(DispatchError::EmptySlot(index))
    }
}

#[inline(always)]
fn frame(ctx: &XdpContext) -> FrameContext<'_> {
    unsafe { FrameContext::from_raw(ctx.data() as *mut u8, ctx.data_end() as *mut u8) }
}

#[xdp]
pub fn classifier(ctx: XdpContext) -> u32 {
    let mut frame = frame(&ctx);
    classify(&mut frame, CONFIG.target, &ProgramJumps { ctx: &ctx }).into()
}

#[xdp]
pub fn echo(ctx: XdpContext) -> u32 {
    let mut frame = frame(&ctx);

    match try_mutate(&mut frame, CONFIG.depth) {
        Ok(()) => Disposition::Tx.into(),
        Err(_) => {
            unsafe {
                bpf_printk!(b"icmp echo: truncated frame\n");
            }
            Disposition::Aborted.into()
        }
    }
}

#[no_mangle]
#[link_section = "license"]
pub static LICENSE: [u8; 4] = *b"GPL\0";

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
