//! Indexed hand-off from the classifier to the mutator.
//!
//! In the kernel the table is a `BPF_MAP_TYPE_PROG_ARRAY` and a successful
//! tail call never returns to the caller. The host [`JumpTable`] mirrors
//! that by returning the target stage's disposition as the caller's final
//! answer.

use crate::{DispatchError, Disposition, FrameContext};

pub const JUMP_TABLE_CAPACITY: u32 = 2;
pub const MUTATOR_SLOT: u32 = 0;

/// Entry point of a stage that can sit in the jump table.
pub type StageFn = for<'a, 'b> fn(&'a mut FrameContext<'b>) -> Disposition;

pub trait TailCall {
    /// Run the stage stored at `index` on `ctx`. An error means nothing ran
    /// and the caller keeps control.
    fn tail_call(&self, ctx: &mut FrameContext<'_>, index: u32) -> Result<Disposition, DispatchError>;
}

/// Fixed-capacity jump table, filled by the loader before traffic flows and
/// only read afterwards.
#[derive(Clone, Copy)]
pub struct JumpTable<const N: usize = { JUMP_TABLE_CAPACITY as usize }> {
    slots: [Option<StageFn>; N],
}

impl<const N: usize> Default for JumpTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> JumpTable<N> {
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    pub fn capacity(&self) -> u32 {
        N as u32
    }

    pub fn set(&mut self, index: u32, stage: StageFn) -> Result<(), DispatchError> {
        *self.slot_mut(index)? = Some(stage);
        Ok(())
    }

    pub fn clear(&mut self, index: u32) -> Result<Option<StageFn>, DispatchError> {
        Ok(self.slot_mut(index)?.take())
    }

    pub fn get(&self, index: u32) -> Result<StageFn, DispatchError> {
        self.slots
            .get(index as usize)
            .copied()
            .ok_or(DispatchError::OutOfRange {
                index,
                capacity: N as u32,
            })?
            .ok_or(DispatchError::EmptySlot(index))
    }

    pub fn is_populated(&self, index: u32) -> bool {
        self.get(index).is_ok()
    }

    fn slot_mut(&mut self, index: u32) -> Result<&mut Option<StageFn>, DispatchError> {
        self.slots
            .get_mut(index as usize)
            .ok_or(DispatchError::OutOfRange {
                index,
                capacity: N as u32,
            })
    }
}

impl<const N: usize> TailCall for JumpTable<N> {
    #[inline(always)]
    fn tail_call(&self, ctx: &mut FrameContext<'_>, index: u32) -> Result<Disposition, DispatchError> {
        let stage = self.get(index)?;
        Ok(stage(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(_: &mut FrameContext<'_>) -> Disposition {
        Disposition::Tx
    }

    fn stamp(ctx: &mut FrameContext<'_>) -> Disposition {
        match ctx.get_ptr_mut::<u8>(0) {
            Ok(byte) => {
                unsafe { *byte = 0xEE };
                Disposition::Tx
            }
            Err(_) => Disposition::Aborted,
        }
    }

    #[test]
    fn empty_table_reports_empty_slot() {
        let table = JumpTable::<2>::new();
        let mut frame = [0u8; 4];

        assert_eq!(table.capacity(), 2);
        assert!(!table.is_populated(MUTATOR_SLOT));
        assert_eq!(
            table.tail_call(&mut FrameContext::new(&mut frame), MUTATOR_SLOT),
            Err(DispatchError::EmptySlot(0))
        );
    }

    #[test]
    fn index_past_capacity_is_out_of_range() {
        let mut table = JumpTable::<2>::new();

        assert_eq!(
            table.set(2, tx),
            Err(DispatchError::OutOfRange {
                index: 2,
                capacity: 2
            })
        );
        assert!(table.get(7).is_err());
    }

    #[test]
    fn populated_slot_runs_on_the_same_buffer() {
        let mut table = JumpTable::<2>::new();
        table.set(MUTATOR_SLOT, stamp).unwrap();
        let mut frame = [0u8; 4];

        let disposition = table
            .tail_call(&mut FrameContext::new(&mut frame), MUTATOR_SLOT)
            .unwrap();

        assert_eq!(disposition, Disposition::Tx);
        assert_eq!(frame, [0xEE, 0, 0, 0]);
    }

    #[test]
    fn cleared_slot_misses_again() {
        let mut table = JumpTable::<2>::new();
        table.set(1, tx).unwrap();

        assert!(table.clear(1).unwrap().is_some());
        assert!(table.clear(1).unwrap().is_none());
        assert!(matches!(table.get(1), Err(DispatchError::EmptySlot(1))));
    }
}
