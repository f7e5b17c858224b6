//! Shared packet logic for the tail-call echo programs.
//!
//! Everything reachable from the kernel programs is `no_std`, loop free and
//! bounds checked before every access. The `std` feature adds a userspace
//! model of the pipeline that drives the same stage functions over plain byte
//! buffers.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod classifier;
pub mod config;
pub mod dispatch;
mod error;
pub mod headers;
pub mod mutator;
mod programs;

#[cfg(any(test, feature = "test-help"))]
pub mod fixtures;
#[cfg(any(test, feature = "std"))]
pub mod pipeline;

use core::marker::PhantomData;
use core::mem;

pub use config::{EchoConfig, EchoDepth};
pub use dispatch::{JumpTable, StageFn, TailCall, JUMP_TABLE_CAPACITY, MUTATOR_SLOT};
pub use error::{DispatchError, Layer, OutOfBounds, ParseError};
pub use programs::Disposition;

/// One frame, described by its first byte and one-past-its-last byte.
///
/// In the kernel both pointers come straight from the XDP context. On the
/// host they are taken from a borrowed slice, which is what ties the context
/// to `'a`.
pub struct FrameContext<'a> {
    data: *mut u8,
    data_end: *mut u8,
    _frame: PhantomData<&'a mut [u8]>,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: &'a mut [u8]) -> Self {
        let range = frame.as_mut_ptr_range();
        Self {
            data: range.start,
            data_end: range.end,
            _frame: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `data..data_end` must be a single writable region that stays valid
    /// and unaliased for `'a`.
    #[inline(always)]
    pub unsafe fn from_raw(data: *mut u8, data_end: *mut u8) -> Self {
        Self {
            data,
            data_end,
            _frame: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data_end as usize - self.data as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pointer to a `T` at `offset`, handed out only once
    /// `offset + size_of::<T>()` fits inside the frame.
    #[inline(always)]
    pub fn get_ptr<T>(&self, offset: usize) -> Result<*const T, OutOfBounds> {
        self.check::<T>(offset)?;
        Ok((self.data as usize + offset) as *const T)
    }

    #[inline(always)]
    pub fn get_ptr_mut<T>(&mut self, offset: usize) -> Result<*mut T, OutOfBounds> {
        self.check::<T>(offset)?;
        Ok((self.data as usize + offset) as *mut T)
    }

    #[inline(always)]
    fn check<T>(&self, offset: usize) -> Result<(), OutOfBounds> {
        let start = self.data as usize;
        let end = self.data_end as usize;
        let len = mem::size_of::<T>();

        if start + offset + len > end {
            return Err(OutOfBounds {
                offset,
                len,
                available: end - start,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ptr_accepts_exact_fit() {
        let mut frame = [0u8; 8];
        let ctx = FrameContext::new(&mut frame);

        assert_eq!(ctx.len(), 8);
        assert!(ctx.get_ptr::<[u8; 8]>(0).is_ok());
        assert!(ctx.get_ptr::<[u8; 4]>(4).is_ok());
    }

    #[test]
    fn get_ptr_rejects_one_byte_past_end() {
        let mut frame = [0u8; 8];
        let mut ctx = FrameContext::new(&mut frame);

        let err = ctx.get_ptr::<[u8; 4]>(5).unwrap_err();
        assert_eq!(
            err,
            OutOfBounds {
                offset: 5,
                len: 4,
                available: 8
            }
        );
        assert!(ctx.get_ptr_mut::<[u8; 9]>(0).is_err());
    }

    #[test]
    fn empty_frame_has_no_headers() {
        let mut frame: [u8; 0] = [];
        let ctx = FrameContext::new(&mut frame);

        assert!(ctx.is_empty());
        assert!(ctx.get_ptr::<u8>(0).is_err());
    }
}
