//! Userspace stand-in for the kernel side of the pipeline.
//!
//! A [`Pipeline`] owns what the kernel would: the jump table the loader
//! fills and the counters the driver bumps. Each call to
//! [`Pipeline::process`] is one run-to-completion traversal of one frame;
//! frames may be processed from many threads at once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};

use crate::{
    classifier, DispatchError, Disposition, EchoConfig, FrameContext, JumpTable, StageFn, TailCall,
    MUTATOR_SLOT,
};

pub struct Pipeline {
    config: EchoConfig,
    table: JumpTable,
    counters: Counters,
}

impl Pipeline {
    /// Both stages loaded, jump table still empty. Matching frames pass
    /// until [`Pipeline::populate`] runs.
    pub fn new(config: EchoConfig) -> Self {
        Self {
            config,
            table: JumpTable::new(),
            counters: Counters::default(),
        }
    }

    /// Loaded and populated, ready for traffic.
    pub fn attached(config: EchoConfig) -> Result<Self, DispatchError> {
        let mut pipeline = Self::new(config);
        pipeline.populate()?;
        Ok(pipeline)
    }

    pub fn config(&self) -> EchoConfig {
        self.config
    }

    /// Store the configured mutator in the mutator slot.
    pub fn populate(&mut self) -> Result<(), DispatchError> {
        self.install(MUTATOR_SLOT, self.config.depth.entry())
    }

    pub fn install(&mut self, index: u32, stage: StageFn) -> Result<(), DispatchError> {
        self.table.set(index, stage)?;
        debug!("installed stage in jump table slot {index}");
        Ok(())
    }

    pub fn uninstall(&mut self, index: u32) -> Result<(), DispatchError> {
        self.table.clear(index)?;
        debug!("cleared jump table slot {index}");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.table.is_populated(MUTATOR_SLOT)
    }

    pub fn process(&self, frame: &mut [u8]) -> Disposition {
        let len = frame.len();
        let mut ctx = FrameContext::new(frame);
        let jumps = CountedJumps {
            table: &self.table,
            counters: &self.counters,
        };

        let disposition = classifier::classify(&mut ctx, self.config.target, &jumps);
        self.counters.record(disposition);
        trace!("{len} byte frame -> {disposition}");

        disposition
    }

    pub fn stats(&self) -> Stats {
        self.counters.snapshot()
    }
}

/// Jump table wrapper that counts hand-offs and misses.
struct CountedJumps<'a> {
    table: &'a JumpTable,
    counters: &'a Counters,
}

impl TailCall for CountedJumps<'_> {
    fn tail_call(&self, ctx: &mut FrameContext<'_>, index: u32) -> Result<Disposition, DispatchError> {
        match self.table.tail_call(ctx, index) {
            Ok(disposition) => {
                self.counters.tail_calls.fetch_add(1, Ordering::Relaxed);
                Ok(disposition)
            }
            Err(err) => {
                self.counters.dispatch_misses.fetch_add(1, Ordering::Relaxed);
                debug!("tail call failed: {err}");
                Err(err)
            }
        }
    }
}

#[derive(Default)]
struct Counters {
    pass: AtomicU64,
    tx: AtomicU64,
    aborted: AtomicU64,
    tail_calls: AtomicU64,
    dispatch_misses: AtomicU64,
}

impl Counters {
    fn record(&self, disposition: Disposition) {
        let counter = match disposition {
            Disposition::Pass => &self.pass,
            Disposition::Tx => &self.tx,
            Disposition::Aborted => &self.aborted,
            // a successful hand-off always resolves to the mutator's answer
            Disposition::TailCall => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> Stats {
        Stats {
            pass: self.pass.load(Ordering::Relaxed),
            tx: self.tx.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            tail_calls: self.tail_calls.load(Ordering::Relaxed),
            dispatch_misses: self.dispatch_misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub pass: u64,
    pub tx: u64,
    pub aborted: u64,
    pub tail_calls: u64,
    pub dispatch_misses: u64,
}

impl Stats {
    pub fn frames(&self) -> u64 {
        self.pass + self.tx + self.aborted
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} pass={} tx={} aborted={} tail_calls={} dispatch_misses={}",
            self.frames(),
            self.pass,
            self.tx,
            self.aborted,
            self.tail_calls,
            self.dispatch_misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn unpopulated_pipeline_passes_matching_frames() {
        let pipeline = Pipeline::new(EchoConfig::ICMP);
        let mut frame = fixtures::icmp_echo_request(b"hello");
        let original = frame.clone();

        assert!(!pipeline.is_ready());
        assert_eq!(pipeline.process(&mut frame), Disposition::Pass);
        assert_eq!(frame, original);

        let stats = pipeline.stats();
        assert_eq!(stats.pass, 1);
        assert_eq!(stats.dispatch_misses, 1);
        assert_eq!(stats.tail_calls, 0);
    }

    #[test]
    fn populate_enables_echo() {
        let mut pipeline = Pipeline::new(EchoConfig::ICMP);
        pipeline.populate().unwrap();
        let mut frame = fixtures::icmp_echo_request(b"hello");

        assert!(pipeline.is_ready());
        assert_eq!(pipeline.process(&mut frame), Disposition::Tx);
        assert_eq!(&frame[0..6], &fixtures::CLIENT_MAC);
    }

    #[test]
    fn uninstall_disables_echo() {
        let mut pipeline = Pipeline::attached(EchoConfig::UDP).unwrap();
        pipeline.uninstall(MUTATOR_SLOT).unwrap();
        let mut frame = fixtures::udp_datagram(5000, 6000, b"");

        assert_eq!(pipeline.process(&mut frame), Disposition::Pass);
    }

    #[test]
    fn install_rejects_out_of_range_slot() {
        let mut pipeline = Pipeline::new(EchoConfig::UDP);

        assert_eq!(
            pipeline.install(5, EchoConfig::UDP.depth.entry()),
            Err(DispatchError::OutOfRange {
                index: 5,
                capacity: 2
            })
        );
    }

    #[test]
    fn truncated_match_is_aborted_and_counted() {
        let pipeline = Pipeline::attached(EchoConfig::UDP).unwrap();
        let mut frame = fixtures::udp_datagram(5000, 6000, b"");

        assert_eq!(pipeline.process(&mut frame[..38]), Disposition::Aborted);

        let stats = pipeline.stats();
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.tail_calls, 1);
        assert_eq!(
            stats.to_string(),
            "frames=1 pass=0 tx=0 aborted=1 tail_calls=1 dispatch_misses=0"
        );
    }
}
