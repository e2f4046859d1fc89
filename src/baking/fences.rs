use std::time::Duration;

use crate::errors::{BakeError, Result};

/// One synchronization fence slot per ring section.
///
/// A fence expresses "the GPU has finished all reads of this section's
/// previous contents". It is recorded right after the draws reading the
/// section are submitted and consumed at most once, just before the CPU
/// reuses the section.
///
/// The table is generic over the fence token so the reuse discipline can be
/// exercised without a GPU; production code uses the default
/// `wgpu::SubmissionIndex`.
#[derive(Debug)]
pub struct SectionFences<F = wgpu::SubmissionIndex> {
    pending: Vec<Option<F>>,
}

impl<F> SectionFences<F> {
    #[must_use]
    pub fn new(section_count: u32) -> Self {
        Self {
            pending: (0..section_count).map(|_| None).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn section_count(&self) -> u32 {
        self.pending.len() as u32
    }

    /// Associates a new fence with `section`, replacing any previous one.
    /// Call immediately after submitting the draws that read the section.
    pub fn signal(&mut self, section: u32, fence: F) {
        self.pending[section as usize] = Some(fence);
    }

    /// Consumes the pending fence for `section`, if any. A section's fence
    /// is taken at most once per reuse cycle.
    pub fn take_pending(&mut self, section: u32) -> Option<F> {
        self.pending[section as usize].take()
    }

    #[inline]
    #[must_use]
    pub fn has_pending(&self, section: u32) -> bool {
        self.pending[section as usize].is_some()
    }

    /// Drops all pending fences, e.g. on context teardown.
    pub fn clear(&mut self) {
        for slot in &mut self.pending {
            *slot = None;
        }
    }
}

impl SectionFences<wgpu::SubmissionIndex> {
    /// Blocks until the fence associated with `section` reports completion,
    /// or returns immediately if none is pending (first use of the section).
    ///
    /// This is the mandatory precondition before writing to a section about
    /// to be reused, and the only blocking operation in the subsystem; call
    /// it as late as possible — just before the write — to maximize CPU/GPU
    /// overlap.
    ///
    /// A wait exceeding `timeout` indicates an unrecoverable driver or
    /// queue stall and escalates to [`BakeError::FenceTimeout`]; skipping
    /// the wait would corrupt in-flight GPU reads.
    pub fn wait_until_ready(
        &mut self,
        device: &wgpu::Device,
        section: u32,
        timeout: Duration,
    ) -> Result<()> {
        let Some(index) = self.take_pending(section) else {
            return Ok(());
        };

        match device.poll(wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: Some(timeout),
        }) {
            Ok(_) => Ok(()),
            Err(wgpu::PollError::Timeout) => {
                log::error!(
                    "GPU fence for section {section} did not signal within {timeout:?}; \
                     the queue appears stalled"
                );
                Err(BakeError::FenceTimeout {
                    section,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}
