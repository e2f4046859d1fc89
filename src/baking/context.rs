use crate::baking::collector::TransformCollector;
use crate::baking::fences::SectionFences;
use crate::baking::ring::SectionedRingBuffer;
use crate::errors::Result;
use crate::settings::StreamSettings;

/// What one frame's flush produced: the section the host must reference
/// when binding and drawing, and how much of it is populated.
#[derive(Debug, Clone, Copy)]
pub struct FrameSlice {
    /// The ring section holding this frame's records.
    pub section: u32,
    /// Instances baked this frame (the model-record count).
    pub instance_count: u32,
    /// Bytes of part records written.
    pub part_bytes: u64,
    /// Bytes of model records written.
    pub model_bytes: u64,
}

// The part ring and the model ring always advance in lockstep: a frame's
// draws read both sections together, so one fence set guards both.
#[derive(Debug)]
struct RingPair {
    part: SectionedRingBuffer,
    model: SectionedRingBuffer,
}

/// The process-wide streaming context.
///
/// Created once at renderer initialization and owning everything the
/// baking path needs: the transform collector, the two sectioned ring
/// buffers (per-part transforms and per-instance model records, created
/// lazily on first flush), and the section fences shared between them.
///
/// # Frame Protocol
///
/// ```rust,ignore
/// ctx.begin_frame();
/// let mut walker = HierarchyWalker::new(&mut target, Some(ctx.collector_mut()));
/// // ... walker.render(...) per instance ...
/// let slice = ctx.flush_frame(&mut encoder)?;
/// // ... encode draws referencing slice.section, then:
/// let submission = queue.submit([encoder.finish()]);
/// ctx.finish_frame(submission);
/// ```
///
/// The only blocking point is inside [`flush_frame`](Self::flush_frame),
/// which waits on the reused section's fence immediately before writing —
/// as late as possible, so the GPU keeps `section_count - 1` frames of
/// slack.
///
/// The context is single-threaded by design: one CPU thread drives
/// traversal, collection and writes, while the GPU consumes previous
/// sections concurrently.
#[derive(Debug)]
pub struct StreamingContext {
    device: wgpu::Device,
    settings: StreamSettings,
    collector: Option<TransformCollector>,
    buffers: Option<RingPair>,
    fences: SectionFences,
    pending_section: Option<u32>,
}

impl StreamingContext {
    /// Creates the context without touching the GPU; buffers are allocated
    /// on first flush.
    #[must_use]
    pub fn new(device: wgpu::Device, settings: StreamSettings) -> Self {
        let fences = SectionFences::new(settings.section_count);
        Self {
            device,
            settings,
            collector: None,
            buffers: None,
            fences,
            pending_section: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// The frame-scoped collector, created lazily.
    pub fn collector_mut(&mut self) -> &mut TransformCollector {
        self.collector
            .get_or_insert_with(|| TransformCollector::new(&self.settings))
    }

    /// Starts a new frame's collection phase by clearing the collector.
    pub fn begin_frame(&mut self) {
        debug_assert!(
            self.pending_section.is_none(),
            "begin_frame called while a flushed frame awaits finish_frame"
        );
        self.collector_mut().reset();
    }

    /// Stages the frame's collected records into the next ring section.
    ///
    /// Waits (bounded) on the fence recorded when this section was last
    /// consumed, re-maps the section's staging memory, serializes the
    /// collector into it and encodes the flush copies into `encoder`.
    /// The returned [`FrameSlice`] names the section for the host's bind
    /// groups and draws.
    pub fn flush_frame(&mut self, encoder: &mut wgpu::CommandEncoder) -> Result<FrameSlice> {
        let collector = self
            .collector
            .get_or_insert_with(|| TransformCollector::new(&self.settings));

        let buffers = match self.buffers.take() {
            Some(buffers) => self.buffers.insert(buffers),
            None => {
                let part = SectionedRingBuffer::create(
                    &self.device,
                    "baked part transforms",
                    self.settings.part_section_size(),
                    self.settings.section_count,
                )?;
                let model = SectionedRingBuffer::create(
                    &self.device,
                    "baked model records",
                    self.settings.model_section_size(),
                    self.settings.section_count,
                )?;
                self.buffers.insert(RingPair { part, model })
            }
        };

        let section = buffers.part.current_section();
        debug_assert_eq!(section, buffers.model.current_section());

        // Mandatory precondition for reuse; a no-op on first use.
        self.fences
            .wait_until_ready(&self.device, section, self.settings.fence_timeout)?;

        buffers.part.remap(&self.device, section)?;
        buffers.model.remap(&self.device, section)?;

        let part_bytes = collector.part_bytes_len();
        if part_bytes > 0 {
            let mut view = buffers.part.writable_slice(section, 0, part_bytes)?;
            collector.write_parts_into(&mut view);
        }
        buffers.part.flush(encoder, section, part_bytes)?;

        let model_bytes = collector.model_bytes_len();
        if model_bytes > 0 {
            let mut view = buffers.model.writable_slice(section, 0, model_bytes)?;
            collector.write_models_into(&mut view);
        }
        buffers.model.flush(encoder, section, model_bytes)?;

        self.pending_section = Some(section);

        Ok(FrameSlice {
            section,
            instance_count: collector.instance_count(),
            part_bytes,
            model_bytes,
        })
    }

    /// Records the section fence for the submission containing this
    /// frame's draws and advances both rings. Call exactly once per frame,
    /// after `queue.submit`; `submission` must cover every draw that reads
    /// the flushed section.
    pub fn finish_frame(&mut self, submission: wgpu::SubmissionIndex) {
        let Some(section) = self.pending_section.take() else {
            debug_assert!(false, "finish_frame called without a flushed frame");
            return;
        };

        self.fences.signal(section, submission);

        if let Some(buffers) = &mut self.buffers {
            buffers.part.advance();
            buffers.model.advance();
        }
    }

    /// The part-transform binding for a flushed frame's section.
    #[must_use]
    pub fn part_binding(&self, slice: &FrameSlice) -> Option<wgpu::BufferBinding<'_>> {
        self.buffers.as_ref().map(|b| b.part.binding(slice.section))
    }

    /// The model-record binding for a flushed frame's section.
    #[must_use]
    pub fn model_binding(&self, slice: &FrameSlice) -> Option<wgpu::BufferBinding<'_>> {
        self.buffers.as_ref().map(|b| b.model.binding(slice.section))
    }

    /// Releases all GPU resources, e.g. on graphics context loss. The
    /// context stays usable; buffers are recreated lazily on the next
    /// flush.
    pub fn teardown(&mut self) {
        if self.buffers.take().is_some() {
            log::info!("Streaming ring buffers released");
        }
        self.fences.clear();
        self.collector = None;
        self.pending_section = None;
    }
}
