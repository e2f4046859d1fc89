use crate::errors::{BakeError, Result};

/// A GPU allocation split into `section_count` equal sections, written
/// round-robin so the CPU can fill one section while the GPU still reads
/// the previous ones.
///
/// # wgpu Rendition of Persistent Mapping
///
/// wgpu refuses to execute submissions referencing a mapped buffer, so the
/// classic single persistently-mapped allocation becomes two pieces:
///
/// - one device-local `STORAGE | COPY_DST` buffer holding all sections —
///   the single allocation shaders read, alive for the ring's lifetime;
/// - one `MAP_WRITE | COPY_SRC` staging buffer per section, created
///   mapped, which stays host-writable from the moment its fence is
///   consumed until [`flush`](Self::flush) unmaps it for the copy.
///
/// The mapped/unmapped state doubles as the write discipline: writing a
/// section whose fence has not been consumed (and the staging memory
/// therefore not re-mapped via [`remap`](Self::remap)) is rejected.
///
/// Sections persist until an explicit teardown, e.g. on context loss.
#[derive(Debug)]
pub struct SectionedRingBuffer {
    label: String,
    section_size: u64,
    section_count: u32,
    device_buffer: wgpu::Buffer,
    staging: Vec<wgpu::Buffer>,
    mapped: Vec<bool>,
    cursor: u32,
}

impl SectionedRingBuffer {
    /// Allocates `section_size * section_count` bytes of device-local
    /// storage plus the per-section staging buffers.
    ///
    /// Fatal on driver rejection: there is no degraded single-buffered
    /// fallback, so capacities must be chosen such that this cannot occur
    /// under normal load.
    pub fn create(
        device: &wgpu::Device,
        label: &str,
        section_size: u64,
        section_count: u32,
    ) -> Result<Self> {
        assert!(
            section_count >= 2,
            "a sectioned ring needs at least two sections for CPU/GPU overlap"
        );
        let total_size = section_size * u64::from(section_count);

        let error_scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let device_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: total_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging: Vec<wgpu::Buffer> = (0..section_count)
            .map(|i| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} staging {i}")),
                    size: section_size,
                    usage: wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
                    mapped_at_creation: true,
                })
            })
            .collect();

        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(BakeError::BufferAllocationFailed {
                label: label.to_string(),
                size: total_size,
                reason: error.to_string(),
            });
        }

        log::info!(
            "Created streaming ring `{label}`: {section_count} sections x {section_size} bytes"
        );

        Ok(Self {
            label: label.to_string(),
            section_size,
            section_count,
            device_buffer,
            staging,
            mapped: vec![true; section_count as usize],
            cursor: 0,
        })
    }

    /// The section currently designated for writing.
    #[inline]
    #[must_use]
    pub fn current_section(&self) -> u32 {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn section_size(&self) -> u64 {
        self.section_size
    }

    #[inline]
    #[must_use]
    pub fn section_count(&self) -> u32 {
        self.section_count
    }

    /// Byte offset of `section` within the device buffer.
    #[inline]
    #[must_use]
    pub fn offset_of(&self, section: u32) -> u64 {
        u64::from(section) * self.section_size
    }

    /// Moves the write cursor to the next section, wrapping round-robin.
    /// Call exactly once per frame, after the current section has been
    /// fully written and flushed.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.section_count;
    }

    /// Copies `bytes` into the mapped staging memory of `section` at
    /// `byte_offset` (which must be 8-byte aligned, per wgpu mapping
    /// rules).
    ///
    /// The caller must have confirmed via
    /// [`SectionFences::wait_until_ready`](crate::baking::fences::SectionFences::wait_until_ready)
    /// — followed by [`remap`](Self::remap) — that the section's previous
    /// consumer has finished; a not-yet-writable section is rejected.
    pub fn write(&mut self, section: u32, byte_offset: u64, bytes: &[u8]) -> Result<()> {
        let mut view = self.writable_slice(section, byte_offset, bytes.len() as u64)?;
        view.copy_from_slice(bytes);
        Ok(())
    }

    /// Borrows the mapped staging memory of `section` for in-place
    /// serialization, enforcing the same discipline as [`write`](Self::write).
    pub fn writable_slice(
        &mut self,
        section: u32,
        byte_offset: u64,
        len: u64,
    ) -> Result<wgpu::BufferViewMut> {
        let needed = byte_offset + len;
        if needed > self.section_size {
            return Err(BakeError::SectionOverflow {
                needed,
                capacity: self.section_size,
            });
        }
        if !self.mapped[section as usize] {
            debug_assert!(false, "section {section} written before its fence was consumed");
            return Err(BakeError::SectionNotReady { section });
        }

        Ok(self.staging[section as usize]
            .slice(byte_offset..needed)
            .get_mapped_range_mut())
    }

    /// Unmaps `section`'s staging memory and encodes the copy of its first
    /// `len` bytes into the device buffer. This is the explicit
    /// flush-after-write; the copy must be submitted before any draw that
    /// reads the section.
    pub fn flush(&mut self, encoder: &mut wgpu::CommandEncoder, section: u32, len: u64) -> Result<()> {
        if len > self.section_size {
            return Err(BakeError::SectionOverflow {
                needed: len,
                capacity: self.section_size,
            });
        }
        if !self.mapped[section as usize] {
            return Err(BakeError::SectionNotReady { section });
        }

        self.staging[section as usize].unmap();
        self.mapped[section as usize] = false;

        if len > 0 {
            encoder.copy_buffer_to_buffer(
                &self.staging[section as usize],
                0,
                &self.device_buffer,
                self.offset_of(section),
                wgpu::util::align_to(len, wgpu::COPY_BUFFER_ALIGNMENT),
            );
        }
        Ok(())
    }

    /// Re-maps `section`'s staging memory for host writes. Only valid once
    /// the section's fence has been consumed; resolves promptly since the
    /// prior copy is then known complete.
    pub fn remap(&mut self, device: &wgpu::Device, section: u32) -> Result<()> {
        if self.mapped[section as usize] {
            return Ok(());
        }

        let (tx, rx) = std::sync::mpsc::channel();
        self.staging[section as usize]
            .slice(..)
            .map_async(wgpu::MapMode::Write, move |result| {
                let _ = tx.send(result);
            });

        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });

        match rx.try_recv() {
            Ok(Ok(())) => {
                self.mapped[section as usize] = true;
                Ok(())
            }
            _ => Err(BakeError::BufferMapFailed {
                label: self.label.clone(),
                section,
            }),
        }
    }

    /// The device-local buffer shaders bind.
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.device_buffer
    }

    /// A bind-group entry covering exactly `section`.
    #[must_use]
    pub fn binding(&self, section: u32) -> wgpu::BufferBinding<'_> {
        wgpu::BufferBinding {
            buffer: &self.device_buffer,
            offset: self.offset_of(section),
            size: wgpu::BufferSize::new(self.section_size),
        }
    }
}
