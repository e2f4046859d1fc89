//! The transform-streaming core.
//!
//! Per frame, the flow is:
//!
//! 1. [`HierarchyWalker`](walker::HierarchyWalker) traverses each model's
//!    part tree depth-first and, for GPU-path instances, records world
//!    transforms into the [`TransformCollector`](collector::TransformCollector)
//!    keyed by part id.
//! 2. [`StreamingContext::flush_frame`](context::StreamingContext::flush_frame)
//!    waits on the fence guarding the next ring section, then copies the
//!    collector's contents into that section of the
//!    [`SectionedRingBuffer`](ring::SectionedRingBuffer) pair.
//! 3. The host submits its draws referencing the section and hands the
//!    submission back to
//!    [`StreamingContext::finish_frame`](context::StreamingContext::finish_frame),
//!    which records the section fence and advances the ring.
//!
//! The [`SectionFences`](fences::SectionFences) guarantee the CPU never
//! overwrites a section the GPU is still reading.

pub mod collector;
pub mod context;
pub mod fences;
pub mod layout;
pub mod ring;
pub mod vertex;
pub mod walker;
