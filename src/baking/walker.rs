use glam::{Mat4, Vec4};

use crate::baking::collector::{InstanceSlot, TransformCollector};
use crate::model::definition::ModelDefinition;
use crate::model::part::{BakeablePart, Part, PartKey};

/// Which path a rendered instance took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecision {
    /// Transforms were recorded into the collector for GPU-side lookup;
    /// geometry is not re-emitted per instance on this path.
    Gpu,
    /// Geometry was submitted immediately with CPU-combined transforms,
    /// matching classical per-instance rendering.
    Cpu,
    /// The definition had no parts; nothing was done.
    Skipped,
}

/// The host-facing render destination.
///
/// This is the sole interface the core requires from the host rendering
/// pipeline: a capability flag, queried once per root part per frame, and
/// the classical per-part submission used on the CPU path.
pub trait BakeTarget {
    /// `true` when the destination accepts per-part ids and looks up
    /// transforms GPU-side, as opposed to requiring pre-transformed
    /// vertices from the CPU.
    fn supports_baking(&self) -> bool;

    /// Submits one part's geometry with its accumulated world transform.
    /// Only invoked on the CPU path.
    fn submit_part(&mut self, part: &Part, world: Mat4);
}

/// Depth-first render traversal over a part tree.
///
/// For each rendered instance the walker decides once, at the root,
/// between the GPU baking path and the immediate CPU path:
///
/// - GPU path requires the target to be baking-capable, a live collector
///   (i.e. a graphics context), and a successful capacity reservation.
///   Visible parts get their world transform recorded by id; an invisible
///   part propagates an explicit absent record to its entire subtree
///   without further matrix work.
/// - CPU path combines transforms top-down and submits each visible
///   part's geometry immediately, in fixed child order. Instances that
///   overflow the capacity ceilings land here too, so the excess degrades
///   silently instead of corrupting section memory.
pub struct HierarchyWalker<'a, T: BakeTarget> {
    target: &'a mut T,
    collector: Option<&'a mut TransformCollector>,
}

impl<'a, T: BakeTarget> HierarchyWalker<'a, T> {
    /// `collector` is `None` when no graphics context is available, which
    /// forces the CPU path regardless of target capability.
    pub fn new(target: &'a mut T, collector: Option<&'a mut TransformCollector>) -> Self {
        Self { target, collector }
    }

    /// Renders one instance of `def`, returning the path taken.
    pub fn render(&mut self, def: &ModelDefinition, root_transform: Mat4, tint: Vec4) -> PathDecision {
        if def.roots().is_empty() {
            return PathDecision::Skipped;
        }

        if self.target.supports_baking() && def.is_registered() {
            if let Some(collector) = self.collector.as_deref_mut() {
                match collector.begin_instance(def.part_count(), tint) {
                    Some(slot) => {
                        for &root in def.roots() {
                            Self::gpu_walk(collector, def, root, slot, root_transform);
                        }
                        return PathDecision::Gpu;
                    }
                    None => {
                        log::warn!(
                            "Capacity ceiling reached; rendering `{}` through the CPU path",
                            def.name()
                        );
                    }
                }
            }
        }

        for &root in def.roots() {
            Self::cpu_walk(self.target, def, root, root_transform);
        }
        PathDecision::Cpu
    }

    fn gpu_walk(
        collector: &mut TransformCollector,
        def: &ModelDefinition,
        key: PartKey,
        slot: InstanceSlot,
        parent: Mat4,
    ) {
        let Some(part) = def.part(key) else {
            return;
        };
        let Some(id) = part.bake_id() else {
            debug_assert!(false, "unregistered part reached the GPU path");
            return;
        };

        if !part.is_visible() {
            Self::absent_walk(collector, def, key, slot);
            return;
        }

        let world = parent * part.local_matrix();
        collector.record(slot, id, world);

        for &child in part.children() {
            Self::gpu_walk(collector, def, child, slot, world);
        }
    }

    // An absent subtree is pruned for transform purposes, but every id in
    // it still needs an explicit absent record so the shader skips it
    // deterministically instead of reading stale data.
    fn absent_walk(
        collector: &mut TransformCollector,
        def: &ModelDefinition,
        key: PartKey,
        slot: InstanceSlot,
    ) {
        let Some(part) = def.part(key) else {
            return;
        };
        if let Some(id) = part.bake_id() {
            collector.record_absent(slot, id);
        }
        for &child in part.children() {
            Self::absent_walk(collector, def, child, slot);
        }
    }

    fn cpu_walk(target: &mut T, def: &ModelDefinition, key: PartKey, parent: Mat4) {
        let Some(part) = def.part(key) else {
            return;
        };
        if !part.is_visible() {
            return;
        }

        let world = parent * part.local_matrix();
        target.submit_part(part, world);

        for &child in part.children() {
            Self::cpu_walk(target, def, child, world);
        }
    }
}
