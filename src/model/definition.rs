use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::baking::vertex::BakedVertex;
use crate::model::part::{BakeablePart, Part, PartKey};

/// A model's part tree plus its stable bake-id assignment.
///
/// Topology is built once with [`add_root`](Self::add_root) /
/// [`add_child`](Self::add_child) and frozen by
/// [`register`](Self::register), which assigns every part a dense integer
/// id, depth-first in fixed child order. Registration is idempotent, so a
/// definition built the same way always carries the same ids — the
/// property GPU-side `id * stride` addressing depends on.
///
/// Pose fields of individual parts remain mutable per frame through
/// [`part_mut`](Self::part_mut).
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    name: String,
    parts: SlotMap<PartKey, Part>,
    by_name: FxHashMap<String, PartKey>,
    roots: Vec<PartKey>,
    part_count: u32,
    registered: bool,
}

impl ModelDefinition {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parts: SlotMap::with_key(),
            by_name: FxHashMap::default(),
            roots: Vec::new(),
            part_count: 0,
            registered: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a root part. Panics if called after registration: topology is
    /// immutable once ids are assigned.
    pub fn add_root(&mut self, name: &str, part: Part) -> PartKey {
        assert!(!self.registered, "part topology is frozen by register()");
        let key = self.parts.insert(part);
        self.roots.push(key);
        self.by_name.insert(name.to_string(), key);
        key
    }

    /// Adds a child part under `parent`, keeping both sides of the link in
    /// sync. Panics on an unknown parent or after registration.
    pub fn add_child(&mut self, parent: PartKey, name: &str, part: Part) -> PartKey {
        assert!(!self.registered, "part topology is frozen by register()");
        assert!(
            self.parts.contains_key(parent),
            "add_child: unknown parent part"
        );
        let key = self.parts.insert(part);
        self.parts[key].parent = Some(parent);
        self.parts[parent].children.push(key);
        self.by_name.insert(name.to_string(), key);
        key
    }

    #[inline]
    #[must_use]
    pub fn part(&self, key: PartKey) -> Option<&Part> {
        self.parts.get(key)
    }

    #[inline]
    pub fn part_mut(&mut self, key: PartKey) -> Option<&mut Part> {
        self.parts.get_mut(key)
    }

    /// Looks up a part handle by the name it was added under.
    #[inline]
    #[must_use]
    pub fn part_by_name(&self, name: &str) -> Option<PartKey> {
        self.by_name.get(name).copied()
    }

    /// Root part handles, in insertion order.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[PartKey] {
        &self.roots
    }

    /// Number of parts, which equals the id range `0..part_count` after
    /// registration.
    #[inline]
    #[must_use]
    pub fn part_count(&self) -> u32 {
        self.part_count
    }

    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Freezes the topology and assigns dense bake ids `0..n`, depth-first
    /// in fixed child order. Returns the part count. Idempotent: calling
    /// again returns the existing assignment untouched.
    pub fn register(&mut self) -> u32 {
        if self.registered {
            return self.part_count;
        }

        let mut next = 0u32;
        let mut stack: Vec<PartKey> = self.roots.iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            let part = &mut self.parts[key];
            part.set_bake_id(next);
            next += 1;
            for &child in part.children.clone().iter().rev() {
                stack.push(child);
            }
        }

        self.part_count = next;
        self.registered = true;
        next
    }

    /// Builds the unique baked mesh for this model: every cuboid of every
    /// part, in id order, with vertices stamped by part id. Built once per
    /// definition; per-frame posing happens GPU-side through the streamed
    /// transforms. Panics if the definition is not registered.
    #[must_use]
    pub fn build_mesh(&self) -> Vec<BakedVertex> {
        assert!(self.registered, "build_mesh requires register() first");

        let mut out = Vec::new();
        let mut stack: Vec<PartKey> = self.roots.iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            let part = &self.parts[key];
            // registered() guarantees every part has an id
            let id = part.bake_id().map_or(0, |id| id as i32);
            for cuboid in &part.cuboids {
                cuboid.emit_vertices(id, &mut out);
            }
            for &child in part.children.iter().rev() {
                stack.push(child);
            }
        }

        out
    }

    /// Computes one part's accumulated world matrix by walking its parent
    /// chain. Intended for tooling and tests; the per-frame render path
    /// accumulates top-down instead.
    #[must_use]
    pub fn world_matrix_of(&self, key: PartKey) -> Mat4 {
        let mut chain = Vec::new();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let part = &self.parts[k];
            chain.push(part.local_matrix());
            cursor = part.parent;
        }
        chain.iter().rev().copied().product()
    }
}
