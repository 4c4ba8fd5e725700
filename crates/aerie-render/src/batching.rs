//! Frame-local draw submissions, sorted and grouped to minimize state changes.
//!
//! Calls are ordered by program, then material, then mesh. Groups sharing a
//! program and material are yielded together, and within each group calls
//! sharing a mesh form one instanced draw.

use aerie_mesh::MeshId;
use glam::Mat4;

use crate::material::MaterialId;
use crate::shader::ProgramId;

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub material: MaterialId,
    pub mesh: MeshId,
    /// Model-to-world transform.
    pub transform: Mat4,
    /// Fog blend in `[0, 1]`; 1 draws the fog colour only.
    pub fog: f32,
}

#[derive(Default)]
pub struct DrawBatch {
    draw_calls: Vec<DrawCall>,
    sorted: bool,
}

impl DrawBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            draw_calls: Vec::with_capacity(capacity),
            sorted: false,
        }
    }

    pub fn push(&mut self, call: DrawCall) {
        self.draw_calls.push(call);
        self.sorted = false;
    }

    /// Stable sort, so calls for one mesh keep submission order.
    pub fn sort(&mut self) {
        self.draw_calls
            .sort_by_key(|c| (c.program, c.material, c.mesh));
        self.sorted = true;
    }

    /// Clear for reuse next frame, keeping capacity.
    pub fn clear(&mut self) {
        self.draw_calls.clear();
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.draw_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_calls.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Calls drawn with `program`, in submission order.
    pub fn calls_with(&self, program: ProgramId) -> impl Iterator<Item = &DrawCall> {
        self.draw_calls.iter().filter(move |c| c.program == program)
    }

    /// Groups of calls sharing program and material.
    ///
    /// Call [`sort`](Self::sort) first for maximal groups.
    pub fn groups(&self) -> DrawGroupIter<'_> {
        DrawGroupIter {
            calls: &self.draw_calls,
            cursor: 0,
        }
    }
}

#[derive(Debug)]
pub struct DrawGroup<'a> {
    pub program: ProgramId,
    pub material: MaterialId,
    pub calls: &'a [DrawCall],
}

impl<'a> DrawGroup<'a> {
    /// Runs of calls with the same mesh, one instanced draw each.
    pub fn instanced(&self) -> InstancedGroupIter<'a> {
        InstancedGroupIter {
            calls: self.calls,
            cursor: 0,
        }
    }
}

pub struct DrawGroupIter<'a> {
    calls: &'a [DrawCall],
    cursor: usize,
}

impl<'a> Iterator for DrawGroupIter<'a> {
    type Item = DrawGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.calls.get(self.cursor)?;
        let (program, material) = (first.program, first.material);
        let start = self.cursor;
        let run = self.calls[start..]
            .iter()
            .take_while(|c| c.program == program && c.material == material)
            .count();
        self.cursor += run;
        Some(DrawGroup {
            program,
            material,
            calls: &self.calls[start..self.cursor],
        })
    }
}

#[derive(Debug)]
pub struct InstancedDraw<'a> {
    pub mesh: MeshId,
    pub calls: &'a [DrawCall],
}

impl InstancedDraw<'_> {
    pub fn instance_count(&self) -> u32 {
        self.calls.len() as u32
    }
}

pub struct InstancedGroupIter<'a> {
    calls: &'a [DrawCall],
    cursor: usize,
}

impl<'a> Iterator for InstancedGroupIter<'a> {
    type Item = InstancedDraw<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.calls.get(self.cursor)?.mesh;
        let start = self.cursor;
        let run = self.calls[start..]
            .iter()
            .take_while(|c| c.mesh == mesh)
            .count();
        self.cursor += run;
        Some(InstancedDraw {
            mesh,
            calls: &self.calls[start..self.cursor],
        })
    }
}
