//! The single vertex layout shared by ground, tree and building meshes.

/// Interleaved vertex, 48 bytes.
///
/// Layout:
///   - `[0..12]`  position
///   - `[12..24]` normal
///   - `[24..32]` uv
///   - `[32..48]` ground texture weights (city, dry, forest, highland)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub weights: [f32; 4],
}

static_assertions::assert_eq_size!(Vertex, [u8; 48]);

impl Vertex {
    /// A vertex with an up normal and no texture weights.
    pub fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal: [0.0, 1.0, 0.0],
            uv,
            weights: [0.0; 4],
        }
    }

    /// Builder-style weight assignment.
    pub fn with_weights(mut self, weights: [f32; 4]) -> Self {
        self.weights = weights;
        self
    }

    /// Component-wise linear interpolation of every attribute.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        fn mix<const N: usize>(a: [f32; N], b: [f32; N], t: f32) -> [f32; N] {
            std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
        }
        Self {
            position: mix(self.position, other.position, t),
            normal: mix(self.normal, other.normal, t),
            uv: mix(self.uv, other.uv, t),
            weights: mix(self.weights, other.weights, t),
        }
    }

    pub fn position_vec(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_midpoint() {
        let a = Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]).with_weights([1.0, 0.0, 0.0, 0.0]);
        let b = Vertex::new([2.0, 4.0, 6.0], [1.0, 1.0]).with_weights([0.0, 0.0, 0.0, 1.0]);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, [1.0, 2.0, 3.0]);
        assert_eq!(mid.uv, [0.5, 0.5]);
        assert_eq!(mid.weights, [0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_vertex_casts_to_bytes() {
        let verts = [Vertex::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 3 * 48);
    }
}
