//! Built-in geometry
//!
//! Unit-sized shapes centred on the origin, ready for
//! [`GpuBackend::upload_geometry`](super::GpuBackend::upload_geometry).

/// Interleaved vertex: position, normal, texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

/// Indexed geometry kept on the CPU side
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex list
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

/// Unit quad in the XY plane facing +Z
pub fn quad() -> MeshData {
    const N: [f32; 3] = [0.0, 0.0, 1.0];
    MeshData {
        vertices: vec![
            Vertex::new([-0.5, -0.5, 0.0], N, [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], N, [1.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.0], N, [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, 0.0], N, [0.0, 1.0]),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Unit cube with per-face normals (24 vertices, 36 indices)
pub fn cube() -> MeshData {
    // (normal, tangent u, tangent v) per face; corners are n/2 ± u/2 ± v/2
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    const CORNERS: [([f32; 2], [f32; 2]); 4] = [
        ([-0.5, -0.5], [0.0, 0.0]),
        ([0.5, -0.5], [1.0, 0.0]),
        ([0.5, 0.5], [1.0, 1.0]),
        ([-0.5, 0.5], [0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        for ([su, sv], uv) in CORNERS {
            let position = [
                normal[0] * 0.5 + u[0] * su + v[0] * sv,
                normal[1] * 0.5 + u[1] * su + v[1] * sv,
                normal[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            vertices.push(Vertex::new(position, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshData { vertices, indices }
}
