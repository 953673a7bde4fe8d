//! Triangle meshes the light is drawn with.
//!
//! The light geometry defaults to a unit quad spanning the `[-1, 1]` model
//! square, whose UVs line up with the light texture. Any other triangle mesh
//! can be read from an OBJ file.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

#[derive(Debug)]
pub enum MeshError {
    Load { path: PathBuf, source: tobj::LoadError },
    Empty { path: PathBuf },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Load { path, source } => {
                write!(f, "failed to load OBJ file {}: {source}", path.display())
            }
            MeshError::Empty { path } => {
                write!(f, "OBJ file {} contains no triangles", path.display())
            }
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Load { source, .. } => Some(source),
            MeshError::Empty { .. } => None,
        }
    }
}

/// One triangle corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

/// UV of a point of the light plane: the `[-1, 1]` square maps onto `[0, 1]`.
#[inline]
fn planar_uv(p: Vec3) -> Vec2 {
    p.xy() * 0.5 + Vec2::new(0.5, 0.5)
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    /// Two triangles covering the `[-1, 1]` square at `z = 0`, facing +z.
    pub fn unit_quad() -> Self {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let vertices = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ]
        .into_iter()
        .map(|position| Vertex {
            position,
            normal,
            uv: planar_uv(position),
        })
        .collect();
        Self::new("unit_quad", vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Loads every object of an OBJ file into one mesh.
    ///
    /// Missing normals default to +z; missing UVs are derived from the
    /// position as for the unit quad.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let (models, _materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| MeshError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let count = mesh.positions.len() / 3;
            if mesh.texcoords.is_empty() {
                log::warn!(
                    "{}: object `{}` has no texture coordinates, using planar UVs",
                    path.display(),
                    model.name
                );
            }
            for i in 0..count {
                let position = Vec3::new(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                );
                let normal = if mesh.normals.len() >= 3 * (i + 1) {
                    Vec3::new(
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    )
                } else {
                    Vec3::new(0.0, 0.0, 1.0)
                };
                let uv = if mesh.texcoords.len() >= 2 * (i + 1) {
                    Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                } else {
                    planar_uv(position)
                };
                vertices.push(Vertex {
                    position,
                    normal,
                    uv,
                });
            }
            indices.extend(mesh.indices.iter().map(|&i| base + i));
        }

        if indices.is_empty() {
            return Err(MeshError::Empty {
                path: path.to_path_buf(),
            });
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!(
            "loaded mesh {} ({} vertices, {} triangles)",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );
        Ok(Self::new(name, vertices, indices))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_quad() {
        let quad = Mesh::unit_quad();
        assert_eq!(quad.triangle_count(), 2);
        let corners: Vec<Vec2> = quad.vertices().iter().map(|v| v.uv).collect();
        assert_eq!(
            corners,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0)
            ]
        );
    }

    #[test]
    fn test_load_obj() {
        let path = std::env::temp_dir().join("bezlight_mesh_test.obj");
        std::fs::write(
            &path,
            "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();
        let mesh = Mesh::from_obj(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(mesh.name(), "bezlight_mesh_test");
        assert_eq!(mesh.triangle_count(), 2);
        let first = mesh.triangles().next().unwrap();
        assert_eq!(first[1].uv, Vec2::new(1.0, 0.0));
        assert_eq!(first[1].normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_obj_names_the_path() {
        let err = Mesh::from_obj("no/such/plane.obj").unwrap_err();
        assert!(matches!(err, MeshError::Load { .. }));
        assert!(err.to_string().contains("no/such/plane.obj"));
    }
}
