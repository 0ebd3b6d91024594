//! OBJ/MTL model loading.
//!
//! Faces are triangulated and re-indexed so every vertex carries position,
//! normal and texture coordinate under a single index. Texture paths from the
//! MTL file resolve against the model's directory.

use crate::texture::{TextureImage, load_texture_2d};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load model {}: {source}", .path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {} contains no triangles", .path.display())]
    Empty { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct SubMesh {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`].
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse_texture: Option<PathBuf>,
    pub specular_texture: Option<PathBuf>,
    /// MTL `Ns`, when present.
    pub shininess: Option<f32>,
}

/// Decoded textures for one material.
#[derive(Debug, Clone)]
pub struct MaterialTextures {
    pub diffuse: TextureImage,
    pub specular: TextureImage,
}

impl MaterialTextures {
    /// White diffuse, black specular.
    pub fn fallback() -> Self {
        Self {
            diffuse: TextureImage::solid("fallback diffuse", [255, 255, 255, 255]),
            specular: TextureImage::solid("fallback specular", [0, 0, 0, 255]),
        }
    }
}

fn load_or_fallback(path: Option<&Path>, slot: &str, fallback: TextureImage) -> TextureImage {
    let Some(path) = path else {
        return fallback;
    };
    match load_texture_2d(path) {
        Ok(texture) => texture,
        Err(err) => {
            tracing::warn!("{slot}: {err}, using fallback");
            fallback
        }
    }
}

impl MaterialData {
    /// Decode this material's textures. Missing or broken files fall back to
    /// [`MaterialTextures::fallback`] per slot.
    pub fn load_textures(&self, diffuse_slot: &str, specular_slot: &str) -> MaterialTextures {
        let MaterialTextures { diffuse, specular } = MaterialTextures::fallback();
        MaterialTextures {
            diffuse: load_or_fallback(self.diffuse_texture.as_deref(), diffuse_slot, diffuse),
            specular: load_or_fallback(self.specular_texture.as_deref(), specular_slot, specular),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelData {
    pub path: PathBuf,
    /// Prefix for sampler slot names, e.g. `material.`.
    pub slot_prefix: String,
    pub meshes: Vec<SubMesh>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    /// Slot name of the diffuse sampler, `<prefix>texture_diffuse1`.
    pub fn diffuse_slot(&self) -> String {
        format!("{}texture_diffuse1", self.slot_prefix)
    }

    /// Slot name of the specular sampler, `<prefix>texture_specular1`.
    pub fn specular_slot(&self) -> String {
        format!("{}texture_specular1", self.slot_prefix)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }

    pub fn material_for(&self, mesh: &SubMesh) -> Option<&MaterialData> {
        mesh.material.and_then(|i| self.materials.get(i))
    }

    /// Textures for every material, in material order.
    pub fn load_material_textures(&self) -> Vec<MaterialTextures> {
        let (diffuse_slot, specular_slot) = (self.diffuse_slot(), self.specular_slot());
        self.materials
            .iter()
            .map(|m| {
                let diffuse = format!("{} {diffuse_slot}", m.name);
                let specular = format!("{} {specular_slot}", m.name);
                m.load_textures(&diffuse, &specular)
            })
            .collect()
    }
}

/// Area-weighted vertex normals averaged over the faces that share each
/// vertex. Vertices on degenerate faces only get +Y.
fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<[f32; 3]> {
    let count = positions.len() / 3;
    let mut sums = vec![[0.0f32; 3]; count];
    let at = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];
    for face in indices.chunks_exact(3) {
        let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if a >= count || b >= count || c >= count {
            continue;
        }
        let (pa, pb, pc) = (at(a), at(b), at(c));
        let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for v in [a, b, c] {
            for k in 0..3 {
                sums[v][k] += n[k];
            }
        }
    }
    sums.into_iter()
        .map(|[x, y, z]| {
            let len = (x * x + y * y + z * z).sqrt();
            if len > f32::EPSILON {
                [x / len, y / len, z / len]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

fn convert_mesh(model: tobj::Model) -> SubMesh {
    let mesh = model.mesh;
    let count = mesh.positions.len() / 3;
    let generated = if mesh.normals.len() < count * 3 {
        smooth_normals(&mesh.positions, &mesh.indices)
    } else {
        Vec::new()
    };
    let vertices = (0..count)
        .map(|i| {
            let normal = match generated.get(i) {
                Some(normal) => *normal,
                None => [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]],
            };
            // OBJ puts v = 0 at the bottom row; textures are uploaded top row first.
            let tex_coords = if mesh.texcoords.len() >= (i + 1) * 2 {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            };
            MeshVertex {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal,
                tex_coords,
            }
        })
        .collect();
    SubMesh {
        name: model.name,
        vertices,
        indices: mesh.indices,
        material: mesh.material_id,
    }
}

fn texture_path(dir: &Path, name: Option<String>) -> Option<PathBuf> {
    name.filter(|n| !n.trim().is_empty())
        .map(|n| dir.join(n.trim().replace('\\', "/")))
}

/// Load an OBJ model and its materials. A missing or broken MTL file is
/// logged and leaves the model untextured.
pub fn load_model(path: impl AsRef<Path>, slot_prefix: &str) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|source| ModelError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path.parent().unwrap_or(Path::new(""));
    let materials = match materials {
        Ok(materials) => materials
            .into_iter()
            .map(|m| MaterialData {
                name: m.name,
                diffuse_texture: texture_path(dir, m.diffuse_texture),
                specular_texture: texture_path(dir, m.specular_texture),
                shininess: m.shininess,
            })
            .collect(),
        Err(err) => {
            tracing::warn!("materials for {} not loaded: {err}", path.display());
            Vec::new()
        }
    };

    let meshes: Vec<SubMesh> = models
        .into_iter()
        .map(convert_mesh)
        .filter(|m| !m.indices.is_empty())
        .collect();
    if meshes.is_empty() {
        return Err(ModelError::Empty {
            path: path.to_path_buf(),
        });
    }

    let model = ModelData {
        path: path.to_path_buf(),
        slot_prefix: slot_prefix.to_string(),
        meshes,
        materials,
    };
    tracing::debug!(
        "loaded model {} ({} meshes, {} vertices, {} triangles, {} materials)",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        model.materials.len()
    );
    Ok(model)
}
