use crate::texture::{SamplerSettings, TextureError};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Cube faces in array-layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Six square RGBA8 faces of equal size. Faces that failed to load hold
/// zeroed (black) texels.
#[derive(Debug, Clone)]
pub struct CubemapImage {
    pub size: u32,
    faces: [Vec<u8>; 6],
    loaded: [bool; 6],
    pub sampler: SamplerSettings,
}

impl CubemapImage {
    /// Assemble a cubemap from per-face decode results. The first square face
    /// sets the size; later faces that are not square or differ in size are
    /// rejected like decode failures.
    pub fn from_faces(faces: [Result<DynamicImage, TextureError>; 6]) -> Self {
        let mut size = None;
        let mut accepted: [Option<Vec<u8>>; 6] = Default::default();

        for (face, result) in CubeFace::ALL.into_iter().zip(faces) {
            let image = match result {
                Ok(image) => image,
                Err(err) => {
                    tracing::warn!("cubemap face {face:?} failed to load: {err}");
                    continue;
                }
            };
            let (w, h) = (image.width(), image.height());
            if w != h || w == 0 {
                tracing::warn!("cubemap face {face:?} is {w}x{h}, faces must be square");
                continue;
            }
            let expected = *size.get_or_insert(w);
            if w != expected {
                tracing::warn!(
                    "cubemap face {face:?} is {w}x{h}, expected {expected}x{expected}"
                );
                continue;
            }
            accepted[face.layer() as usize] = Some(image.to_rgba8().into_raw());
        }

        let size = size.unwrap_or(1);
        let texels = (size * size * 4) as usize;
        let loaded = accepted.each_ref().map(Option::is_some);
        let faces = accepted.map(|face| face.unwrap_or_else(|| vec![0; texels]));

        let missing = loaded.iter().filter(|ok| !**ok).count();
        if missing == 6 {
            tracing::warn!("no cubemap face loaded, using a 1x1 black cube");
        }

        Self {
            size,
            faces,
            loaded,
            sampler: SamplerSettings::cubemap(),
        }
    }

    /// RGBA8 texels of one face, `size * size * 4` bytes.
    pub fn face(&self, face: CubeFace) -> &[u8] {
        &self.faces[face.layer() as usize]
    }

    pub fn is_loaded(&self, face: CubeFace) -> bool {
        self.loaded[face.layer() as usize]
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.iter().filter(|ok| **ok).count()
    }
}

fn open_face(path: &Path) -> Result<DynamicImage, TextureError> {
    image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Load six face images in +X, -X, +Y, -Y, +Z, -Z order. Never fails: a face
/// that cannot be used is reported and left black.
pub fn load_cubemap(paths: &[PathBuf; 6]) -> CubemapImage {
    let cube = CubemapImage::from_faces(paths.each_ref().map(|p| open_face(p)));
    tracing::debug!(
        "loaded cubemap ({}x{}, {}/6 faces)",
        cube.size,
        cube.size,
        cube.loaded_count()
    );
    cube
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_face(dir: &Path, name: &str, size: u32, color: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(size, size, Rgb(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn faces_keep_layer_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: [PathBuf; 6] = std::array::from_fn(|i| {
            write_face(dir.path(), &format!("f{i}.png"), 4, [i as u8 * 40, 0, 0])
        });
        let cube = load_cubemap(&paths);
        assert_eq!(cube.size, 4);
        assert_eq!(cube.loaded_count(), 6);
        for (i, face) in CubeFace::ALL.into_iter().enumerate() {
            assert_eq!(face.layer(), i as u32);
            assert_eq!(&cube.face(face)[..4], &[i as u8 * 40, 0, 0, 255]);
        }
    }

    #[test]
    fn missing_face_is_black_and_others_survive() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: [PathBuf; 6] =
            std::array::from_fn(|i| write_face(dir.path(), &format!("f{i}.png"), 2, [255; 3]));
        paths[CubeFace::NegativeY.layer() as usize] = dir.path().join("nope.jpg");

        let cube = load_cubemap(&paths);
        assert!(!cube.is_loaded(CubeFace::NegativeY));
        assert_eq!(cube.loaded_count(), 5);
        assert!(cube.face(CubeFace::NegativeY).iter().all(|b| *b == 0));
        assert_eq!(cube.face(CubeFace::NegativeY).len(), 2 * 2 * 4);
        assert_eq!(&cube.face(CubeFace::PositiveZ)[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: [PathBuf; 6] =
            std::array::from_fn(|i| write_face(dir.path(), &format!("f{i}.png"), 4, [9; 3]));
        paths[2] = write_face(dir.path(), "small.png", 2, [9; 3]);
        let cube = load_cubemap(&paths);
        assert_eq!(cube.size, 4);
        assert!(!cube.is_loaded(CubeFace::PositiveY));
        assert_eq!(cube.face(CubeFace::PositiveY).len(), 4 * 4 * 4);
    }

    #[test]
    fn all_faces_missing_gives_one_texel_cube() {
        let paths: [PathBuf; 6] = std::array::from_fn(|i| PathBuf::from(format!("/nope/{i}.jpg")));
        let cube = load_cubemap(&paths);
        assert_eq!(cube.size, 1);
        assert_eq!(cube.loaded_count(), 0);
        assert_eq!(cube.face(CubeFace::PositiveX), &[0, 0, 0, 0]);
    }
}
