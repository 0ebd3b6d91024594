use anyhow::{Context, Result};
use nocturne_assets::{
    CubemapImage, ModelData, TextureImage, load_cubemap, load_model, load_texture_2d,
};
use nocturne_common::ViewerConfig;
use nocturne_render_wgpu::SceneAssets;

/// Every asset the viewer draws, decoded and ready for upload.
pub struct LoadedScene {
    pub scene: ModelData,
    pub billboard: ModelData,
    pub sprite: TextureImage,
    pub skybox: CubemapImage,
}

impl LoadedScene {
    /// Models are required. A broken sprite texture is replaced by the
    /// placeholder and missing skybox faces stay black.
    pub fn load(config: &ViewerConfig) -> Result<Self> {
        let assets = &config.assets;
        let prefix = assets.material_prefix.as_str();

        let scene_path = config.resolve(&assets.scene_model);
        let scene = load_model(&scene_path, prefix)
            .with_context(|| format!("loading scene model {}", scene_path.display()))?;
        let billboard_path = config.resolve(&assets.billboard_model);
        let billboard = load_model(&billboard_path, prefix)
            .with_context(|| format!("loading billboard model {}", billboard_path.display()))?;

        let sprite = load_texture_2d(config.resolve(&assets.sprite_texture)).unwrap_or_else(|err| {
            tracing::warn!("{err}, using placeholder");
            TextureImage::placeholder()
        });

        let skybox = load_cubemap(&config.skybox_face_paths());

        tracing::info!(
            "scene loaded: {} + {} meshes, {} sprites, {}/6 skybox faces",
            scene.meshes.len(),
            billboard.meshes.len(),
            config.scene.sprites.len(),
            skybox.loaded_count()
        );
        Ok(Self {
            scene,
            billboard,
            sprite,
            skybox,
        })
    }

    pub fn assets(&self) -> SceneAssets<'_> {
        SceneAssets {
            scene: &self.scene,
            billboard: &self.billboard,
            sprite: &self.sprite,
            skybox: &self.skybox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";

    fn write_models(root: &Path) {
        for dir in ["objects/scene", "objects/billboard"] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        std::fs::write(root.join("objects/scene/scene.obj"), TRIANGLE).unwrap();
        std::fs::write(root.join("objects/billboard/billboard.obj"), TRIANGLE).unwrap();
    }

    #[test]
    fn missing_textures_degrade_but_load() {
        let dir = tempfile::tempdir().unwrap();
        write_models(dir.path());
        let config = ViewerConfig {
            resources: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };

        let loaded = LoadedScene::load(&config).unwrap();
        assert_eq!(loaded.scene.meshes.len(), 1);
        assert_eq!(loaded.sprite.label, "placeholder");
        assert_eq!(loaded.skybox.loaded_count(), 0);
    }

    #[test]
    fn sprite_texture_is_decoded_when_present() {
        let dir = tempfile::tempdir().unwrap();
        write_models(dir.path());
        std::fs::create_dir_all(dir.path().join("textures")).unwrap();
        image::RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]))
            .save(dir.path().join("textures/mita.png"))
            .unwrap();

        let mut config = ViewerConfig {
            resources: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        config.assets.sprite_texture = "textures/mita.png".into();

        let loaded = LoadedScene::load(&config).unwrap();
        assert_eq!(loaded.sprite.width(), 8);
        assert_eq!(loaded.sprite.mip_level_count(), 4);
    }

    #[test]
    fn missing_model_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            resources: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let err = LoadedScene::load(&config).err().unwrap();
        assert!(format!("{err:#}").contains("scene.obj"));
    }
}
