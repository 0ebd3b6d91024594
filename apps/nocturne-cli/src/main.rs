use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use nocturne_assets::{TextureImage, load_cubemap, load_model, load_texture_2d};
use nocturne_common::ViewerConfig;
use nocturne_render::{DebugTextRenderer, FlyCamera, Renderer, SceneLayout, Viewport, plan_frame};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nocturne-cli", about = "Inspect nocturne scenes without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resource directory, overriding the config
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the frame plan for a camera pose
    Plan {
        /// Camera position as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        position: Option<Vec3>,
        /// Camera yaw in degrees
        #[arg(long, allow_hyphen_values = true)]
        yaw: Option<f32>,
        /// Camera pitch in degrees
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<f32>,
        /// Viewport width
        #[arg(long, default_value = "1600")]
        width: u32,
        /// Viewport height
        #[arg(long, default_value = "800")]
        height: u32,
    },
    /// Decode every model and texture the scene references
    Check,
    /// Print the effective configuration as YAML
    Config,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in '{s}': {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            ViewerConfig::load(path).with_context(|| format!("reading config {}", path.display()))?
        }
        None => ViewerConfig::default(),
    };
    if let Some(resources) = &cli.resources {
        config.resources = resources.clone();
    }
    Ok(config)
}

fn plan_text(
    config: &ViewerConfig,
    position: Option<Vec3>,
    yaw: Option<f32>,
    pitch: Option<f32>,
    viewport: Viewport,
) -> String {
    let mut camera_config = config.camera.clone();
    if let Some(position) = position {
        camera_config.position = position;
    }
    if let Some(yaw) = yaw {
        camera_config.yaw = yaw;
    }
    if let Some(pitch) = pitch {
        camera_config.pitch = pitch;
    }
    let camera = FlyCamera::from_config(&camera_config);
    let plan = plan_frame(&SceneLayout::from_config(config), &camera, viewport);
    DebugTextRenderer::new().render(&plan)
}

/// One line of `check` output.
#[derive(Debug)]
struct CheckLine {
    asset: String,
    outcome: Result<String, String>,
}

fn describe_texture(texture: &TextureImage) -> String {
    format!(
        "{:?} {}x{}, {} mips, wrap {:?}",
        texture.format,
        texture.width(),
        texture.height(),
        texture.mip_level_count(),
        texture.sampler.wrap_u
    )
}

fn check_texture(lines: &mut Vec<CheckLine>, asset: String, path: &Path) {
    let outcome = load_texture_2d(path)
        .map(|texture| describe_texture(&texture))
        .map_err(|e| e.to_string());
    lines.push(CheckLine { asset, outcome });
}

fn check_model(lines: &mut Vec<CheckLine>, asset: &str, config: &ViewerConfig, path: &Path) {
    let model = match load_model(config.resolve(path), &config.assets.material_prefix) {
        Ok(model) => model,
        Err(e) => {
            lines.push(CheckLine {
                asset: asset.to_string(),
                outcome: Err(e.to_string()),
            });
            return;
        }
    };
    lines.push(CheckLine {
        asset: asset.to_string(),
        outcome: Ok(format!(
            "{} meshes, {} vertices, {} triangles, {} materials",
            model.meshes.len(),
            model.vertex_count(),
            model.triangle_count(),
            model.materials.len()
        )),
    });
    let (diffuse_slot, specular_slot) = (model.diffuse_slot(), model.specular_slot());
    for material in &model.materials {
        let textures = [
            (&diffuse_slot, &material.diffuse_texture),
            (&specular_slot, &material.specular_texture),
        ];
        for (slot, texture) in textures {
            if let Some(texture) = texture {
                check_texture(lines, format!("{asset}/{}/{slot}", material.name), texture);
            }
        }
    }
}

fn check_assets(config: &ViewerConfig) -> Vec<CheckLine> {
    tracing::debug!("checking assets under {}", config.resources.display());
    let assets = &config.assets;
    let mut lines = Vec::new();
    check_model(&mut lines, "scene", config, &assets.scene_model);
    check_model(&mut lines, "billboard", config, &assets.billboard_model);
    check_texture(
        &mut lines,
        "sprite".into(),
        &config.resolve(&assets.sprite_texture),
    );

    let skybox = load_cubemap(&config.skybox_face_paths());
    let outcome = if skybox.loaded_count() == 6 {
        Ok(format!("6 faces, {}x{}", skybox.size, skybox.size))
    } else {
        Err(format!("{}/6 faces loaded", skybox.loaded_count()))
    };
    lines.push(CheckLine {
        asset: "skybox".into(),
        outcome,
    });
    lines
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Plan {
            position,
            yaw,
            pitch,
            width,
            height,
        } => {
            let text = plan_text(
                &config,
                *position,
                *yaw,
                *pitch,
                Viewport::new(*width, *height),
            );
            print!("{text}");
        }
        Commands::Check => {
            let lines = check_assets(&config);
            let mut failed = 0;
            for line in &lines {
                match &line.outcome {
                    Ok(detail) => println!("ok    {:<40} {detail}", line.asset),
                    Err(err) => {
                        failed += 1;
                        println!("FAIL  {:<40} {err}", line.asset);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} of {} assets failed to load", lines.len());
            }
            println!("all {} assets ok", lines.len());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_argument_parses() {
        assert_eq!(parse_vec3("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn plan_command_parses_pose() {
        let cli = Cli::parse_from([
            "nocturne-cli",
            "plan",
            "--position",
            "0,1,2",
            "--yaw",
            "-45",
            "--resources",
            "/tmp/res",
        ]);
        match cli.command {
            Commands::Plan { position, yaw, .. } => {
                assert_eq!(position, Some(Vec3::new(0.0, 1.0, 2.0)));
                assert_eq!(yaw, Some(-45.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(load_config(&cli).unwrap().resources, PathBuf::from("/tmp/res"));
    }

    #[test]
    fn plan_text_uses_overrides() {
        let config = ViewerConfig::default();
        let text = plan_text(
            &config,
            Some(Vec3::new(1.0, 2.0, 3.0)),
            None,
            None,
            Viewport::new(800, 600),
        );
        assert!(text.starts_with("=== Frame 1 "));
        assert!(text.contains("eye=(1.00, 2.00, 3.00)"));
        assert!(text.contains("lights=8"));
    }

    #[test]
    fn check_reports_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            resources: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let lines = check_assets(&config);
        let names: Vec<&str> = lines.iter().map(|l| l.asset.as_str()).collect();
        assert_eq!(names, ["scene", "billboard", "sprite", "skybox"]);
        assert!(lines.iter().all(|l| l.outcome.is_err()));
    }

    #[test]
    fn check_describes_loaded_assets() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("objects")).unwrap();
        std::fs::write(
            root.join("objects/tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.join("textures/skybox")).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 128]))
            .save(root.join("textures/sprite.png"))
            .unwrap();

        let mut config = ViewerConfig {
            resources: root.to_path_buf(),
            ..ViewerConfig::default()
        };
        config.assets.scene_model = "objects/tri.obj".into();
        config.assets.billboard_model = "objects/tri.obj".into();
        config.assets.sprite_texture = "textures/sprite.png".into();

        let lines = check_assets(&config);
        let scene = lines[0].outcome.as_ref().unwrap();
        assert!(scene.starts_with("1 meshes, 3 vertices, 1 triangles"));
        let sprite = lines[2].outcome.as_ref().unwrap();
        assert!(sprite.contains("4x4"));
        assert!(sprite.contains("ClampToEdge"));
        assert_eq!(
            lines[3].outcome.as_ref().unwrap_err(),
            "0/6 faces loaded"
        );
    }
}
