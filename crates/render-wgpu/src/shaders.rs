// Frame uniforms shared by every shader. Layout mirrors `uniforms::FrameUniforms`.
macro_rules! frame_block {
    () => {
        r#"
struct PointLight {
    position: vec3<f32>,
    constant: f32,
    ambient: vec3<f32>,
    linear: f32,
    diffuse: vec3<f32>,
    quadratic: f32,
    specular: vec3<f32>,
    _pad: f32,
};

struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    skybox_view: mat4x4<f32>,
    camera_position: vec3<f32>,
    shininess: f32,
    light_count: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
    lights: array<PointLight, 8>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
"#
    };
}

// Per-draw transform block. Layout mirrors `uniforms::DrawUniforms`.
macro_rules! draw_block {
    () => {
        r#"
struct Draw {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> draw: Draw;
"#
    };
}

/// Phong shading with attenuated point lights, diffuse and specular maps.
pub const MODEL_SHADER: &str = concat!(
    frame_block!(),
    draw_block!(),
    r#"
@group(2) @binding(0) var diffuse_texture: texture_2d<f32>;
@group(2) @binding(1) var diffuse_sampler: sampler;
@group(2) @binding(2) var specular_texture: texture_2d<f32>;
@group(2) @binding(3) var specular_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = draw.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.view * world;
    out.world_position = world.xyz;
    out.normal = (draw.normal * vec4<f32>(in.normal, 0.0)).xyz;
    out.tex_coords = in.tex_coords;
    return out;
}

fn shade_point_light(
    light: PointLight,
    normal: vec3<f32>,
    position: vec3<f32>,
    view_dir: vec3<f32>,
    diffuse_color: vec3<f32>,
    specular_color: vec3<f32>,
) -> vec3<f32> {
    let to_light = light.position - position;
    let light_dir = normalize(to_light);
    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), frame.shininess);

    let distance = length(to_light);
    let attenuation = 1.0 / (light.constant + light.linear * distance
        + light.quadratic * distance * distance);

    let ambient = light.ambient * diffuse_color;
    let diffuse = light.diffuse * diff * diffuse_color;
    let specular = light.specular * spec * specular_color;
    return (ambient + diffuse + specular) * attenuation;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let diffuse_color = textureSample(diffuse_texture, diffuse_sampler, in.tex_coords).rgb;
    let specular_color = textureSample(specular_texture, specular_sampler, in.tex_coords).rgb;
    let normal = normalize(in.normal);
    let view_dir = normalize(frame.camera_position - in.world_position);

    var color = vec3<f32>(0.0);
    for (var i = 0u; i < frame.light_count; i = i + 1u) {
        color += shade_point_light(
            frame.lights[i],
            normal,
            in.world_position,
            view_dir,
            diffuse_color,
            specular_color,
        );
    }
    return vec4<f32>(color, 1.0);
}
"#
);

/// Unlit textured quad; nearly transparent texels are discarded.
pub const SPRITE_SHADER: &str = concat!(
    frame_block!(),
    draw_block!(),
    r#"
@group(2) @binding(0) var sprite_texture: texture_2d<f32>;
@group(2) @binding(1) var sprite_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.view * draw.model * vec4<f32>(in.position, 1.0);
    out.tex_coords = in.tex_coords;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(sprite_texture, sprite_sampler, in.tex_coords);
    if color.a < 0.1 {
        discard;
    }
    return color;
}
"#
);

/// Cubemap sampled by direction. Depth is forced to the far plane (`xyww`).
pub const SKYBOX_SHADER: &str = concat!(
    frame_block!(),
    r#"
@group(1) @binding(0) var skybox_texture: texture_cube<f32>;
@group(1) @binding(1) var skybox_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    let clip = frame.projection * frame.skybox_view * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(skybox_texture, skybox_sampler, in.direction);
}
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_declare_entry_points() {
        for source in [MODEL_SHADER, SPRITE_SHADER, SKYBOX_SHADER] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
            assert!(source.contains("var<uniform> frame: Frame"));
        }
    }

    #[test]
    fn sprite_shader_discards_transparent_texels() {
        assert!(SPRITE_SHADER.contains("color.a < 0.1"));
        assert!(SPRITE_SHADER.contains("discard"));
    }

    #[test]
    fn skybox_shader_projects_to_far_plane() {
        assert!(SKYBOX_SHADER.contains("clip.xyww"));
        assert!(SKYBOX_SHADER.contains("skybox_view"));
        assert!(!SKYBOX_SHADER.contains("var<uniform> draw"));
    }
}
