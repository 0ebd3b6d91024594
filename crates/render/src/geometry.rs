//! Static vertex data uploaded once at startup.

/// Unit cube (±1) as 12 triangles, positions only.
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Sprite quad as two triangles: `[x, y, z, u, v]`. Spans x 0..1 and
/// y -0.5..0.5; v runs top to bottom to match image row order.
#[rustfmt::skip]
pub const SPRITE_QUAD_VERTICES: [[f32; 5]; 6] = [
    [0.0,  0.5, 0.0, 0.0, 0.0],
    [0.0, -0.5, 0.0, 0.0, 1.0],
    [1.0, -0.5, 0.0, 1.0, 1.0],

    [0.0,  0.5, 0.0, 0.0, 0.0],
    [1.0, -0.5, 0.0, 1.0, 1.0],
    [1.0,  0.5, 0.0, 1.0, 0.0],
];

pub const SKYBOX_VERTEX_COUNT: u32 = SKYBOX_VERTICES.len() as u32;
pub const SPRITE_VERTEX_COUNT: u32 = SPRITE_QUAD_VERTICES.len() as u32;
