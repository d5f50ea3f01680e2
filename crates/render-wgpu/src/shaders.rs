use lifegrid_common::WORKGROUP_SIZE;
use lifegrid_render::DEAD_COLOR;

/// Update kernel: one invocation per cell, reading `cell_state_in` and
/// writing only its own element of `cell_state_out`.
const UPDATE_SHADER: &str = r#"
@group(0) @binding(0) var<uniform> grid: vec2<u32>;
@group(0) @binding(1) var<storage, read> cell_state_in: array<u32>;
@group(0) @binding(2) var<storage, read_write> cell_state_out: array<u32>;

// x and y are at most one step outside the grid. Adding the dimension first
// keeps the remainder operands non-negative, which every backend agrees on.
fn cell_index(x: i32, y: i32) -> u32 {
    let wx = u32(x + i32(grid.x)) % grid.x;
    let wy = u32(y + i32(grid.y)) % grid.y;
    return wy * grid.x + wx;
}

fn cell_active(x: i32, y: i32) -> u32 {
    return cell_state_in[cell_index(x, y)];
}

@compute @workgroup_size($WORKGROUP_SIZE, $WORKGROUP_SIZE)
fn update_main(@builtin(global_invocation_id) id: vec3<u32>) {
    // Tiles on the right and top edges may overhang the grid.
    if (id.x >= grid.x || id.y >= grid.y) {
        return;
    }
    let x = i32(id.x);
    let y = i32(id.y);

    let neighbors = cell_active(x - 1, y - 1) +
        cell_active(x, y - 1) +
        cell_active(x + 1, y - 1) +
        cell_active(x - 1, y) +
        cell_active(x + 1, y) +
        cell_active(x - 1, y + 1) +
        cell_active(x, y + 1) +
        cell_active(x + 1, y + 1);

    let i = cell_index(x, y);
    switch neighbors {
        case 2u: {
            cell_state_out[i] = cell_state_in[i];
        }
        case 3u: {
            cell_state_out[i] = 1u;
        }
        default: {
            cell_state_out[i] = 0u;
        }
    }
}
"#;

/// Render kernel: one instance of the cell quad per cell, coloured by the
/// state in the buffer bound at binding 1.
const CELL_SHADER: &str = r#"
@group(0) @binding(0) var<uniform> grid: vec2<u32>;
@group(0) @binding(1) var<storage, read> cell_state: array<u32>;

const DEAD_COLOR: vec4<f32> = $DEAD_COLOR;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) cell: vec2<f32>,
    @location(1) @interpolate(flat) state: u32,
};

@vertex
fn vs_cell(@location(0) pos: vec2<f32>, @builtin(instance_index) instance: u32) -> VertexOutput {
    let dims = vec2<f32>(grid);
    let cell = vec2<f32>(f32(instance % grid.x), f32(instance / grid.x));
    let offset = cell / dims * 2.0;
    let grid_pos = (pos + 1.0) / dims - 1.0 + offset;

    var out: VertexOutput;
    out.position = vec4<f32>(grid_pos, 0.0, 1.0);
    out.cell = cell / dims;
    out.state = cell_state[instance];
    return out;
}

@fragment
fn fs_cell(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.state == 0u) {
        return DEAD_COLOR;
    }
    return vec4<f32>(in.cell, 1.0 - in.cell.x, 1.0);
}
"#;

pub const UPDATE_ENTRY: &str = "update_main";
pub const VERTEX_ENTRY: &str = "vs_cell";
pub const FRAGMENT_ENTRY: &str = "fs_cell";

/// WGSL source of the update kernel with the tile size filled in.
pub fn update_shader() -> String {
    UPDATE_SHADER.replace("$WORKGROUP_SIZE", &WORKGROUP_SIZE.to_string())
}

/// WGSL source of the render kernel with the palette filled in.
pub fn cell_shader() -> String {
    let [r, g, b, a] = DEAD_COLOR;
    CELL_SHADER.replace(
        "$DEAD_COLOR",
        &format!("vec4<f32>({r:?}, {g:?}, {b:?}, {a:?})"),
    )
}
