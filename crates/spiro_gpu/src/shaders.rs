//! WGSL shader for the quad batch
//!
//! One pipeline draws every batch. Vertices arrive already in pixel space;
//! the vertex stage applies the frame projection, and the fragment stage
//! picks one of sixteen texture bindings by the vertex's slot tag.

/// Batch shader
///
/// Bindings (group 0):
/// - 0: frame uniforms (projection)
/// - 1: shared linear sampler
/// - 2..=17: texture slots 0..=15
pub const BATCH_SHADER: &str = r#"
// ============================================================================
// Spiro Batch Shader
// ============================================================================

struct FrameUniforms {
    projection: mat4x4<f32>,
}

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
    @location(2) tex_coord: vec2<f32>,
    @location(3) tex_slot: f32,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) tex_coord: vec2<f32>,
    // -1 = untextured
    @location(2) @interpolate(flat) slot: i32,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(0) @binding(1) var tex_sampler: sampler;
@group(0) @binding(2) var t0: texture_2d<f32>;
@group(0) @binding(3) var t1: texture_2d<f32>;
@group(0) @binding(4) var t2: texture_2d<f32>;
@group(0) @binding(5) var t3: texture_2d<f32>;
@group(0) @binding(6) var t4: texture_2d<f32>;
@group(0) @binding(7) var t5: texture_2d<f32>;
@group(0) @binding(8) var t6: texture_2d<f32>;
@group(0) @binding(9) var t7: texture_2d<f32>;
@group(0) @binding(10) var t8: texture_2d<f32>;
@group(0) @binding(11) var t9: texture_2d<f32>;
@group(0) @binding(12) var t10: texture_2d<f32>;
@group(0) @binding(13) var t11: texture_2d<f32>;
@group(0) @binding(14) var t12: texture_2d<f32>;
@group(0) @binding(15) var t13: texture_2d<f32>;
@group(0) @binding(16) var t14: texture_2d<f32>;
@group(0) @binding(17) var t15: texture_2d<f32>;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = frame.projection * vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    out.tex_coord = in.tex_coord;
    out.slot = i32(round(in.tex_slot));
    return out;
}

// Sample slot `slot`; explicit LOD keeps sampling legal in the switch
fn sample_slot(slot: i32, uv: vec2<f32>) -> vec4<f32> {
    switch slot {
        case 1: { return textureSampleLevel(t1, tex_sampler, uv, 0.0); }
        case 2: { return textureSampleLevel(t2, tex_sampler, uv, 0.0); }
        case 3: { return textureSampleLevel(t3, tex_sampler, uv, 0.0); }
        case 4: { return textureSampleLevel(t4, tex_sampler, uv, 0.0); }
        case 5: { return textureSampleLevel(t5, tex_sampler, uv, 0.0); }
        case 6: { return textureSampleLevel(t6, tex_sampler, uv, 0.0); }
        case 7: { return textureSampleLevel(t7, tex_sampler, uv, 0.0); }
        case 8: { return textureSampleLevel(t8, tex_sampler, uv, 0.0); }
        case 9: { return textureSampleLevel(t9, tex_sampler, uv, 0.0); }
        case 10: { return textureSampleLevel(t10, tex_sampler, uv, 0.0); }
        case 11: { return textureSampleLevel(t11, tex_sampler, uv, 0.0); }
        case 12: { return textureSampleLevel(t12, tex_sampler, uv, 0.0); }
        case 13: { return textureSampleLevel(t13, tex_sampler, uv, 0.0); }
        case 14: { return textureSampleLevel(t14, tex_sampler, uv, 0.0); }
        case 15: { return textureSampleLevel(t15, tex_sampler, uv, 0.0); }
        default: { return textureSampleLevel(t0, tex_sampler, uv, 0.0); }
    }
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.slot < 0) {
        return in.color;
    }
    return in.color * sample_slot(in.slot, in.tex_coord);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_is_bound() {
        for i in 0..crate::MAX_TEXTURES {
            let binding = format!("@binding({}) var t{}: texture_2d<f32>;", i + 2, i);
            assert!(BATCH_SHADER.contains(&binding), "missing slot {}", i);
        }
        assert!(BATCH_SHADER.contains("fn vs_main"));
        assert!(BATCH_SHADER.contains("fn fs_main"));
    }
}
