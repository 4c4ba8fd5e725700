//! WGSL stages for terrain geometry, registered with the program cache
//! under the names below.

use aerie_render::ProgramCache;

pub const GROUND_VS: &str = "terrain_ground.vert";
pub const GROUND_FS: &str = "terrain_ground.frag";
pub const TREES_VS: &str = "terrain_trees.vert";
pub const TREES_FS: &str = "terrain_trees.frag";
pub const PROPS_VS: &str = "terrain_props.vert";
pub const PROPS_FS: &str = "terrain_props.frag";
pub const BILLBOARD_VS: &str = "terrain_billboard.vert";
pub const BILLBOARD_FS: &str = "terrain_billboard.frag";

/// Shared vertex stage: instance transform, fog factor passed through.
const INSTANCED_VERTEX_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) weights: vec4<f32>,
};

struct InstanceInput {
    @location(4) model_0: vec4<f32>,
    @location(5) model_1: vec4<f32>,
    @location(6) model_2: vec4<f32>,
    @location(7) model_3: vec4<f32>,
    @location(8) fog: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) weights: vec4<f32>,
    @location(3) fog: f32,
};

@vertex
fn vs_main(in: VertexInput, inst: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * model * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    out.normal = normalize((model * vec4<f32>(in.normal, 0.0)).xyz);
    out.weights = in.weights;
    out.fog = inst.fog;
    return out;
}
"#;

const FRAGMENT_HEADER: &str = r#"
struct FragmentInput {
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) weights: vec4<f32>,
    @location(3) fog: f32,
};

const SUN_DIR: vec3<f32> = vec3<f32>(0.3, 0.8, 0.5);
const FOG_COLOR: vec3<f32> = vec3<f32>(0.70, 0.78, 0.86);

fn shade(base: vec3<f32>, in: FragmentInput) -> vec3<f32> {
    let light = 0.35 + 0.65 * max(dot(normalize(in.normal), normalize(SUN_DIR)), 0.0);
    return mix(base * light, FOG_COLOR, in.fog);
}
"#;

const GROUND_FRAGMENT_SOURCE: &str = r#"
@group(1) @binding(0) var t_city: texture_2d<f32>;
@group(1) @binding(1) var t_dry: texture_2d<f32>;
@group(1) @binding(2) var t_forest: texture_2d<f32>;
@group(1) @binding(3) var t_highland: texture_2d<f32>;
@group(1) @binding(4) var s_ground: sampler;

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let base = textureSample(t_city, s_ground, in.uv).rgb * in.weights.x
        + textureSample(t_dry, s_ground, in.uv).rgb * in.weights.y
        + textureSample(t_forest, s_ground, in.uv).rgb * in.weights.z
        + textureSample(t_highland, s_ground, in.uv).rgb * in.weights.w;
    return vec4<f32>(shade(base, in), 1.0);
}
"#;

const TREES_FRAGMENT_SOURCE: &str = r#"
@group(1) @binding(0) var t_atlas: texture_2d<f32>;
@group(1) @binding(1) var s_atlas: sampler;

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let texel = textureSample(t_atlas, s_atlas, in.uv);
    if texel.a < 0.5 {
        discard;
    }
    return vec4<f32>(mix(texel.rgb, FOG_COLOR, in.fog), 1.0);
}
"#;

const PROPS_FRAGMENT_SOURCE: &str = r#"
@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let facade = mix(vec3<f32>(0.62, 0.58, 0.52), vec3<f32>(0.35, 0.38, 0.45), in.uv.y);
    return vec4<f32>(shade(facade, in), 1.0);
}
"#;

const BILLBOARD_FRAGMENT_SOURCE: &str = r#"
@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let base = vec3<f32>(0.55, 0.53, 0.50) * (0.8 + 0.2 * in.uv.y);
    return vec4<f32>(mix(base, FOG_COLOR, in.fog), 1.0);
}
"#;

/// Register every terrain stage. Re-registering replaces the sources.
pub fn register_terrain_shaders(programs: &mut ProgramCache) {
    for name in [GROUND_VS, TREES_VS, PROPS_VS, BILLBOARD_VS] {
        programs.register(name, INSTANCED_VERTEX_SOURCE);
    }
    let fragments = [
        (GROUND_FS, GROUND_FRAGMENT_SOURCE),
        (TREES_FS, TREES_FRAGMENT_SOURCE),
        (PROPS_FS, PROPS_FRAGMENT_SOURCE),
        (BILLBOARD_FS, BILLBOARD_FRAGMENT_SOURCE),
    ];
    for (name, body) in fragments {
        programs.register(name, &format!("{FRAGMENT_HEADER}{body}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_terrain_programs_link() {
        let mut programs = ProgramCache::new();
        register_terrain_shaders(&mut programs);
        let pairs = [
            (GROUND_VS, GROUND_FS),
            (TREES_VS, TREES_FS),
            (PROPS_VS, PROPS_FS),
            (BILLBOARD_VS, BILLBOARD_FS),
        ];
        let ids: Vec<_> = pairs
            .iter()
            .map(|(vs, fs)| programs.get(vs, fs).unwrap())
            .collect();
        assert_eq!(programs.len(), 4);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_stages_are_not_interchangeable() {
        let mut programs = ProgramCache::new();
        register_terrain_shaders(&mut programs);
        assert!(programs.get(GROUND_FS, GROUND_VS).is_err());
    }
}
