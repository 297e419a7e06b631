//! GLSL sources for the two-stage silk program.
//!
//! Both stages are compiled by naga's GLSL frontend. The uniform block layout
//! must match [`SilkUniforms`](crate::gpu::SilkUniforms), and the fragment body
//! must match [`crate::shading`] constant for constant.

/// Passes the quad's clip-space position straight through.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Layered simplex noise folded into an indigo/purple silk sheen.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform SilkParams {
    float u_time;
    vec2 u_resolution;
} params;

const vec4 C = vec4(0.211324865405187, 0.366025403784439,
                    -0.577350269189626, 0.024390243902439);

vec3 mod289(vec3 x) { return x - floor(x * (1.0 / 289.0)) * 289.0; }
vec2 mod289(vec2 x) { return x - floor(x * (1.0 / 289.0)) * 289.0; }
vec3 permute(vec3 x) { return mod289(((x * 34.0) + 1.0) * x); }

float snoise(vec2 v) {
    vec2 i = floor(v + dot(v, C.yy));
    vec2 x0 = v - i + dot(i, C.xx);
    vec2 i1 = vec2(0.0, 1.0);
    if (x0.x > x0.y) {
        i1 = vec2(1.0, 0.0);
    }
    vec4 x12 = x0.xyxy + C.xxzz;
    x12 = vec4(x12.xy - i1, x12.zw);
    i = mod289(i);
    vec3 p = permute(permute(i.y + vec3(0.0, i1.y, 1.0)) + i.x + vec3(0.0, i1.x, 1.0));
    vec3 m = max(vec3(0.5) - vec3(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)), vec3(0.0));
    m = m * m;
    m = m * m;
    vec3 x = 2.0 * fract(p * C.www) - 1.0;
    vec3 h = abs(x) - 0.5;
    vec3 ox = floor(x + 0.5);
    vec3 a0 = x - ox;
    m = m * (1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h));
    vec3 g = vec3(a0.x * x0.x + h.x * x0.y,
                  a0.y * x12.x + h.y * x12.y,
                  a0.z * x12.z + h.z * x12.w);
    return 130.0 * dot(m, g);
}

void main() {
    // wgpu rasterises with a top-left origin; the pattern is authored bottom-left.
    vec2 fragCoord = vec2(gl_FragCoord.x, params.u_resolution.y - gl_FragCoord.y);
    vec2 rawUv = fragCoord / params.u_resolution;
    vec2 uv = vec2(rawUv.x * (params.u_resolution.x / params.u_resolution.y), rawUv.y);

    float t = params.u_time * 0.15;

    float n1 = snoise(vec2(uv.x * 1.5 + t * 0.3, uv.y * 2.0 + t * 0.5)) * 0.5;
    float n2 = snoise(vec2(uv.x * 3.0 - t * 0.4, uv.y * 1.5 + t * 0.3)) * 0.25;
    float n3 = snoise(vec2(uv.x * 5.0 + t * 0.2, uv.y * 4.0 - t * 0.6)) * 0.125;
    float n4 = snoise(vec2(uv.x * 0.8 + t * 0.1, uv.y * 0.6 - t * 0.2)) * 0.6;
    float noise = n1 + n2 + n3 + n4;

    float fold = clamp(sin(noise * 6.28318 + uv.y * 4.0 + t) * 0.5 + 0.5, 0.0, 1.0);
    fold = pow(fold, 1.5);

    vec3 darkBase = vec3(0.02, 0.01, 0.06);
    vec3 deepIndigo = vec3(0.12, 0.08, 0.28);
    vec3 accentPurple = vec3(0.30, 0.18, 0.55);
    vec3 highlight = vec3(0.39, 0.40, 0.95);

    vec3 color = mix(darkBase, deepIndigo, fold * 0.7);
    color = mix(color, accentPurple, pow(fold, 2.5) * 0.4);
    color = mix(color, highlight, pow(fold, 5.0) * 0.2);

    float sheen = pow(fold, 8.0) * 0.15;
    color = color + vec3(sheen);

    float vignette = 1.0 - smoothstep(0.3, 1.2, length(rawUv - vec2(0.5)) * 1.4);
    color = color * vignette;
    color = color * 0.65;

    outColor = vec4(color, 1.0);
}
";

/// Scales the backing store onto the swapchain.
pub(crate) const BLIT_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = vec2(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

pub(crate) const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D backing_texture;
layout(set = 0, binding = 1) uniform sampler backing_sampler;

void main() {
    outColor = vec4(texture(sampler2D(backing_texture, backing_sampler), v_uv).rgb, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga;

    fn validate(source: &str, stage: naga::ShaderStage) {
        let mut frontend = naga::front::glsl::Frontend::default();
        let module = frontend
            .parse(&naga::front::glsl::Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} stage failed to parse: {err:?}"));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap_or_else(|err| panic!("{stage:?} stage failed validation: {err:?}"));
    }

    #[test]
    fn silk_program_sources_compile() {
        validate(VERTEX_SHADER_GLSL, naga::ShaderStage::Vertex);
        validate(FRAGMENT_SHADER_GLSL, naga::ShaderStage::Fragment);
    }

    #[test]
    fn blit_sources_compile() {
        validate(BLIT_VERTEX_GLSL, naga::ShaderStage::Vertex);
        validate(BLIT_FRAGMENT_GLSL, naga::ShaderStage::Fragment);
    }

    #[test]
    fn fragment_shader_carries_the_shading_constants() {
        for needle in [
            "u_time * 0.15",
            "fold * 0.7",
            "pow(fold, 2.5) * 0.4",
            "pow(fold, 5.0) * 0.2",
            "pow(fold, 8.0) * 0.15",
            "smoothstep(0.3, 1.2",
            "color * 0.65",
        ] {
            assert!(FRAGMENT_SHADER_GLSL.contains(needle), "missing `{needle}`");
        }
    }
}
