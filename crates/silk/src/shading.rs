//! CPU evaluation of the silk pattern.
//!
//! Every function here mirrors a line of [`FRAGMENT_SHADER_GLSL`] in `f32`
//! arithmetic: same constants, same blend order. The GPU program and this module
//! must stay in lockstep so still exports and parity snapshots match what the
//! swapchain shows.
//!
//! [`FRAGMENT_SHADER_GLSL`]: crate::shaders::FRAGMENT_SHADER_GLSL

/// Near-black with a purple tint.
pub const DARK_BASE: [f32; 3] = [0.02, 0.01, 0.06];
/// Deep indigo.
pub const DEEP_INDIGO: [f32; 3] = [0.12, 0.08, 0.28];
/// Medium purple.
pub const ACCENT_PURPLE: [f32; 3] = [0.30, 0.18, 0.55];
/// Bright indigo (`#6366f1`).
pub const HIGHLIGHT: [f32; 3] = [0.39, 0.40, 0.95];

/// Scale applied to elapsed seconds before it drives the pattern.
pub const TIME_SCALE: f32 = 0.15;
/// Final multiplier that keeps the background dark enough for foreground text.
pub const BRIGHTNESS: f32 = 0.65;

/// `(freq_x, freq_y, phase_x, phase_y, weight)` per noise octave; phases are
/// multiplied by the scaled time.
const LAYERS: [[f32; 5]; 4] = [
    [1.5, 2.0, 0.3, 0.5, 0.5],
    [3.0, 1.5, -0.4, 0.3, 0.25],
    [5.0, 4.0, 0.2, -0.6, 0.125],
    [0.8, 0.6, 0.1, -0.2, 0.6],
];

const SIMPLEX_C: [f32; 4] = [
    0.211_324_87,
    0.366_025_42,
    -0.577_350_26,
    0.024_390_243,
];

/// Shades a pixel given its fragment coordinate (bottom-left origin, pixel
/// centres at `.5`) and the backing-store resolution.
pub fn shade(frag_coord: [f32; 2], resolution: [f32; 2], time: f32) -> [f32; 3] {
    let width = resolution[0].max(1.0);
    let height = resolution[1].max(1.0);
    shade_uv([frag_coord[0] / width, frag_coord[1] / height], [width, height], time)
}

/// Shades a normalised surface coordinate `uv ∈ [0,1]²`.
pub fn shade_uv(uv: [f32; 2], resolution: [f32; 2], time: f32) -> [f32; 3] {
    let aspect = resolution[0].max(1.0) / resolution[1].max(1.0);
    let x = uv[0] * aspect;
    let y = uv[1];

    let t = time * TIME_SCALE;
    let noise = layered_noise(x, y, t);
    let fold = fold(noise, y, t);

    let mut color = mix3(DARK_BASE, DEEP_INDIGO, fold * 0.7);
    color = mix3(color, ACCENT_PURPLE, fold.powf(2.5) * 0.4);
    color = mix3(color, HIGHLIGHT, fold.powf(5.0) * 0.2);

    let sheen = fold.powf(8.0) * 0.15;
    let vignette = vignette(uv);
    color.map(|channel| (channel + sheen) * vignette * BRIGHTNESS)
}

/// Sum of the four weighted noise octaves at an aspect-corrected coordinate.
pub fn layered_noise(x: f32, y: f32, scaled_time: f32) -> f32 {
    LAYERS
        .iter()
        .map(|&[fx, fy, px, py, weight]| {
            snoise([x * fx + scaled_time * px, y * fy + scaled_time * py]) * weight
        })
        .sum()
}

/// Interference intensity used as the palette blend weight.
pub fn fold(noise: f32, y: f32, scaled_time: f32) -> f32 {
    let wave = (noise * 6.28318 + y * 4.0 + scaled_time).sin() * 0.5 + 0.5;
    wave.clamp(0.0, 1.0).powf(1.5)
}

/// Radial darkening computed on the raw (not aspect-corrected) coordinate.
pub fn vignette(uv: [f32; 2]) -> f32 {
    let dx = uv[0] - 0.5;
    let dy = uv[1] - 0.5;
    let distance = (dx * dx + dy * dy).sqrt();
    1.0 - smoothstep(0.3, 1.2, distance * 1.4)
}

/// 2D simplex noise in roughly `[-1, 1]`.
pub fn snoise(v: [f32; 2]) -> f32 {
    let [cx, cy, cz, cw] = SIMPLEX_C;

    let skew = dot2(v, [cy, cy]);
    let mut i = [(v[0] + skew).floor(), (v[1] + skew).floor()];
    let unskew = dot2(i, [cx, cx]);
    let x0 = [v[0] - i[0] + unskew, v[1] - i[1] + unskew];

    let i1 = if x0[0] > x0[1] { [1.0, 0.0] } else { [0.0, 1.0] };
    let x12 = [x0[0] + cx - i1[0], x0[1] + cx - i1[1], x0[0] + cz, x0[1] + cz];

    i = i.map(mod289);
    let inner = permute3([i[1], i[1] + i1[1], i[1] + 1.0]);
    let p = permute3([
        inner[0] + i[0],
        inner[1] + i[0] + i1[0],
        inner[2] + i[0] + 1.0,
    ]);

    let mut m = [
        dot2(x0, x0),
        dot2([x12[0], x12[1]], [x12[0], x12[1]]),
        dot2([x12[2], x12[3]], [x12[2], x12[3]]),
    ]
    .map(|d| (0.5 - d).max(0.0));
    m = m.map(|value| value * value);
    m = m.map(|value| value * value);

    let x = p.map(|value| 2.0 * fract(value * cw) - 1.0);
    let h = x.map(|value| value.abs() - 0.5);
    let ox = x.map(|value| (value + 0.5).floor());
    let a0 = [x[0] - ox[0], x[1] - ox[1], x[2] - ox[2]];

    for ((weight, a), h) in m.iter_mut().zip(a0).zip(h) {
        *weight *= 1.792_842_9 - 0.853_734_7 * (a * a + h * h);
    }

    let g = [
        a0[0] * x0[0] + h[0] * x0[1],
        a0[1] * x12[0] + h[1] * x12[1],
        a0[2] * x12[2] + h[2] * x12[3],
    ];
    130.0 * (m[0] * g[0] + m[1] * g[1] + m[2] * g[2])
}

fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute3(x: [f32; 3]) -> [f32; 3] {
    x.map(|value| mod289((value * 34.0 + 1.0) * value))
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn dot2(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
