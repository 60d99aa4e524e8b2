// Default frame parameters
pub const FRAME_WIDTH: usize = 640;
pub const FRAME_HEIGHT: usize = 480;
pub const OUT_FILE: &'static str = "./out.ppm";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

/// Sentinel distance for rays that hit nothing.
pub const FARAWAY: f64 = f64::INFINITY;

// Shading model parameters
pub const AMBIENT: f64 = 0.05;
pub const SPECULAR: f64 = 0.5;
pub const SHININESS: f64 = 50.0;

/// Offset applied along the surface normal before casting shadow rays,
/// so a surface never occludes itself at the hit point.
pub const SHADOW_BIAS: f64 = 0.0001;

/// Angle of one interactive rotation step, in radians.
pub const ROTATE_STEP: f64 = std::f64::consts::PI / 10.0;

// Brightness factors for the two checkerboard tones
pub const CHECKER_LIGHT: f64 = 1.0;
pub const CHECKER_DARK: f64 = 0.2;
