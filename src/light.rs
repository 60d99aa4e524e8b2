use crate::batch::Mask;
use crate::consts::{ AMBIENT, SHININESS, SPECULAR };
use crate::vector::{ Rgb, Vec3, Vec3x };

/// A directional light.
///
/// The light sits infinitely far away, so every surface point sees it along
/// the same direction and nothing is ever "between" a point and the light at
/// a finite distance unless some shape blocks the ray outright.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector pointing from any surface point toward the light.
    pub direction: Vec3,
    pub intensity: Rgb,
}

impl DirectionalLight {
    /// Creates a directional light. `direction` is normalized here, so
    /// callers may pass any non-zero vector toward the light.
    pub fn new(direction: Vec3, intensity: Rgb) -> DirectionalLight {
        DirectionalLight { direction: direction.norm(), intensity }
    }
}

impl Default for DirectionalLight {
    fn default() -> DirectionalLight {
        DirectionalLight::new(Vec3::new(5.0, 5.0, -10.0), Rgb::white())
    }
}

/// Calculates Blinn-Phong shading for a batch of surface points.
///
/// Takes the base surface colors, the per-lane normals and eye vectors, and
/// a `lit` mask from the shadow pass. Ambient light is always present;
/// diffuse and specular contributions are gated lane-by-lane so shadowed
/// points receive the ambient term only.
pub fn lighting(
    base: &Vec3x,
    light: &DirectionalLight,
    normal: &Vec3x,
    eyev: &Vec3x,
    lit: &Mask,
) -> Vec3x {
    // Combine surface color with light's color
    let effective = base * light.intensity;

    // Compute ambient light
    let color = &effective * AMBIENT;

    // Lambert diffuse, clipped on the dark side and gated by the shadow mask
    let gate = lit.to_batch();
    let lambert = normal.dot_scalar(light.direction).max(0.0) * &gate;
    let color = color + &effective * &lambert;

    // Blinn-Phong highlight against the half vector between light and eye
    let half = (light.direction + eyev).norm();
    let phong = normal.dot(&half).clamp(0.0, 1.0).powf(SHININESS);

    color + light.intensity * &(phong * gate * SPECULAR)
}

#[test]
fn new_light_normalizes_direction() {
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -5.0), Rgb::white());

    assert_eq!(light.direction, Vec3::new(0.0, 0.0, -1.0));
}

#[test]
fn surface_facing_light_head_on() {
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -1.0), Rgb::white());
    let base = Vec3x::splat(Rgb::white(), 1);
    let normal = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);
    let eyev = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);

    let color = lighting(&base, &light, &normal, &eyev, &Mask::splat(true, 1));

    // Full ambient + diffuse + specular
    let expected = AMBIENT + 1.0 + SPECULAR;
    assert_eq!(color.lane(0), Rgb::new(expected, expected, expected));
}

#[test]
fn shadowed_surface_keeps_ambient_only() {
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -1.0), Rgb::white());
    let base = Vec3x::splat(Rgb::white(), 1);
    let normal = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);
    let eyev = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);

    let color = lighting(&base, &light, &normal, &eyev, &Mask::splat(false, 1));

    assert_eq!(color.lane(0), Rgb::new(AMBIENT, AMBIENT, AMBIENT));
    assert_eq!(color.lane(0).x, AMBIENT);
}

#[test]
fn light_behind_surface_adds_nothing() {
    // Light directly behind the surface: no diffuse, and the half vector
    // degenerates to zero (the guarded norm keeps it there)
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, 1.0), Rgb::white());
    let base = Vec3x::splat(Rgb::white(), 1);
    let normal = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);
    let eyev = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);

    let color = lighting(&base, &light, &normal, &eyev, &Mask::splat(true, 1));

    assert_eq!(color.lane(0), Rgb::new(AMBIENT, AMBIENT, AMBIENT));
}

#[test]
fn lit_lane_strictly_exceeds_shadowed_lane() {
    let light = DirectionalLight::default();
    let base = Vec3x::splat(Rgb::new(0.8, 0.2, 0.4), 2);
    let normal = Vec3x::splat(light.direction, 2);
    let eyev = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 2);
    let lit = Mask::from_vec(vec![true, false]);

    let color = lighting(&base, &light, &normal, &eyev, &lit);

    assert!(color.lane(0).x > color.lane(1).x);
    assert!(color.lane(0).y > color.lane(1).y);
}

#[test]
fn base_color_modulates_diffuse() {
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -1.0), Rgb::white());
    let base = Vec3x::splat(Rgb::red(), 1);
    let normal = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);
    let eyev = Vec3x::splat(Vec3::new(0.0, 0.0, -1.0), 1);

    let color = lighting(&base, &light, &normal, &eyev, &Mask::splat(true, 1));

    // Green/blue channels see the white highlight but no diffuse
    assert_eq!(color.lane(0), Rgb::new(AMBIENT + 1.0 + SPECULAR, SPECULAR, SPECULAR));
}
