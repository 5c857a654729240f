//! Built-in demo scenes.

use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::{bail, Result};
use nalgebra::Complex;
use optica_geom::{Cylinder, Disc, Parallelepiped, Plane, Sphere, Triangle};
use optica_math::{Dir3, Point3, Transform, Vec3};
use optica_raytrace::surface::{
    ComplexMap, EitherOr, Emissive, GlowingCloud, ImagingHologram, Metarefractive, RayRotating, Reflective,
    Refractive, SurfaceColour, SurfaceProperty, Teleporting, ThinLensHologram, Tiling, Transparent,
    WeightedAverage,
};
use optica_raytrace::{
    AmbientLight, Colour, Container, Difference, Intersection, PointLight, Primitive, Scene, SceneBuilder, Union,
};

use crate::camera::CameraConfig;

/// Names and one-line descriptions of the demo scenes.
pub const SCENES: &[(&str, &str)] = &[
    ("mirrors", "a ball between two facing mirrors"),
    ("csg", "boolean solids: a bitten cube, a glass lens and a pillar"),
    ("lens", "ideal thin lens, imaging hologram and a glass marble"),
    ("teleport", "a pair of portals"),
    ("rotation", "ray-rotating and complex-map metarefractive windows"),
    ("cloud", "a glowing cloud and a tinted transparent sheet"),
];

/// A validated scene and the camera it is meant to be seen from.
#[derive(Debug)]
pub struct DemoScene {
    /// The scene.
    pub scene: Scene,
    /// Default camera.
    pub camera: CameraConfig,
}

/// Build the demo scene called `name`, optionally overriding its background.
pub fn build(name: &str, background: Option<Colour>) -> Result<DemoScene> {
    let (builder, camera) = match name {
        "mirrors" => mirrors(),
        "csg" => csg(),
        "lens" => lens(),
        "teleport" => teleport(),
        "rotation" => rotation(),
        "cloud" => cloud(),
        _ => {
            let known: Vec<&str> = SCENES.iter().map(|(n, _)| *n).collect();
            bail!("unknown scene '{name}' (available: {})", known.join(", "));
        }
    };
    let builder = match background {
        Some(c) => builder.background(c),
        None => builder,
    };
    Ok(DemoScene {
        scene: builder.build()?,
        camera,
    })
}

// =============================================================================
// Shared pieces
// =============================================================================

fn shared(property: impl SurfaceProperty + 'static) -> Arc<dyn SurfaceProperty> {
    Arc::new(property)
}

fn checkerboard(a: Colour, b: Colour, period: f64) -> Arc<dyn SurfaceProperty> {
    shared(Tiling::new(
        shared(SurfaceColour::matte(a)),
        shared(SurfaceColour::matte(b)),
        period,
        period,
    ))
}

fn floor(property: Arc<dyn SurfaceProperty>) -> Primitive {
    Primitive::new("floor", Plane::from_normal(Point3::new(0.0, -1.0, 0.0), Vec3::y()), property)
}

fn back_wall(z: f64) -> Primitive {
    Primitive::new(
        "wall",
        Plane::from_normal(Point3::new(0.0, 0.0, z), -Vec3::z()),
        checkerboard(Colour::new(0.9, 0.9, 0.85), Colour::new(0.2, 0.25, 0.4), 0.5),
    )
}

fn lit(builder: SceneBuilder) -> SceneBuilder {
    builder
        .add_light(AmbientLight::new(Colour::grey(0.2)))
        .add_light(PointLight::new(Point3::new(4.0, 6.0, -5.0), Colour::grey(0.8)))
}

// =============================================================================
// Scenes
// =============================================================================

fn mirrors() -> (SceneBuilder, CameraConfig) {
    let mirror = shared(Reflective::new(0.9));
    let builder = SceneBuilder::new("mirrors")
        .add_scene_object(floor(checkerboard(Colour::WHITE, Colour::grey(0.3), 1.0)))
        .add_scene_object(Primitive::new(
            "left mirror",
            Plane::from_normal(Point3::new(-3.0, 0.0, 0.0), Vec3::x()),
            mirror.clone(),
        ))
        .add_scene_object(Primitive::new(
            "right mirror",
            Plane::from_normal(Point3::new(3.0, 0.0, 0.0), -Vec3::x()),
            mirror,
        ))
        .add_scene_object(Primitive::new(
            "ball",
            Sphere::with_center(Point3::new(0.0, 0.0, 3.0), 1.0),
            shared(SurfaceColour::shiny(Colour::new(0.8, 0.1, 0.1), Colour::grey(0.6), 40.0)),
        ))
        .background(Colour::new(0.05, 0.05, 0.15));
    (lit(builder), CameraConfig::looking_at([1.0, 0.5, -4.0], [-1.0, 0.0, 3.0]))
}

fn csg() -> (SceneBuilder, CameraConfig) {
    let red = shared(SurfaceColour::shiny(Colour::new(0.8, 0.15, 0.1), Colour::grey(0.5), 30.0));
    let center = Point3::new(-1.8, 0.0, 3.0);
    let tilt = Transform::rotation_about_line(&center, &Dir3::new_normalize(Vec3::y()), PI / 6.0);
    let bitten_cube = Difference::new("bitten cube")
        .with_positive(Primitive::new("cube", Parallelepiped::cuboid(center, Vec3::new(2.0, 2.0, 2.0)), red.clone()))
        .with_negative(Primitive::new("bite", Sphere::with_center(center, 1.3), red))
        .transform(&tilt);

    let glass = shared(Refractive::new(1.5).with_fresnel());
    let lens = Intersection::new("lens")
        .with_positive(Primitive::new("front", Sphere::with_center(Point3::new(0.6, 0.0, 2.5), 1.0), glass.clone()))
        .with_positive(Primitive::new("back", Sphere::with_center(Point3::new(0.6, 0.0, 3.5), 1.0), glass))
        .with_invisible_negative(Primitive::new(
            "bore",
            Cylinder::new(Point3::new(0.6, -0.1, 1.0), Point3::new(0.6, 0.1, 5.0), 0.15),
            shared(Emissive::new(Colour::BLACK)),
        ));

    let stone = shared(SurfaceColour::matte(Colour::new(0.6, 0.6, 0.5)));
    let pillar = Union::new("pillar")
        .with(Primitive::new(
            "shaft",
            Cylinder::new(Point3::new(2.5, -1.0, 3.0), Point3::new(2.5, 0.5, 3.0), 0.4),
            stone.clone(),
        ))
        .with(Primitive::new("knob", Sphere::with_center(Point3::new(2.5, 0.7, 3.0), 0.5), stone));

    let polished = shared(WeightedAverage::new(
        checkerboard(Colour::WHITE, Colour::grey(0.2), 1.0),
        shared(Reflective::perfect()),
        0.8,
    ));
    let builder = SceneBuilder::new("csg")
        .add_scene_object(floor(polished))
        .add_scene_object(bitten_cube)
        .add_scene_object(lens)
        .add_scene_object(pillar)
        .background(Colour::new(0.4, 0.55, 0.8));
    (lit(builder), CameraConfig::looking_at([0.0, 2.0, -5.0], [0.0, 0.0, 3.0]))
}

fn lens() -> (SceneBuilder, CameraConfig) {
    let window = |name: &str, x: f64, property: Arc<dyn SurfaceProperty>| {
        Primitive::new(name, Disc::new(Point3::new(x, 0.0, 2.0), -Vec3::z(), 1.0), property)
    };
    let builder = SceneBuilder::new("lens")
        .add_scene_object(back_wall(8.0))
        .add_scene_object(floor(checkerboard(Colour::grey(0.8), Colour::grey(0.4), 1.0)))
        .add_scene_object(window(
            "thin lens",
            -1.2,
            shared(ThinLensHologram::new(Point3::new(-1.2, 0.0, 2.0), Vec3::z(), 3.0)),
        ))
        .add_scene_object(window(
            "hologram",
            1.2,
            shared(ImagingHologram::new(Point3::new(1.2, 0.0, -2.0), Point3::new(1.7, 0.3, 8.0))),
        ))
        .add_scene_object(Primitive::new(
            "marble",
            Sphere::with_center(Point3::new(0.0, -0.6, 1.0), 0.4),
            shared(Refractive::new(1.5).with_partial_reflection(0.9, 0.1)),
        ));
    (lit(builder), CameraConfig::looking_at([0.0, 0.3, -3.0], [0.0, 0.0, 2.0]))
}

fn teleport() -> (SceneBuilder, CameraConfig) {
    let rim = shared(SurfaceColour::matte(Colour::new(0.9, 0.6, 0.1)));
    let ring = |name: &str, x: f64| {
        Difference::new(name)
            .with_positive(Primitive::new(
                format!("{name} outer"),
                Cylinder::new(Point3::new(x, 0.0, 1.95), Point3::new(x, 0.0, 2.05), 0.95),
                rim.clone(),
            ))
            .with_negative(Primitive::new(
                format!("{name} inner"),
                Cylinder::new(Point3::new(x, 0.0, 1.9), Point3::new(x, 0.0, 2.1), 0.8),
                rim.clone(),
            ))
    };
    let portals = Container::new("portals")
        .with(Primitive::new(
            "entrance",
            Disc::new(Point3::new(-1.5, 0.0, 2.0), -Vec3::z(), 0.8),
            shared(Teleporting::new("exit")),
        ))
        .with(Primitive::new(
            "exit",
            Disc::new(Point3::new(1.5, 0.0, 2.0), -Vec3::z(), 0.8),
            shared(Teleporting::new("entrance")),
        ))
        .with(ring("entrance rim", -1.5))
        .with(ring("exit rim", 1.5));
    let builder = SceneBuilder::new("teleport")
        .add_scene_object(floor(checkerboard(Colour::WHITE, Colour::grey(0.3), 1.0)))
        .add_scene_object(back_wall(9.0))
        .add_scene_object(portals)
        .add_scene_object(Primitive::new(
            "beacon",
            Sphere::with_center(Point3::new(1.5, 0.0, 5.0), 0.5),
            shared(Emissive::new(Colour::new(0.2, 1.0, 0.3))),
        ));
    (lit(builder), CameraConfig::looking_at([0.0, 0.5, -3.0], [0.0, 0.0, 2.0]))
}

fn rotation() -> (SceneBuilder, CameraConfig) {
    let window = |name: &str, x: f64, property: Arc<dyn SurfaceProperty>| {
        Primitive::new(name, Disc::new(Point3::new(x, 0.0, 2.0), -Vec3::z(), 0.9), property)
    };
    let builder = SceneBuilder::new("rotation")
        .add_scene_object(back_wall(6.0))
        .add_scene_object(window("rotator", -2.0, shared(RayRotating::new(PI / 6.0))))
        .add_scene_object(window(
            "multiplier",
            0.0,
            shared(Metarefractive::new(ComplexMap::Multiplication(Complex::from_polar(0.8, 0.4)))),
        ))
        .add_scene_object(window(
            "squarer",
            2.0,
            shared(EitherOr::new(
                shared(Metarefractive::new(ComplexMap::Exponentiation(2.0))),
                shared(Transparent::new(Colour::grey(0.9))),
                (0.0, 0.7),
                (0.0, 2.0 * PI),
            )),
        ));
    (lit(builder), CameraConfig::looking_at([0.0, 0.0, -4.0], [0.0, 0.0, 2.0]))
}

fn cloud() -> (SceneBuilder, CameraConfig) {
    let builder = SceneBuilder::new("cloud")
        .add_scene_object(back_wall(7.0))
        .add_scene_object(floor(checkerboard(Colour::WHITE, Colour::grey(0.3), 1.0)))
        .add_scene_object(Primitive::new(
            "cloud",
            Sphere::with_center(Point3::new(-0.8, 0.3, 3.0), 1.2),
            shared(GlowingCloud::new(Colour::new(1.0, 0.7, 0.4), 0.8)),
        ))
        .add_scene_object(Primitive::new(
            "sheet",
            Triangle::new(
                Point3::new(0.5, -1.0, 1.5),
                Point3::new(2.5, -1.0, 2.5),
                Point3::new(1.5, 1.5, 2.0),
            ),
            shared(Transparent::new(Colour::new(0.4, 0.9, 0.9))),
        ));
    (lit(builder), CameraConfig::looking_at([0.0, 0.5, -3.0], [0.0, 0.0, 3.0]))
}
