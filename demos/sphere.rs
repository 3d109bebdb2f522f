use bevy::{
    pbr::wireframe::{Wireframe, WireframeConfig},
    prelude::*,
};
use metaball_mesher::{
    ExtractionConfig, MarchingCubesPlugin, extract, fields::Sphere, plugin::Isosurface,
    types::Point,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            // #[cfg(not(target_arch = "wasm32"))]
            bevy::pbr::wireframe::WireframePlugin::default(),
            MarchingCubesPlugin::default(),
        ))
        .insert_resource(WireframeConfig {
            global: true,
            ..Default::default()
        })
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    bevy::log::info!("Sphere Example");

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(2.5, 2.0, 3.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let sphere = Sphere::new(Point::origin(), 1.0);
    let config = ExtractionConfig::default();

    // Same geometry the plugin will produce, extracted synchronously for the log.
    match extract(&sphere, &config) {
        Ok(mesh) => bevy::log::info!(
            "{} triangles, {} vertices",
            mesh.triangle_count(),
            mesh.vertex_count()
        ),
        Err(err) => bevy::log::error!("extraction failed: {err}"),
    }

    commands.spawn((Isosurface::new(sphere).with_config(config), Wireframe));
}
