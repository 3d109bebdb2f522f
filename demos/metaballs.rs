use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use metaball_mesher::{
    ExtractionConfig, MarchingCubesPlugin,
    fields::{MetaBall, MetaBalls},
    plugin::Isosurface,
    types::Point,
};

/// Orbit radius, angular speed and size of each animated ball.
const BALLS: [(f32, f32, f32); 4] = [
    (1.6, 0.9, 1.0),
    (1.2, -1.3, 0.8),
    (2.0, 0.6, 0.7),
    (0.8, 1.7, 0.6),
];

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PanOrbitCameraPlugin,
            MarchingCubesPlugin::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, animate)
        .run();
}

fn setup(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera::default(),
        Transform::from_xyz(0.0, 4.0, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    commands.spawn((
        Isosurface::new(metaballs(0.0)).with_config(ExtractionConfig::default()),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.6, 1.0),
            ..Default::default()
        })),
    ));
}

/// Replaces the field every frame; the plugin re-extracts whenever the previous pass is done.
fn animate(time: Res<Time>, mut query: Query<&mut Isosurface>) {
    for mut surface in query.iter_mut() {
        let config = surface.config;
        *surface = Isosurface::new(metaballs(time.elapsed_secs())).with_config(config);
    }
}

fn metaballs(t: f32) -> MetaBalls {
    MetaBalls::new(
        BALLS
            .iter()
            .enumerate()
            .map(|(i, &(orbit, speed, radius))| {
                let phase = t * speed + i as f32;
                let center = Point::new(
                    orbit * phase.cos(),
                    0.6 * (phase * 1.3).sin(),
                    orbit * phase.sin(),
                );
                MetaBall::new(center, radius)
            })
            .collect(),
    )
}
