use std::sync::Arc;

use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{
    config::ExtractionConfig,
    error::Result,
    extract::{extract, extract_par},
    mesh::MeshBuffers,
    types::ScalarField,
};

/// A scalar field that can be shared with async compute tasks.
pub type SharedField = Arc<dyn ScalarField + Send + Sync>;

/// An entity whose mesh is the zero level set of `field`.
///
/// Adding the component, or changing it (e.g. swapping in a field with moved metaballs),
/// queues a regeneration. The resulting mesh is inserted as a [`Mesh3d`] on the same entity.
#[derive(Component, Clone)]
#[require(Transform)]
pub struct Isosurface {
    pub field: SharedField,
    pub config: ExtractionConfig,
}

impl Isosurface {
    pub fn new(field: impl ScalarField + Send + Sync + 'static) -> Self {
        Self {
            field: Arc::new(field),
            config: ExtractionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }
}

/// System sets for the marching cubes pipeline.
///
/// Use these to order your own systems relative to mesh generation:
///
/// ```rust,ignore
/// // Run after geometry is ready but before it's uploaded, e.g. for collider generation:
/// app.add_systems(Update, build_collider.after(MarchingCubesSet::Generate)
///                                       .before(MarchingCubesSet::Upload));
/// ```
///
/// ```text
/// MarchingCubesSet::Spawn   →  [async compute]  →  MarchingCubesSet::Generate  →  [your systems]  →  MarchingCubesSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarchingCubesSet {
    /// Spawns an async compute task for each queued surface.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedMesh`] on completion.
    Generate,
    /// Uploads [`GeneratedMesh`] data into a Bevy [`Mesh3d`] and removes [`GeneratedMesh`].
    Upload,
}

/// Marker component added to [`Isosurface`] entities that are waiting to be extracted.
///
/// Removed once the extraction task has been spawned, so a change made while a task is
/// in flight queues another pass.
#[derive(Component)]
pub struct QueuedSurface;

/// Holds the in-flight async compute task for an [`Isosurface`].
#[derive(Component)]
pub struct ComputeTask(Task<Result<MeshBuffers>>);

/// Mesh buffers produced by the last finished task, waiting for upload.
#[derive(Component, Clone, Deref)]
pub struct GeneratedMesh(pub MeshBuffers);

/// Runtime configuration for the marching cubes pipeline.
///
/// Inserted as a resource by [`MarchingCubesPlugin`]. Modify it at any time to change behaviour.
#[derive(Resource)]
pub struct MarchingCubesConfig {
    /// Maximum number of async mesh tasks spawned per frame. Default: `4`.
    pub max_tasks_per_frame: usize,
    /// Run each extraction with [`extract_par`] instead of [`extract`]. Default: `true`.
    pub parallel: bool,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
            parallel: true,
        }
    }
}

/// Bevy plugin that keeps the mesh of every [`Isosurface`] up to date.
///
/// Extraction runs on Bevy's `AsyncComputeTaskPool` so the main thread is never blocked:
///
/// ```text
/// Isosurface added or changed
///   → QueuedSurface inserted        (queue_changed_surfaces)
///   → ComputeTask spawned           (MarchingCubesSet::Spawn)
///   → [async compute runs]
///   → GeneratedMesh inserted        (MarchingCubesSet::Generate, once task completes)
///   → [your collider systems here]
///   → Mesh3d inserted               (MarchingCubesSet::Upload)
/// ```
pub struct MarchingCubesPlugin {
    /// Initial value for [`MarchingCubesConfig::max_tasks_per_frame`].
    pub max_tasks_per_frame: usize,
    /// Initial value for [`MarchingCubesConfig::parallel`].
    pub parallel: bool,
}

impl Default for MarchingCubesPlugin {
    fn default() -> Self {
        let config = MarchingCubesConfig::default();
        Self {
            max_tasks_per_frame: config.max_tasks_per_frame,
            parallel: config.parallel,
        }
    }
}

impl Plugin for MarchingCubesPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MarchingCubesConfig {
            max_tasks_per_frame: self.max_tasks_per_frame,
            parallel: self.parallel,
        })
        .configure_sets(
            Update,
            (
                MarchingCubesSet::Spawn,
                MarchingCubesSet::Generate,
                MarchingCubesSet::Upload,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                queue_changed_surfaces.before(MarchingCubesSet::Spawn),
                spawn_mesh_tasks.in_set(MarchingCubesSet::Spawn),
                poll_mesh_tasks.in_set(MarchingCubesSet::Generate),
                upload_mesh.in_set(MarchingCubesSet::Upload),
            ),
        );
    }
}

/// Inserts [`QueuedSurface`] on every added or changed [`Isosurface`].
fn queue_changed_surfaces(
    mut commands: Commands,
    query: Query<Entity, (Changed<Isosurface>, Without<QueuedSurface>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert(QueuedSurface);
    }
}

/// Spawns async compute tasks for [`QueuedSurface`]s, up to [`MarchingCubesConfig::max_tasks_per_frame`] per frame.
fn spawn_mesh_tasks(
    mut commands: Commands,
    config: Res<MarchingCubesConfig>,
    query: Query<(Entity, &Isosurface), (With<QueuedSurface>, Without<ComputeTask>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, surface) in query.iter().take(config.max_tasks_per_frame) {
        let field = Arc::clone(&surface.field);
        let extraction = surface.config;
        let parallel = config.parallel;

        let task = task_pool.spawn(async move {
            if parallel {
                extract_par(&*field, &extraction)
            } else {
                extract(&*field, &extraction)
            }
        });

        commands
            .entity(entity)
            .insert(ComputeTask(task))
            .remove::<QueuedSurface>();
    }
}

/// Polls in-flight [`ComputeTask`]s each frame and inserts [`GeneratedMesh`] on completion.
///
/// Non-blocking: tasks that haven't finished are skipped and retried next frame.
/// A failed extraction is logged and the previous mesh stays in place.
fn poll_mesh_tasks(mut commands: Commands, mut query: Query<(Entity, &mut ComputeTask)>) {
    for (entity, mut compute_task) in query.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut compute_task.0)) else {
            continue;
        };
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<ComputeTask>();
        match result {
            Ok(buffers) => {
                entity_commands.insert(GeneratedMesh(buffers));
            }
            Err(err) => error!("isosurface extraction failed for {entity}: {err}"),
        }
    }
}

/// Uploads a [`GeneratedMesh`] into a Bevy [`Mesh3d`], then removes [`GeneratedMesh`].
fn upload_mesh(
    mut commands: Commands,
    mut query: Query<(Entity, &mut GeneratedMesh)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, mut generated) in query.iter_mut() {
        // The component is removed below, so its buffers can be moved out.
        let bevy_mesh = Mesh::from(std::mem::take(&mut generated.0));

        commands
            .entity(entity)
            .insert(Mesh3d(meshes.add(bevy_mesh)))
            .remove::<GeneratedMesh>();
    }
}

impl From<MeshBuffers> for Mesh {
    /// Builds a triangle-list mesh; the three buffers are moved in without copies.
    fn from(buffers: MeshBuffers) -> Self {
        let MeshBuffers {
            vertices,
            normals,
            indices,
        } = buffers;

        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vertices)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_indices(Indices::U32(indices))
    }
}
