//! Editor-control collaborator.
//!
//! The bridge never performs editor work itself. Every operation handler
//! goes through [`EditorControl`], implemented by whatever hosts the editor.
//! [`InMemoryEditor`] is a headless implementation used by the shipped
//! binary and by tests.

pub mod memory;
pub mod types;

pub use memory::{InMemoryEditor, SpawnRecord};
pub use types::{ActorHandle, ActorInfo, ProjectInfo, Rotator, Vector3};

/// Synchronous editor API consumed by the operation handlers.
///
/// Calls are made from whichever runtime worker serves the request, so
/// implementations must be `Send + Sync`. An implementation wrapping a
/// thread-affine editor marshals each call onto the owning thread and
/// blocks until it completes.
pub trait EditorControl: Send + Sync + std::fmt::Debug {
    /// Whether an editor session is active and accepting calls.
    fn is_available(&self) -> bool;

    /// Project identity and the currently open world, if any.
    ///
    /// `None` when no editor session is active.
    fn project_info(&self) -> Option<ProjectInfo>;

    /// Spawns an actor of the given engine class at `location`, oriented by
    /// `rotation`.
    ///
    /// Returns `None` if the class is unknown to the editor or the spawn is
    /// refused.
    fn spawn_actor(
        &self,
        class_name: &str,
        location: Vector3,
        rotation: Rotator,
    ) -> Option<ActorHandle>;

    /// Every actor in the current level, in editor enumeration order.
    fn list_actors(&self) -> Vec<ActorInfo>;

    /// Runs a console command verbatim. Returns `false` if it was rejected.
    fn execute_console_command(&self, command: &str) -> bool;

    /// Saves all dirty packages.
    fn save_all(&self) -> bool;

    /// Rebuilds static lighting for the current level.
    fn build_lighting(&self) -> bool;
}
