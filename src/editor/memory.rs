//! Headless in-process editor.
//!
//! Keeps a single level in memory and records every forwarded console
//! command, save and lighting build so callers can observe what the bridge
//! asked for.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::EditorControl;
use super::types::{ActorHandle, ActorInfo, ProjectInfo, Rotator, Vector3};
use crate::config::{DEFAULT_ACTOR_CLASSES, ServerConfig};

/// Default name of the level opened by [`InMemoryEditor::new`].
pub const DEFAULT_WORLD_NAME: &str = "Untitled";

/// A spawn the editor carried out, as requested.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    /// Engine class spawned.
    pub class_name: String,
    /// Requested location.
    pub location: Vector3,
    /// Requested orientation.
    pub rotation: Rotator,
}

/// In-memory [`EditorControl`] implementation.
#[derive(Debug)]
pub struct InMemoryEditor {
    project_name: String,
    engine_version: String,
    known_classes: HashSet<String>,
    available: AtomicBool,
    state: RwLock<EditorState>,
}

#[derive(Debug, Default)]
struct EditorState {
    world: Option<World>,
    name_counters: HashMap<String, u64>,
    console_history: Vec<String>,
    spawn_log: Vec<SpawnRecord>,
    save_count: u64,
    lighting_builds: u64,
}

#[derive(Debug)]
struct World {
    name: String,
    actors: Vec<ActorInfo>,
}

impl InMemoryEditor {
    /// Creates an available editor with an empty level named
    /// [`DEFAULT_WORLD_NAME`] and the default class registry.
    #[must_use]
    pub fn new(project_name: impl Into<String>, engine_version: impl Into<String>) -> Self {
        let editor = Self {
            project_name: project_name.into(),
            engine_version: engine_version.into(),
            known_classes: DEFAULT_ACTOR_CLASSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            available: AtomicBool::new(true),
            state: RwLock::new(EditorState::default()),
        };
        editor.open_world(DEFAULT_WORLD_NAME);
        editor
    }

    /// Creates an editor with the configured project identity that knows
    /// exactly the configured actor classes.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.project_name.clone(), config.engine_version.clone())
            .with_known_classes(config.actor_classes.iter().cloned())
    }

    /// Replaces the class registry with `classes`.
    #[must_use]
    pub fn with_known_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Opens a fresh, empty level, discarding the current one.
    pub fn open_world(&self, name: impl Into<String>) {
        self.write().world = Some(World {
            name: name.into(),
            actors: Vec::new(),
        });
    }

    /// Closes the current level.
    pub fn close_world(&self) {
        self.write().world = None;
    }

    /// Toggles whether the editor session is active.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Console commands forwarded so far, oldest first.
    #[must_use]
    pub fn console_history(&self) -> Vec<String> {
        self.read().console_history.clone()
    }

    /// Every spawn request that succeeded, oldest first.
    #[must_use]
    pub fn spawn_log(&self) -> Vec<SpawnRecord> {
        self.read().spawn_log.clone()
    }

    /// Number of completed save-all calls.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.read().save_count
    }

    /// Number of completed lighting builds.
    #[must_use]
    pub fn lighting_builds(&self) -> u64 {
        self.read().lighting_builds
    }

    fn read(&self) -> RwLockReadGuard<'_, EditorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EditorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryEditor {
    fn default() -> Self {
        Self::new("HeadlessProject", "5.4.0")
    }
}

impl EditorControl for InMemoryEditor {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn project_info(&self) -> Option<ProjectInfo> {
        if !self.is_available() {
            return None;
        }
        Some(ProjectInfo {
            name: self.project_name.clone(),
            engine_version: self.engine_version.clone(),
            world_name: self.read().world.as_ref().map(|w| w.name.clone()),
        })
    }

    fn spawn_actor(
        &self,
        class_name: &str,
        location: Vector3,
        rotation: Rotator,
    ) -> Option<ActorHandle> {
        if !self.is_available() || !self.known_classes.contains(class_name) {
            return None;
        }

        let mut state = self.write();
        let state = &mut *state;
        let world = state.world.as_mut()?;

        let counter = state.name_counters.entry(class_name.to_string()).or_insert(0);
        let name = format!("{class_name}_{counter}");
        *counter = counter.saturating_add(1);

        world.actors.push(ActorInfo {
            name: name.clone(),
            class_name: class_name.to_string(),
            location,
            rotation,
        });
        state.spawn_log.push(SpawnRecord {
            class_name: class_name.to_string(),
            location,
            rotation,
        });

        Some(ActorHandle {
            name,
            class_name: class_name.to_string(),
        })
    }

    fn list_actors(&self) -> Vec<ActorInfo> {
        if !self.is_available() {
            return Vec::new();
        }
        self.read()
            .world
            .as_ref()
            .map(|w| w.actors.clone())
            .unwrap_or_default()
    }

    fn execute_console_command(&self, command: &str) -> bool {
        if !self.is_available() || command.trim().is_empty() {
            return false;
        }
        self.write().console_history.push(command.to_string());
        true
    }

    fn save_all(&self) -> bool {
        if !self.is_available() {
            return false;
        }
        let mut state = self.write();
        state.save_count = state.save_count.saturating_add(1);
        true
    }

    fn build_lighting(&self) -> bool {
        if !self.is_available() {
            return false;
        }
        let mut state = self.write();
        if state.world.is_none() {
            return false;
        }
        state.lighting_builds = state.lighting_builds.saturating_add(1);
        true
    }
}
