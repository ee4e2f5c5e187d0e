//! Operation handlers.
//!
//! Each handler validates its own parameters and translates them into one
//! call on the editor collaborator. Handlers never touch router or listener
//! state.

use serde_json::{Map, Value, json};

use super::actor_class::ActorClassTable;
use crate::editor::{EditorControl, Rotator, Vector3};
use crate::error::BridgeError;

/// Parameter object of a command envelope.
pub type Params = Map<String, Value>;

/// What a handler produces: optional data on success.
pub type HandlerResult = Result<Option<Value>, BridgeError>;

/// Borrowed state a handler may read.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Editor collaborator.
    pub editor: &'a dyn EditorControl,
    /// Classes `CreateActor` may spawn.
    pub actor_classes: &'a ActorClassTable,
}

/// Uniform handler signature stored in the router table.
pub type Handler = fn(&HandlerContext<'_>, Option<&Params>) -> HandlerResult;

/// `GetProjectInfo`: project, engine and world names.
///
/// Never fails: with no editor the data object is empty, with no world it
/// lacks `worldName`.
///
/// # Errors
///
/// None; the `Result` only satisfies [`Handler`].
pub fn get_project_info(ctx: &HandlerContext<'_>, _params: Option<&Params>) -> HandlerResult {
    let mut data = Map::new();
    if let Some(info) = ctx.editor.project_info() {
        data.insert("projectName".to_string(), Value::String(info.name));
        data.insert(
            "engineVersion".to_string(),
            Value::String(info.engine_version),
        );
        if let Some(world) = info.world_name {
            data.insert("worldName".to_string(), Value::String(world));
        }
    }
    Ok(Some(Value::Object(data)))
}

/// `CreateActor`: spawns `params.className` at `params.location`, oriented
/// by `params.rotation`. Both default to zero.
///
/// # Errors
///
/// - [`BridgeError::MissingParam`] when `className` is absent.
/// - [`BridgeError::EditorUnavailable`] when no editor session is active.
/// - [`BridgeError::SpawnFailed`] when the class does not resolve or the
///   editor refuses the spawn.
pub fn create_actor(ctx: &HandlerContext<'_>, params: Option<&Params>) -> HandlerResult {
    let class_name = string_param(params, "className")?;
    let location = params
        .and_then(|p| p.get("location"))
        .map(parse_location)
        .unwrap_or_default();
    let rotation = params
        .and_then(|p| p.get("rotation"))
        .map(parse_rotation)
        .unwrap_or_default();

    if !ctx.editor.is_available() {
        return Err(BridgeError::EditorUnavailable);
    }

    let Some(engine_class) = ctx.actor_classes.resolve(class_name) else {
        tracing::warn!(class = class_name, "actor class not in allowlist");
        return Err(BridgeError::SpawnFailed);
    };

    let actor = ctx
        .editor
        .spawn_actor(engine_class, location, rotation)
        .ok_or(BridgeError::SpawnFailed)?;

    tracing::info!(actor = %actor.name, class = %actor.class_name, "actor created");
    Ok(Some(json!({
        "actorId": actor.name,
        "actorClass": actor.class_name,
    })))
}

/// `GetActors`: every actor in the level, optionally filtered by
/// `params.className`.
///
/// # Errors
///
/// None; an unavailable editor yields an empty list.
pub fn get_actors(ctx: &HandlerContext<'_>, params: Option<&Params>) -> HandlerResult {
    let filter = params
        .and_then(|p| p.get("className"))
        .and_then(Value::as_str);

    let actors: Vec<Value> = ctx
        .editor
        .list_actors()
        .into_iter()
        .filter(|actor| filter.is_none_or(|class| actor.class_name == class))
        .map(|actor| {
            json!({
                "name": actor.name,
                "class": actor.class_name,
                "location": {
                    "x": actor.location.x,
                    "y": actor.location.y,
                    "z": actor.location.z,
                },
                "rotation": {
                    "pitch": actor.rotation.pitch,
                    "yaw": actor.rotation.yaw,
                    "roll": actor.rotation.roll,
                },
            })
        })
        .collect();

    Ok(Some(json!({ "actors": actors })))
}

/// `ConsoleCommand`: forwards `params.command` verbatim.
///
/// # Errors
///
/// - [`BridgeError::MissingParam`] when `command` is absent.
/// - [`BridgeError::EditorUnavailable`] when no editor session is active.
/// - [`BridgeError::OperationFailed`] when the editor rejects the command.
pub fn console_command(ctx: &HandlerContext<'_>, params: Option<&Params>) -> HandlerResult {
    let command = string_param(params, "command")?;
    require_editor(ctx)?;
    if !ctx.editor.execute_console_command(command) {
        return Err(BridgeError::OperationFailed("Console command"));
    }
    tracing::debug!(command, "console command forwarded");
    Ok(None)
}

/// `SaveAll`: saves every dirty package.
///
/// # Errors
///
/// [`BridgeError::EditorUnavailable`] or [`BridgeError::OperationFailed`].
pub fn save_all(ctx: &HandlerContext<'_>, _params: Option<&Params>) -> HandlerResult {
    require_editor(ctx)?;
    if !ctx.editor.save_all() {
        return Err(BridgeError::OperationFailed("Save"));
    }
    Ok(None)
}

/// `BuildLighting`: rebuilds static lighting for the current level.
///
/// # Errors
///
/// [`BridgeError::EditorUnavailable`] or [`BridgeError::OperationFailed`].
pub fn build_lighting(ctx: &HandlerContext<'_>, _params: Option<&Params>) -> HandlerResult {
    require_editor(ctx)?;
    if !ctx.editor.build_lighting() {
        return Err(BridgeError::OperationFailed("Lighting build"));
    }
    Ok(None)
}

/// `Ping`: liveness probe.
///
/// # Errors
///
/// None.
pub fn ping(_ctx: &HandlerContext<'_>, _params: Option<&Params>) -> HandlerResult {
    Ok(Some(json!({ "pong": true })))
}

/// Placeholder for registered but unimplemented operations
/// (`ModifyActor`, `DeleteActor`, `CreateBlueprint`).
///
/// # Errors
///
/// Always [`BridgeError::NotImplemented`].
pub fn not_implemented(_ctx: &HandlerContext<'_>, _params: Option<&Params>) -> HandlerResult {
    Err(BridgeError::NotImplemented)
}

fn require_editor(ctx: &HandlerContext<'_>) -> Result<(), BridgeError> {
    if ctx.editor.is_available() {
        Ok(())
    } else {
        Err(BridgeError::EditorUnavailable)
    }
}

fn string_param<'p>(params: Option<&'p Params>, field: &'static str) -> Result<&'p str, BridgeError> {
    params
        .and_then(|p| p.get(field))
        .and_then(Value::as_str)
        .ok_or(BridgeError::MissingParam(field))
}

/// Reads `{x, y, z}`; any missing or non-numeric axis is 0.
fn parse_location(value: &Value) -> Vector3 {
    let axis = |name: &str| value.get(name).and_then(Value::as_f64).unwrap_or(0.0);
    Vector3::new(axis("x"), axis("y"), axis("z"))
}

/// Reads `{pitch, yaw, roll}`; any missing or non-numeric axis is 0.
fn parse_rotation(value: &Value) -> Rotator {
    let axis = |name: &str| value.get(name).and_then(Value::as_f64).unwrap_or(0.0);
    Rotator::new(axis("pitch"), axis("yaw"), axis("roll"))
}
