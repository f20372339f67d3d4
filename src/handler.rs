//! Adapts a request event into a `find_spot` call.
//!
//! An event is either a JSON object or a JSON string holding one:
//!
//! ```json
//! { "mesh": { "nodes": [...], "elements": [...], "values": [...] }, "N": 3 }
//! ```
//!
//! `mesh` may itself be an encoded JSON string. `N` defaults to 1 and a
//! negative `N` yields no spots.

use serde_json::Value as Json;
use tracing::debug;

use crate::finder::{find_spot, ViewSpot};
use crate::mesh::Mesh;
use crate::{Result, ViewSpotError};

const DEFAULT_SPOT_COUNT: usize = 1;

pub fn handle_event(event: Json) -> Result<Vec<ViewSpot>> {
    let body = decode_if_string(event)?;

    let mesh = match body.get("mesh") {
        Some(mesh) if !mesh.is_null() => Mesh::from_json_value(decode_if_string(mesh.clone())?)?,
        _ => return Err(ViewSpotError::InvalidRequest("missing field `mesh`".to_string())),
    };
    let n = spot_count(body.get("N"))?;
    debug!(n, "Handling view spot request");

    find_spot(&mesh, n)
}

/// Same as `handle_event`, with the spots encoded as a JSON array.
pub fn handle_event_json(event: Json) -> Result<Json> {
    let spots = handle_event(event)?;
    Ok(serde_json::to_value(spots)?)
}

fn decode_if_string(json: Json) -> Result<Json> {
    match json {
        Json::String(text) => Ok(serde_json::from_str(&text)?),
        other => Ok(other),
    }
}

fn spot_count(field: Option<&Json>) -> Result<usize> {
    match field {
        None | Some(Json::Null) => Ok(DEFAULT_SPOT_COUNT),
        Some(Json::Number(number)) => {
            if let Some(n) = number.as_u64() {
                Ok(usize::try_from(n).unwrap_or(usize::MAX))
            } else if number.as_i64().is_some() {
                Ok(0)
            } else {
                Err(ViewSpotError::InvalidRequest(format!("`N` must be an integer, got {}", number)))
            }
        }
        Some(other) => Err(ViewSpotError::InvalidRequest(format!("`N` must be an integer, got {}", other))),
    }
}
