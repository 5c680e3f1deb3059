//! Query string validation.
//!
//! Raw parameters are first coerced into typed values, then every check in
//! [`CHECKS`] runs against the coerced form. All violations are collected so
//! a client sees every problem with its request at once.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::catalog::{MapCatalog, MapEntry};
use crate::error::ValidationError;
use crate::geometry::CANVAS_SIZE;
use crate::models::{BarColor, Faction, FactionCapture, RenderRequest};

const SIZE_RANGE: RangeInclusive<i64> = 1..=CANVAS_SIZE as i64;
const CAPS_RANGE: RangeInclusive<i64> = 1..=5;

struct FactionParams {
    faction: Faction,
    caps_field: &'static str,
    color_field: &'static str,
    caps_given: bool,
    color_given: bool,
    caps: Option<i64>,
    color: Option<BarColor>,
}

/// Typed view of the query; a field that failed coercion is `None`.
struct Coerced<'a> {
    map_id: Option<&'a str>,
    map: Option<Arc<MapEntry>>,
    strongpoints: Vec<&'a str>,
    width: Option<i64>,
    height: Option<i64>,
    axis: FactionParams,
    allies: FactionParams,
}

type Check = fn(&Coerced, &MapCatalog, &mut Vec<ValidationError>);

const CHECKS: &[Check] = &[
    check_map,
    check_strongpoints,
    check_size,
    check_caps,
    check_pairing,
];

pub fn validate(
    catalog: &MapCatalog,
    params: &HashMap<String, String>,
) -> Result<RenderRequest, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let query = coerce(catalog, params, &mut errors);

    for check in CHECKS {
        check(&query, catalog, &mut errors);
    }

    match query.map {
        Some(map) if errors.is_empty() => Ok(RenderRequest {
            map,
            strongpoints: query.strongpoints.iter().map(|s| s.to_string()).collect(),
            width: query.width.and_then(|v| u32::try_from(v).ok()),
            height: query.height.and_then(|v| u32::try_from(v).ok()),
            axis: capture(&query.axis),
            allies: capture(&query.allies),
        }),
        _ => Err(errors),
    }
}

fn capture(params: &FactionParams) -> Option<FactionCapture> {
    let caps = u32::try_from(params.caps?).ok()?;
    Some(FactionCapture {
        caps,
        color: params.color?,
    })
}

/// A parameter's trimmed value; blank counts as absent.
fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn coerce<'a>(
    catalog: &MapCatalog,
    params: &'a HashMap<String, String>,
    errors: &mut Vec<ValidationError>,
) -> Coerced<'a> {
    let map_id = param(params, "map");
    let strongpoints: Vec<&str> = param(params, "strongpoints")
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Coerced {
        map_id,
        map: map_id.and_then(|id| catalog.lookup(id)),
        strongpoints,
        width: coerce_int(params, "width", errors),
        height: coerce_int(params, "height", errors),
        axis: coerce_faction(params, Faction::Axis, "axisCaps", "axisColor", errors),
        allies: coerce_faction(params, Faction::Allies, "alliesCaps", "alliesColor", errors),
    }
}

fn coerce_int(
    params: &HashMap<String, String>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    let raw = param(params, field)?;
    match raw.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(ValidationError::new(field, format!("{} must be an integer, got '{}'", field, raw)));
            None
        }
    }
}

fn coerce_color(
    params: &HashMap<String, String>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<BarColor> {
    let raw = param(params, field)?;
    match raw.parse::<BarColor>() {
        Ok(color) => Some(color),
        Err(()) => {
            let valid: Vec<&str> = BarColor::ALL.iter().map(|c| c.as_str()).collect();
            errors.push(ValidationError::new(
                field,
                format!("{} must be one of: {}, got '{}'", field, valid.join(", "), raw),
            ));
            None
        }
    }
}

fn coerce_faction(
    params: &HashMap<String, String>,
    faction: Faction,
    caps_field: &'static str,
    color_field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> FactionParams {
    FactionParams {
        faction,
        caps_field,
        color_field,
        caps_given: param(params, caps_field).is_some(),
        color_given: param(params, color_field).is_some(),
        caps: coerce_int(params, caps_field, errors),
        color: coerce_color(params, color_field, errors),
    }
}

fn check_map(query: &Coerced, catalog: &MapCatalog, errors: &mut Vec<ValidationError>) {
    if query.map.is_some() {
        return;
    }
    let valid = catalog.list_maps().join(", ");
    let message = match query.map_id {
        None => format!("map is required. Should be one of: {}", valid),
        Some(id) => format!("Invalid map '{}'. Should be one of: {}", id, valid),
    };
    errors.push(ValidationError::new("map", message));
}

fn check_strongpoints(query: &Coerced, _: &MapCatalog, errors: &mut Vec<ValidationError>) {
    // Without a known map there is no strongpoint set to check against.
    let Some(map) = &query.map else { return };
    for name in &query.strongpoints {
        if map.strongpoint(name).is_none() {
            errors.push(ValidationError::new(
                "strongpoints",
                format!(
                    "{} is not a valid strongpoint for {}. Should be one of: {}",
                    name,
                    map.id,
                    map.strongpoint_names().join(", ")
                ),
            ));
        }
    }
}

fn check_size(query: &Coerced, _: &MapCatalog, errors: &mut Vec<ValidationError>) {
    for (field, value) in [("width", query.width), ("height", query.height)] {
        if let Some(v) = value {
            if !SIZE_RANGE.contains(&v) {
                errors.push(ValidationError::new(
                    field,
                    format!("{} must be greater than 0 and at most {}px, got {}", field, CANVAS_SIZE, v),
                ));
            }
        }
    }
}

fn check_caps(query: &Coerced, _: &MapCatalog, errors: &mut Vec<ValidationError>) {
    for faction in [&query.axis, &query.allies] {
        if let Some(caps) = faction.caps {
            if !CAPS_RANGE.contains(&caps) {
                errors.push(ValidationError::new(
                    faction.caps_field,
                    format!(
                        "{} must be between {} and {}, got {}",
                        faction.caps_field,
                        CAPS_RANGE.start(),
                        CAPS_RANGE.end(),
                        caps
                    ),
                ));
            }
        }
    }
}

fn check_pairing(query: &Coerced, _: &MapCatalog, errors: &mut Vec<ValidationError>) {
    for faction in [&query.axis, &query.allies] {
        if faction.caps_given != faction.color_given {
            errors.push(ValidationError::new(
                faction.faction.name(),
                format!(
                    "Either provide both {} and {} or neither",
                    faction.color_field, faction.caps_field
                ),
            ));
        }
    }
}
