//! Event payload validation against closed per-type schemas.
//!
//! Each event type has a fixed set of fields with primitive types and value
//! ranges. The schema is closed-world: unknown fields are rejected. On
//! failure the caller receives a field-path → reason map which becomes the
//! API error payload. Validation is synchronous, stateless, and side-effect
//! free.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::{GameEventType, SpatialCoordinates};
use crate::error::{CoreError, FieldErrors};

/// Primitive kind and value constraints for a single payload field.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Canonical UUID string.
    Uuid,
    /// Integer bounded inclusively.
    Int { min: i64, max: i64 },
    /// String with an inclusive character-length range.
    Str { min: usize, max: usize },
}

/// One field of a closed payload schema.
#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

const PERIOD: FieldKind = FieldKind::Int { min: 1, max: 9 };
const SCORE: FieldKind = FieldKind::Int { min: 0, max: 99 };
const REASON: FieldKind = FieldKind::Str { min: 1, max: 256 };

/// Returns the closed schema for an event type.
const fn schema(event_type: GameEventType) -> &'static [FieldSpec] {
    match event_type {
        GameEventType::GameStarted => const { &[optional("period", PERIOD)] },
        GameEventType::GoalScored => const {
            &[
                required("team_id", FieldKind::Uuid),
                optional("player_id", FieldKind::Uuid),
                optional("period", PERIOD),
            ]
        },
        GameEventType::PenaltyAssessed => const {
            &[
                required("team_id", FieldKind::Uuid),
                required("player_id", FieldKind::Uuid),
                required("infraction", FieldKind::Str { min: 1, max: 64 }),
                required("minutes", FieldKind::Int { min: 1, max: 10 }),
                optional("period", PERIOD),
            ]
        },
        GameEventType::PeriodEnded => const { &[required("period", PERIOD)] },
        GameEventType::GameFinalized => const {
            &[
                required("final_home_score", SCORE),
                required("final_away_score", SCORE),
            ]
        },
        GameEventType::GameCancelled => const { &[optional("reason", REASON)] },
        GameEventType::ScoreCorrected => const {
            &[
                required("home_score", SCORE),
                required("away_score", SCORE),
                optional("reason", REASON),
            ]
        },
        GameEventType::EventReversal => const {
            &[
                required("reversed_event_id", FieldKind::Uuid),
                optional("reason", REASON),
            ]
        },
    }
}

/// Validates a submitted payload against the schema for its event type.
///
/// # Errors
///
/// [`CoreError::Validation`] carrying one entry per offending field:
/// missing, wrong type, out of range, or unexpected under the closed-world
/// schema.
pub fn validate(event_type: GameEventType, payload: &Value) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();

    let fields = match payload {
        Value::Null => None,
        Value::Object(map) => Some(map),
        _ => {
            errors.insert("payload".to_string(), "must be a JSON object".to_string());
            return Err(CoreError::Validation(errors));
        }
    };

    let specs = schema(event_type);
    for spec in specs {
        match fields.and_then(|map| map.get(spec.name)) {
            Some(value) => {
                if let Err(reason) = check_kind(spec.kind, value) {
                    errors.insert(spec.name.to_string(), reason);
                }
            }
            None if spec.required => {
                errors.insert(spec.name.to_string(), "missing required field".to_string());
            }
            None => {}
        }
    }

    if let Some(map) = fields {
        for key in map.keys() {
            if !specs.iter().any(|spec| spec.name == key) {
                errors.insert(key.clone(), "unexpected field".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

/// Validates optional spatial coordinates, independently of the payload
/// schema. Both axes must be finite and normalized to `[0.0, 1.0]`.
///
/// # Errors
///
/// [`CoreError::Validation`] with `coordinates.x` / `coordinates.y` entries.
pub fn validate_coordinates(coordinates: &SpatialCoordinates) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    for (axis, value) in [("coordinates.x", coordinates.x), ("coordinates.y", coordinates.y)] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            errors.insert(
                axis.to_string(),
                "must be a normalized value between 0.0 and 1.0".to_string(),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

fn check_kind(kind: FieldKind, value: &Value) -> Result<(), String> {
    match kind {
        FieldKind::Uuid => match value.as_str() {
            Some(s) if Uuid::parse_str(s).is_ok() => Ok(()),
            Some(_) => Err("must be a canonical UUID string".to_string()),
            None => Err("must be a UUID string".to_string()),
        },
        FieldKind::Int { min, max } => match value.as_i64() {
            Some(n) if (min..=max).contains(&n) => Ok(()),
            Some(n) => Err(format!("must be between {min} and {max}, got {n}")),
            None => Err("must be an integer".to_string()),
        },
        FieldKind::Str { min, max } => match value.as_str() {
            Some(s) if (min..=max).contains(&s.chars().count()) => Ok(()),
            Some(_) => Err(format!("must be {min}-{max} characters long")),
            None => Err("must be a string".to_string()),
        },
    }
}
