use serde::Serialize;
use serde_json::Value;

use crate::decode::TrackingPayload;

// ═══════════════════════════════════════════════════════════════
//  Feature Projector — TrackingPayload → GeoJSON FeatureCollection
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    pub r#type: &'static str,
    /// [longitude, latitude] — порядок осей обратный входному.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub id: String,
    /// Класс объекта переносится как есть.
    pub class: Value,
    pub score: f64,
    /// Первая компонента вектора скорости, без числовой коэрции.
    pub speed: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub r#type: &'static str,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    pub r#type: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Спроецировать payload в коллекцию точек. Может быть пустой —
/// пустые коллекции наружу не отправляются (решает caller).
///
/// Parse failure одного объекта отбрасывает только этот объект,
/// остальные индексы обрабатываются дальше.
pub fn project(payload: &TrackingPayload) -> FeatureCollection {
    let safe_count = payload
        .ids
        .len()
        .min(payload.classes.len())
        .min(payload.coords.len());

    let mut features = Vec::with_capacity(safe_count);
    for i in 0..safe_count {
        let Some((lat, lon)) = coordinate_pair(&payload.coords[i]) else {
            continue;
        };
        let Some(id) = object_id(&payload.ids[i]) else {
            continue;
        };

        let speed = payload
            .velocities
            .get(i)
            .and_then(Value::as_array)
            .and_then(|v| v.first())
            .cloned()
            .unwrap_or(Value::from(0));

        features.push(Feature {
            r#type: "Feature",
            geometry: Geometry {
                r#type: "Point",
                // Axis swap is mandatory for map rendering: input is [lat, lon].
                coordinates: [lon, lat],
            },
            properties: FeatureProperties {
                id,
                class: payload.classes[i].clone(),
                score: 1.0,
                speed,
            },
        });
    }

    FeatureCollection {
        r#type: "FeatureCollection",
        features,
    }
}

/// Числовая коэрция в духе float(): JSON число или числовая строка.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coordinate_pair(value: &Value) -> Option<(f64, f64)> {
    let pair = value.as_array()?;
    let lat = as_f64(pair.first()?)?;
    let lon = as_f64(pair.get(1)?)?;
    Some((lat, lon))
}

/// Строковое представление id: строка или число; остальное — parse failure.
fn object_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
