use serde::Deserialize;
use serde_json::Value;

// ═══════════════════════════════════════════════════════════════
//  Payload Decoder — serialized blob → TrackingPayload
// ═══════════════════════════════════════════════════════════════

/// Декодированный tracking payload: четыре параллельных массива.
///
/// Массивы не обязаны быть одинаковой длины — usable count определяет
/// projector. Отсутствующие ключи трактуются как пустые массивы.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingPayload {
    #[serde(default)]
    pub ids: Vec<Value>,
    #[serde(default)]
    pub classes: Vec<Value>,
    /// Пары [lat, lon].
    #[serde(default)]
    pub coords: Vec<Value>,
    /// Вектор на объект; опционален целиком и поэлементно.
    #[serde(default)]
    pub velocities: Vec<Value>,
}

/// Malformed serialization is expected noise in a live feed: skip the
/// entry, never abort the stream.
pub fn decode(raw: &str) -> Option<TrackingPayload> {
    match serde_json::from_str(raw) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "malformed payload, skipping entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_payload() {
        let payload = decode(
            r#"{"ids":["a"],"classes":["car"],"coords":[[41.9,12.5]],"velocities":[[10]]}"#,
        )
        .unwrap();
        assert_eq!(payload.ids.len(), 1);
        assert_eq!(payload.classes[0], "car");
        assert_eq!(payload.coords[0], serde_json::json!([41.9, 12.5]));
        assert_eq!(payload.velocities[0], serde_json::json!([10]));
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let payload = decode("{}").unwrap();
        assert!(payload.ids.is_empty());
        assert!(payload.classes.is_empty());
        assert!(payload.coords.is_empty());
        assert!(payload.velocities.is_empty());
    }

    #[test]
    fn missing_velocities_is_not_an_error() {
        let payload = decode(r#"{"ids":["a"],"classes":["car"],"coords":[[1.0,2.0]]}"#).unwrap();
        assert!(payload.velocities.is_empty());
    }

    #[test]
    fn malformed_json_is_skipped() {
        assert!(decode("not json at all").is_none());
        assert!(decode("").is_none());
        assert!(decode(r#"{"ids": ["#).is_none());
    }

    #[test]
    fn non_object_payload_is_skipped() {
        assert!(decode("[1, 2, 3]").is_none());
        assert!(decode("null").is_none());
        assert!(decode("42").is_none());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let payload = decode(r#"{"ids":["a"],"frame_ts":123,"camera":"x"}"#).unwrap();
        assert_eq!(payload.ids.len(), 1);
    }
}
