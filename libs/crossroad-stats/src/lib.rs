pub mod error;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use error::StatsError;

// ═══════════════════════════════════════════════════════════════
//  Dashboard rows
// ═══════════════════════════════════════════════════════════════

/// Один наблюдаемый перекрёсток: камера + привязка к карте.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossroad {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// [min_lon, min_lat, max_lon, max_lat], если заданы в хранилище.
    pub bbox: Option<[f64; 4]>,
    /// Upstream topic с live-детекциями этой камеры.
    pub topic: String,
}

/// Агрегатная карточка для UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub r#type: String,
}

// ═══════════════════════════════════════════════════════════════
//  Backend — mock данные или боевой ClickHouse
// ═══════════════════════════════════════════════════════════════

pub enum StatsBackend {
    Mock,
    ClickHouse(StatsClient),
}

impl StatsBackend {
    pub async fn crossroads(&self) -> Result<Vec<Crossroad>, StatsError> {
        match self {
            StatsBackend::Mock => Ok(mock_crossroads()),
            StatsBackend::ClickHouse(client) => client.crossroads().await,
        }
    }

    pub async fn crossroad_stats(&self, id: &str) -> Result<Vec<StatCard>, StatsError> {
        match self {
            StatsBackend::Mock => Ok(mock_stats()),
            StatsBackend::ClickHouse(client) => client.crossroad_stats(id).await,
        }
    }
}

pub fn mock_crossroads() -> Vec<Crossroad> {
    vec![
        Crossroad {
            id: "1".into(),
            name: "Largo Argentina".into(),
            lat: 41.8959,
            lon: 12.4767,
            bbox: Some([12.4755, 41.8955, 12.4779, 41.8965]),
            topic: "camera:skylinewebcams_largo_argentina".into(),
        },
        Crossroad {
            id: "2".into(),
            name: "Piazza Venezia".into(),
            lat: 41.8955,
            lon: 12.4825,
            bbox: Some([12.4815, 41.8950, 12.4835, 41.8960]),
            topic: "camera:piazza_venezia".into(),
        },
    ]
}

pub fn mock_stats() -> Vec<StatCard> {
    let mut rng = rand::thread_rng();
    vec![
        StatCard {
            title: "Avg Speed".into(),
            value: format!("{} km/h", rng.gen_range(20..=40)),
            r#type: "value".into(),
        },
        StatCard {
            title: "Traffic Volume".into(),
            value: format!("{} vehicles", rng.gen_range(100..=500)),
            r#type: "value".into(),
        },
        StatCard {
            title: "Congestion".into(),
            value: "Moderate".into(),
            r#type: "string".into(),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════
//  ClickHouse client (HTTP interface, JSONEachRow)
// ═══════════════════════════════════════════════════════════════

/// Параметры подключения к ClickHouse HTTP интерфейсу.
#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8123,
            user: "default".into(),
            password: String::new(),
            database: "default".into(),
        }
    }
}

/// Read-only клиент поверх HTTP интерфейса.
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    database: String,
}

impl StatsClient {
    pub fn new(config: &ClickHouseConfig) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: format!("http://{}:{}", config.host, config.port),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
        })
    }

    async fn exec(&self, sql: &str) -> Result<String, StatsError> {
        let resp = self
            .http
            .post(&self.base_url)
            .query(&[
                ("user", self.user.as_str()),
                ("password", self.password.as_str()),
                ("database", self.database.as_str()),
            ])
            .body(sql.to_owned())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(StatsError::Server(body))
        }
    }

    /// Все доступные перекрёстки.
    pub async fn crossroads(&self) -> Result<Vec<Crossroad>, StatsError> {
        let sql = "SELECT toString(id) AS id, name, latitude, longitude, redis_topic, \
                   min_lon, min_lat, max_lon, max_lat \
                   FROM crossroads \
                   FORMAT JSONEachRow";
        let body = self.exec(sql).await?;
        let rows: Vec<CrossroadRow> = parse_rows(&body)?;
        Ok(rows.into_iter().map(Crossroad::from).collect())
    }

    /// Последний срез агрегатов одного перекрёстка.
    pub async fn crossroad_stats(&self, id: &str) -> Result<Vec<StatCard>, StatsError> {
        let id = escape_ch_string(id);
        let sql = format!(
            "SELECT title, value, type \
             FROM crossroads_stats \
             WHERE id = '{id}' AND timestamp = ( \
                 SELECT MAX(timestamp) FROM crossroads_stats WHERE id = '{id}' \
             ) \
             ORDER BY title \
             FORMAT JSONEachRow"
        );
        let body = self.exec(&sql).await?;
        parse_rows(&body)
    }
}

#[derive(Debug, Deserialize)]
struct CrossroadRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    redis_topic: String,
    min_lon: Option<f64>,
    min_lat: Option<f64>,
    max_lon: Option<f64>,
    max_lat: Option<f64>,
}

impl From<CrossroadRow> for Crossroad {
    fn from(row: CrossroadRow) -> Self {
        let bbox = match (row.min_lon, row.min_lat, row.max_lon, row.max_lat) {
            (Some(min_lon), Some(min_lat), Some(max_lon), Some(max_lat)) => {
                Some([min_lon, min_lat, max_lon, max_lat])
            }
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            lat: row.latitude,
            lon: row.longitude,
            bbox,
            topic: row.redis_topic,
        }
    }
}

/// Разобрать JSONEachRow ответ построчно.
fn parse_rows<T: serde::de::DeserializeOwned>(body: &str) -> Result<Vec<T>, StatsError> {
    let mut rows = Vec::new();
    for line in body.lines() {
        if line.is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(line)?);
    }
    Ok(rows)
}

/// Escape a string value for safe use inside a ClickHouse single-quoted
/// literal. Prevents SQL injection by escaping `\` and `'`.
fn escape_ch_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsoneachrow_lines() {
        let body = concat!(
            r#"{"title":"Avg Speed","value":"28 km/h","type":"value"}"#,
            "\n",
            r#"{"title":"Congestion","value":"Moderate","type":"string"}"#,
            "\n",
        );
        let cards: Vec<StatCard> = parse_rows(body).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Avg Speed");
        assert_eq!(cards[1].r#type, "string");
    }

    #[test]
    fn empty_body_parses_to_no_rows() {
        let cards: Vec<StatCard> = parse_rows("").unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn bad_row_is_an_error() {
        assert!(parse_rows::<StatCard>("{oops}").is_err());
    }

    #[test]
    fn crossroad_row_without_bbox_maps_to_none() {
        let row: CrossroadRow = serde_json::from_str(
            r#"{"id":"3","name":"Colosseo","latitude":41.89,"longitude":12.49,
                "redis_topic":"camera:colosseo",
                "min_lon":null,"min_lat":null,"max_lon":null,"max_lat":null}"#,
        )
        .unwrap();
        let crossroad = Crossroad::from(row);
        assert!(crossroad.bbox.is_none());
        assert_eq!(crossroad.topic, "camera:colosseo");
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_ch_string("it's"), "it\\'s");
        assert_eq!(escape_ch_string(r"a\b"), r"a\\b");
        assert_eq!(escape_ch_string("plain"), "plain");
    }

    #[test]
    fn mock_crossroads_carry_topics() {
        let list = mock_crossroads();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].topic, "camera:skylinewebcams_largo_argentina");
        assert!(list.iter().all(|c| c.bbox.is_some()));
    }

    #[test]
    fn mock_stats_shape() {
        let cards = mock_stats();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "Avg Speed");
        assert!(cards[0].value.ends_with("km/h"));
        assert_eq!(cards[2].value, "Moderate");
    }
}
