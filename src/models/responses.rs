//! Response DTOs for the blog API
//!
//! Bodies for endpoints that do not simply echo a document.

use serde::Serialize;

use crate::cache::CacheStats;

/// Plain acknowledgement, e.g. sign-up and sign-out.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for `POST /signin`
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub message: String,
    /// Session token, also set as the session cookie
    pub cookie: String,
}

impl SignInResponse {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            message: "sign in succeed".to_string(),
            cookie: token.into(),
        }
    }
}

/// Response body for `DELETE /posts/:id`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    #[serde(rename = "deleteResult")]
    pub delete_result: String,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self {
            delete_result: "success".to_string(),
        }
    }
}

/// Response body for the thumb-up endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ThumbupResponse {
    #[serde(rename = "thumbupResult")]
    pub thumbup_result: String,
    /// Counter value after the call
    #[serde(rename = "numOfThumb")]
    pub num_of_thumb: u64,
}

impl ThumbupResponse {
    pub fn success(num_of_thumb: u64) -> Self {
        Self {
            thumbup_result: "success".to_string(),
            num_of_thumb,
        }
    }

    pub fn already_counted(num_of_thumb: u64) -> Self {
        Self {
            thumbup_result: "already thumbed up".to_string(),
            num_of_thumb,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(DeleteResponse::success()).unwrap();
        assert_eq!(json["deleteResult"], "success");

        let json = serde_json::to_value(ThumbupResponse::success(3)).unwrap();
        assert_eq!(json["thumbupResult"], "success");
        assert_eq!(json["numOfThumb"], 3);

        let json = serde_json::to_value(SignInResponse::new("tok")).unwrap();
        assert_eq!(json["message"], "sign in succeed");
        assert_eq!(json["cookie"], "tok");
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
