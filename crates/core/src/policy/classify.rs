//! Request classification.
//!
//! Rules are checked in a fixed order: static-asset destinations, then the
//! API path prefix, then the catch-all. Exactly one strategy applies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::request::InterceptedRequest;

/// How a request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Static store first, network on a miss.
    CacheFirst,
    /// Cached API answer now, network refresh in the background.
    StaleWhileRevalidate,
    /// Network first, any store on failure.
    NetworkFirst,
}

/// Pick the strategy for a request.
pub fn classify(request: &InterceptedRequest, api_prefix: &str) -> Strategy {
    if request.destination.is_static_asset() {
        Strategy::CacheFirst
    } else if request.url.path().starts_with(api_prefix) {
        Strategy::StaleWhileRevalidate
    } else {
        Strategy::NetworkFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Destination;

    fn request(method: &str, path: &str, destination: Destination) -> InterceptedRequest {
        let url = url::Url::parse("http://localhost:5173").unwrap().join(path).unwrap();
        InterceptedRequest::new(method, url).with_destination(destination)
    }

    #[test]
    fn test_static_destinations_are_cache_first() {
        for destination in [Destination::Script, Destination::Style, Destination::Image] {
            let strategy = classify(&request("GET", "/assets/app.js", destination), "/api/");
            assert_eq!(strategy, Strategy::CacheFirst);
        }
    }

    #[test]
    fn test_api_prefix_is_stale_while_revalidate() {
        for method in ["GET", "POST", "DELETE"] {
            let strategy = classify(&request(method, "/api/v1/productos", Destination::Empty), "/api/");
            assert_eq!(strategy, Strategy::StaleWhileRevalidate);
        }
    }

    #[test]
    fn test_destination_wins_over_api_prefix() {
        let strategy = classify(&request("GET", "/api/avatar.png", Destination::Image), "/api/");
        assert_eq!(strategy, Strategy::CacheFirst);
    }

    #[test]
    fn test_everything_else_is_network_first() {
        assert_eq!(classify(&request("GET", "/", Destination::Document), "/api/"), Strategy::NetworkFirst);
        assert_eq!(classify(&request("GET", "/fonts/a.woff2", Destination::Font), "/api/"), Strategy::NetworkFirst);
        assert_eq!(classify(&request("GET", "/apiary", Destination::Empty), "/api/"), Strategy::NetworkFirst);
    }

    #[test]
    fn test_prefix_matches_path_only() {
        let url = url::Url::parse("https://api.example.com/v1/items?path=/api/").unwrap();
        let strategy = classify(&InterceptedRequest::get(url), "/api/");
        assert_eq!(strategy, Strategy::NetworkFirst);
    }
}
