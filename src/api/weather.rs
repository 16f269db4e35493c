//! Weather passthrough.

use super::ApiClient;
use crate::error::Result;
use serde_json::Value;

impl ApiClient {
    /// Current weather, for the server's default city unless one is given.
    pub async fn current_weather(&self, city: Option<&str>) -> Result<Value> {
        match city {
            Some(city) => {
                self.get_query("/weather/current", &[("city", city)])
                    .await
            }
            None => self.get("/weather/current").await,
        }
    }
}
