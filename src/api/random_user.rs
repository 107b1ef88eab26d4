//! Random profile-list client
//!
//! Backs the user list screen with randomly generated profiles. Only the
//! display fields the conversation view needs are modeled: a name, an email
//! and the profile photo URLs.

use crate::config::Config;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One generated user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Reported gender
    pub gender: String,
    /// Structured display name
    pub name: UserName,
    /// Contact address
    pub email: String,
    /// Profile photo URLs by size
    pub picture: Picture,
}

impl UserProfile {
    /// Display name for list rows and the conversation header
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.first, self.name.last)
    }
}

/// First/last name pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserName {
    /// Given name
    pub first: String,
    /// Family name
    pub last: String,
}

/// Profile photo URLs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Picture {
    /// Large rendition, used in the conversation header
    pub large: String,
    /// Medium rendition
    pub medium: String,
    /// Thumbnail rendition, used in list rows
    pub thumbnail: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    results: Vec<UserProfile>,
}

/// HTTP client for the profile-list service
#[derive(Debug, Clone)]
pub struct RandomUserClient {
    client: reqwest::Client,
    origin: String,
}

impl RandomUserClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = super::http_client(config.connect_timeout(), config.request_timeout())?;

        Ok(Self {
            client,
            origin: config.profile_origin.clone(),
        })
    }

    /// Fetch one page of profiles; `None` means the list stays as-is
    pub async fn fetch_page(&self, results: u32, page: u32) -> Option<Vec<UserProfile>> {
        match self.try_fetch_page(results, page).await {
            Ok(profiles) => Some(profiles),
            Err(e) => {
                warn!("Profile page fetch skipped: {}", e);
                None
            }
        }
    }

    async fn try_fetch_page(&self, results: u32, page: u32) -> Result<Vec<UserProfile>> {
        let url = format!("{}/api/", self.origin);
        debug!("GET {} results={} page={}", url, results, page);

        let response: PageResponse = self
            .client
            .get(&url)
            .query(&[("results", results), ("page", page)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Profile request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Transport(format!("Profile request rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid profile response: {}", e)))?;

        Ok(response.results)
    }
}
