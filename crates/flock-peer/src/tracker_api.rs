//! HTTP client for the tracker API

use flock_core::{Error, Peer, RegisterRequest, Result, StatusResponse, UpdateRequest};
use reqwest::StatusCode;

pub struct TrackerClient {
    base_url: String,
    http: reqwest::Client,
}

impl TrackerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// `POST /register`; returns the tracker's status line
    pub async fn register(&self, peer: Peer, files: &[String]) -> Result<String> {
        let body = RegisterRequest {
            peer,
            files: files.to_vec(),
        };

        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("register failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "tracker rejected registration: {}",
                response.status()
            )));
        }

        let ack: StatusResponse = response
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("bad registration ack: {e}")))?;
        Ok(ack.status)
    }

    /// `POST /updateStatus`; 404 means the tracker evicted us
    pub async fn update_status(&self, peer: Peer, files: &[String]) -> Result<()> {
        let body = UpdateRequest {
            peer,
            files: files.to_vec(),
        };

        let response = self
            .http
            .post(format!("{}/updateStatus", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("status update failed: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status if status == StatusCode::NOT_FOUND => Err(Error::PeerNotRegistered(peer.ip)),
            status => Err(Error::Transport(format!(
                "tracker rejected status update: {status}"
            ))),
        }
    }

    /// `GET /getPeers?file=<name>`; the list comes back ranked by the tracker
    pub async fn get_peers(&self, file: &str) -> Result<Vec<Peer>> {
        let response = self
            .http
            .get(format!("{}/getPeers", self.base_url))
            .query(&[("file", file)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("peer query failed: {e}")))?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| Error::Protocol(format!("bad peer list: {e}"))),
            status if status == StatusCode::NOT_FOUND => Err(Error::NoOwners(file.to_string())),
            status => Err(Error::Transport(format!(
                "tracker rejected peer query: {status}"
            ))),
        }
    }
}
