//! Public link access without authentication.
//!
//! Fetch metadata and decrypted content for file links, and list folder links
//! as a forest of decoded nodes whose files can then be downloaded.

use tracing::debug;

use crate::api::{
    folder_query, ApiClient, FileInfoRequest, FileInfoResponse, FolderListRequest,
    FolderListResponse,
};
use crate::config::ClientConfig;
use crate::download::{self, Download, DownloadInfo};
use crate::error::{MegaError, Result};
use crate::fs::attributes::decrypt_attributes;
use crate::fs::node::Node;
use crate::fs::tree::{build_forest, Forest};
use crate::http::HttpClient;
use crate::link::{parse_file_link, parse_folder_link};

/// Client for public file and folder links.
///
/// Holds one HTTP connection pool shared by command calls and downloads.
/// Calls take `&self`, so a client can be shared between tasks.
///
/// # Example
/// ```no_run
/// use futures::io::AsyncReadExt;
/// use megalink::PublicClient;
///
/// # async fn example() -> megalink::Result<()> {
/// let client = PublicClient::new();
///
/// let mut download = client.download("https://mega.nz/#!HANDLE12!KEY").await?;
/// println!("{} ({} bytes)", download.info.name, download.info.size);
///
/// let mut content = Vec::new();
/// download.stream.read_to_end(&mut content).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PublicClient {
    api: ApiClient,
    http: HttpClient,
    config: ClientConfig,
}

impl PublicClient {
    /// Create a client with the default configuration.
    pub fn new() -> Self {
        let config = ClientConfig::default();
        let http = HttpClient::new();
        Self {
            api: ApiClient::with_http(http.clone(), &config),
            http,
            config,
        }
    }

    /// Create a client from configuration. Fails on an invalid proxy URL.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::with_config(&config)?;
        Ok(Self {
            api: ApiClient::with_http(http.clone(), &config),
            http,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a file link to its name, size and direct content URL.
    ///
    /// Undecodable attributes fail with [`MegaError::BadAttribute`].
    pub async fn file_info(&self, url: &str) -> Result<DownloadInfo> {
        let (handle, key) = parse_file_link(url)?;
        debug!(handle = %handle, "fetching public file info");

        let resp: FileInfoResponse = self
            .api
            .request(&FileInfoRequest::by_public_handle(&handle), &[])
            .await?;
        let attrs = decrypt_attributes(&key.key, &resp.attributes)?;

        Ok(DownloadInfo::new(
            attrs.name,
            resp.size,
            resp.url,
            key.key,
            key.iv,
            Some(key.mac),
        ))
    }

    /// Resolve a file link and start downloading it.
    pub async fn download(&self, url: &str) -> Result<Download> {
        let info = self.file_info(url).await?;
        self.open(info).await
    }

    /// Start downloading previously resolved content.
    pub async fn open(&self, info: DownloadInfo) -> Result<Download> {
        download::open(&self.http, info, self.config.verify_mac).await
    }

    /// List every node under a folder link.
    ///
    /// Nodes with undecodable names are kept under a placeholder name; nodes
    /// that cannot be placed are reported in [`Forest::dropped`]. Malformed
    /// node keys fail the whole listing.
    pub async fn list_folder(&self, url: &str) -> Result<Forest> {
        let (handle, key) = parse_folder_link(url)?;
        debug!(handle = %handle, "listing public folder");

        let resp: FolderListResponse = self
            .api
            .request(&FolderListRequest::recursive(), &folder_query(&handle))
            .await?;
        debug!(nodes = resp.nodes.len(), noc = resp.noc, "folder listing received");

        build_forest(&key, resp.nodes, &handle)
    }

    /// Resolve a file node from a folder listing to a direct content URL.
    pub async fn node_info(&self, node: &Node) -> Result<DownloadInfo> {
        if !node.is_file() {
            return Err(MegaError::NotAFile(node.name.clone()));
        }
        let keys = node
            .keys()
            .ok_or_else(|| MegaError::Decode(format!("node {} has no key material", node.hash)))?;
        let (Some(iv), mac) = (keys.iv, keys.mac) else {
            return Err(MegaError::Decode(format!("node {} has no counter seed", node.hash)));
        };

        let resp: FileInfoResponse = self
            .api
            .request(
                &FileInfoRequest::by_node_handle(&node.hash),
                &folder_query(node.share_handle()),
            )
            .await?;
        let attrs = decrypt_attributes(&keys.key, &resp.attributes)?;

        Ok(DownloadInfo::new(attrs.name, resp.size, resp.url, keys.key, iv, mac))
    }

    /// Resolve a file node and start downloading it.
    pub async fn download_node(&self, node: &Node) -> Result<Download> {
        let info = self.node_info(node).await?;
        self.open(info).await
    }
}

impl Default for PublicClient {
    fn default() -> Self {
        Self::new()
    }
}
