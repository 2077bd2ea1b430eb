//! # megalink
//!
//! Rust client for MEGA public share links.
//!
//! ## Features
//!
//! - **Share links**: parse file and folder links and unpack the key material
//!   they carry (`https://mega.nz/#!H!K`, `https://mega.nz/file/H#K`,
//!   `https://mega.nz/folder/H#K`).
//! - **Command API**: single-command JSON envelope over HTTP with atomic
//!   request ids, optional proxy and deadlines.
//! - **Folder listings**: decrypt every node's key and name and rebuild the
//!   folder hierarchy from a flat, unordered node list.
//! - **Downloads**:
//!   - Streaming AES-128-CTR decryption as an `AsyncRead`.
//!   - Non-blocking progress notifications over a small bounded channel.
//!   - Optional content MAC verification.
//!
//! No login is needed or supported; possession of the link is the only
//! credential.
//!
//! ## Example: Download a file link
//!
//! ```no_run
//! use futures::io::AsyncReadExt;
//! use megalink::PublicClient;
//!
//! # async fn example() -> megalink::Result<()> {
//! let client = PublicClient::new();
//! let mut download = client
//!     .download("https://mega.nz/#!HANDLE12!KEY")
//!     .await?;
//!
//! let mut content = Vec::new();
//! download.stream.read_to_end(&mut content).await?;
//! println!("{}: {} bytes", download.info.name, download.stream.total());
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Walk a folder link
//!
//! ```no_run
//! use megalink::PublicClient;
//!
//! # async fn example() -> megalink::Result<()> {
//! let client = PublicClient::new();
//! let forest = client
//!     .list_folder("https://mega.nz/folder/HANDLE12#KEY")
//!     .await?;
//!
//! for (path, node) in forest.walk() {
//!     println!("{} ({} bytes)", path, node.size);
//! }
//!
//! if let Some(node) = forest.stat("/Photos/beach.jpg") {
//!     let download = client.download_node(node).await?;
//!     println!("downloading {}", download.info.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod base64;
pub mod config;
pub mod crypto;
pub mod download;
pub mod error;
pub mod fs;
pub mod http;
pub mod link;
pub mod progress;
pub mod public;

// Re-export commonly used types
pub use config::ClientConfig;
pub use download::{Download, DownloadInfo, DownloadStream};
pub use error::{MegaError, Result};
pub use fs::{DropReason, DroppedNode, Forest, Node, NodeType, TreeNode};
pub use link::{is_file_link, is_folder_link, parse_file_link, parse_folder_link, ShareLink};
pub use progress::{ProgressReceiver, ProgressSink};
pub use public::PublicClient;
