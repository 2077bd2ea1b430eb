//! MEGA command API client and types.

pub mod client;
pub mod commands;

pub use client::ApiClient;
pub use commands::{
    folder_query, FileInfoRequest, FileInfoResponse, FolderListRequest, FolderListResponse,
    RawNode,
};
