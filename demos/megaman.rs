//! Example: Download files and folders from public MEGA links
//!
//! Usage:
//!   cargo run --example megaman -- <URL | URL_LIST_FILE> <OUTPUT>
//!
//! A single file link is written to OUTPUT (or OUTPUT/<name> if OUTPUT is a
//! directory). Folder links and link lists recreate their trees under OUTPUT.

use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use futures::io::AllowStdIo;
use indicatif::{ProgressBar, ProgressStyle};
use megalink::{is_folder_link, Download, PublicClient};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: cargo run --example megaman -- <URL | URL_LIST_FILE> <OUTPUT>";

type AnyResult<T> = Result<T, Box<dyn std::error::Error>>;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("megalink=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
    let (source, output) = (&args[0], PathBuf::from(&args[1]));

    let links = match read_links(source) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("Failed to read {}: {}", source, e);
            std::process::exit(1);
        }
    };

    let client = PublicClient::new();
    let single = links.len() == 1;
    let mut failures = 0;

    for link in &links {
        let result = if is_folder_link(link) {
            download_folder(&client, link, &output).await
        } else {
            download_file(&client, link, &output, single).await
        };
        if let Err(e) = result {
            error!(link = %link, error = %e, "download failed");
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{} of {} links failed", failures, links.len());
        std::process::exit(1);
    }
}

/// A file of whitespace-separated links if `source` names an existing file,
/// otherwise a single link.
fn read_links(source: &str) -> AnyResult<Vec<String>> {
    if !Path::new(source).is_file() {
        return Ok(vec![source.to_string()]);
    }
    let text = fs::read_to_string(source)?;
    Ok(text.split_whitespace().map(str::to_string).collect())
}

async fn download_file(
    client: &PublicClient,
    link: &str,
    output: &Path,
    single: bool,
) -> AnyResult<()> {
    let download = client.download(link).await?;
    let target = if single && !output.is_dir() {
        output.to_path_buf()
    } else {
        fs::create_dir_all(output)?;
        output.join(safe_component(&download.info.name))
    };
    save(download, &target).await
}

async fn download_folder(client: &PublicClient, link: &str, output: &Path) -> AnyResult<()> {
    let forest = client.list_folder(link).await?;
    info!(nodes = forest.len(), "folder listed");
    for dropped in &forest.dropped {
        eprintln!("Skipping node {}: {:?}", dropped.hash, dropped.reason);
    }

    for (path, node) in forest.walk() {
        let target = local_path(output, &path);
        if node.node_type.is_container() {
            fs::create_dir_all(&target)?;
        } else if node.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let download = client.download_node(node).await?;
            save(download, &target).await?;
        }
    }
    Ok(())
}

async fn save(download: Download, target: &Path) -> AnyResult<()> {
    let Download {
        info,
        mut stream,
        mut progress,
    } = download;

    let bar = ProgressBar::new(info.size);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    bar.set_message(info.name.clone());

    let watcher = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while let Some(total) = progress.recv().await {
                bar.set_position(total);
            }
        })
    };

    let mut writer = AllowStdIo::new(BufWriter::new(File::create(target)?));
    futures::io::copy(&mut stream, &mut writer).await?;
    writer.into_inner().into_inner().map_err(|e| e.into_error())?;

    drop(stream);
    let _ = watcher.await;
    bar.finish_with_message(format!("{} complete", info.name));
    Ok(())
}

/// Map a forest path onto the output directory, one component per node name.
fn local_path(output: &Path, path: &str) -> PathBuf {
    path.split('/')
        .filter(|c| !c.is_empty())
        .fold(output.to_path_buf(), |acc, c| acc.join(safe_component(c)))
}

fn safe_component(name: &str) -> String {
    match name {
        "." | ".." => "_".to_string(),
        other => other.replace(['/', '\\'], "_"),
    }
}
