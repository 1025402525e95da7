//! Command-line and environment configuration for the two hosts.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::data::merge::{MergeOptions, DEFAULT_KEY_LABEL};

/// Default request body cap for `POST /merge` (20 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Arguments for the directory converter.
#[derive(Parser, Debug, Clone)]
#[command(name = "panda-merge")]
#[command(about = "Merge two-column spectra in a directory into one CSV")]
#[command(version)]
pub struct ConvertArgs {
    /// Directory holding the input spectra
    #[arg(default_value = "example")]
    pub input_dir: PathBuf,

    /// Where to write the merged CSV
    #[arg(default_value = "merged.csv")]
    pub output_file: PathBuf,

    /// File extension to pick up (case-insensitive)
    #[arg(short, long, default_value = "txt")]
    pub extension: String,

    /// Header label for the key column
    #[arg(short, long, default_value = DEFAULT_KEY_LABEL, env = "PANDA_KEY_LABEL")]
    pub key_label: String,
}

impl ConvertArgs {
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            key_label: self.key_label.clone(),
        }
    }
}

/// Arguments for the HTTP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "panda-merge-server")]
#[command(about = "HTTP front end for merging uploaded spectra")]
#[command(version)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "PANDA_BIND")]
    pub bind: std::net::IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "PORT")]
    pub port: u16,

    /// Static assets served for any other GET
    #[arg(long, default_value = "public", env = "PANDA_PUBLIC_DIR")]
    pub public_dir: PathBuf,

    /// Where merged CSVs are written
    #[arg(long, default_value = "generated", env = "PANDA_GENERATED_DIR")]
    pub generated_dir: PathBuf,

    /// Where session records are written
    #[arg(long, default_value = "sessions", env = "PANDA_SESSIONS_DIR")]
    pub sessions_dir: PathBuf,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "PANDA_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Header label for the key column
    #[arg(short, long, default_value = DEFAULT_KEY_LABEL, env = "PANDA_KEY_LABEL")]
    pub key_label: String,
}

impl ServerArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            key_label: self.key_label.clone(),
        }
    }
}
