use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::imaging::DerivationPolicy;

/// Static file server with cached directory listings and on-demand cover thumbnails.
#[derive(Parser, Debug, Clone)]
#[command(name = "basic-file-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "FILESERVER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Server options used when no subcommand is given.
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options accepted by the `serve` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen to.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base path from which files will be served.
    #[arg(short, long = "base-path", alias = "basePath")]
    pub base_path: Option<PathBuf>,

    /// Only accept requests from this address.
    #[arg(long)]
    pub allow_ip: Option<IpAddr>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve(ServeArgs),

    /// Create a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Listing cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Image derivation configuration.
    #[serde(default)]
    pub images: ImageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as the root. Defaults to the executable's directory.
    #[serde(default)]
    pub base_path: Option<PathBuf>,

    /// Single remote address allowed to connect; everyone else gets 403.
    #[serde(default)]
    pub allowed_ip: Option<IpAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_path: None,
            allowed_ip: None,
        }
    }
}

fn default_port() -> u16 {
    9068
}

/// Listing cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cached listings, relative to the working directory.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

/// Image derivation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Which derivation rules apply to missing image paths.
    #[serde(default)]
    pub policy: DerivationPolicy,

    /// Width in pixels of generated covers.
    #[serde(default = "default_cover_width")]
    pub cover_width: u32,

    /// JPEG quality (1-100) of generated files.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            policy: DerivationPolicy::default(),
            cover_width: default_cover_width(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_cover_width() -> u32 {
    320
}

fn default_jpeg_quality() -> u8 {
    75
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("basic-file-server.toml"),
            dirs::config_dir()
                .map(|p| p.join("basic-file-server").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/basic-file-server/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Apply command-line overrides on top of the file configuration.
    pub fn apply_args(&mut self, args: &ServeArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref base_path) = args.base_path {
            self.server.base_path = Some(base_path.clone());
        }
        if let Some(ip) = args.allow_ip {
            self.server.allowed_ip = Some(ip);
        }
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# basic-file-server configuration

[server]
port = 9068
# base_path = "/srv/files"
# Reject every request not coming from this address
# allowed_ip = "10.0.0.1"

[cache]
# Directory listings are cached here, one JSON file per request path
dir = "cache"

[images]
# "cover": generate cover.jpg from 1.jpg/1.jpeg/1.png/1.avif/1.gif/1.webp
# "extension_swap": convert X.png/X.gif to a missing X.jpg
policy = "cover"
cover_width = 320
jpeg_quality = 75
"#
        .to_string()
    }
}
