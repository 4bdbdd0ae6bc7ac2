//! Runtime configuration.
//!
//! Every option can be given as a flag or, as is usual under Lambda, through
//! the environment.

use std::time::Duration;

use clap::Parser;

use crate::git::TraversalOrder;

/// Longest expiry S3 accepts for a presigned URL.
const MAX_PRESIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Package a caller's repository into a zip and hand back a temporary link
#[derive(Parser, Debug, Clone)]
#[command(name = "repo-download")]
#[command(about = "Package a caller's repository into a zip and hand back a temporary link", long_about = None)]
pub struct Config {
    /// S3 bucket that receives the archives
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: String,

    /// Endpoint that validates bearer tokens and returns their claims
    #[arg(long, env = "AUTHORIZER_ENDPOINT_URL")]
    pub authorizer_endpoint_url: String,

    /// Lifetime of generated download links, in seconds (SigV4 allows at most
    /// seven days)
    #[arg(
        long,
        env = "PRESIGNED_URL_TTL_SECS",
        default_value_t = 3600,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PRESIGNED_URL_TTL_SECS)
    )]
    pub presigned_url_ttl_secs: u64,

    /// Per-attempt timeout for calls to the authorizer and AWS, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Attempts per AWS call, including the first
    #[arg(
        long,
        env = "UPSTREAM_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub upstream_max_attempts: u32,

    /// Order in which repository folders are walked
    #[arg(long, env = "TRAVERSAL_ORDER", value_enum, default_value_t = TraversalOrder::DepthFirst)]
    pub traversal_order: TraversalOrder,

    /// Port for the local HTTP server (ignored under Lambda)
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,
}

impl Config {
    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.presigned_url_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
