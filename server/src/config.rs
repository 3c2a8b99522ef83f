use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use connect4::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Serve one local two-player Connect 4 session to a browser page.
#[derive(Debug, Clone, Parser)]
#[command(name = "connect4-server", about = "Host a local Connect 4 session")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CONNECT4_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Board width used when a new game does not pick one
    #[arg(long, env = "CONNECT4_WIDTH", default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Board height used when a new game does not pick one
    #[arg(long, env = "CONNECT4_HEIGHT", default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,

    /// Directory holding the board page
    #[arg(long, env = "CONNECT4_STATIC_DIR", default_value = "web/dist")]
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            static_dir: PathBuf::from("web/dist"),
        }
    }
}
