use std::path::PathBuf;

use clap::Parser;

use crate::io::config_io::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "kantui",
    about = concat!("kantui v", env!("CARGO_PKG_VERSION"), " - a kanban board in your terminal"),
    version
)]
pub struct Cli {
    /// Folder holding kantui.db (created if missing)
    #[arg(long = "db", value_name = "DIR")]
    pub db: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// Roll back this many migrations before migrating up again
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub remigrate: i64,

    /// Config file (default: <config dir>/kantui/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            db_dir: self.db.clone(),
            debug: self.debug,
            remigrate: usize::try_from(self.remigrate.max(0)).unwrap_or(usize::MAX),
        }
    }
}
