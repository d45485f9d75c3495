mod cctray;
mod exports;
mod styling;

pub use cctray::render_cctray;
pub use exports::{export_feed, export_resources, export_stats};
pub use styling::{bright_green, dim};
use styling::magenta_bold;

/// Prints the banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("concourse-feed"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Concourse build status as CCTray and JSON feeds")
    );
}
