use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::feed::{JobStats, Project, Resource};

use super::cctray::render_cctray;

/// Writes the CCTray XML feed.
pub fn export_feed(projects: &[Project], output: &mut dyn Write) -> Result<()> {
    output.write_all(render_cctray(projects)?.as_bytes())?;
    Ok(())
}

/// Writes the job-stats feed as a JSON array.
pub fn export_stats(stats: &[JobStats], pretty: bool, output: &mut dyn Write) -> Result<()> {
    export_json(stats, pretty, output)
}

pub fn export_resources(
    resources: &[Resource],
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    export_json(resources, pretty, output)
}

fn export_json<T>(value: &T, pretty: bool, output: &mut dyn Write) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(output, "{}", json)?;
    Ok(())
}
