use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::Credentials;
use crate::config::Config;
use crate::output;
use crate::providers::ConcourseProvider;
use crate::server::{self, AppState};

#[derive(Parser)]
#[command(name = "concourse-feed")]
#[command(
    author,
    version,
    about = "Concourse build status as CCTray and JSON feeds",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./concourse-feed.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    concourse: ConcourseArgs,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct ConcourseArgs {
    /// Concourse base URL
    #[arg(short, long, global = true, env = "CONCOURSE_URL")]
    url: Option<String>,

    #[arg(long, global = true, env = "CONCOURSE_USERNAME")]
    username: Option<String>,

    #[arg(long, global = true, env = "CONCOURSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /cc.xml and /job-stats over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the CCTray XML feed once
    Feed,
    /// Print the JSON job-stats feed once
    Stats,
    /// Print the input resources of a job's last finished build
    Resources {
        pipeline: String,
        job: String,
    },
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(url) = &self.concourse.url {
            config.concourse.url.clone_from(url);
        }
        if self.concourse.username.is_some() {
            config.concourse.username.clone_from(&self.concourse.username);
        }
        if self.concourse.password.is_some() {
            config.concourse.password.clone_from(&self.concourse.password);
        }
        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.server.host.clone_from(host);
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        config.output.pretty |= self.pretty;

        Ok(config)
    }

    fn build_provider(config: &Config) -> Result<ConcourseProvider> {
        let username = config
            .concourse
            .username
            .clone()
            .context("No Concourse username configured (--username or CONCOURSE_USERNAME)")?;
        let credentials = Credentials::new(username, config.concourse.password.clone());

        let base_url = config.concourse.base_url()?;
        Ok(ConcourseProvider::new(&base_url, credentials)?)
    }

    fn write_output(&self, render: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<()> {
        if let Some(output_path) = &self.output {
            let mut file = std::fs::File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            render(&mut file)?;
            info!("Output written to: {}", output_path.display());
        } else {
            render(&mut std::io::stdout().lock())?;
        }
        Ok(())
    }

    async fn execute_serve(&self, config: &Config) -> Result<()> {
        let provider = Self::build_provider(config)?;
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .context("Invalid host/port")?;

        let state = AppState {
            provider: Arc::new(provider),
            web_url: Arc::new(config.concourse.base_url()?),
        };

        eprintln!(
            "Serving {} on {}",
            output::dim(&config.concourse.url),
            output::bright_green(format!("http://{addr}"))
        );
        server::serve(state, addr).await
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.resolve_config()?;

        match &self.command {
            Commands::Serve { .. } => self.execute_serve(&config).await,
            Commands::Feed => {
                let provider = Self::build_provider(&config)?;
                let projects = provider.build_feed(&config.concourse.base_url()?).await?;
                info!("Rendering {} projects", projects.len());
                self.write_output(|out| output::export_feed(&projects, out))
            }
            Commands::Stats => {
                let provider = Self::build_provider(&config)?;
                let stats = provider.build_stats(&config.concourse.base_url()?).await?;
                info!("Rendering {} job stats", stats.len());
                self.write_output(|out| output::export_stats(&stats, config.output.pretty, out))
            }
            Commands::Resources { pipeline, job } => {
                let provider = Self::build_provider(&config)?;
                let resources = provider.job_resources(pipeline, job).await?;
                self.write_output(|out| {
                    output::export_resources(&resources, config.output.pretty, out)
                })
            }
        }
    }
}
