use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use log::{debug, error, info};
use serde::Serialize;
use std::path::PathBuf;

use docker_mirror::probe::DEFAULT_ATTEMPTS;
use docker_mirror::{
    add_host_args, ConfigOverlay, DockerRuntime, MirrorFacade, MirrorOptions, Notifier,
    ReadinessProbe,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Action {
    /// Show this help screen
    #[value(alias = "?")]
    Help,
    /// The image name matching the local system (or the given image)
    #[value(alias = "image")]
    Detect,
    /// The json data used to start or stop the containers
    Facts,
    /// Start the container(s) with the mirror-packages-repo
    Start,
    /// Stop the container(s) with the mirror-packages-repo
    Stop,
    /// Show the addresses of running mirror containers
    #[value(aliases = ["show", "infos"])]
    Info,
    /// Show the --add-host options for the client container
    #[value(aliases = ["addhost", "add-host", "addhosts"])]
    AddHosts,
    /// Show name, image and address of each mirror container
    Inspect,
    /// Show the mirror container names
    Containers,
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Helper to start/stop mirror containers with the packages repo",
    long_about = None
)]
struct Cli {
    #[arg(value_enum, default_value = "detect", help = "What to do")]
    action: Action,

    #[arg(help = "Image to find mirrors for (e.g., centos:8); detected from the local system if omitted")]
    image: Option<String>,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for info, -vv for debug, -vvv for trace)"
    )]
    verbose: u8,

    #[arg(
        short = 'a',
        long = "add-hosts",
        visible_alias = "add-host",
        help = "Show options for 'docker run' instead of json"
    )]
    add_hosts: bool,

    #[arg(long, help = "Add the EPEL mirror for centos and almalinux")]
    epel: bool,

    #[arg(long, visible_alias = "update", help = "Use the updates repo variant")]
    updates: bool,

    #[arg(long, help = "Use the ubuntu universe repo variant")]
    universe: bool,

    #[arg(
        short = 'l',
        long = "local",
        visible_alias = "localmirrors",
        action = clap::ArgAction::Count,
        help = "Fail if a local mirror is not available"
    )]
    local: u8,

    /// Accepted for compatibility; an explicit image is never re-detected
    #[arg(long, hide = true)]
    no_detect: bool,

    #[arg(long, help = "Container runtime binary [default: $DOCKER_EXE or docker]")]
    docker: Option<String>,

    #[arg(long, help = "Mirror config file [default: $DOCKER_MIRROR_CONFIG or ~/.config/docker_mirror.ini]")]
    config: Option<PathBuf>,

    #[arg(long, help = "Registry prefix of the mirror images [default: $DOCKER_MIRROR_REPO or localhost:5000/mirror-packages]")]
    repo: Option<String>,

    #[arg(long, default_value_t = DEFAULT_ATTEMPTS, help = "Connection attempts while waiting for a started mirror")]
    probe_attempts: u32,

    #[arg(long, help = "Do not wait for started mirrors to accept connections")]
    no_probe: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render json")?;
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let notifier = Notifier::new(cli.verbose);
    notifier.init_logger();

    info!("docker-mirror {:?} {}", cli.action, cli.image.as_deref().unwrap_or(""));
    debug!("no-detect: {}", cli.no_detect);

    let overlay = match cli.config.clone().or_else(ConfigOverlay::default_path) {
        Some(path) => ConfigOverlay::load(&path)?,
        None => ConfigOverlay::empty(),
    };

    let runtime = match &cli.docker {
        Some(binary) => DockerRuntime::with_binary(binary.as_str()),
        None => DockerRuntime::from_env(),
    };

    let probe = if cli.no_probe {
        None
    } else {
        Some(ReadinessProbe::new(cli.probe_attempts))
    };

    let mut facade = MirrorFacade::new(runtime, overlay, notifier)
        .with_options(MirrorOptions {
            epel: cli.epel,
            updates: cli.updates,
            universe: cli.universe,
        })
        .with_probe(probe);
    if let Some(repo) = &cli.repo {
        facade = facade.with_repo_prefix(repo.as_str());
    }

    let image = cli.image.as_deref();
    match cli.action {
        Action::Help => Cli::command().print_long_help()?,
        Action::Detect => println!("{}", facade.detect(image)?),
        Action::Facts => print_json(&facade.facts(image)?)?,
        Action::Start => {
            let report = facade.start(image)?;
            if cli.add_hosts {
                println!("{}", add_host_args(&report.specs, &report.addresses).join(" "));
            } else {
                print_json(&report.addresses)?;
            }
            if cli.local > 0 && !report.is_complete() {
                error!(
                    "local mirrors required: {} missing, {} unreachable",
                    report.missing(),
                    report.unreachable
                );
                std::process::exit(1);
            }
        }
        Action::Stop => {
            let done = facade.stop(image)?;
            if cli.add_hosts {
                let names: Vec<&str> = done.keys().map(String::as_str).collect();
                println!("{}", names.join(" "));
            } else {
                print_json(&done)?;
            }
        }
        Action::Info => {
            if cli.add_hosts {
                println!("{}", facade.add_hosts(image)?.join(" "));
            } else {
                print_json(&facade.info(image)?)?;
            }
        }
        Action::AddHosts => {
            let args = facade.add_hosts(image)?;
            if cli.local > 0 && args.is_empty() {
                error!("local mirrors required: none is running");
                std::process::exit(1);
            }
            println!("{}", args.join(" "));
        }
        Action::Inspect => {
            let entries = facade.inspect(image)?;
            if cli.add_hosts {
                let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
                println!("{}", names.join(" "));
            } else {
                print_json(&entries)?;
            }
        }
        Action::Containers => {
            let names = facade.containers(image)?;
            if cli.add_hosts {
                println!("{}", names.join(" "));
            } else {
                print_json(&names)?;
            }
        }
    }

    Ok(())
}
