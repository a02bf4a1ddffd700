//! `floodview [DATASET] [CONFIG]`
//!
//! Without a dataset the built-in sample hospital is shown.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use floodview::{data::sample_hospital, Dataset, FloodViewApp, ViewerConfig};

/// Interactive 3D viewer for hospital flood-damage assessments
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Dataset JSON with `building` and `rooms`; the sample hospital when omitted
    #[arg(value_name = "DATASET")]
    dataset: Option<PathBuf>,

    /// Viewer settings JSON (window, layers, camera, animation)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("floodview=info"))
        .init();

    let opts = Opts::parse();

    let dataset = match &opts.dataset {
        Some(path) => Dataset::load(path)
            .with_context(|| format!("could not load dataset from {}", path.display()))?,
        None => {
            log::info!("No dataset given, showing the sample hospital");
            sample_hospital()
        }
    };

    let config = match &opts.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("could not load viewer config from {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    FloodViewApp::new(dataset)
        .with_config(config)
        .on_selection_change(|room| match room {
            Some(room) if !room.damage.demolition.is_empty() => log::debug!(
                "{}: {} demolition items",
                room.id,
                room.damage.demolition.len()
            ),
            Some(_) => (),
            None => log::debug!("No room selected"),
        })
        .run()
        .context("viewer stopped with an error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_positional_paths() {
        let opts = Opts::try_parse_from(["floodview", "wing.json", "viewer.json"]).unwrap();
        assert_eq!(opts.dataset, Some(PathBuf::from("wing.json")));
        assert_eq!(opts.config, Some(PathBuf::from("viewer.json")));

        let opts = Opts::try_parse_from(["floodview"]).unwrap();
        assert!(opts.dataset.is_none() && opts.config.is_none());

        assert!(Opts::try_parse_from(["floodview", "a", "b", "c"]).is_err());
    }
}
