use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{ExperimentConfig, FeatureMode};
use crate::storage::FsStorageService;
use crate::task::MetaInfoTask;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FeatureModeArg {
    Document,
    Unit,
    Sequence,
    Pair,
}

impl From<FeatureModeArg> for FeatureMode {
    fn from(value: FeatureModeArg) -> Self {
        match value {
            FeatureModeArg::Document => FeatureMode::Document,
            FeatureModeArg::Unit => FeatureMode::Unit,
            FeatureModeArg::Sequence => FeatureMode::Sequence,
            FeatureModeArg::Pair => FeatureMode::Pair,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meta_collection",
    disable_help_subcommand = true,
    about = "Run the meta-collection pre-pass for one experiment point",
    long_about = "Resolve the meta collectors required by the configured feature extractors, scan the corpus once, and write every artifact into the storage meta folder.",
    after_help = "Relative corpus paths and keywords_file entries in the experiment file are resolved against the file's directory."
)]
/// CLI for `meta_collection`.
///
/// Common usage:
/// - Run a point: `--config experiment.json --storage-root /tmp/run`
/// - Override the mode from the file: `--feature-mode unit`
/// - Restrict collectors to views: repeat `--view <NAME>`
/// - Print the resolved collectors only: `--plan`
struct MetaCollectionCli {
    #[arg(long, value_name = "PATH", help = "JSON experiment configuration file")]
    config: PathBuf,
    #[arg(
        long = "storage-root",
        value_name = "PATH",
        default_value = ".metacollect",
        help = "Root folder holding the input and meta storage folders"
    )]
    storage_root: PathBuf,
    #[arg(
        long = "feature-mode",
        value_enum,
        help = "Feature mode override for this run"
    )]
    feature_mode: Option<FeatureModeArg>,
    #[arg(
        long = "view",
        value_name = "NAME",
        help = "Restrict collectors to this view, repeat as needed"
    )]
    views: Vec<String>,
    #[arg(
        long = "skip-if-current",
        help = "Skip the scan when the stored manifest matches this configuration and the size and mtime of every corpus file"
    )]
    skip_if_current: bool,
    #[arg(long = "plan", help = "Print the resolved collectors and exit")]
    plan_only: bool,
}

/// Run the `meta_collection` CLI with the given arguments (program name excluded).
pub fn run_meta_collection<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<MetaCollectionCli, _>(
        std::iter::once("meta_collection".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = ExperimentConfig::from_path(&cli.config)?;
    if let Some(mode) = cli.feature_mode {
        config.feature_mode = mode.into();
    }
    if !cli.views.is_empty() {
        config.views = Some(cli.views);
    }
    let mut task = MetaInfoTask::new(config.into_point());
    if cli.plan_only {
        let collectors = task.plan()?;
        println!("Point: {}", task.point().describe());
        if collectors.is_empty() {
            println!("No meta collectors required.");
        }
        for collector in &collectors {
            let owner = collector.extractor().unwrap_or("<mode>");
            for binding in collector.bindings() {
                println!(
                    "  {:<24} {:<10} {} -> {}",
                    collector.kind().name(),
                    owner,
                    binding.parameter,
                    binding.resolved_path
                );
            }
        }
        return Ok(());
    }

    let storage = FsStorageService::new(&cli.storage_root);
    if cli.skip_if_current && task.is_up_to_date(&storage)? {
        println!(
            "Meta artifacts in {} are current; skipping.",
            storage.root().display()
        );
        return Ok(());
    }

    let report = task.execute(&storage)?;
    println!(
        "Scanned {} documents; wrote {} artifacts (fingerprint {}).",
        report.documents,
        report.artifacts.len(),
        report.fingerprint
    );
    for artifact in &report.artifacts {
        println!("  {}", artifact.display());
    }
    println!("Manifest: {}", report.manifest.display());
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::read_frequency_table;
    use crate::constants::storage::{MANIFEST_FILENAME, META_KEY};
    use std::fs;
    use tempfile::tempdir;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn help_exits_cleanly() {
        run_meta_collection(args(&["--help"])).unwrap();
    }

    #[test]
    fn cli_overrides_and_view_flags_parse() {
        let cli = parse_cli::<MetaCollectionCli, _>([
            "meta_collection",
            "--config",
            "exp.json",
            "--feature-mode",
            "sequence",
            "--view",
            "source",
            "--view",
            "target",
            "--skip-if-current",
        ])
        .unwrap()
        .unwrap();
        assert!(matches!(cli.feature_mode, Some(FeatureModeArg::Sequence)));
        assert_eq!(cli.views, vec!["source", "target"]);
        assert!(cli.skip_if_current);
        assert_eq!(cli.storage_root, PathBuf::from(".metacollect"));
    }

    #[test]
    fn line_corpus_runs_end_to_end_from_an_experiment_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("corpus.txt"), "plum tart\nfig jam\n").unwrap();
        let config = temp.path().join("experiment.json");
        fs::write(
            &config,
            r#"{
                "corpus": {"type": "lines", "path": "corpus.txt"},
                "extractors": [{"identity": "ng", "implementation": "ngram"}]
            }"#,
        )
        .unwrap();
        let storage = temp.path().join("store");
        let config_arg = config.to_string_lossy().into_owned();
        let storage_arg = storage.to_string_lossy().into_owned();

        run_meta_collection(args(&["--config", &config_arg, "--storage-root", &storage_arg]))
            .unwrap();
        assert!(storage.join(META_KEY).join("ng-ngrams.bin").is_file());
        assert!(storage.join(META_KEY).join(MANIFEST_FILENAME).is_file());

        run_meta_collection(args(&[
            "--config",
            &config_arg,
            "--storage-root",
            &storage_arg,
            "--skip-if-current",
        ]))
        .unwrap();
    }

    #[test]
    fn relative_keyword_files_resolve_next_to_the_experiment_file() {
        let temp = tempdir().unwrap();
        let experiment_dir = temp.path().join("experiment");
        fs::create_dir_all(&experiment_dir).unwrap();
        fs::write(experiment_dir.join("kw.txt"), "plum\nfig\n").unwrap();
        fs::write(experiment_dir.join("corpus.txt"), "plum and fig\nfig tart\n").unwrap();
        let config = experiment_dir.join("experiment.json");
        fs::write(
            &config,
            r#"{
                "corpus": {"type": "lines", "path": "corpus.txt"},
                "extractors": [{
                    "identity": "kw",
                    "implementation": "keyword_ngram",
                    "parameters": {"keywords_file": "kw.txt", "max_n": 2}
                }]
            }"#,
        )
        .unwrap();
        let storage = temp.path().join("store");
        let config_arg = config.to_string_lossy().into_owned();
        let storage_arg = storage.to_string_lossy().into_owned();

        run_meta_collection(args(&["--config", &config_arg, "--storage-root", &storage_arg]))
            .unwrap();
        let table =
            read_frequency_table(&storage.join(META_KEY).join("kw-keyword_ngrams.bin")).unwrap();
        assert_eq!(table.count("plum_fig"), Some(1));
        assert_eq!(table.count("fig"), Some(2));
    }
}
