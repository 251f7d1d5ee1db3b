use clap::Parser;
use log::{error, info, warn};
use maxprep_core::{AnalyseOptions, MaxAnalyser, MaxprepError};
use std::path::PathBuf;

/// Prepare and launch a scene-analysis pass for a 3ds Max render job.
#[derive(Parser)]
#[command(name = "maxprep", version)]
struct Cli {
    /// Scene file to analyse
    cg_file: PathBuf,

    /// Render software version, e.g. "2018"
    #[arg(long)]
    software_version: String,

    /// Project name recorded in the task description
    #[arg(long)]
    project_name: String,

    /// Workspace root for run directories (must exist; defaults to
    /// ~/renderfarm_sdk, created on demand)
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Analyzer executable override
    #[arg(long)]
    max_exe_path: Option<PathBuf>,

    /// Camera to render; repeat for several cameras
    #[arg(long = "camera")]
    cameras: Vec<String>,

    /// Plugin as name=version; repeat for several plugins
    #[arg(long = "plugin", value_parser = parse_plugin)]
    plugins: Vec<(String, String)>,

    /// Renderfarm platform code
    #[arg(long, default_value = "2")]
    platform: String,

    /// Render software name
    #[arg(long, default_value = "3ds Max")]
    render_software: String,

    /// Do not load the upload manifest after analysis
    #[arg(long)]
    skip_upload: bool,

    /// Write the log to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_plugin(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, version)) if !name.is_empty() => {
            Ok((name.to_owned(), version.to_owned()))
        }
        _ => Err(format!("expected name=version, got '{raw}'")),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, log_file: Option<&PathBuf>) {
    let log_level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(log_level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    match log_file.and_then(|path| std::fs::File::create(path).ok()) {
        Some(file) => {
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .format(|buf, record| {
                    use std::io::Write;
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                });
        }
        None => {
            builder.format(|buf, record| {
                use std::io::Write;
                let level_style = match record.level() {
                    log::Level::Error => "\x1b[31mERROR\x1b[0m",
                    log::Level::Warn => "\x1b[33mWARN\x1b[0m",
                    log::Level::Info => "\x1b[32mINFO\x1b[0m",
                    log::Level::Debug => "\x1b[36mDEBUG\x1b[0m",
                    log::Level::Trace => "\x1b[35mTRACE\x1b[0m",
                };
                writeln!(buf, "[{}] {}", level_style, record.args())
            });
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_ref());

    match run_main(cli) {
        Ok(0) => {}
        Ok(code) => {
            warn!("analyzer exited with code {code}");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

fn run_main(cli: Cli) -> Result<i32, MaxprepError> {
    let mut options = AnalyseOptions::new(cli.cg_file, cli.software_version, cli.project_name);
    options.workspace = cli.workspace;
    options.max_exe_path = cli.max_exe_path;
    options.renderable_camera = cli.cameras;
    options.plugin_config = cli.plugins.into_iter().collect();
    options.platform = cli.platform;
    options.render_software = cli.render_software;

    let mut analyser = MaxAnalyser::new(options)?;
    let code = analyser.analyse(cli.skip_upload)?;

    info!("analysis artifacts in {}", analyser.run_dir().display());
    println!("{}", summary(analyser.run_dir(), code));
    Ok(code)
}

/// What a successful run prints: the run directory holding the artifacts
/// and the analyzer's exit code.
fn summary(run_dir: &std::path::Path, code: i32) -> String {
    format!("{}\nanalyzer exit code: {code}", run_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plugin_arguments_split_on_equals() {
        assert_eq!(
            parse_plugin("vray=5.0").unwrap(),
            ("vray".to_owned(), "5.0".to_owned())
        );
        assert!(parse_plugin("vray").is_err());
        assert!(parse_plugin("=5.0").is_err());
    }

    #[test]
    fn summary_names_run_dir_and_exit_code() {
        let text = summary(std::path::Path::new("/workspace/1700000000"), 0);
        assert!(text.starts_with("/workspace/1700000000"));
        assert!(text.ends_with("analyzer exit code: 0"));
    }

    #[test]
    fn cameras_and_plugins_repeat() {
        let cli = Cli::parse_from([
            "maxprep",
            "scene.max",
            "--software-version",
            "2018",
            "--project-name",
            "Project1",
            "--camera",
            "cam1",
            "--camera",
            "cam2",
            "--plugin",
            "vray=5.0",
        ]);
        assert_eq!(cli.cameras, vec!["cam1", "cam2"]);
        assert_eq!(cli.plugins, vec![("vray".to_owned(), "5.0".to_owned())]);
        assert_eq!(cli.platform, "2");
        assert_eq!(cli.render_software, "3ds Max");
    }
}
