use anyhow::Result;
use clap::Parser;
use pkgfold::archive::SaveMode;
use pkgfold::commands::{self, ConsoleContext};
use pkgfold::runtime::RealRuntime;
use pkgfold::settings::{MachineWideConfig, RestoreSettingsRequest};
use std::io::{self, Write};
use std::path::PathBuf;

/// pkgfold - folder package store
///
/// Install and remove versioned package archives in a plain directory, and
/// resolve the restore settings (sources, fallback folders, packages path)
/// a project would use.
///
/// Examples:
///   pkgfold install Foo 1.0.0 ./Foo.1.0.0.nupkg
///   pkgfold restore-settings --project ./app/app.csproj --source clear
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGFOLD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package store root (defaults to ./packages; also via PKGFOLD_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PKGFOLD_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package archive into the store
    Install(InstallArgs),

    /// Remove an installed package
    Uninstall(PackageArgs),

    /// Print whether a package is installed
    Exists(PackageArgs),

    /// Resolve restore settings for a project and print them as JSON
    RestoreSettings(RestoreArgs),
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Package id
    pub id: String,

    /// Package version, e.g. 1.0.0 or 2.1.0-beta.1
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Path to the package archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// What to write into the package folder
    #[arg(long, value_enum, default_value_t = SaveMode::default())]
    pub save_mode: SaveMode,
}

#[derive(clap::Args, Debug)]
pub struct RestoreArgs {
    /// Project file; its directory is where config discovery starts
    #[arg(long, value_name = "FILE")]
    pub project: PathBuf,

    /// Solution directory holding an optional .pkgfold/pkgfold.json
    #[arg(long, value_name = "DIR")]
    pub solution_dir: Option<PathBuf>,

    /// Use only this config file
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Global packages folder override
    #[arg(long, value_name = "PATH")]
    pub packages_path: Option<String>,

    /// Project package source (repeatable; "clear" drops configured sources)
    #[arg(long = "source", value_name = "SOURCE")]
    pub sources: Option<Vec<String>>,

    /// Source that replaces every other source (repeatable)
    #[arg(long = "source-override", value_name = "SOURCE")]
    pub sources_override: Option<Vec<String>>,

    /// Project fallback folder (repeatable; "clear" drops configured folders)
    #[arg(long = "fallback-folder", value_name = "DIR")]
    pub fallback_folders: Option<Vec<String>>,

    /// Fallback folder that replaces every other folder (repeatable)
    #[arg(long = "fallback-folder-override", value_name = "DIR")]
    pub fallback_folders_override: Option<Vec<String>>,

    /// JSON file with per-framework restore items
    #[arg(long, value_name = "FILE")]
    pub per_framework: Option<PathBuf>,

    /// Directory holding machine-wide pkgfold.json (also via PKGFOLD_MACHINE_CONFIG)
    #[arg(long, env = "PKGFOLD_MACHINE_CONFIG", value_name = "DIR")]
    pub machine_config: Option<PathBuf>,
}

impl RestoreArgs {
    fn into_request(self) -> RestoreSettingsRequest {
        RestoreSettingsRequest {
            project_path: self.project,
            solution_dir: self.solution_dir,
            config_file: self.config_file,
            packages_path: self.packages_path,
            sources: self.sources,
            sources_override: self.sources_override,
            fallback_folders: self.fallback_folders,
            fallback_folders_override: self.fallback_folders_override,
            per_framework: Vec::new(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            commands::install(
                &runtime,
                cli.root,
                &args.package.id,
                &args.package.version,
                &args.archive,
                args.save_mode,
                &ConsoleContext,
            )?;
        }
        Commands::Uninstall(args) => {
            commands::uninstall(&runtime, cli.root, &args.id, &args.version, &ConsoleContext)?;
        }
        Commands::Exists(args) => {
            let installed = commands::exists(&runtime, cli.root, &args.id, &args.version)?;
            let _ = writeln!(io::stdout().lock(), "{}", installed);
        }
        Commands::RestoreSettings(args) => {
            let machine_wide = match &args.machine_config {
                Some(dir) => MachineWideConfig::from_dir(&runtime, dir)?,
                None => MachineWideConfig::default(),
            };
            let per_framework = args.per_framework.clone();
            let settings = commands::restore_settings(
                &runtime,
                &machine_wide,
                args.into_request(),
                per_framework.as_deref(),
            )?;
            let json = serde_json::to_string_pretty(&settings)?;
            let _ = writeln!(io::stdout().lock(), "{}", json);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["pkgfold", "install", "Foo", "1.0.0", "foo.nupkg"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.package.id, "Foo");
                assert_eq!(args.package.version, "1.0.0");
                assert_eq!(args.archive, PathBuf::from("foo.nupkg"));
                assert_eq!(args.save_mode, SaveMode::ArchiveOnly);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_save_mode_parsing() {
        let cli = Cli::try_parse_from([
            "pkgfold",
            "install",
            "Foo",
            "1.0.0",
            "foo.nupkg",
            "--save-mode",
            "archive-and-files",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => assert_eq!(args.save_mode, SaveMode::ArchiveAndFiles),
            _ => panic!("Expected Install command"),
        }

        let result = Cli::try_parse_from([
            "pkgfold",
            "install",
            "Foo",
            "1.0.0",
            "foo.nupkg",
            "--save-mode",
            "everything",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from(["pkgfold", "--root", "/tmp/store", "exists", "Foo", "1.0"])
            .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/store")));

        let cli = Cli::try_parse_from(["pkgfold", "uninstall", "Foo", "1.0", "-r", "/tmp/other"])
            .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/other")));
    }

    #[test]
    fn test_cli_restore_settings_parsing() {
        let cli = Cli::try_parse_from([
            "pkgfold",
            "restore-settings",
            "--project",
            "app/app.csproj",
            "--source",
            "a",
            "--source",
            "b",
            "--fallback-folder",
            "clear",
        ])
        .unwrap();
        match cli.command {
            Commands::RestoreSettings(args) => {
                let request = args.into_request();
                assert_eq!(request.project_path, PathBuf::from("app/app.csproj"));
                assert_eq!(
                    request.sources,
                    Some(vec!["a".to_string(), "b".to_string()])
                );
                assert_eq!(request.fallback_folders, Some(vec!["clear".to_string()]));
                assert!(request.sources_override.is_none());
            }
            _ => panic!("Expected RestoreSettings command"),
        }
    }

    #[test]
    fn test_cli_restore_settings_requires_project() {
        let result = Cli::try_parse_from(["pkgfold", "restore-settings"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["pkgfold", "Foo"]);
        assert!(result.is_err());
    }
}
