//! vbuild: generate APKBUILDs from VELBUILD recipes.
//!
//! Usage:
//!   vbuild                          # same as `vbuild gen`
//!   vbuild -C pkgs/foo gen          # VELBUILD → APKBUILD + install scripts
//!   vbuild -C pkgs/foo validate     # check an APKBUILD
//!   vbuild dump --json VELBUILD     # print the parsed tables
//!   vbuild quote '$srcdir/x'        # print the quoted form of a value

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vbuild::config::{Config, ValidateConfig};
use vbuild::dialect::Dialect;
use vbuild::recipe::{Recipe, Velbuild, validate};
use vbuild::shell::Bash;
use vbuild::{Error, Result};

/// vbuild - APKBUILD generator for VELBUILD recipes
#[derive(Parser, Debug)]
#[command(name = "vbuild")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Change directory to DIR before running any commands
    #[arg(short = 'C', value_name = "DIR", default_value = ".", global = true)]
    directory: String,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config overlay to use instead of ~/.config/vbuild/config.toml
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    #[command(subcommand)]
    command: Option<SubCmd>,
}

#[derive(Subcommand, Debug)]
enum SubCmd {
    /// Generate the APKBUILD and install files for a given VELBUILD
    Gen,
    /// Check the APKBUILD for missing fields and inconsistencies
    Validate,
    /// Print the variables and functions a recipe declares
    Dump {
        /// Print JSON instead of recipe source
        #[arg(long)]
        json: bool,
        /// Recipe to read (default: DIR/VELBUILD)
        file: Option<PathBuf>,
    },
    /// Quote values the way generated recipes do
    Quote {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("vbuild: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::load(),
    };
    vbuild::logging::init(args.verbose, config.log_file().as_deref());

    match run(&args, &config) {
        Ok(code) => code,
        Err(e) => report(&e),
    }
}

fn run(args: &Args, config: &Config) -> Result<ExitCode> {
    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let directory = PathBuf::from(shellexpand::tilde(&args.directory).into_owned());
    let dialect = Dialect::from_config(&config.variables);
    let shell = Bash::from_config(&config.shell);
    log::debug!(
        "directory {}, shell {}",
        directory.display(),
        shell.program()
    );

    match args.command.as_ref().unwrap_or(&SubCmd::Gen) {
        SubCmd::Gen => generate(&directory, &shell, &dialect, &config.validate),
        SubCmd::Validate => {
            let recipe = Recipe::from_path(&directory.join("APKBUILD"), &shell, &dialect)?;
            let pkgname = recipe.pkgname().unwrap_or("APKBUILD").to_string();
            Ok(exit_code(print_diagnostics(&recipe, &pkgname, &config.validate)))
        }
        SubCmd::Dump { json, file } => {
            let path = file.clone().unwrap_or_else(|| directory.join("VELBUILD"));
            let recipe = Recipe::from_path(&path, &shell, &dialect)?;
            if *json {
                println!("{}", recipe.to_json()?);
            } else {
                println!("{}", recipe.text(&dialect)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        SubCmd::Quote { values } => {
            for value in values {
                println!("{}", dialect.automatic.quote(value)?);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn generate(
    directory: &Path,
    shell: &Bash,
    dialect: &Dialect,
    rules: &ValidateConfig,
) -> Result<ExitCode> {
    let recipe = Recipe::from_path(&directory.join("VELBUILD"), shell, dialect)?;
    let pkgname = recipe
        .pkgname()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::MissingField("pkgname".into()))?
        .to_string();

    println!(">>> {pkgname}: Generating APKBUILD");
    if print_diagnostics(&recipe, &pkgname, rules) {
        return Ok(ExitCode::FAILURE);
    }

    let written = Velbuild::new(recipe).save(directory, dialect)?;
    log::info!("{pkgname}: {} files written", written.len());
    Ok(ExitCode::SUCCESS)
}

/// Print validation output; true if any diagnostic is an error.
fn print_diagnostics(recipe: &Recipe, pkgname: &str, rules: &ValidateConfig) -> bool {
    let diagnostics = validate(recipe, rules);
    for diagnostic in &diagnostics {
        println!("{}", diagnostic.render(pkgname));
    }
    diagnostics.iter().any(|d| d.is_error())
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(error: &Error) -> ExitCode {
    match error {
        Error::MissingRecipe(_) => println!("{error}"),
        _ => match error.stderr() {
            // The shell already said what went wrong.
            Some(stderr) => eprint!("{stderr}"),
            None => eprintln!("vbuild: {error}"),
        },
    }
    ExitCode::FAILURE
}
