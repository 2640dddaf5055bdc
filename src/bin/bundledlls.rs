extern crate bundledlls;

use anyhow::Context;
use bundledlls::bundle::{Bundler, Compressor};
use bundledlls::{
    gather_dependencies, path_to_string, Blacklist, BundleParameters, LookupQuery, ObjdumpReader,
};
use clap::{ArgAction, Parser};
use fs_err as fs;
use slog::{debug, o, Drain, Level, LevelFilter, Logger};
use slog_term::{FullFormat, TermDecorator};
use std::path::PathBuf;
use std::sync::Mutex;

/// Find the DLLs a MinGW-built executable needs and optionally copy them next to it
///
/// DLLs are searched recursively under the roots listed in MINGW_BUNDLEDLLS_SEARCH_PATH
/// (separated by '|'), or under well-known MinGW install locations if it is not set.
#[derive(Parser, Debug)]
#[command(name = "bundledlls", version)]
struct Args {
    /// Target file (.exe or .dll)
    input: PathBuf,

    /// Also write the list of dependencies to this file, one path per line
    #[arg(long = "log", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Replace the default blacklist with the names in this file (one per line, '#' comments)
    #[arg(long, value_name = "FILE")]
    blacklist: Option<PathBuf>,

    /// Copy the dependencies into the directory of the target file
    #[arg(long)]
    copy: bool,

    /// Skip dependencies that can't be found instead of failing
    #[arg(long)]
    force: bool,

    /// Compress every copied DLL with UPX (requires --copy)
    #[arg(long)]
    upx: bool,

    /// objdump program used to read import tables (default: $MINGW_BUNDLEDLLS_OBJDUMP or objdump)
    #[arg(long, value_name = "PROGRAM")]
    objdump: Option<PathBuf>,

    /// Path for output in JSON format
    #[arg(short = 'j', long, value_name = "OUTPUT_JSON_PATH")]
    output_json_path: Option<PathBuf>,

    /// Verbosity level (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn make_logger(verbosity: u8) -> Logger {
    let level = match verbosity {
        0 => Level::Warning,
        1 => Level::Info,
        _ => Level::Debug,
    };
    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = Mutex::new(drain).fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    Logger::root(drain, o!())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let parameters = BundleParameters {
        force: args.force,
        copy: args.copy,
        upx: args.upx,
    };
    parameters.validate()?;

    let log = make_logger(args.verbose);

    if !args.input.exists() {
        eprintln!(
            "Specified file not found at {}\nCurrent working directory: {}",
            path_to_string(&args.input),
            path_to_string(std::env::current_dir()?),
        );
        std::process::exit(1);
    }

    if args.input.is_dir() {
        eprintln!(
            "The specified path is a directory, not a PE executable file: {}",
            path_to_string(&args.input),
        );
        std::process::exit(1);
    }

    let mut query = LookupQuery::deduce_from_executable_location(&args.input);
    query.parameters = parameters;

    if let Some(blacklist_path) = &args.blacklist {
        query.blacklist = Blacklist::from_file(blacklist_path)
            .with_context(|| format!("couldn't read blacklist {}", blacklist_path.display()))?;
        debug!(log, "blacklist replaced"; "entries" => ?query.blacklist.sorted());
    }

    let search_path: Vec<String> = query.search_path.iter().map(path_to_string).collect();
    println!("Search path: [{}]", search_path.join(", "));

    let reader = match &args.objdump {
        Some(program) => ObjdumpReader::new(program)?,
        None => ObjdumpReader::from_env()?,
    };
    debug!(log, "reading imports"; "objdump" => %reader.program().display());

    let dependencies = gather_dependencies(&query, &reader, log.clone())?;

    for d in dependencies.iter() {
        println!("{}", path_to_string(d));
    }

    if let Some(log_path) = &args.log_file {
        let mut content = String::new();
        for d in dependencies.iter() {
            content.push_str(&path_to_string(d));
            content.push('\n');
        }
        fs::write(log_path, content)
            .with_context(|| format!("couldn't write to {}", log_path.display()))?;
    }

    if let Some(json_output_path) = &args.output_json_path {
        let js = serde_json::to_string(&dependencies).context("Error serializing")?;
        fs::write(json_output_path, js)
            .with_context(|| format!("couldn't write to {}", json_output_path.display()))?;
    }

    if query.parameters.copy {
        let compressor = query.parameters.upx.then(Compressor::default);
        let bundler = Bundler::new(&query.target_dir, compressor, log.clone());
        let report = bundler.bundle(dependencies.iter());
        println!("{} file(s) copied", report.copied.len());
        for (src, reason) in &report.failed {
            eprintln!("Could not copy {}: {}", path_to_string(src), reason);
        }
    }

    Ok(())
}
