use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use memplot_core::cdecl::parse_c_type;
use memplot_core::config::Config;
use memplot_core::dumper::{ArrayDumper, LayoutOverrides, ERROR_CATEGORY};
use memplot_core::dwarf::SymbolIndex;
use memplot_core::error::{MemplotError, Result};
use memplot_core::host::{catch_errors, DumperHost};
use memplot_core::inference::{infer_layout, Inference};
use memplot_core::memory::{ProcessMemory, SliceMemory};
use memplot_core::registry::{RegistryTable, IMAGE_PLOT_TAG};
use memplot_core::types::{Address, DType, DebugValue, ProcessId, Shape};
use memplot_utils::{info, init_logging_with, LogFormat, LogLevel};

mod console;

use console::ConsoleHost;

/// Plot and export C arrays straight out of a running process or a memory dump.
#[derive(Parser, Debug)]
#[command(name = "memplot")]
#[command(version)]
#[command(about = "Plot and export C arrays from process memory", long_about = None)]
struct Cli
{
    /// TOML configuration file (defaults to $MEMPLOT_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level: error, warn, info, debug or trace (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format: pretty or json (overrides MEMPLOT_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List the registry tags and their formats
    Formats,
    /// Show a global variable's type and inferred array layout
    Describe
    {
        /// Binary with debug info
        binary: PathBuf,
        /// Name of the global variable
        symbol: String,
    },
    /// Snapshot a global array of a running process and transform it
    Inspect
    {
        /// Process ID (PID) of the running binary
        pid: u32,
        /// Binary with debug info the process was started from
        binary: PathBuf,
        /// Name of the global variable
        symbol: String,
        /// Registry to use (debug::ImagePlot or debug::ArrayExport)
        #[arg(long, default_value = IMAGE_PLOT_TAG)]
        tag: String,
        /// 1-based format within the registry (default: the first)
        #[arg(short, long)]
        format: Option<usize>,
        /// Address the binary was loaded at (default: read /proc/<pid>/maps)
        #[arg(long)]
        load_base: Option<Address>,
        /// Print the whole Data / Image / Export tree, each child with its first format
        #[arg(long, default_value_t = false, conflicts_with_all = ["tag", "format"])]
        expand: bool,
    },
    /// Transform an array stored in a raw memory dump
    Render
    {
        /// File holding the dumped bytes
        dump: PathBuf,
        /// C declaration of the array, e.g. "float[4][4]"
        #[arg(long = "type")]
        ty: String,
        /// Address the first dumped byte was read from
        #[arg(long, default_value = "0")]
        base: Address,
        /// Address of the array (default: --base)
        #[arg(long)]
        at: Option<Address>,
        /// Registry to use (debug::ImagePlot or debug::ArrayExport)
        #[arg(long, default_value = IMAGE_PLOT_TAG)]
        tag: String,
        /// 1-based format within the registry (default: the first)
        #[arg(short, long)]
        format: Option<usize>,
        /// Override the inferred shape, e.g. 16x16
        #[arg(long)]
        shape: Option<Shape>,
        /// Override the inferred dtype, e.g. uint16
        #[arg(long)]
        dtype: Option<DType>,
        /// Print the whole Data / Image / Export tree, each child with its first format
        #[arg(long, default_value_t = false, conflicts_with_all = ["tag", "format", "shape", "dtype"])]
        expand: bool,
    },
}

fn main()
{
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the node tree
    let _log_guard = match init_logging_with(cli.log_level, cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    match run_command(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the dumper reported an error to the host
fn run_command(cli: Cli) -> Result<bool>
{
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    match cli.command {
        Commands::Formats => {
            for registry in RegistryTable::builtin().iter() {
                println!("{}", registry.tag());
                for (index, name) in registry.names().enumerate() {
                    println!("  {}. {name}", index + 1);
                }
            }
            Ok(true)
        }
        Commands::Describe { binary, symbol } => {
            let index = SymbolIndex::load(&binary)?;
            let value = find(&index, &symbol)?;
            println!("{}", value.name);
            println!("  address: {} (file)", value.address);
            println!("  type:    {}", value.ty);
            println!("  size:    {} bytes", value.ty.byte_size);
            match infer_layout(&value.ty) {
                Inference::Array(layout) => println!("  layout:  {layout}"),
                Inference::Unsupported(reason) => println!("  layout:  unsupported ({reason})"),
            }
            Ok(true)
        }
        Commands::Inspect {
            pid,
            binary,
            symbol,
            tag,
            format,
            load_base,
            expand,
        } => {
            let pid = ProcessId::from(pid);
            let mut index = SymbolIndex::load(&binary)?;
            let bias = match load_base {
                Some(base) => index.bias_for_base(base),
                None => index.bias_for_process(pid)?,
            };
            index.set_load_bias(bias);
            info!(%pid, binary = %binary.display(), bias = format_args!("{bias:#x}"), "inspecting process");

            let value = find(&index, &symbol)?;
            let mut host = ConsoleHost::new(Box::new(ProcessMemory::new(pid)), expand, format);
            Ok(show(&config, &mut host, &value, &tag, &LayoutOverrides::default()))
        }
        Commands::Render {
            dump,
            ty,
            base,
            at,
            tag,
            format,
            shape,
            dtype,
            expand,
        } => {
            let bytes = fs::read(&dump)?;
            info!(dump = %dump.display(), len = bytes.len(), %base, "loaded memory dump");

            let name = dump
                .file_stem()
                .map_or_else(|| "dump".to_string(), |stem| stem.to_string_lossy().into_owned());
            let value = DebugValue::new(name, at.unwrap_or(base), parse_c_type(&ty)?);
            let mut host = ConsoleHost::new(Box::new(SliceMemory::new(base, bytes)), expand, format);
            Ok(show(&config, &mut host, &value, &tag, &LayoutOverrides { shape, dtype }))
        }
    }
}

fn find(index: &SymbolIndex, symbol: &str) -> Result<DebugValue>
{
    index
        .find_variable(symbol)?
        .ok_or_else(|| MemplotError::SymbolNotFound(symbol.to_string()))
}

/// Run the dumper, print the collected tree, and report whether it succeeded
fn show(config: &Config, host: &mut ConsoleHost, value: &DebugValue, tag: &str, overrides: &LayoutOverrides) -> bool
{
    let dumper = ArrayDumper::builtin(config);
    host.put_header(value);

    if host.is_expanded() {
        dumper.dump_c_style_array(host, value);
    } else {
        host.put_type(&value.ty.name);
        let shown = catch_errors(host, ERROR_CATEGORY, |host| dumper.plot_memory(host, value, tag, overrides));
        if let (Some(None), Inference::Unsupported(reason)) = (shown, infer_layout(&value.ty)) {
            host.put_value(&format!("<not plottable: {reason}>"));
        }
    }

    for line in host.lines() {
        println!("{line}");
    }
    host.failures() == 0
}
