//! LUT synthesis - Command Line Interface
//!
//! Compiles a file of equations (one `name = expression` per line) onto a
//! LUT fabric and writes the resulting bitstream as JSON.

use clap::{Parser, Subcommand, ValueEnum};
use lut_synth::{
    compile_with, report, CompileConfig, ConnectivityScheme, FabricState, PlacementPolicy,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Constrained if any equation reads another or a scheme is given
    Auto,
    /// Any LUT in any cell
    Free,
    /// Producers strictly left of consumers
    Constrained,
}

impl From<Policy> for PlacementPolicy {
    fn from(val: Policy) -> Self {
        match val {
            Policy::Auto => PlacementPolicy::Auto,
            Policy::Free => PlacementPolicy::Free,
            Policy::Constrained => PlacementPolicy::Constrained,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Show {
    /// LUT names, locations and configurations
    Luts,
    /// LUT-to-LUT and LUT-to-pin connections
    Connections,
    /// External input and output pins
    Externals,
    /// Resource usage
    Utilization,
    /// Fabric shape, equations and usage
    Summary,
    /// Truth table of each equation
    Tables,
    /// Karnaugh map of each equation of up to four literals
    Kmaps,
}

#[derive(Parser, Debug)]
#[command(name = "lutsynth")]
#[command(about = "Compile Boolean equations onto a LUT fabric", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an equation file
    Compile {
        /// Equation file, one equation per line
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of LUTs in the fabric
        #[arg(short = 'n', long = "luts")]
        luts: usize,

        /// LUT arity (4 or 6)
        #[arg(short = 'k', long = "arity", default_value_t = 4)]
        arity: usize,

        /// Connectivity scheme (JSON)
        #[arg(short = 'c', long = "connectivity")]
        connectivity: Option<PathBuf>,

        /// Placement policy
        #[arg(short = 'p', long = "policy", value_enum, default_value = "auto")]
        policy: Policy,

        /// Map equations as written, skipping minimization
        #[arg(long = "no-minimize")]
        no_minimize: bool,

        /// Bitstream output file (stdout if not specified)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Reports to print to stderr
        #[arg(short = 's', long = "show", value_enum)]
        show: Vec<Show>,
    },
    /// Print reports for an existing bitstream
    Inspect {
        /// Bitstream file (JSON)
        #[arg(value_name = "BITSTREAM")]
        input: PathBuf,

        /// Reports to print (summary if not specified)
        #[arg(short = 's', long = "show", value_enum)]
        show: Vec<Show>,
    },
}

/// Non-empty lines that are not `#` comments
fn read_equations(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn show<W: Write>(fabric: &FabricState, views: &[Show], writer: &mut W) -> io::Result<()> {
    for view in views {
        match view {
            Show::Luts => report::write_lut_assignments(fabric, writer)?,
            Show::Connections => report::write_connections(fabric, writer)?,
            Show::Externals => report::write_externals(fabric, writer)?,
            Show::Utilization => report::write_utilization(fabric, writer)?,
            Show::Summary => report::write_summary(fabric, writer)?,
            Show::Tables => report::write_truth_tables(fabric, writer)?,
            Show::Kmaps => report::write_karnaugh_maps(fabric, writer)?,
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_compile(
    input: &Path,
    luts: usize,
    arity: usize,
    connectivity: Option<&Path>,
    policy: Policy,
    no_minimize: bool,
    output: Option<&Path>,
    views: &[Show],
) -> Result<(), Box<dyn std::error::Error>> {
    let equations = read_equations(input)
        .map_err(|e| format!("Error reading equation file '{}': {}", input.display(), e))?;

    let mut config = CompileConfig::new(luts, arity);
    config.policy = policy.into();
    config.minimize = !no_minimize;
    if let Some(path) = connectivity {
        let file = fs::File::open(path).map_err(|e| {
            format!("Error reading connectivity file '{}': {}", path.display(), e)
        })?;
        config.connectivity = Some(ConnectivityScheme::from_reader(io::BufReader::new(file))?);
    }

    let fabric = compile_with(&equations, &config)?;

    match output {
        Some(path) => fabric.to_bitstream_file(path)?,
        None => fabric.write_bitstream(&mut io::stdout().lock())?,
    }
    show(&fabric, views, &mut io::stderr().lock())?;
    Ok(())
}

fn run_inspect(input: &Path, views: &[Show]) -> Result<(), Box<dyn std::error::Error>> {
    let fabric = FabricState::from_bitstream_file(input)
        .map_err(|e| format!("Error reading bitstream '{}': {}", input.display(), e))?;
    let views = if views.is_empty() {
        &[Show::Summary][..]
    } else {
        views
    };
    show(&fabric, views, &mut io::stdout().lock())?;
    Ok(())
}

fn main() {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let result = match &args.command {
        Command::Compile {
            input,
            luts,
            arity,
            connectivity,
            policy,
            no_minimize,
            output,
            show,
        } => run_compile(
            input,
            *luts,
            *arity,
            connectivity.as_deref(),
            *policy,
            *no_minimize,
            output.as_deref(),
            show,
        ),
        Command::Inspect { input, show } => run_inspect(input, show),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
