use super::{Labels, VERSION};
use clap::{App, Arg};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const N_ARGS: usize = 5;

/// Input, labels and output of one plot, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotArgs {
    pub csvin: PathBuf,
    pub labels: Labels,
    pub fout: PathBuf,
}

pub fn usage(program: &str) -> String {
    format!(
        "{} <data.csv> <plot-title> <x-label> <y-label> <output>",
        program
    )
}

/// file name of argv[0] without extension, or the crate name
pub fn program_name(argv0: Option<&OsString>) -> String {
    argv0
        .and_then(|a| Path::new(a).file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Takes the CLI arguments of the current process.
pub fn parse_cli() -> Option<PlotArgs> {
    parse_cli_from(std::env::args_os())
}

/// Takes the program name followed by exactly five positional arguments.
/// Any other count gives None.
/// The values go to clap after "--", so titles like "-n" or "--help" stay values.
pub fn parse_cli_from<I, T>(args: I) -> Option<PlotArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() != N_ARGS + 1 {
        return None;
    }
    let mut argv = args;
    argv.insert(1, OsString::from("--"));

    let arg_csvin = Arg::with_name("data_csvfile")
        .help("csv file with Size and Time columns")
        .index(1)
        .required(true)
        .empty_values(true);
    let arg_title = Arg::with_name("plot_title")
        .help("title of the chart")
        .index(2)
        .required(true)
        .empty_values(true);
    let arg_xlabel = Arg::with_name("x_label")
        .help("description of the x axis")
        .index(3)
        .required(true)
        .empty_values(true);
    let arg_ylabel = Arg::with_name("y_label")
        .help("description of the y axis")
        .index(4)
        .required(true)
        .empty_values(true);
    let arg_fout = Arg::with_name("output_file")
        .help("output image, format from the extension (svg, png, ...)")
        .index(5)
        .required(true)
        .empty_values(true);
    let cli_args = App::new("sizetime_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot Time against Size from a csv file")
        .arg(arg_csvin)
        .arg(arg_title)
        .arg(arg_xlabel)
        .arg(arg_ylabel)
        .arg(arg_fout)
        .get_matches_from_safe(argv)
        .ok()?;

    let path = |name: &str| cli_args.value_of_os(name).map(PathBuf::from);
    let text = |name: &str| cli_args.value_of_lossy(name).map(|v| v.into_owned());
    Some(PlotArgs {
        csvin: path("data_csvfile")?,
        labels: Labels {
            title: text("plot_title")?,
            x: text("x_label")?,
            y: text("y_label")?,
        },
        fout: path("output_file")?,
    })
}
