use sizetime_plot::plot::{parse_cli, program_name, usage};
use sizetime_plot::{DataError, SizeTime};

fn main() -> Result<(), DataError> {
    let args = match parse_cli() {
        Some(args) => args,
        None => {
            println!("{}", usage(&program_name(std::env::args_os().next().as_ref())));
            return Ok(());
        }
    };
    println!(
        "read data from {} and plot to {}",
        args.csvin.display(),
        args.fout.display()
    );
    let st = SizeTime::from_csv(&args.csvin)?;
    st.plot(&args.labels, &args.fout)?;
    println!("plotted {} points to {}", st.len(), args.fout.display());
    Ok(())
}
