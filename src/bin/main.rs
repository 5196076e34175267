use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bgpkit_originas::{
    parse_fields, AnnotateOptions, Annotator, AsNameDirectory, OriginAsError, OriginIndex,
};
use clap::Parser;

/// bgpkit-originas reads delimited records from stdin and appends the origin AS of selected
/// fields, looked up in text routing table dumps.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Routing table dumps ("show ip bgp" output), plain or gzip compressed.
    /// Defaults to bgp4.txt and bgp6.txt.
    #[clap(name = "FILES")]
    files: Vec<PathBuf>,

    /// Also print the announced prefix each field matched; disables merging of adjacent ranges
    #[clap(short = 'm', long)]
    show_prefix: bool,

    /// Field delimiter of input records; only the first character is used
    #[clap(short, long, default_value = ",")]
    delimiter: String,

    /// Comma separated 1-based indices of the fields to resolve
    #[clap(short, long, default_value = "1")]
    fields: String,

    /// Print AS names instead of numbers
    #[clap(short = 'n', long)]
    names: bool,

    /// AS name directory used with --names
    #[clap(long, default_value = "asn.txt")]
    names_file: PathBuf,

    /// Print the deaggregated ranges of both families and exit
    #[clap(long)]
    print_ranges: bool,
}

fn main() {
    let opts: Opts = Opts::parse();

    env_logger::init();

    if let Err(e) = run(opts) {
        if let OriginAsError::IoError(io_err) = &e {
            if io_err.kind() == std::io::ErrorKind::BrokenPipe {
                std::process::exit(0);
            }
        }
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> Result<(), OriginAsError> {
    let options = AnnotateOptions {
        delimiter: opts.delimiter.chars().next().unwrap_or(','),
        fields: parse_fields(&opts.fields)?,
        show_prefix: opts.show_prefix,
        use_names: opts.names,
    };

    let files = match opts.files.is_empty() {
        true => vec!["bgp4.txt".to_string(), "bgp6.txt".to_string()],
        false => opts
            .files
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect(),
    };
    let index = OriginIndex::from_dumps(&files, !options.show_prefix)?;

    if opts.print_ranges {
        let mut stdout = BufWriter::new(std::io::stdout().lock());
        index.write_ranges(&mut stdout)?;
        stdout.flush()?;
        return Ok(());
    }

    let names = match options.use_names {
        true => Some(AsNameDirectory::load(&opts.names_file.to_string_lossy())?),
        false => None,
    };
    let mut annotator = Annotator::new(&index, options);
    if let Some(names) = &names {
        annotator = annotator.with_names(names);
    }

    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    annotator.run(stdin, &mut stdout)?;
    Ok(())
}
