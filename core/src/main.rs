use clap::Parser;
use log::{error, info};
use radiocohort_core::cli::{setup_logging, ExtractCli, OutputFormat};
use radiocohort_core::{run_extraction, ColorLut, PyRadiomicsCli, TextReport};

fn main() {
    let cli = ExtractCli::parse();

    setup_logging(cli.verbose);

    let lut = match &cli.lut {
        Some(path) => match ColorLut::from_file(path) {
            Ok(lut) => lut,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        },
        None => ColorLut::embedded(),
    };
    info!("Color lookup table: {} entries", lut.len());

    let mut extractor = PyRadiomicsCli::new(&cli.pyradiomics);
    if let Some(params) = &cli.params {
        extractor = extractor.with_params(params);
    }

    let summary = match run_extraction(&cli.master, &lut, &extractor) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Extraction aborted: {}", e);
            eprintln!("Error: {}", e);
            return;
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", TextReport::extraction(&summary)),
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        },
    }
}
