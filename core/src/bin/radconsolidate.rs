use clap::Parser;
use log::error;
use radiocohort_core::cli::{setup_logging, ConsolidateCli, OutputFormat};
use radiocohort_core::{run_consolidation, Target, TextReport, TransformConfig};

fn main() {
    let cli = ConsolidateCli::parse();

    setup_logging(cli.verbose);

    let target = match Target::try_from(cli.target) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let config =
        match TransformConfig::from_files(cli.drop_columns.as_deref(), cli.drop_structures.as_deref())
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };

    let summary = match run_consolidation(&cli.master, target, &config) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Consolidation aborted: {}", e);
            eprintln!("Error: {}", e);
            return;
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", TextReport::consolidation(&summary)),
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        },
    }
}
