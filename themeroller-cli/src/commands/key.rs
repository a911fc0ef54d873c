//! Key command - print the canonical filename for a request.

use clap::Args;
use themeroller::{ImageParams, ImageRequest};

use crate::error::CliError;

/// Arguments for the key command.
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// A filename to normalize, e.g. ui-bg_flat_75_fff_40x100.png
    #[arg(required_unless_present = "json", conflicts_with = "json")]
    pub filename: Option<String>,

    /// Parameters as JSON, e.g. '{"icon": {"color": "fff"}}'
    #[arg(long, value_name = "PARAMS")]
    pub json: Option<String>,

    /// Also print the normalized parameters
    #[arg(long)]
    pub params: bool,
}

/// Run the key command.
pub fn run(args: KeyArgs) -> Result<(), CliError> {
    let request = parse_request(&args)?;
    println!("{}", request.filename());

    if args.params {
        let json = serde_json::to_string_pretty(&request.to_params())
            .map_err(|e| CliError::Config(e.to_string()))?;
        println!("{}", json);
    }
    Ok(())
}

fn parse_request(args: &KeyArgs) -> Result<ImageRequest, CliError> {
    let request = match (&args.json, &args.filename) {
        (Some(json), _) => ImageRequest::from_params(ImageParams::from_json(json)?)?,
        (None, Some(filename)) => ImageRequest::parse(filename)?,
        (None, None) => {
            return Err(CliError::Config(
                "a filename or --json is required".to_string(),
            ))
        }
    };
    Ok(request)
}
