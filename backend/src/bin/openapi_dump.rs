//! Print the OpenAPI document as JSON.

use std::io::{self, Write};
use std::process::ExitCode;

use starter_backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    let written = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => writeln!(io::stdout(), "{json}"),
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "failed to serialise OpenAPI document: {err}");
            return ExitCode::FAILURE;
        }
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
