use std::process::ExitCode;

use case_search::search::api::SearchResponse;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    match case_search::run() {
        Ok(code) => code,
        Err(err) => {
            let response = SearchResponse::error(format!("{err:#}"), None);
            if case_search::emit(&response, false).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
