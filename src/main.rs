//! stackrunner binary entry point.

fn main() {
    let code = match stackrunner::cli::run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}
