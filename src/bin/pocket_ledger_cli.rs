use pocket_ledger::{cli::run_cli, errors::CliError, init};

fn main() {
    init();

    let result = std::env::current_dir()
        .map_err(CliError::from)
        .and_then(|base| run_cli(&base));

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
