use clap::Parser;

use ledgerbook_cli::{Cli, finish, run};

fn main() {
    ledgerbook_observability::init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    let result = run(&cli, &mut stdout);
    std::process::exit(finish(result, &mut stdout));
}
