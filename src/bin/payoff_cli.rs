use payoff_core::{cli, init};

fn main() {
    init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = if args.is_empty() {
        cli::run_cli()
    } else {
        cli::run_headless(&args)
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
