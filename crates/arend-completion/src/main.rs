//
// main.rs
//
// Command-line entry point for keyword completion over tree snapshots.
//

use std::env;

use arend_completion::cli::complete;
use arend_completion::perf;

fn print_usage() {
    println!(
        "arend-completion {}, keyword completion for Arend.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: arend-completion complete <snapshot.json> [OPTIONS]

Available options:

--offset N                   Cursor byte offset (default: the placeholder identifier)
--prefix P                   Raw prefix typed before the cursor
--config FILE                JSON settings file with a "completion" section
--json                       Print candidates as JSON
--version                    Print the version
--help                       Print this help message

"#
    );
}

fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let Some(command) = argv.next() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "--version" => {
            println!("arend-completion {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "--help" => {
            print_usage();
            Ok(())
        }
        "complete" => {
            let args = complete::parse_args(&mut argv).map_err(|e| anyhow::anyhow!(e))?;

            env_logger::init();

            let (_tree, candidates) = complete::run_complete(&args)?;
            if args.json {
                complete::print_results_json(&candidates)?;
            } else {
                complete::print_results(&candidates);
            }
            perf::log_summary();
            Ok(())
        }
        other => Err(anyhow::anyhow!("Unknown argument: '{other}'")),
    }
}
