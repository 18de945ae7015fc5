mod report;

use anyhow::{Context, Result, bail};
use argtree::ArgParser;
use tracing_subscriber::{EnvFilter, fmt};

const HELP: &str = "\
Usage: argtree [OPTIONS] <COMMAND>

Demonstrates the argtree parser by echoing what it resolved.

Options:
  -v, --verbose   Print more detail
  -j, --json      Render reports as JSON
  --help          Show help information
  --version       Show version information

Commands:
  show, s   Print the resolved argument tree
  sum       Add up numbers
  help      Show help for a command";

const SHOW_HELP: &str = "\
Usage: argtree show [OPTIONS] [ARGS]...

Print every option, argument and command the parser resolved.

Options:
  -f, --format <FMT>   text or json [default: text]";

const SUM_HELP: &str = "\
Usage: argtree sum [OPTIONS] [NUMBERS]...

Add up the positional numbers and every --add value.

Options:
  -a, --add <X>...   Extra terms (takes every following number)";

fn main() -> Result<()> {
    // A missing .env is fine; it only supplies RUST_LOG.
    dotenvy::dotenv().ok();
    init_tracing();

    let mut parser = build_parser();
    parser.parse_env_or_exit();
    tracing::debug!(command = ?parser.cmd_name(), "parsed command line");

    match parser.command() {
        Some(("show" | "s", show)) => run_show(&parser, show),
        Some(("sum", sum)) => run_sum(&parser, sum),
        Some((other, _)) => bail!("'{other}' has no handler"),
        None => bail!("missing command"),
    }
}

fn build_parser() -> ArgParser {
    let mut parser = ArgParser::new()
        .with_help(HELP)
        .with_version(format!("argtree {}", env!("CARGO_PKG_VERSION")));
    parser.add_flag("verbose v").add_flag("json j");

    parser.add_cmd("show s", SHOW_HELP).add_str("format f", "text");
    parser.add_cmd("sum", SUM_HELP).add_float_list("add a", true);

    parser
}

fn run_show(root: &ArgParser, show: &ArgParser) -> Result<()> {
    tracing::debug!("executing show command");

    let format = if root.get_flag("json") {
        "json"
    } else {
        show.get_str("format")
    };
    let text = report::render(root, format)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn run_sum(root: &ArgParser, sum: &ArgParser) -> Result<()> {
    tracing::debug!("executing sum command");

    let mut terms = sum
        .args_as_floats()
        .context("sum only accepts numbers")?;
    terms.extend(sum.get_float_list("add"));

    if root.get_flag("verbose") {
        for term in &terms {
            eprintln!("+ {term}");
        }
    }

    let total: f64 = terms.iter().sum();
    if root.get_flag("json") {
        println!("{}", serde_json::json!({ "terms": terms, "total": total }));
    } else {
        println!("{total}");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
