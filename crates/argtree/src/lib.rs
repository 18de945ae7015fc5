//! Minimal argument parsing with typed options and nested commands.
//!
//! Register options and commands on an [`ArgParser`], hand it argv, and read
//! the results back off the parser tree:
//!
//! ```
//! use argtree::{ArgParser, ParseOutcome};
//!
//! let mut parser = ArgParser::new().with_help("Usage: app [--verbose] <command>");
//! parser.add_flag("verbose v");
//! parser.add_cmd("boil", "Usage: app boil [--time N]").add_int("time t", 10);
//!
//! let outcome = parser.parse(["-v", "boil", "-t", "12", "kettle"]).unwrap();
//! assert_eq!(outcome, ParseOutcome::Complete);
//! assert!(parser.get_flag("verbose"));
//!
//! let (name, boil) = parser.command().unwrap();
//! assert_eq!(name, "boil");
//! assert_eq!(boil.get_int("time"), 12);
//! assert_eq!(boil.arg(0), Some("kettle"));
//! ```
//!
//! Parsing never exits the process. `--help`, `--version` and `help <command>`
//! come back as [`ParseOutcome`] variants and user errors as [`ParseError`];
//! [`ArgParser::parse_or_exit`] turns both into the usual exit behavior.

pub mod cursor;
pub mod error;
pub mod parser;
pub mod positional;
pub mod value;

pub use cursor::TokenCursor;
pub use error::{ParseError, ParseResult};
pub use parser::{ArgParser, Callback, ParseOutcome};
pub use positional::Positionals;
pub use value::{OptionKind, OptionValue, Value};
