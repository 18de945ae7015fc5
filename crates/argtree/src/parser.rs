use std::fmt;

use indexmap::IndexMap;

use crate::cursor::{TokenCursor, is_value_like};
use crate::error::{ParseError, ParseResult};
use crate::positional::Positionals;
use crate::value::{OptionKind, OptionValue, Value};

/// Invoked once a command's parser has consumed the rest of argv.
///
/// Receives the command's own parser and the parser the command was
/// registered on, in that order.
pub type Callback = Box<dyn FnMut(&ArgParser, &ArgParser)>;

/// What a successful parse asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every token was consumed; the parser tree holds the results.
    Complete,
    /// `--help` or `help <command>` was requested. Holds the text to print.
    Help(String),
    /// `--version` was requested. Holds the text to print.
    Version(String),
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

struct Command {
    parser: ArgParser,
    callback: Option<Callback>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("parser", &self.parser)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct MatchedCommand {
    name: String,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Active,
    /// Entered on a literal `--`; never left.
    PositionalOnly,
}

/// Stores registered options and commands, and the results of parsing.
///
/// Every registered command owns an `ArgParser` of its own, so a parsed
/// command line resolves to a tree: each node holds its options and
/// positional arguments, and the node that matched a command links to that
/// command's node.
///
/// Option and command names may hold several whitespace-separated aliases
/// (`"verbose v"`); every alias resolves to the same underlying value.
#[derive(Debug, Default)]
pub struct ArgParser {
    help: Option<String>,
    version: Option<String>,
    options: Vec<OptionValue>,
    option_names: IndexMap<String, usize>,
    commands: Vec<Command>,
    command_names: IndexMap<String, usize>,
    arguments: Positionals,
    matched: Option<MatchedCommand>,
}

impl ArgParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplying help text activates the automatic `--help` flag.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Supplying a version string activates the automatic `--version` flag.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn version_text(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

fn bind_aliases(names: &mut IndexMap<String, usize>, spec: &str, index: usize, what: &str) {
    let mut bound = false;
    for alias in spec.split_whitespace() {
        assert!(
            !names.contains_key(alias),
            "{what} name '{alias}' is already registered"
        );
        names.insert(alias.to_string(), index);
        bound = true;
    }
    assert!(bound, "{what} name must contain at least one alias");
}

/// Process arguments without the program name. Bytes that are not valid
/// UTF-8 become U+FFFD instead of aborting the process.
fn env_args() -> impl Iterator<Item = String> {
    std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
}

// Registering options and commands.
impl ArgParser {
    fn register(&mut self, name: &str, option: OptionValue) -> &mut Self {
        let index = self.options.len();
        bind_aliases(&mut self.option_names, name, index, "option");
        self.options.push(option);
        self
    }

    /// Register a boolean option with a default value of `false`.
    pub fn add_flag(&mut self, name: &str) -> &mut Self {
        self.register(name, OptionValue::scalar(false))
    }

    pub fn add_str(&mut self, name: &str, default: impl Into<String>) -> &mut Self {
        self.register(name, OptionValue::scalar(Value::Str(default.into())))
    }

    pub fn add_int(&mut self, name: &str, default: i64) -> &mut Self {
        self.register(name, OptionValue::scalar(default))
    }

    pub fn add_float(&mut self, name: &str, default: f64) -> &mut Self {
        self.register(name, OptionValue::scalar(default))
    }

    /// Register a boolean list option, e.g. for counting `-vvv`.
    pub fn add_flag_list(&mut self, name: &str) -> &mut Self {
        self.register(name, OptionValue::list(OptionKind::Flag, false))
    }

    pub fn add_str_list(&mut self, name: &str, greedy: bool) -> &mut Self {
        self.register(name, OptionValue::list(OptionKind::String, greedy))
    }

    pub fn add_int_list(&mut self, name: &str, greedy: bool) -> &mut Self {
        self.register(name, OptionValue::list(OptionKind::Integer, greedy))
    }

    pub fn add_float_list(&mut self, name: &str, greedy: bool) -> &mut Self {
        self.register(name, OptionValue::list(OptionKind::Float, greedy))
    }

    /// Register a command and return its parser so options can be added to it.
    pub fn add_cmd(&mut self, name: &str, help: impl Into<String>) -> &mut ArgParser {
        self.insert_command(name, help.into(), None)
    }

    /// Register a command whose callback runs after the command's parser has
    /// consumed the rest of argv.
    pub fn add_cmd_with_callback<F>(
        &mut self,
        name: &str,
        help: impl Into<String>,
        callback: F,
    ) -> &mut ArgParser
    where
        F: FnMut(&ArgParser, &ArgParser) + 'static,
    {
        let callback: Callback = Box::new(callback);
        self.insert_command(name, help.into(), Some(callback))
    }

    fn insert_command(
        &mut self,
        name: &str,
        help: String,
        callback: Option<Callback>,
    ) -> &mut ArgParser {
        let index = self.commands.len();
        bind_aliases(&mut self.command_names, name, index, "command");
        self.commands.push(Command {
            parser: ArgParser::new().with_help(help),
            callback,
        });
        &mut self.commands[index].parser
    }
}

// Parsing.
impl ArgParser {
    /// Parse argument tokens. The program name must not be included.
    pub fn parse<I, S>(&mut self, args: I) -> ParseResult<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut cursor = TokenCursor::new(&tokens);
        self.parse_stream(&mut cursor)
    }

    /// Parse the process arguments, skipping the program name.
    pub fn parse_env(&mut self) -> ParseResult<ParseOutcome> {
        self.parse(env_args())
    }

    /// Parse and handle the outcome the way a command line tool expects:
    /// help and version text go to stdout with exit status 0, errors go to
    /// stderr with exit status 1.
    pub fn parse_or_exit<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.parse(args) {
            Ok(ParseOutcome::Complete) => {}
            Ok(ParseOutcome::Help(text) | ParseOutcome::Version(text)) => {
                println!("{text}");
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("Error: {err}.");
                std::process::exit(1);
            }
        }
    }

    pub fn parse_env_or_exit(&mut self) {
        self.parse_or_exit(env_args());
    }

    /// Run the dispatch loop until `cursor` is exhausted.
    ///
    /// A matched command continues on the same cursor, so when this returns
    /// every remaining token has been consumed by this parser or one of its
    /// descendants.
    pub fn parse_stream(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<ParseOutcome> {
        let mut mode = Mode::Active;

        while let Some(token) = cursor.next() {
            if mode == Mode::PositionalOnly {
                self.arguments.push(token);
                continue;
            }

            if token == "--" {
                tracing::debug!(position = cursor.position(), "option parsing turned off");
                mode = Mode::PositionalOnly;
            } else if let Some(body) = token.strip_prefix("--") {
                let outcome = self.parse_long(body, cursor)?;
                if !outcome.is_complete() {
                    return Ok(outcome);
                }
            } else if token.starts_with('-') {
                // A lone dash or a negative number is an argument, not a switch.
                if is_value_like(token) {
                    self.arguments.push(token);
                } else {
                    self.parse_short(&token[1..], cursor)?;
                }
            } else if let Some(&index) = self.command_names.get(token) {
                let outcome = self.enter_command(token, index, cursor)?;
                if !outcome.is_complete() {
                    return Ok(outcome);
                }
            } else if token == "help" {
                // `app help cmd` is equivalent to `app cmd --help`.
                return self.command_help(cursor).map(ParseOutcome::Help);
            } else {
                tracing::trace!(token, "positional argument");
                self.arguments.push(token);
            }
        }

        Ok(ParseOutcome::Complete)
    }

    fn parse_long(&mut self, body: &str, cursor: &mut TokenCursor<'_>) -> ParseResult<ParseOutcome> {
        if let Some((name, value)) = body.split_once('=') {
            self.parse_equals("--", name, value)?;
            return Ok(ParseOutcome::Complete);
        }

        if let Some(&index) = self.option_names.get(body) {
            self.take_values(index, "--", body, cursor)?;
            return Ok(ParseOutcome::Complete);
        }

        match (body, &self.help, &self.version) {
            ("help", Some(help), _) => Ok(ParseOutcome::Help(help.clone())),
            ("version", _, Some(version)) => Ok(ParseOutcome::Version(version.clone())),
            _ => Err(ParseError::unrecognized_option("--", body)),
        }
    }

    /// Condensed short options: `-abc foo` is `-a -b -c foo` when `a` and `b`
    /// are flags. Each non-flag character takes its value from the cursor
    /// before the next character is handled.
    fn parse_short(&mut self, body: &str, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        if let Some((name, value)) = body.split_once('=') {
            if name.chars().count() != 1 {
                return Err(ParseError::unrecognized_option("-", name));
            }
            return self.parse_equals("-", name, value);
        }

        let mut buf = [0u8; 4];
        for ch in body.chars() {
            let name: &str = ch.encode_utf8(&mut buf);
            let Some(&index) = self.option_names.get(name) else {
                return Err(ParseError::unrecognized_option("-", name));
            };
            self.take_values(index, "-", name, cursor)?;
        }
        Ok(())
    }

    /// `--name=value` or `-n=value`.
    fn parse_equals(&mut self, prefix: &str, name: &str, value: &str) -> ParseResult<()> {
        let Some(&index) = self.option_names.get(name) else {
            return Err(ParseError::unrecognized_option(prefix, name));
        };

        let option = &mut self.options[index];
        if option.kind() == OptionKind::Flag {
            return Err(ParseError::FlagTakesNoValue {
                option: format!("{prefix}{name}"),
            });
        }
        if value.is_empty() {
            return Err(ParseError::missing_value(prefix, name));
        }

        option.append(value)?;
        option.mark_found();
        Ok(())
    }

    /// Resolve one option switch. Values are staged and committed together so
    /// a bad literal inside a greedy run leaves the option untouched.
    fn take_values(
        &mut self,
        index: usize,
        prefix: &str,
        name: &str,
        cursor: &mut TokenCursor<'_>,
    ) -> ParseResult<()> {
        let option = &mut self.options[index];

        if option.kind() == OptionKind::Flag {
            option.mark_found();
            option.push(true);
            return Ok(());
        }

        let Some(first) = cursor.next_value() else {
            return Err(ParseError::missing_value(prefix, name));
        };
        let mut staged = vec![option.coerce(first)?];
        if option.is_greedy() {
            while let Some(raw) = cursor.next_value() {
                staged.push(option.coerce(raw)?);
            }
        }

        tracing::trace!(option = name, values = staged.len(), "option resolved");
        option.mark_found();
        option.extend(staged);
        Ok(())
    }

    fn enter_command(
        &mut self,
        name: &str,
        index: usize,
        cursor: &mut TokenCursor<'_>,
    ) -> ParseResult<ParseOutcome> {
        tracing::debug!(command = name, "entering command");
        self.matched = Some(MatchedCommand {
            name: name.to_string(),
            index,
        });

        let outcome = self.commands[index].parser.parse_stream(cursor)?;
        if outcome.is_complete() {
            self.run_callback(index);
        }
        Ok(outcome)
    }

    fn run_callback(&mut self, index: usize) {
        // Taken out for the call so the parent can be lent out alongside the child.
        let Some(mut callback) = self.commands[index].callback.take() else {
            return;
        };
        callback(&self.commands[index].parser, self);
        self.commands[index].callback = Some(callback);
    }

    fn command_help(&self, cursor: &mut TokenCursor<'_>) -> ParseResult<String> {
        let name = cursor.next().ok_or(ParseError::MissingHelpTarget)?;
        let Some(&index) = self.command_names.get(name) else {
            return Err(ParseError::UnrecognizedCommand {
                name: name.to_string(),
            });
        };
        Ok(self.commands[index]
            .parser
            .help
            .clone()
            .unwrap_or_default())
    }
}

// Retrieving and setting option values.
//
// Asking for a name that was never registered is a programming error, so
// these accessors panic rather than return a `Result`. Use `try_option` to
// probe.
impl ArgParser {
    pub fn try_option(&self, name: &str) -> ParseResult<&OptionValue> {
        self.option_names
            .get(name)
            .map(|&index| &self.options[index])
            .ok_or_else(|| ParseError::UnknownRegisteredName {
                name: name.to_string(),
            })
    }

    /// # Panics
    ///
    /// Panics if `name` is not a registered option.
    pub fn option(&self, name: &str) -> &OptionValue {
        match self.try_option(name) {
            Ok(option) => option,
            Err(err) => panic!("{err}"),
        }
    }

    fn option_mut(&mut self, name: &str) -> &mut OptionValue {
        match self.option_names.get(name) {
            Some(&index) => &mut self.options[index],
            None => panic!(
                "{}",
                ParseError::UnknownRegisteredName {
                    name: name.to_string()
                }
            ),
        }
    }

    /// Every registered alias with the value it resolves to, in registration
    /// order. Aliases of one option yield the same value.
    pub fn options(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.option_names
            .iter()
            .map(|(name, &index)| (name.as_str(), &self.options[index]))
    }

    /// Whether the option was encountered while parsing.
    pub fn found(&self, name: &str) -> bool {
        self.option(name).is_found()
    }

    pub fn get_flag(&self, name: &str) -> bool {
        self.option(name).get_flag()
    }

    pub fn get_str(&self, name: &str) -> &str {
        self.option(name).get_str()
    }

    pub fn get_int(&self, name: &str) -> i64 {
        self.option(name).get_int()
    }

    pub fn get_float(&self, name: &str) -> f64 {
        self.option(name).get_float()
    }

    /// Number of values held by the option.
    pub fn list_len(&self, name: &str) -> usize {
        self.option(name).len()
    }

    pub fn get_flag_list(&self, name: &str) -> Vec<bool> {
        self.option(name).flag_list()
    }

    pub fn get_str_list(&self, name: &str) -> Vec<String> {
        self.option(name).str_list()
    }

    pub fn get_int_list(&self, name: &str) -> Vec<i64> {
        self.option(name).int_list()
    }

    pub fn get_float_list(&self, name: &str) -> Vec<f64> {
        self.option(name).float_list()
    }

    /// Clear the option's values, e.g. before replacing a list's contents.
    pub fn clear_list(&mut self, name: &str) {
        self.option_mut(name).clear();
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.option_mut(name).push(value);
    }

    pub fn set_str(&mut self, name: &str, value: impl Into<String>) {
        self.option_mut(name).push(Value::Str(value.into()));
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.option_mut(name).push(value);
    }

    pub fn set_float(&mut self, name: &str, value: f64) {
        self.option_mut(name).push(value);
    }
}

// Positional arguments.
impl ArgParser {
    pub fn args(&self) -> &Positionals {
        &self.arguments
    }

    pub fn has_args(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn len_args(&self) -> usize {
        self.arguments.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.arguments.get(index)
    }

    pub fn args_as_ints(&self) -> ParseResult<Vec<i64>> {
        self.arguments.as_integers()
    }

    pub fn args_as_floats(&self) -> ParseResult<Vec<f64>> {
        self.arguments.as_floats()
    }
}

// Commands.
impl ArgParser {
    /// Whether a command was matched while parsing.
    pub fn has_cmd(&self) -> bool {
        self.matched.is_some()
    }

    /// The matched command, as spelled on the command line.
    pub fn cmd_name(&self) -> Option<&str> {
        self.matched.as_ref().map(|m| m.name.as_str())
    }

    /// The matched command's parser.
    pub fn cmd_parser(&self) -> Option<&ArgParser> {
        self.matched
            .as_ref()
            .map(|m| &self.commands[m.index].parser)
    }

    pub fn command(&self) -> Option<(&str, &ArgParser)> {
        self.matched
            .as_ref()
            .map(|m| (m.name.as_str(), &self.commands[m.index].parser))
    }

    /// Look up a registered command's parser by any of its aliases.
    pub fn command_parser(&self, name: &str) -> Option<&ArgParser> {
        self.command_names
            .get(name)
            .map(|&index| &self.commands[index].parser)
    }

    pub fn command_parser_mut(&mut self, name: &str) -> Option<&mut ArgParser> {
        let index = *self.command_names.get(name)?;
        Some(&mut self.commands[index].parser)
    }

    /// Every registered command alias with its parser, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &ArgParser)> {
        self.command_names
            .iter()
            .map(|(name, &index)| (name.as_str(), &self.commands[index].parser))
    }
}

impl fmt::Display for ArgParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Options:")?;
        if self.option_names.is_empty() {
            writeln!(f, "  [none]")?;
        }
        for (name, option) in self.options() {
            writeln!(f, "  {name}: {option}")?;
        }

        writeln!(f, "\nArguments:")?;
        if self.arguments.is_empty() {
            writeln!(f, "  [none]")?;
        }
        for arg in self.arguments.iter() {
            writeln!(f, "  {arg}")?;
        }

        writeln!(f, "\nCommand:")?;
        match self.cmd_name() {
            Some(name) => writeln!(f, "  {name}"),
            None => writeln!(f, "  [none]"),
        }
    }
}
