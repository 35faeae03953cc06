//! cli::args
//!
//! Token classifier for the command line.
//!
//! # Rules
//!
//! A single left-to-right pass with one pending slot:
//! - `-name` (one leading dash) opens a pending flag `name`
//! - the token after a pending flag is always its value, even if it looks
//!   like a flag: `-x -y` is the flag `x` with value `-y`
//! - `--name` is a standalone switch, kept as the positional `--name`
//! - anything else is a positional
//!
//! A flag still pending at the end of input is an error.
//!
//! # Example
//!
//! ```
//! use stackrunner::cli::args::{Opt, OptionSet};
//!
//! let options = OptionSet::tokenize(["delete", "-stack-name", "demo", "--force"]).unwrap();
//!
//! assert_eq!(options.command_or("deploy"), "delete");
//! assert_eq!(options.optional("stack-name"), Some("demo"));
//! assert!(options.has_switch("--force"));
//! assert_eq!(
//!     options.options()[1],
//!     Opt::FlagValue("stack-name".to_string(), "demo".to_string())
//! );
//! ```

use thiserror::Error;

/// One classified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opt {
    /// A command word or a `--switch`
    Positional(String),
    /// A `-name value` pair, name stored without the dash
    FlagValue(String, String),
}

/// Errors from reading the command line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgError {
    /// None of the accepted spellings of a required flag was given.
    #[error("Expected {} argument", alternatives(.0))]
    MissingFlag(Vec<String>),

    /// A flag value failed its structural check.
    #[error("-{flag} must match {pattern}")]
    InvalidFlag { flag: String, pattern: String },

    /// The last token was a flag with nothing after it.
    #[error("-{0} expects a value")]
    DanglingFlag(String),
}

impl ArgError {
    /// Missing flag with a single accepted spelling.
    pub fn missing(name: &str) -> Self {
        ArgError::MissingFlag(vec![name.to_string()])
    }
}

fn alternatives(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("-{}", n))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Whether `token` opens a flag (one leading dash, not two).
pub fn is_flag(token: &str) -> bool {
    token.starts_with('-') && !token.starts_with("--")
}

/// The classified command line, in input order.
///
/// Built once per process and never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<Opt>,
}

impl OptionSet {
    /// Classify `args` (without the program name).
    pub fn tokenize<I, S>(args: I) -> Result<Self, ArgError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Vec::new();
        let mut pending: Option<String> = None;

        for token in args {
            let token = token.into();
            match pending.take() {
                Some(name) => options.push(Opt::FlagValue(name, token)),
                None if is_flag(&token) => pending = Some(token[1..].to_string()),
                None => options.push(Opt::Positional(token)),
            }
        }

        match pending {
            Some(name) => Err(ArgError::DanglingFlag(name)),
            None => Ok(Self { options }),
        }
    }

    /// All options, in input order.
    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Positional tokens, switches included.
    pub fn positionals(&self) -> impl Iterator<Item = &str> {
        self.options.iter().filter_map(|opt| match opt {
            Opt::Positional(token) => Some(token.as_str()),
            Opt::FlagValue(..) => None,
        })
    }

    /// Flag names and values.
    pub fn flags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().filter_map(|opt| match opt {
            Opt::FlagValue(name, value) => Some((name.as_str(), value.as_str())),
            Opt::Positional(_) => None,
        })
    }

    /// The command word: the first positional that is not a switch.
    pub fn command(&self) -> Option<&str> {
        self.positionals().find(|token| !token.starts_with("--"))
    }

    /// The command word, or `default` when there is none.
    pub fn command_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.command().unwrap_or(default)
    }

    /// Value of the first flag called `name`.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.flags().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Value of the first flag called `name`, or an error naming it.
    pub fn required(&self, name: &str) -> Result<&str, ArgError> {
        self.optional(name).ok_or_else(|| ArgError::missing(name))
    }

    /// Value of the first flag with any of `names`.
    pub fn required_any(&self, names: &[&str]) -> Result<&str, ArgError> {
        self.flags()
            .find(|(n, _)| names.contains(n))
            .map(|(_, v)| v)
            .ok_or_else(|| ArgError::MissingFlag(names.iter().map(|n| n.to_string()).collect()))
    }

    /// Whether the switch (e.g. `--force`) was given.
    pub fn has_switch(&self, switch: &str) -> bool {
        self.positionals().any(|token| token == switch)
    }

    /// Tokens that classify back into this set.
    pub fn to_args(&self) -> Vec<String> {
        self.options
            .iter()
            .flat_map(|opt| match opt {
                Opt::Positional(token) => vec![token.clone()],
                Opt::FlagValue(name, value) => vec![format!("-{}", name), value.clone()],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, value: &str) -> Opt {
        Opt::FlagValue(name.to_string(), value.to_string())
    }

    fn positional(token: &str) -> Opt {
        Opt::Positional(token.to_string())
    }

    #[test]
    fn empty_input() {
        let options = OptionSet::tokenize(Vec::<String>::new()).unwrap();
        assert!(options.is_empty());
        assert_eq!(options.command(), None);
        assert_eq!(options.command_or("deploy"), "deploy");
    }

    #[test]
    fn full_deploy_line() {
        let options = OptionSet::tokenize([
            "deploy",
            "-region",
            "us-east-1",
            "-stack-name",
            "demo",
            "-template",
            "t.json",
        ])
        .unwrap();

        assert_eq!(
            options.options(),
            &[
                positional("deploy"),
                flag("region", "us-east-1"),
                flag("stack-name", "demo"),
                flag("template", "t.json"),
            ]
        );
    }

    #[test]
    fn value_is_never_reinterpreted() {
        let options = OptionSet::tokenize(["-x", "-y"]).unwrap();
        assert_eq!(options.options(), &[flag("x", "-y")]);

        let options = OptionSet::tokenize(["-payload", "--force"]).unwrap();
        assert_eq!(options.options(), &[flag("payload", "--force")]);
        assert!(!options.has_switch("--force"));
    }

    #[test]
    fn leading_flag_means_default_command() {
        let options = OptionSet::tokenize(["-region", "eu-west-1", "--force"]).unwrap();
        assert_eq!(options.command(), None);
        assert_eq!(options.command_or("deploy"), "deploy");
        assert!(options.has_switch("--force"));
    }

    #[test]
    fn switches_are_not_commands() {
        let options = OptionSet::tokenize(["--disable-logs", "invoke"]).unwrap();
        assert_eq!(options.command(), Some("invoke"));
        assert_eq!(
            options.positionals().collect::<Vec<_>>(),
            vec!["--disable-logs", "invoke"]
        );
    }

    #[test]
    fn dangling_flag_is_an_error() {
        assert_eq!(
            OptionSet::tokenize(["list", "-region"]),
            Err(ArgError::DanglingFlag("region".into()))
        );
    }

    #[test]
    fn first_occurrence_wins() {
        let options = OptionSet::tokenize(["-region", "a", "-region", "b"]).unwrap();
        assert_eq!(options.optional("region"), Some("a"));
    }

    #[test]
    fn required_flags() {
        let options = OptionSet::tokenize(["delete", "-stack-names", "a,b"]).unwrap();

        assert_eq!(
            options.required_any(&["stack-name", "stack-names"]),
            Ok("a,b")
        );
        let err = options.required("region").unwrap_err();
        assert_eq!(err.to_string(), "Expected -region argument");

        let err = OptionSet::default()
            .required_any(&["stack-name", "stack-names"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected -stack-name or -stack-names argument"
        );
    }

    #[test]
    fn to_args_round_trips() {
        let args = ["invoke", "-function-name", "fn", "--disable-logs", "-payload", "-1"];
        let options = OptionSet::tokenize(args).unwrap();
        assert_eq!(options.to_args(), args);
        assert_eq!(OptionSet::tokenize(options.to_args()).unwrap(), options);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ArgError::InvalidFlag {
                flag: "qualifier".into(),
                pattern: "(|[a-z]+)".into()
            }
            .to_string(),
            "-qualifier must match (|[a-z]+)"
        );
        assert_eq!(
            ArgError::DanglingFlag("template".into()).to_string(),
            "-template expects a value"
        );
    }
}
