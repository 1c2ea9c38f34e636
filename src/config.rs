//! Command-line configuration for `todc`

use std::path::PathBuf;
use thiserror::Error;

pub const USAGE: &str = "\
Usage: todc <file.tod> [options]

Options:
  --tokens            print the token stream
  --ast               print the syntax tree
  --symbols           print the bound symbols
  --no-hash-comments  treat '#' as an ordinary character
  --no-color          disable colored output";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no input file provided")]
    MissingInput,

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("more than one input file: '{0}' and '{1}'")]
    MultipleInputs(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    /// `#` starts a line comment
    pub hash_comments: bool,
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
    pub color: bool,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Config {
            input: input.into(),
            hash_comments: true,
            dump_tokens: false,
            dump_ast: false,
            dump_symbols: false,
            color: true,
        }
    }

    /// Parse arguments, not including the program name
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut input: Option<String> = None;
        let mut config = Config::new(PathBuf::new());

        for arg in args {
            match arg.as_str() {
                "--tokens" => config.dump_tokens = true,
                "--ast" => config.dump_ast = true,
                "--symbols" => config.dump_symbols = true,
                "--no-hash-comments" => config.hash_comments = false,
                "--no-color" => config.color = false,
                flag if flag.starts_with("--") => return Err(ConfigError::UnknownArgument(flag.to_string())),
                _ => {
                    if let Some(first) = input {
                        return Err(ConfigError::MultipleInputs(first, arg));
                    }
                    input = Some(arg);
                }
            }
        }

        config.input = PathBuf::from(input.ok_or(ConfigError::MissingInput)?);
        Ok(config)
    }
}
