//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates local inputs (files, patterns) before any remote call
//! 2. Connects to the provider for the region it needs
//! 3. Calls the engine and formats its outcome
//!
//! Handlers return a [`CommandOutcome`] or a [`CommandError`]; only
//! [`dispatch`] turns those into an exit code.
//!
//! # Async Commands
//!
//! Every command talks to the provider, so handlers are async. [`dispatch`]
//! drives them on a current-thread tokio runtime, which keeps execution
//! single-threaded; tests call [`execute`] directly with a mock connector
//! and a scripted prompt.

mod delete;
mod deploy;
mod invoke;
mod list;
mod outputs;
mod upload;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use thiserror::Error;

use crate::cli::args::{ArgError, OptionSet};
use crate::core::archive::PackageError;
use crate::core::config::Config;
use crate::core::naming::StackRef;
use crate::engine::invoke::{
    is_valid_function_name, is_valid_qualifier, FUNCTION_NAME_PATTERN, QUALIFIER_PATTERN,
};
use crate::engine::{CommandOutcome, Context, InvokeError, Invocation};
use crate::provider::{AwsConnector, Connector, ProviderError};
use crate::ui::output::Console;
use crate::ui::prompts::{Confirm, LinePrompt, PromptError};

/// Command used when the command line has no command word.
pub const DEFAULT_COMMAND: &str = "deploy";

/// Exit code for an unrecognised command.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Short usage text printed for an unknown command.
pub const USAGE: &str = "\
Usage: stackrunner [command] -region <region> [flags]

Commands:
  deploy    -stack-name <name> -template <file> [-output <file>]   (default)
  delete    -stack-name <name[,name...]> [--force]
  list
  outputs   [-stacks <[region:]name[,...]>]
  uploadZip -bucket <bucket> -location <path> [-key <key>] [--zip]
  invoke    -function-name <name> [-type <type>] [-qualifier <q>]
            [-context <text|file://path>] [-payload <text|file://path>] [--disable-logs]

Switches:
  --debug   debug logging
  --quiet   minimal output";

/// Errors from running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command {0} not recognised try deploy or delete")]
    UnknownCommand(String),

    #[error(transparent)]
    Arg(#[from] ArgError),

    #[error("Could not find file {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl CommandError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::UnknownCommand(_) => USAGE_EXIT_CODE,
            _ => 1,
        }
    }

    /// Whether the message came from the provider and is printed verbatim.
    fn is_remote(&self) -> bool {
        matches!(
            self,
            CommandError::Provider(_) | CommandError::Invoke(InvokeError::Provider(_))
        )
    }
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        region: String,
    },
    Deploy {
        region: String,
        stack_name: String,
        template: PathBuf,
        output: Option<PathBuf>,
    },
    Delete {
        region: String,
        stack_names: Vec<String>,
        force: bool,
    },
    Upload {
        region: String,
        bucket: String,
        location: PathBuf,
        key: Option<String>,
        /// Archive a plain file instead of uploading it raw
        zip: bool,
    },
    Invoke {
        region: String,
        invocation: Invocation,
    },
    Outputs {
        region: String,
        stacks: Vec<StackRef>,
    },
}

impl Command {
    /// Resolve the command word and extract the flags it needs.
    ///
    /// `-region` falls back to the configured region.
    pub fn from_options(options: &OptionSet, config: &Config) -> Result<Command, CommandError> {
        let name = options.command_or(DEFAULT_COMMAND);
        let known = matches!(
            name,
            "list" | "deploy" | "delete" | "upload" | "uploadZip" | "invoke" | "outputs"
        );
        if !known {
            return Err(CommandError::UnknownCommand(name.to_string()));
        }

        let region = options
            .optional("region")
            .or(config.region())
            .ok_or_else(|| ArgError::missing("region"))?
            .to_string();

        let command = match name {
            "list" => Command::List { region },
            "delete" => Command::Delete {
                stack_names: options
                    .required_any(&["stack-name", "stack-names"])?
                    .split(',')
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect(),
                force: options.has_switch("--force"),
                region,
            },
            "upload" | "uploadZip" => Command::Upload {
                bucket: options.required("bucket")?.to_string(),
                location: PathBuf::from(options.required("location")?),
                key: options.optional("key").map(String::from),
                zip: options.has_switch("--zip"),
                region,
            },
            "invoke" => Command::Invoke {
                invocation: invocation_from(options, config)?,
                region,
            },
            "outputs" => Command::Outputs {
                stacks: options
                    .optional("stacks")
                    .map(|list| StackRef::parse_list(list, &region))
                    .unwrap_or_default(),
                region,
            },
            _ => Command::Deploy {
                stack_name: options.required("stack-name")?.to_string(),
                template: PathBuf::from(options.required("template")?),
                output: options.optional("output").map(PathBuf::from),
                region,
            },
        };

        Ok(command)
    }
}

fn invocation_from(options: &OptionSet, config: &Config) -> Result<Invocation, ArgError> {
    let function_name = options.required("function-name")?;
    if !is_valid_function_name(function_name) {
        return Err(ArgError::InvalidFlag {
            flag: "function-name".into(),
            pattern: FUNCTION_NAME_PATTERN.into(),
        });
    }

    let qualifier = options.optional("qualifier");
    if let Some(q) = qualifier.filter(|q| !is_valid_qualifier(q)) {
        tracing::debug!(qualifier = q, "rejected qualifier");
        return Err(ArgError::InvalidFlag {
            flag: "qualifier".into(),
            pattern: QUALIFIER_PATTERN.into(),
        });
    }

    Ok(Invocation {
        function_name: function_name.to_string(),
        invocation_type: options
            .optional("type")
            .unwrap_or(config.invocation_type())
            .to_string(),
        show_logs: !options.has_switch("--disable-logs"),
        payload: options.optional("payload").map(String::from),
        qualifier: qualifier.map(String::from),
        context: options.optional("context").map(String::from),
    })
}

/// Run `command` against providers built by `connector`.
pub async fn execute(
    command: &Command,
    ctx: &Context,
    connector: &dyn Connector,
    prompt: &mut dyn Confirm,
    console: &mut Console,
) -> Result<CommandOutcome, CommandError> {
    match command {
        Command::List { region } => list::list(connector, region, console).await,
        Command::Deploy {
            region,
            stack_name,
            template,
            output,
        } => {
            deploy::deploy(
                ctx,
                connector,
                console,
                region,
                stack_name,
                template,
                output.as_deref(),
            )
            .await
        }
        Command::Delete {
            region,
            stack_names,
            force,
        } => delete::delete(ctx, connector, prompt, console, region, stack_names, *force).await,
        Command::Upload {
            region,
            bucket,
            location,
            key,
            zip,
        } => {
            upload::upload(
                ctx,
                connector,
                console,
                region,
                bucket,
                location,
                key.as_deref(),
                *zip,
            )
            .await
        }
        Command::Invoke { region, invocation } => {
            invoke::invoke(connector, console, region, invocation).await
        }
        Command::Outputs { region: _, stacks } => outputs::outputs(connector, console, stacks).await,
    }
}

/// Print `err` and return its exit code.
pub fn report(err: &CommandError, console: &mut Console) -> i32 {
    if err.is_remote() {
        console.diag(err);
    } else {
        console.error(err);
    }
    if let CommandError::UnknownCommand(_) = err {
        console.diag(USAGE);
    }
    err.exit_code()
}

/// Resolve, run and report one command line; returns the exit code.
pub fn dispatch(options: &OptionSet, ctx: &Context) -> Result<i32> {
    let mut console = Console::stdio(ctx.verbosity());

    let command = match Command::from_options(options, &ctx.config) {
        Ok(command) => command,
        Err(err) => return Ok(report(&err, &mut console)),
    };
    tracing::debug!(?command, "dispatching");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut prompt = LinePrompt::stdin();
    let result = runtime.block_on(execute(
        &command,
        ctx,
        &AwsConnector,
        &mut prompt,
        &mut console,
    ));

    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => report(&err, &mut console),
    };
    console.flush();
    Ok(code)
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), CommandError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write().map_err(|source| CommandError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CommandError> {
        let options = OptionSet::tokenize(args.iter().copied()).unwrap();
        Command::from_options(&options, &Config::default())
    }

    #[test]
    fn deploy_is_the_default() {
        let command = parse(&["-region", "us-east-1", "-stack-name", "demo", "-template", "t.json"]).unwrap();
        assert_eq!(
            command,
            Command::Deploy {
                region: "us-east-1".into(),
                stack_name: "demo".into(),
                template: PathBuf::from("t.json"),
                output: None,
            }
        );
    }

    #[test]
    fn unknown_command() {
        let err = parse(&["launch", "-region", "us-east-1"]).unwrap_err();
        assert_eq!(err.exit_code(), USAGE_EXIT_CODE);
        assert_eq!(
            err.to_string(),
            "Command launch not recognised try deploy or delete"
        );
    }

    #[test]
    fn missing_flags_are_named() {
        let err = parse(&["list"]).unwrap_err();
        assert_eq!(err.to_string(), "Expected -region argument");

        let err = parse(&["deploy", "-region", "us-east-1", "-template", "t.json"]).unwrap_err();
        assert_eq!(err.to_string(), "Expected -stack-name argument");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn region_falls_back_to_config() {
        let config = Config::from_file(crate::core::config::FileConfig {
            region: Some("eu-west-1".into()),
            ..Default::default()
        })
        .unwrap();
        let options = OptionSet::tokenize(["list"]).unwrap();

        assert_eq!(
            Command::from_options(&options, &config).unwrap(),
            Command::List {
                region: "eu-west-1".into()
            }
        );
    }

    #[test]
    fn delete_accepts_both_spellings() {
        let command = parse(&["delete", "-region", "r", "-stack-names", "a,b", "--force"]).unwrap();
        assert_eq!(
            command,
            Command::Delete {
                region: "r".into(),
                stack_names: vec!["a".into(), "b".into()],
                force: true,
            }
        );

        let err = parse(&["delete", "-region", "r"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected -stack-name or -stack-names argument"
        );
    }

    #[test]
    fn upload_aliases() {
        for word in ["upload", "uploadZip"] {
            let command = parse(&[word, "-region", "r", "-bucket", "b", "-location", "dist"]).unwrap();
            assert!(matches!(command, Command::Upload { key: None, zip: false, .. }));
        }
    }

    #[test]
    fn invoke_defaults_and_validation() {
        let command = parse(&["invoke", "-region", "r", "-function-name", "fn"]).unwrap();
        let Command::Invoke { invocation, .. } = command else {
            panic!("expected invoke");
        };
        assert_eq!(invocation.invocation_type, "RequestResponse");
        assert!(invocation.show_logs);

        let err = parse(&["invoke", "-region", "r", "-function-name", "bad name"]).unwrap_err();
        assert!(err.to_string().starts_with("-function-name must match "));

        let err = parse(&[
            "invoke",
            "-region",
            "r",
            "-function-name",
            "fn",
            "-qualifier",
            "a:b",
        ])
        .unwrap_err();
        assert!(err.to_string().starts_with("-qualifier must match "));
    }

    #[test]
    fn outputs_refs_default_to_command_region() {
        let command = parse(&["outputs", "-region", "us-east-1", "-stacks", "api,eu-west-1:web"]).unwrap();
        let Command::Outputs { stacks, .. } = command else {
            panic!("expected outputs");
        };
        assert_eq!(stacks[0].region, "us-east-1");
        assert_eq!(stacks[0].query, "api");
        assert_eq!(stacks[1].region, "eu-west-1");
        assert_eq!(stacks[1].query, "web");
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out/nested/outputs.env");
        write_file(&path, "A=1").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "A=1");
    }
}
