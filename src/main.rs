use clap::Parser;
use serde_json::Value;
use thiserror::Error;
use todoist_tasks::app::App;
use todoist_tasks::errors::ToolError;
use tokio::io::AsyncReadExt;

/// Run one Todoist task and print its JSON result to stdout.
#[derive(Parser)]
#[command(name = "todoist-tasks")]
#[command(about = "Create, read, update, delete, complete and list Todoist tasks", long_about = None)]
#[command(version)]
struct Cli {
    /// Task action: create, get, update, delete, complete or list
    action: String,

    /// Task input as inline JSON, @path to a JSON file, or - for stdin
    #[arg(long, default_value = "{}")]
    args: String,

    /// Template variables as inline JSON or @path
    #[arg(long)]
    vars: Option<String>,

    /// Tool to route the action to
    #[arg(long, default_value = "todoist")]
    tool: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name} is not valid JSON: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must be a JSON object")]
    NotAnObject(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl CliError {
    fn to_value(&self) -> Value {
        match self {
            CliError::Tool(err) => serde_json::to_value(err).unwrap_or(Value::Null),
            other => serde_json::json!({
                "kind": "invalid_params",
                "code": "INVALID_CLI_INPUT",
                "message": other.to_string(),
                "retryable": false,
            }),
        }
    }
}

async fn read_json_input(name: &str, raw: &str) -> Result<Value, CliError> {
    let text = if raw == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|source| CliError::Read {
                source_name: "stdin".to_string(),
                source,
            })?;
        buf
    } else if let Some(path) = raw.strip_prefix('@') {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CliError::Read {
                source_name: path.to_string(),
                source,
            })?
    } else {
        raw.to_string()
    };
    let value: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        source_name: name.to_string(),
        source,
    })?;
    if !value.is_object() {
        return Err(CliError::NotAnObject(name.to_string()));
    }
    Ok(value)
}

async fn run(cli: &Cli) -> Result<Value, CliError> {
    let mut args = read_json_input("--args", &cli.args).await?;
    let vars = match cli.vars.as_deref() {
        Some(raw) => read_json_input("--vars", raw).await?,
        None => Value::Object(Default::default()),
    };
    if let Value::Object(map) = &mut args {
        map.insert("action".to_string(), Value::String(cli.action.clone()));
    }

    let app = App::initialize()?;
    let outcome = app.run(&cli.tool, args, vars).await;
    app.logger.debug("finished", Some(&app.logger.stats()));
    Ok(outcome?)
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(payload) => println!("{}", render(&payload, cli.pretty)),
        Err(err) => {
            eprintln!("todoist-tasks: {}", err);
            let payload = serde_json::json!({ "success": false, "error": err.to_value() });
            println!("{}", render(&payload, cli.pretty));
            std::process::exit(1);
        }
    }
}
