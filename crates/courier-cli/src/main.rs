use clap::{ArgAction, Parser, Subcommand};
use courier_http::{
    ActiveSlot, DefaultErrorHandler, Dispatcher, DispatcherConfig, ErrorFn, Failure, Handling,
    Method, Notice, NoticeErrorHandler, Payload, RequestDescriptor, Resolution, ReqwestTransport,
    SuccessFn, SuccessPolicy, parse_header,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "courier-cli")]
#[command(about = "Dispatch a request and route the outcome through success or error handlers")]
struct Cli {
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
    target: String,
    #[arg(long, default_value = "GET")]
    method: Method,
    #[arg(long = "header")]
    headers: Vec<String>,
    #[arg(long)]
    data: Option<String>,
    #[arg(long)]
    success_status: Option<SuccessPolicy>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Failure statuses the caller handles itself; anything else falls through.
    #[arg(long = "handle-status")]
    handle_statuses: Vec<u16>,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Show the failure notice on stderr instead of only logging it.
    #[arg(long, action = ArgAction::SetTrue)]
    notice: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version print to stdout and are not failures.
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Fetch(args) => fetch_command(args).await,
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

async fn fetch_command(args: FetchArgs) -> Result<ExitCode, String> {
    let mut config = DispatcherConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(policy) = args.success_status.clone() {
        config.success_policy = policy;
    }
    if let Some(millis) = args.timeout_ms {
        if millis == 0 {
            return Err("--timeout-ms must be greater than zero".to_string());
        }
        config.timeout = Duration::from_millis(millis);
    }

    let request = build_request(&args)?;
    let transport = ReqwestTransport::new(&config).map_err(|e| e.to_string())?;

    let notices: Arc<ActiveSlot<Notice>> = Arc::new(ActiveSlot::new());
    let mut dispatcher = Dispatcher::with_config(transport, &config);
    if args.notice {
        let handler: Arc<dyn DefaultErrorHandler> =
            Arc::new(NoticeErrorHandler::new(notices.clone()));
        dispatcher = dispatcher.with_default_handler(handler);
    }

    tracing::debug!(
        request_target = request.target.as_str(),
        success_policy = %config.success_policy,
        "dispatching"
    );
    let handle = dispatcher
        .dispatch(
            request,
            Some(success_printer(args.json)),
            error_handler(args.handle_statuses),
        )
        .map_err(|e| e.to_string())?;
    let resolution = handle.join().await.map_err(|e| e.to_string())?;

    if let Some(notice) = notices.clear() {
        eprintln!("notice: {} {}", notice.target, notice.summary);
    }
    Ok(exit_code_for_resolution(resolution))
}

fn build_request(args: &FetchArgs) -> Result<RequestDescriptor, String> {
    let mut request = RequestDescriptor::new(args.method, args.target.clone());
    for raw in &args.headers {
        let (name, value) = parse_header(raw).map_err(|e| e.to_string())?;
        request = request.with_header(name, value);
    }
    if let Some(data) = &args.data {
        request = request.with_body(data.clone().into_bytes());
    }
    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}

fn success_printer(pretty_json: bool) -> SuccessFn {
    Box::new(move |payload: Payload| {
        if pretty_json {
            if let Ok(value) = payload.json::<serde_json::Value>() {
                if let Ok(text) = serde_json::to_string_pretty(&value) {
                    println!("{text}");
                    return;
                }
            }
        }
        println!("{}", payload.text());
    })
}

fn error_handler(handle_statuses: Vec<u16>) -> Option<ErrorFn> {
    if handle_statuses.is_empty() {
        return None;
    }
    Some(Box::new(move |failure: &Failure| {
        match failure.status() {
            Some(status) if handle_statuses.contains(&status) => {
                println!("handled: {status}");
                Handling::Handled
            }
            _ => Handling::Declined,
        }
    }))
}

fn exit_code_for_resolution(resolution: Resolution) -> ExitCode {
    match resolution {
        Resolution::Succeeded => ExitCode::SUCCESS,
        Resolution::HandledByCaller => ExitCode::from(2),
        Resolution::DeclinedToDefault | Resolution::HandledByDefault => ExitCode::from(3),
    }
}
