// ==========================================
// 设备组件库存核对系统 - 命令行入口
// ==========================================
// 职责: 解析命令,驱动编辑会话并输出结果
// 约定: stdout 输出结果/报表,stderr 输出日志与错误
// ==========================================

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use device_stock::api::{ApiError, ApiResult, EditorSession, ImportOutcome};
use device_stock::app::{get_default_db_path, AppState};
use device_stock::domain::{ConflictRule, MergePolicy, Tool};
use device_stock::engine::{EngineError, ReadinessGate, StockStatusCore, ToolReadiness};
use device_stock::i18n::{t, t_with_args};
use device_stock::logging::{self, LogFormat};

#[derive(Parser)]
#[command(name = "device-stock")]
#[command(about = "Device component stock reconciliation", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (defaults to $DEVICE_STOCK_DB or the user data dir)
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    db: Option<PathBuf>,

    /// Message language (overrides the stored `locale` setting)
    #[arg(long, global = true)]
    locale: Option<LocaleArg>,

    /// Log debug detail to stderr (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tools with their assembly readiness
    List,

    /// Show the components of a tool
    Show {
        /// Tool id or name
        tool: String,
    },

    /// Create a tool, optionally importing its components from a spreadsheet
    Create {
        #[arg(long)]
        name: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Spreadsheet whose rows become the component list
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        from: Option<PathBuf>,
    },

    /// Import component rows from a spreadsheet into an existing tool
    Import {
        /// Tool id or name
        tool: String,

        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Merge policy (defaults to the stored `edit_merge_policy` setting)
        #[arg(long)]
        policy: Option<PolicyArg>,
    },

    /// Set the stock of every component row with the given name
    SetStock {
        /// Tool id or name
        tool: String,
        component: String,
        stock: u32,
    },

    /// Write the stock reconciliation report as CSV
    Report {
        /// Tool id or name
        tool: String,

        /// Output file (stdout when omitted)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Delete a tool
    Delete {
        /// Tool id or name
        tool: String,
    },

    /// Read or change reconciliation settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show stored settings
    List,

    /// Store a setting (edit_merge_policy, empty_tool_eligible, locale)
    Set { key: String, value: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LocaleArg {
    En,
    Id,
}

impl LocaleArg {
    fn code(self) -> &'static str {
        match self {
            LocaleArg::En => "en",
            LocaleArg::Id => "id",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PolicyArg {
    Append,
    MergeLastWrite,
    MergeSum,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Append => MergePolicy::AppendAll,
            PolicyArg::MergeLastWrite => MergePolicy::MergeByName(ConflictRule::LastWriteWins),
            PolicyArg::MergeSum => MergePolicy::MergeByName(ConflictRule::SumQuantities),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统（RUST_LOG 可覆盖）；命令行默认只输出告警
    let level = if cli.verbose { "debug" } else { "warn" };
    logging::init_with(LogFormat::from_env(), level);

    let db_path = match &cli.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => get_default_db_path(),
    };
    tracing::debug!(db_path = %db_path, version = device_stock::VERSION, "启动");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    state.apply_locale(cli.locale.map(LocaleArg::code)).await;

    run(&state, cli.command)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
}

async fn run(state: &AppState, command: Commands) -> ApiResult<()> {
    let api = &state.tool_api;

    match command {
        Commands::List => {
            for summary in api.list_tools().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    summary.id,
                    summary.name,
                    summary.component_count,
                    readiness_text(&summary.readiness)
                );
            }
        }

        Commands::Show { tool } => {
            let tool = api.resolve_tool(&tool).await?;
            let settings = api.settings().await?;
            print_tool(&tool, &ReadinessGate::new(settings.empty_tool_eligible));
        }

        Commands::Create { name, image, from } => {
            let mut session = api.new_draft(&name).await?;
            session.set_image(image);
            if let Some(path) = from {
                print_outcome(session.import_file(&path).await?);
            }
            let saved = save(api, session).await?;
            println!("{}\t{}", t("common.success"), saved.id.unwrap_or_default());
        }

        Commands::Import { tool, file, policy } => {
            let tool = api.resolve_tool(&tool).await?;
            let mut settings = api.settings().await?;
            if let Some(policy) = policy {
                settings.edit_merge_policy = policy.into();
            }

            let mut session = EditorSession::edit_existing(&tool, settings)?;
            print_outcome(session.import_file(&file).await?);
            println!("{}", readiness_text(&session.readiness()));
            save(api, session).await?;
        }

        Commands::SetStock {
            tool,
            component,
            stock,
        } => {
            let mut session = api.open_editor(&tool).await?;
            session.set_stock_by_name(&component, stock)?;
            println!("{}", readiness_text(&session.readiness()));
            save(api, session).await?;
        }

        Commands::Report { tool, out } => {
            let report = api.stock_report(&tool).await?;

            match out {
                Some(path) => {
                    let file = File::create(&path).map_err(EngineError::from)?;
                    report.write_csv(file)?;
                }
                None => report.write_csv(std::io::stdout().lock())?,
            }
        }

        Commands::Delete { tool } => {
            let deleted = api.delete_tool(&tool).await?;
            println!("{}\t{}", t("common.success"), deleted.name);
        }

        Commands::Config { action } => match action {
            ConfigAction::List => {
                let values = state
                    .config_manager
                    .list_config_values()
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;
                let sorted: std::collections::BTreeMap<_, _> = values.into_iter().collect();
                for (key, value) in sorted {
                    println!("{}={}", key, value);
                }
            }
            ConfigAction::Set { key, value } => {
                state
                    .config_manager
                    .set_reconcile_setting(&key, &value)
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                println!("{}", t("common.success"));
            }
        },
    }

    Ok(())
}

/// 保存会话；失败时放弃工作副本并返回错误
async fn save(api: &device_stock::api::ToolApi, session: EditorSession) -> ApiResult<Tool> {
    match api.save(session).await {
        Ok(tool) => Ok(tool),
        Err(failure) => {
            let (session, error) = failure.into_parts();
            session.cancel();
            Err(error)
        }
    }
}

fn print_outcome(outcome: ImportOutcome) {
    match outcome {
        ImportOutcome::Applied(summary) => {
            let count = (summary.appended + summary.updated).to_string();
            println!("{}", t_with_args("import.applied", &[("count", &count)]));
        }
        ImportOutcome::Stale { .. } => println!("{}", t("import.stale")),
    }
}

fn print_tool(tool: &Tool, gate: &ReadinessGate) {
    println!("{}\t{}", tool.id.as_deref().unwrap_or_default(), tool.name);
    for (position, component) in tool.components.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            position,
            component.display_name(),
            opt_count(component.quantity),
            opt_count(component.stock),
            t(StockStatusCore::status(component).label_key())
        );
    }
    println!("{}", readiness_text(&gate.evaluate(&tool.components)));
}

fn readiness_text(readiness: &ToolReadiness) -> String {
    if readiness.total == 0 && readiness.eligible {
        t("readiness.empty")
    } else if readiness.eligible {
        t("readiness.eligible")
    } else {
        let short = (readiness.total - readiness.adequate).to_string();
        let total = readiness.total.to_string();
        t_with_args("readiness.blocked", &[("short", &short), ("total", &total)])
    }
}

fn opt_count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
