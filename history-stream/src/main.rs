use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, Command};
use common::{AccountSymbol, StreamItem};
use history_stream::{
    AccountStreamSource, AppConfig, HistoryPager, InMemorySignatureRepository, MultipleStreamSource,
    PageOutcome, RpcSignatureRepository, SignatureRepository, StreamSource,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("history-stream")
        .version("1.0")
        .author("Wallet History Team")
        .about("Merged, time-ordered transaction history across accounts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("fixture")
                .short('f')
                .long("fixture")
                .value_name("FILE")
                .help("Serve signatures from a JSON fixture instead of the RPC node"),
        )
        .arg(
            Arg::new("account")
                .short('a')
                .long("account")
                .value_name("ADDRESS:SYMBOL")
                .action(ArgAction::Append)
                .help("Account to include (repeatable, overrides the config file)"),
        )
        .arg(
            Arg::new("pages")
                .short('p')
                .long("pages")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .default_value("1")
                .help("Number of history pages to load"),
        )
        .get_matches();

    // 加载配置
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(accounts) = matches.get_many::<String>("account") {
        config.accounts = accounts
            .map(|raw| parse_account(raw))
            .collect::<Result<Vec<_>>>()?;
    }

    // 初始化日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 构建签名仓库
    let repository: Arc<dyn SignatureRepository> = match matches.get_one::<String>("fixture") {
        Some(path) => {
            let fixture = InMemorySignatureRepository::from_fixture_file(path)
                .with_context(|| format!("Failed to load fixture {}", path))?;
            if config.accounts.is_empty() {
                let mut addresses: Vec<String> = fixture.addresses().map(str::to_string).collect();
                addresses.sort();
                config.accounts = addresses
                    .into_iter()
                    .map(|address| AccountSymbol::new(address, "UNKNOWN"))
                    .collect();
            }
            info!("✓ Fixture loaded from {}", path);
            Arc::new(fixture)
        }
        None => {
            let rpc = RpcSignatureRepository::new(config.rpc.clone())
                .context("Failed to create RPC client")?;
            info!("✓ RPC node: {}", rpc.url());
            Arc::new(rpc)
        }
    };

    config.validate()?;
    info!("✓ Configuration loaded ({} accounts)", config.accounts.len());

    let source = build_source(&config, repository);
    let mut pager = HistoryPager::new(source, config.pager.clone());
    info!(
        "✓ Pager ready (page size {}, window {}h)",
        pager.config().page_size,
        pager.config().window_hours
    );

    // Ctrl-C 取消当前页
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling...");
            canceller.cancel();
        }
    });

    let pages = matches.get_one::<usize>("pages").copied().unwrap_or(1);
    for number in 1..=pages {
        let page = pager.fetch_page(&cancel).await;
        println!("--- Page {} ({} items) ---", number, page.items.len());
        for item in &page.items {
            println!("{}", format_item(item));
        }

        match page.outcome {
            PageOutcome::Full => continue,
            PageOutcome::Exhausted => {
                info!("History exhausted");
                break;
            }
            PageOutcome::Cancelled => {
                info!("Cancelled");
                break;
            }
            PageOutcome::Failed(error) => bail!("Failed to load history: {}", error),
        }
    }

    Ok(())
}

/// 单个账户直接使用账户数据源，多个账户合并
fn build_source(config: &AppConfig, repository: Arc<dyn SignatureRepository>) -> Box<dyn StreamSource> {
    let mut sources: Vec<Box<dyn StreamSource>> = config
        .accounts
        .iter()
        .map(|account| {
            Box::new(
                AccountStreamSource::new(&account.account, &account.symbol, repository.clone())
                    .with_batch_size(config.source.batch_size),
            ) as Box<dyn StreamSource>
        })
        .collect();

    if sources.len() == 1 {
        if let Some(source) = sources.pop() {
            return source;
        }
    }
    Box::new(MultipleStreamSource::new(sources))
}

fn parse_account(raw: &str) -> Result<AccountSymbol> {
    match raw.split_once(':') {
        Some((account, symbol)) if !account.is_empty() && !symbol.is_empty() => {
            Ok(AccountSymbol::new(account, symbol))
        }
        _ => bail!("Invalid account {:?}, expected ADDRESS:SYMBOL", raw),
    }
}

fn format_item(item: &StreamItem) -> String {
    let time = item
        .block_time()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "pending".to_string());
    let status = if item.signature_info.is_failed() { "failed" } else { "ok" };
    format!(
        "{}  {:<6} {}  {}  [{}]",
        time,
        item.symbol,
        item.account,
        item.signature(),
        status
    )
}
