use clap::Parser;
use math_solver::config::Command;
use math_solver::domain::ports::ImageTextExtractor;
use math_solver::utils::{logger, validation::Validate};
use math_solver::{
    app, classify, ApiKeys, ApiServer, AppConfig, CliConfig, ErrorCategory, ProblemInput,
    SolverError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 讀取 .env（若存在），之後才讀環境變數
    dotenv::dotenv().ok();

    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting math-solver");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_app_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    let keys = ApiKeys::from_env();
    tracing::debug!("API keys: {:?}", keys);

    if let Err(e) = run(cli.command(), config, keys).await {
        exit_with(&e);
    }

    Ok(())
}

async fn run(command: Command, config: AppConfig, keys: ApiKeys) -> Result<(), SolverError> {
    match command {
        Command::Serve { .. } => {
            let state = app::build_state(&config, &keys)?;
            let server = ApiServer::new(config.server.clone(), state);
            server
                .start()
                .await
                .map_err(|e| SolverError::IoError(std::io::Error::other(e.to_string())))?;
        }
        Command::Solve {
            text,
            image,
            domain,
        } => {
            let service = app::build_service(&config, &keys)?;
            let input = match image {
                Some(path) => ProblemInput::Image {
                    filename: path.display().to_string(),
                    bytes: std::fs::read(&path)?,
                },
                None => ProblemInput::Text(text.unwrap_or_default()),
            };
            let domain = domain.map(|d| d.as_str());

            let outcome = service.solve(input, domain).await?;
            println!("📘 Problem ({}): {}\n", outcome.domain, outcome.problem);
            println!("{}", outcome.solution);
        }
        Command::Similar {
            text,
            domain,
            count,
        } => {
            let service = app::build_service(&config, &keys)?;
            let count = count
                .map(usize::from)
                .unwrap_or(config.generator.similar_count);
            let domain = domain.map(|d| d.as_str());

            for problem in service.similar(&text, domain, count).await? {
                println!("{}", problem);
            }
        }
        Command::Extract { image } => {
            let service = app::build_service(&config, &keys)?;
            let bytes = std::fs::read(&image)?;
            let text = service.extractor().extract_text(&bytes).await?;
            println!("{}", text);
        }
        Command::Classify { text } => {
            println!("{}", classify(&text));
        }
    }

    Ok(())
}

fn exit_with(e: &SolverError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤類別決定退出碼
    let exit_code = match e.category() {
        ErrorCategory::Input => 2,
        ErrorCategory::Extraction => 3,
        ErrorCategory::Configuration => 4,
        ErrorCategory::ExternalService => 1,
    };
    std::process::exit(exit_code);
}
