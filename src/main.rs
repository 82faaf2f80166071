use clap::Parser;
use repo_viewer::config::cli::Command;
use repo_viewer::core::download::all_downloaded;
use repo_viewer::core::ClientSettings;
use repo_viewer::runtime::build_runtime;
use repo_viewer::utils::error::ErrorSeverity;
use repo_viewer::utils::{logger, validation::Validate};
use repo_viewer::{
    AssetDownloaderService, CliConfig, ComparisonOperator, DownloaderService, HttpClient,
    LocalStorage, Release, Request, ResponseStatus, Result, TomlConfig, UrlBuilder, ViewerError,
};
use std::process::ExitCode;

/// Exit code for bad flags or an unusable config file.
const CONFIG_EXIT_CODE: u8 = 1;
/// Exit code used when the API answered with anything but a decodable 200.
const STATUS_EXIT_CODE: u8 = 4;
/// Exit code of `compare` when the comparison does not hold.
const COMPARISON_FALSE_EXIT_CODE: u8 = 5;

fn main() -> ExitCode {
    let mut config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if let Some(path) = config.config.clone() {
        tracing::info!("📁 Loading configuration from: {}", path);
        match TomlConfig::from_file(&path).and_then(|file| file.validate().map(|_| file)) {
            Ok(file) => config.apply_file(&file),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 {}", e.recovery_suggestion());
                return ExitCode::from(CONFIG_EXIT_CODE);
            }
        }
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        return ExitCode::from(CONFIG_EXIT_CODE);
    }
    tracing::debug!("CLI config: {:?}", config);

    let runtime = match build_runtime(config.threads()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            return ExitCode::from(3);
        }
    };

    match runtime.block_on(run(&config)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            ExitCode::from(exit_code)
        }
    }
}

async fn run(config: &CliConfig) -> Result<ExitCode> {
    let urls = UrlBuilder::new(config.api_url())?;
    let client = HttpClient::from_settings(config)?;

    match &config.command {
        Command::Repo { owner, repo } => {
            let status = Request::create()
                .url(urls.for_repository(owner, repo)?)
                .client(client)
                .timeout(config.timeout_seconds())
                .repository()?
                .request_and_handle()
                .await;
            Ok(match status {
                ResponseStatus::Valid(repository) => {
                    println!("{}", repository);
                    println!("  url:      {}", UrlBuilder::html_url(owner, repo)?);
                    ExitCode::SUCCESS
                }
                other => report_status(&format!("{}/{}", owner, repo), &other),
            })
        }
        Command::Release { owner, repo, tag } => {
            Ok(match fetch_release(config, &urls, client, owner, repo, tag).await? {
                ResponseStatus::Valid(release) => {
                    println!("{}", release);
                    ExitCode::SUCCESS
                }
                other => report_status(&format!("{}/{}@{}", owner, repo, tag), &other),
            })
        }
        Command::Download {
            owner,
            repo,
            tag,
            index,
            ..
        } => {
            let release = match fetch_release(config, &urls, client, owner, repo, tag).await? {
                ResponseStatus::Valid(release) => release,
                other => {
                    return Ok(report_status(&format!("{}/{}@{}", owner, repo, tag), &other))
                }
            };
            download(config, &release, *index).await
        }
        Command::Compare {
            owner,
            repo,
            operator,
            version,
            tag,
        } => {
            let operator: ComparisonOperator = operator.parse()?;
            let release = match fetch_release(config, &urls, client, owner, repo, tag).await? {
                ResponseStatus::Valid(release) => release,
                other => {
                    return Ok(report_status(&format!("{}/{}@{}", owner, repo, tag), &other))
                }
            };
            let holds = release.compare_version_string(operator, version)?;
            println!(
                "{} {} {} ({}): {}",
                version, operator, release.tag, release.name, holds
            );
            Ok(ExitCode::from(comparison_exit_code(holds)))
        }
    }
}

async fn fetch_release(
    config: &CliConfig,
    urls: &UrlBuilder,
    client: HttpClient,
    owner: &str,
    repo: &str,
    tag: &str,
) -> Result<ResponseStatus<Release>> {
    Ok(Request::create()
        .url(urls.for_release(owner, repo, tag)?)
        .client(client)
        .timeout(config.timeout_seconds())
        .release()?
        .request_and_handle()
        .await)
}

async fn download(
    config: &CliConfig,
    release: &Release,
    index: Option<usize>,
) -> Result<ExitCode> {
    let directory = config.download_directory();
    let downloader = DownloaderService::with_client(
        LocalStorage::new("."),
        HttpClient::downloads_from_settings(config)?,
    );
    let service =
        AssetDownloaderService::new(downloader).with_concurrency(config.concurrent_downloads());

    if release.assets.is_empty() {
        println!("Release {} has no assets", release.tag);
        return Ok(ExitCode::SUCCESS);
    }

    let statuses = match index {
        Some(index) => vec![service.download(&release.assets, directory, index).await],
        None => service.download_all(&release.assets, directory).await,
    };

    for (position, status) in statuses.iter().enumerate() {
        let asset_position = match index {
            Some(index) => index.checked_sub(1),
            None => Some(position),
        };
        let name = asset_position
            .and_then(|p| release.assets.get(p))
            .map_or("<none>", |a| a.name.as_str());
        if status.was_downloaded() {
            println!("✅ {} ({} bytes)", name, status.bytes());
        } else if status.was_unknown() {
            println!("⚠️  {}: nothing was downloaded", name);
        } else {
            println!("❌ {}: download failed", name);
        }
    }

    if all_downloaded(&statuses) {
        println!("📁 Saved to: {}", directory);
        Ok(ExitCode::SUCCESS)
    } else {
        Err(ViewerError::DownloadError {
            message: "one or more assets were not downloaded".to_string(),
        })
    }
}

fn comparison_exit_code(holds: bool) -> u8 {
    if holds {
        0
    } else {
        COMPARISON_FALSE_EXIT_CODE
    }
}

fn report_status<A>(target: &str, status: &ResponseStatus<A>) -> ExitCode {
    let hint = match status {
        ResponseStatus::Unauthorized => "the token was rejected",
        ResponseStatus::Forbidden => "access denied or rate limited",
        ResponseStatus::MovedPermanently => "the repository was renamed or transferred",
        _ => "not found, unreachable, or an unexpected response",
    };
    tracing::warn!("Request for {} finished as {}", target, status);
    eprintln!("❌ {}: {} ({})", target, status, hint);
    ExitCode::from(STATUS_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_comparison_has_its_own_exit_code() {
        assert_eq!(comparison_exit_code(true), 0);

        let code = comparison_exit_code(false);
        assert_ne!(code, 0);
        assert_ne!(code, CONFIG_EXIT_CODE);
        assert_ne!(code, STATUS_EXIT_CODE);
        // Codes 1..=3 are reserved for error severities.
        assert!(code > 3);
    }
}
