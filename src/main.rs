use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use label_match::{cli, config, directory, matcher, ocr, pipeline, preprocess, scanner};
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "label_match=debug,label_match_common=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Preprocess { image, output } => {
            println!("🖼  label-match - 前処理\n");

            let bytes = std::fs::read(&image)
                .with_context(|| format!("画像を読み込めません: {}", image.display()))?;
            let processed = preprocess::preprocess(&bytes, &config.preprocess_options())?;

            let output = output.unwrap_or_else(|| cli::processed_path(&image));
            std::fs::write(&output, processed)?;
            println!("✔ 前処理画像を保存: {}", output.display());
        }

        Commands::Match { text, lines, input, directory } => {
            let input = cli::label_text_from_args(text, lines, input.as_deref())?;
            let directory_path = config.resolve_directory(directory)?;
            let matcher = matcher::LecturerMatcher::new(directory::FileDirectory::new(directory_path));

            let outcome = matcher.evaluate(&input).await?;
            match outcome.email() {
                Some(email) => println!("{}", email),
                None => println!("no match"),
            }
            if cli.verbose {
                println!("{:?}", outcome);
            }
        }

        Commands::Scan { image, directory, keep_processed } => {
            println!("📦 label-match - ラベル照合\n");

            let directory_path = config.resolve_directory(directory)?;
            let pipeline = pipeline::LabelPipeline::new(
                ocr::AzureReadClient::from_config(&config)?,
                directory::FileDirectory::new(directory_path),
                config.preprocess_options(),
                config.poll_interval(),
            );

            println!("[1/2] 前処理・OCR中...");
            let file_name = image
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let result = pipeline.process_file(&image, &file_name).await?;
            println!("✔ {}行を認識\n", result.report.lines.len());

            if keep_processed {
                let path = cli::processed_path(&image);
                std::fs::write(&path, &result.processed_image)?;
                println!("✔ 前処理画像を保存: {}", path.display());
            }

            println!("[2/2] 照合結果");
            for line in &result.report.lines {
                println!("  | {}", line);
            }
            match (&result.report.email, &result.report.recipient_name) {
                (Some(email), Some(name)) => println!("\n✅ 宛先: {} <{}>", name, email),
                (Some(email), None) => println!("\n✅ 宛先: {}", email),
                (None, _) => println!("\n⚠ 該当する教員が見つかりません"),
            }
        }

        Commands::Batch { folder, directory, output, recursive } => {
            println!("📦 label-match - 一括照合\n");

            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder, recursive)?;
            println!("✔ {}枚の写真を検出\n", images.len());
            if images.is_empty() {
                return Ok(());
            }

            let directory_path = config.resolve_directory(directory)?;
            let pipeline = pipeline::LabelPipeline::new(
                ocr::AzureReadClient::from_config(&config)?,
                directory::FileDirectory::new(directory_path),
                config.preprocess_options(),
                config.poll_interval(),
            );

            println!("[2/3] OCR・照合中...");
            let pb = ProgressBar::new(images.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
                    .progress_chars("█▓░"),
            );

            let mut reports = Vec::with_capacity(images.len());
            for image in &images {
                pb.set_message(image.file_name.clone());
                match pipeline.process_file(&image.path, &image.file_name).await {
                    Ok(result) => reports.push(result.report),
                    Err(e) => {
                        tracing::warn!(file = %image.file_name, error = %e, "ラベル処理に失敗");
                        pb.println(format!("✖ {}: {}", image.file_name, e));
                    }
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            let matched = reports.iter().filter(|r| r.email.is_some()).count();
            println!("✔ {}/{}件で宛先を特定\n", matched, reports.len());

            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| folder.join("label-match.json"));
            let json = serde_json::to_string_pretty(&reports)?;
            std::fs::write(&output, json)?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 完了");
        }

        Commands::Config { set_ocr_key, set_ocr_endpoint, set_directory, show } => {
            let mut config = config;

            if let Some(key) = set_ocr_key {
                config.set_ocr_key(key)?;
                println!("✔ OCRキーを設定しました");
            }

            if let Some(endpoint) = set_ocr_endpoint {
                config.set_ocr_endpoint(endpoint)?;
                println!("✔ OCRエンドポイントを設定しました");
            }

            if let Some(path) = set_directory {
                config.set_directory(path)?;
                println!("✔ 教員ディレクトリを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  OCRエンドポイント: {}",
                    config.ocr_endpoint.as_deref().unwrap_or("未設定")
                );
                println!(
                    "  OCRキー: {}",
                    if config.get_ocr_key().is_ok() { "設定済み" } else { "未設定" }
                );
                println!(
                    "  教員ディレクトリ: {}",
                    config
                        .directory_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  ポーリング間隔: {}ms", config.poll_interval_ms);
                println!(
                    "  サイズ制限: {}",
                    if config.limit_size {
                        format!("{}x{}px", config.max_width, config.max_height)
                    } else {
                        "なし".into()
                    }
                );
                println!(
                    "  背景しきい値: {} / 余白: {}px",
                    config.background_threshold, config.padding
                );
            }
        }
    }

    Ok(())
}
