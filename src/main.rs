use clap::Parser;
use recipe_gallery::{cli, config, driver, error, render};
use cli::{Cli, Commands};
use config::Config;
use driver::{Decision, UploadDriver, UploadRequest};
use error::{CliError, Result};
use recipe_gallery_common::{GalleryViewModel, RecipeDetail, RecipeStore, StaticDataset};
use std::path::Path;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dataset(path: Option<&Path>) -> Result<StaticDataset> {
    let dataset = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            StaticDataset::load(path)?
        }
        None => StaticDataset::bundled()?,
    };
    Ok(dataset)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;
    let dataset_path = cli.dataset.clone().or_else(|| config.dataset.clone());

    match cli.command {
        Commands::List { width, tag } => {
            let dataset = Rc::new(load_dataset(dataset_path.as_deref())?);
            let store = RecipeStore::new();
            let gallery = GalleryViewModel::new(dataset, &store, &config.gallery, |_| {});
            gallery.load();
            if let Some(width) = width {
                gallery.update_layout(width);
            }

            let recipes = render::with_tag(gallery.recipes(), tag.as_deref());
            let columns = width.map(|_| gallery.grid_columns());
            print!("{}", render::format_recipe_list(&recipes, columns));
        }

        Commands::Show { id } => {
            let dataset = Rc::new(load_dataset(dataset_path.as_deref())?);
            let store = RecipeStore::new();
            let detail = RecipeDetail::open(id, dataset, &store, |_| {});
            let recipe = detail.resolve()?;
            print!("{}", render::format_recipe(&recipe));
        }

        Commands::Validate { file } => {
            println!("🔍 データセットを検証中: {}", file.display());
            let dataset = load_dataset(Some(&file))?;
            let missing_images = dataset
                .recipes()
                .iter()
                .filter(|r| r.display_image().as_str().is_empty())
                .count();
            println!("✔ {}件のレシピ（ID重複なし）", dataset.len());
            if missing_images > 0 {
                println!("⚠ 画像が未設定のレシピ: {}件", missing_images);
            }
        }

        Commands::Upload { file, mime, title, description, accept, cancel, fail_save } => {
            println!("📷 recipe-gallery - 擬似アップロード\n");
            let dataset = Rc::new(load_dataset(dataset_path.as_deref())?);

            let decision = match (accept, cancel) {
                (true, _) => Decision::Accept,
                (_, true) => Decision::Cancel,
                _ => Decision::Ask,
            };
            let request = UploadRequest {
                mime_type: mime,
                title,
                description,
                fail_save,
                ..UploadRequest::new(file, decision)
            };

            let report = UploadDriver::new(config.gallery.clone(), dataset).run(&request).await?;
            match (&report.accepted, &report.error) {
                (Some(recipe), _) => {
                    println!("✔ ギャラリーに追加しました: {} ({})", recipe.title, recipe.id);
                    println!("  ギャラリー: {}件", report.gallery_count);
                }
                (None, Some(message)) => return Err(CliError::SaveFailed(message.clone())),
                (None, None) => {
                    println!("破棄しました（一時参照を{}件解放）", report.released_images);
                }
            }
        }

        Commands::Config { show, reset } => {
            let mut config = config;

            if reset {
                config = Config::default();
                config.save()?;
                println!("✔ デフォルト設定を書き出しました: {}", Config::config_path()?.display());
            }

            if show || !reset {
                println!("設定 ({}):", Config::config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
