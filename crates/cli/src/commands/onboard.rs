//! `puzzlebot onboard`: First-time setup.

use puzzlebot_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    println!("🧩 puzzlebot: First-Time Setup");
    println!("===============================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());

    let config = AppConfig::default();
    println!("\n📝 Next steps:");
    println!("   1. Set server.user_token (or PUZZLEBOT_USER_TOKEN)");
    println!(
        "   2. Make sure {} holds a Cargo project with src/main_template.rs",
        config.sandbox.project_dir.display()
    );
    println!("   3. Start your model server, then run: puzzlebot doctor");
    println!("   4. Run: puzzlebot run\n");

    Ok(())
}
