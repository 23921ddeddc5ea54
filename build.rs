use serde::Deserialize;
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
struct Config {
    app_id: String,
    name: String,
    product_name: String,
    company: String,
    description: String,
    version: String,
    install_folder: String,
    module_subpath: String,
    settings_subfolder: String,
    settings_prefix: String,
    #[serde(default = "default_settings_extension")]
    settings_extension: String,
    paths_key: String,
}

fn default_settings_extension() -> String {
    "ini".to_string()
}

fn main() {
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let repo_root = PathBuf::from(manifest_dir);

    let config = load_config(&repo_root).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });
    if let Err(err) = validate_config(&config) {
        panic!("invalid config.toml: {err}");
    }

    if let Err(err) = embed_metadata(&config) {
        panic!("failed to embed version resource: {err}");
    }

    if let Err(err) = write_config_rs(&PathBuf::from(&out_dir), &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(repo_root: &Path) -> io::Result<Config> {
    let config_path = repo_root.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    let cfg: Config = toml::from_str(&contents)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(cfg)
}

fn validate_config(config: &Config) -> io::Result<()> {
    for (name, value) in [
        ("name", &config.name),
        ("install_folder", &config.install_folder),
        ("module_subpath", &config.module_subpath),
        ("settings_subfolder", &config.settings_subfolder),
        ("settings_prefix", &config.settings_prefix),
        ("paths_key", &config.paths_key),
    ] {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("config field {name} is required"),
            ));
        }
    }
    if config.module_subpath.contains('\\') || config.module_subpath.starts_with('/') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "module_subpath must be relative and use '/' separators",
        ));
    }
    Ok(())
}

#[cfg(windows)]
fn embed_metadata(config: &Config) -> io::Result<()> {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return Ok(());
    }
    let mut res = winres::WindowsResource::new();
    if !config.product_name.is_empty() {
        res.set("ProductName", &config.product_name);
    }
    if !config.description.is_empty() {
        res.set("FileDescription", &config.description);
    }
    if !config.company.is_empty() {
        res.set("CompanyName", &config.company);
    }
    if !config.version.is_empty() {
        res.set("FileVersion", &config.version);
        res.set("ProductVersion", &config.version);
    }
    if !config.app_id.is_empty() {
        res.set("InternalName", &config.app_id);
    }
    res.compile()?;
    Ok(())
}

#[cfg(not(windows))]
fn embed_metadata(_config: &Config) -> io::Result<()> {
    Ok(())
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    let out_path = out_dir.join("iq_config.rs");
    let mut file = File::create(&out_path)?;
    writeln!(file, "pub const APP_ID: &str = {:?};", config.app_id)?;
    writeln!(file, "pub const NAME: &str = {:?};", config.name)?;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const COMPANY: &str = {:?};", config.company)?;
    writeln!(file, "pub const DESCRIPTION: &str = {:?};", config.description)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    writeln!(file, "pub const INSTALL_FOLDER: &str = {:?};", config.install_folder)?;
    writeln!(
        file,
        "pub const MODULE_SUBPATH: &str = {:?};",
        config.module_subpath.trim_end_matches('/')
    )?;
    writeln!(
        file,
        "pub const SETTINGS_SUBFOLDER: &str = {:?};",
        config.settings_subfolder
    )?;
    writeln!(file, "pub const SETTINGS_PREFIX: &str = {:?};", config.settings_prefix)?;
    writeln!(
        file,
        "pub const SETTINGS_EXTENSION: &str = {:?};",
        config.settings_extension.trim_start_matches('.')
    )?;
    writeln!(file, "pub const PATHS_KEY: &str = {:?};", config.paths_key)?;
    Ok(())
}
