use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub forge: ForgeSettings,
    #[serde(default)]
    pub sites: HashMap<String, SiteSettings>,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

/// Credentials of the forge account the server comments as.
#[derive(Deserialize, Clone)]
pub struct ForgeSettings {
    pub user: String,
    pub token: String,
    pub api_base: String,
}

#[derive(Deserialize, Clone)]
pub struct SiteSettings {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_url_pattern")]
    pub url_pattern: String,
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    #[serde(default = "default_path_suffix")]
    pub path_suffix: String,
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
    #[serde(default = "default_marker_wrap")]
    pub marker_wrap: String,
    #[serde(default = "default_comment_template")]
    pub comment_template: String,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_url_pattern() -> String {
    "/[^/]+/(.*)/".to_string()
}

fn default_path_prefix() -> String {
    "_posts/".to_string()
}

fn default_path_suffix() -> String {
    ".markdown".to_string()
}

fn default_end_marker() -> String {
    "END_COMMENTS".to_string()
}

fn default_marker_wrap() -> String {
    "<!-- {} -->".to_string()
}

fn default_comment_template() -> String {
    "<div class=\"comment\"><b>{{name}}</b><p>{{comment}}</p></div>".to_string()
}

impl From<SiteSettings> for domain::Site {
    fn from(s: SiteSettings) -> Self {
        domain::Site {
            owner: s.owner,
            repo: s.repo,
            branch: s.branch,
            url_pattern: s.url_pattern,
            path_prefix: s.path_prefix,
            path_suffix: s.path_suffix,
            end_marker: s.end_marker,
            marker_wrap: s.marker_wrap,
            comment_template: s.comment_template,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("forge.user", "")?
            .set_default("forge.token", "")?
            .set_default("forge.api_base", "https://api.github.com")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("PRATTLE_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("PRATTLE_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
