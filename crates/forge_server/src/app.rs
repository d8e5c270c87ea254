//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that orchestrates server
//! startup and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, setup_signal_handlers_silent},
};
use forge::ForgeServer;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How long the accept loop gets to wind down after a shutdown request.
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Main application struct.
///
/// # Architecture
///
/// * **Configuration Management**: Loads and validates configuration from files and CLI
/// * **Server Orchestration**: Builds the Forge server and runs its accept loop
/// * **Graceful Shutdown**: Stops accepting on the first signal, exits hard on the second
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Forge server instance
    server: ForgeServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Build the server, its store and its greeting
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::prepare_config(&args).await?;

        display_banner();

        let server = forge::create_server_with_config(config.to_forge_config()?);

        info!(
            "📂 Config: {} | Greeting: {}",
            args.config_path.display(),
            config.greeting.file_path
        );

        Ok(Self { config, server })
    }

    /// Loads the configuration file and applies the CLI overrides on top.
    async fn prepare_config(args: &CliArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = &args.bind_address {
            config.server.bind_address = bind_address.clone();
        }

        if let Some(log_level) = &args.log_level {
            config.logging.level = log_level.clone();
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(greeting_path) = &args.greeting_path {
            config.greeting.file_path = greeting_path.to_string_lossy().to_string();
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        Ok(config)
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Forge MUD Server");

        self.log_configuration_summary();

        let server = Arc::new(self.server);

        let server_handle = {
            let server = server.clone();
            tokio::spawn(async move {
                match server.start().await {
                    Ok(()) => {
                        info!("✅ Server completed successfully");
                    }
                    Err(e) => {
                        error!("❌ Server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        info!("✅ Forge is now running!");
        info!(
            "🎮 Ready to accept connections on {}",
            self.config.server.bind_address
        );
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        setup_signal_handlers().await?;

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = setup_signal_handlers_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");

        if let Err(e) = server.shutdown().await {
            warn!("Shutdown notification failed: {}", e);
        }

        info!("⏳ Waiting for server task to complete gracefully...");
        match tokio::time::timeout(
            tokio::time::Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
            server_handle,
        )
        .await
        {
            Ok(_) => info!("✅ Server task completed gracefully"),
            Err(e) => warn!("⏰ Server task did not complete within timeout: {:?}", e),
        }

        info!(
            "📊 Connections still open at shutdown: {}",
            server.active_connections()
        );
        info!("✅ Forge shutdown complete");

        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!(
            "  👥 Max connections: {}",
            self.config.server.max_connections
        );
        info!("  📜 Greeting file: {}", self.config.greeting.file_path);
        info!(
            "  📝 Log level: {}{}",
            self.config.logging.level,
            if self.config.logging.json_format { " (json)" } else { "" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_for(path: PathBuf) -> CliArgs {
        CliArgs {
            config_path: path,
            bind_address: None,
            log_level: None,
            json_logs: false,
            greeting_path: None,
        }
    }

    #[tokio::test]
    async fn test_cli_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path().join("forge.toml"));
        args.bind_address = Some("127.0.0.1:0".to_string());
        args.log_level = Some("debug".to_string());
        args.json_logs = true;
        args.greeting_path = Some(PathBuf::from("motd.txt"));

        let config = Application::prepare_config(&args).await.unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:0");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.greeting.file_path, "motd.txt");
        // The default file was written before overrides were applied.
        assert!(args.config_path.exists());
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path().join("forge.toml"));
        args.log_level = Some("chatty".to_string());

        let err = Application::prepare_config(&args).await.unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));
    }

    #[tokio::test]
    async fn test_application_creation() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path().join("forge.toml"));
        args.bind_address = Some("127.0.0.1:0".to_string());
        args.greeting_path = Some(dir.path().join("missing-greeting.txt"));

        let app = Application::new(args).await.unwrap();

        assert_eq!(app.config.server.bind_address, "127.0.0.1:0");
        assert_eq!(app.server.active_connections(), 0);
        // A missing greeting file falls back to the built-in banner.
        assert!(!app.server.service().greeting().is_empty());
    }
}
