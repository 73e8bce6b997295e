//! Command-Line Interface

use crate::recognition::ScoringMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gesture Recognizer - Recognise hand gestures from centroid traces
#[derive(Parser, Debug)]
#[command(name = "gesture-rec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded centroid trace through the engine
    Replay {
        /// Trace file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Scoring mode (overrides config)
        #[arg(short, long)]
        mode: Option<ScoringMode>,

        /// Rejection threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print reports as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Recognise gestures from "x y" lines on stdin
    Listen {
        /// Scoring mode (overrides config)
        #[arg(short, long)]
        mode: Option<ScoringMode>,

        /// Rejection threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Save the received centroids as a trace file on exit
        #[arg(short, long)]
        record: Option<String>,
    },

    /// Score one point sequence against every template
    Classify {
        /// JSON array of points
        #[arg(short, long)]
        input: PathBuf,

        /// Scoring mode (overrides config)
        #[arg(short, long)]
        mode: Option<ScoringMode>,
    },

    /// Run synthetic gestures for every built-in template
    Demo {
        /// Scoring mode (overrides config)
        #[arg(short, long)]
        mode: Option<ScoringMode>,

        /// Gesture size in pixels
        #[arg(short, long, default_value = "500")]
        size: f64,

        /// Hand speed in pixels per frame
        #[arg(long, default_value = "30")]
        speed: f64,
    },

    /// List registered templates
    Templates {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// List saved traces
    Traces {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "camera.width", "recognition.scoring_mode")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the saved traces directory
    pub fn traces_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_engine").join("traces"))
            .unwrap_or_else(|| PathBuf::from("traces"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_traces_dir() {
        let dir = Cli::traces_dir();
        assert!(dir.to_string_lossy().contains("traces"));
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_cli_parse_replay_command_with_defaults() {
        let args = vec!["gesture-rec", "replay", "--input", "/tmp/trace.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Replay { input, mode, threshold, json } => {
                assert_eq!(input, PathBuf::from("/tmp/trace.json"));
                assert!(mode.is_none());
                assert!(threshold.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Replay command"),
        }
    }

    #[test]
    fn test_cli_parse_replay_command_with_all_options() {
        let args = vec![
            "gesture-rec",
            "replay",
            "-i", "trace.json",
            "--mode", "index-proportional",
            "--threshold", "250",
            "--json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Replay { input, mode, threshold, json } => {
                assert_eq!(input, PathBuf::from("trace.json"));
                assert_eq!(mode, Some(ScoringMode::IndexProportional));
                assert_eq!(threshold, Some(250.0));
                assert!(json);
            }
            _ => panic!("Expected Replay command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let args = vec!["gesture-rec", "replay", "-i", "t.json", "--mode", "fastest"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parse_listen_command() {
        let args = vec![
            "gesture-rec",
            "listen",
            "--mode", "bounding-box-normalized",
            "--record", "session1",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Listen { mode, threshold, record } => {
                assert_eq!(mode, Some(ScoringMode::BoundingBoxNormalized));
                assert!(threshold.is_none());
                assert_eq!(record.as_deref(), Some("session1"));
            }
            _ => panic!("Expected Listen command"),
        }
    }

    #[test]
    fn test_cli_parse_classify_command() {
        let args = vec!["gesture-rec", "classify", "--input", "points.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Classify { input, mode } => {
                assert_eq!(input, PathBuf::from("points.json"));
                assert!(mode.is_none());
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_cli_parse_demo_command_defaults() {
        let args = vec!["gesture-rec", "demo"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Demo { mode, size, speed } => {
                assert!(mode.is_none());
                assert_eq!(size, 500.0);
                assert_eq!(speed, 30.0);
            }
            _ => panic!("Expected Demo command"),
        }
    }

    #[test]
    fn test_cli_parse_templates_command() {
        let args = vec!["gesture-rec", "templates", "--detailed"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Templates { detailed } => assert!(detailed),
            _ => panic!("Expected Templates command"),
        }
    }

    #[test]
    fn test_cli_parse_traces_command_defaults() {
        let args = vec!["gesture-rec", "traces"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Traces { detailed } => assert!(!detailed),
            _ => panic!("Expected Traces command"),
        }
    }

    #[test]
    fn test_cli_parse_init_command() {
        let args = vec!["gesture-rec", "init", "--force"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let args = vec!["gesture-rec", "-v", "-c", "/custom/config.toml", "demo"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let args = vec!["gesture-rec", "templates", "--verbose"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_config_set() {
        let args = vec![
            "gesture-rec",
            "config",
            "set",
            "recognition.scoring_mode",
            "\"index-proportional\"",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Config { action: ConfigAction::Set { key, value } } => {
                assert_eq!(key, "recognition.scoring_mode");
                assert_eq!(value, "\"index-proportional\"");
            }
            _ => panic!("Expected Config Set"),
        }
    }

    #[test]
    fn test_cli_parse_config_get() {
        let args = vec!["gesture-rec", "config", "get", "camera.width"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Config { action: ConfigAction::Get { key } } => {
                assert_eq!(key, "camera.width");
            }
            _ => panic!("Expected Config Get"),
        }
    }

    #[test]
    fn test_cli_parse_config_reset_defaults() {
        let args = vec!["gesture-rec", "config", "reset"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Config { action: ConfigAction::Reset { force } } => assert!(!force),
            _ => panic!("Expected Config Reset"),
        }
    }

    #[test]
    fn test_cli_missing_required_argument_fails() {
        let args = vec!["gesture-rec", "replay"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_invalid_command_fails() {
        let args = vec!["gesture-rec", "record"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        cmd.clone().debug_assert();

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for name in ["replay", "listen", "classify", "demo", "templates", "traces", "init", "config"] {
            assert!(subcommands.contains(&name), "missing {}", name);
        }
    }
}
