mod settings;

pub use settings::{
    DatabaseConfig, DiscoveryConfig, HunterConfig, LlmConfig, SenderProfile, ServerConfig,
    Settings,
};
