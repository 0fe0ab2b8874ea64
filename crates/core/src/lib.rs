pub mod config;
pub mod driver;
pub mod orchestrator;
pub mod pipeline;
pub mod profile;
pub mod queue;
pub mod status;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DriverConfig,
    ImagesConfig, SanitizedConfig,
};
pub use driver::{
    AutomationDriver, DriverError, FetchedImage, ImageFetchError, ImageFetcher, StockImageFetcher,
    WebDriverAutomation, WebDriverError,
};
pub use orchestrator::{
    OrchestratorError, QueueRunner, RunController, RunStarted, RunSummary, RunnerConfig,
};
pub use pipeline::{PipelineOutcome, PipelineStep, StepOutcome, TaskPipeline};
pub use profile::{
    CreateProfileRequest, InMemoryProfileStore, JsonProfileStore, Profile, ProfileError,
    ProfileStore, UpdateProfileRequest,
};
pub use queue::{EntryStatus, QueueEntry};
pub use status::{LogLevel, RunState, StatusError, StatusStore, TaskResult};
