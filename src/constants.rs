//! Constants used throughout the application
//!
//! This module centralizes prompt texts, user-visible message prefixes and
//! other constant values to improve maintainability and consistency.

// Prompts
pub const PROMPT_REMOVE_SERVICE: &str = "The selected service will be removed. Do you want to proceed? y/N";
pub const PROMPT_SCALE_SERVICE: &str = "Scale service. Number of replicas?";
pub const PROMPT_SERVICE_LOGS: &str =
    "Show logs since timestamp (e.g. 2013-01-02T13:23:37) or relative (e.g. 42m for 42 minutes) or leave empty";
pub const PROMPT_FILTER_SERVICES: &str = "Filter services by name (leave empty to show all)";

// Info Messages
pub const INFO_REFRESHING_SERVICES: &str = "Refreshing the service list";

// Error Messages
pub const ERROR_REMOVE_SERVICE: &str = "There was an error removing the service";
pub const ERROR_SCALE_SERVICE: &str = "There was an error scaling the service";
pub const ERROR_SERVICE_LOGS: &str = "There was an error showing service logs";
pub const ERROR_INSPECT_SERVICE: &str = "There was an error inspecting the service";
pub const ERROR_SHOW_TASKS: &str = "There was an error showing the service tasks";
pub const ERROR_INVALID_REPLICAS: &str = "Cannot scale service, invalid number of replicas";
pub const ERROR_INTERACTION_BUSY: &str = "Another interaction is already in progress";

// Status bar
pub const KEY_HINTS: &str =
    "↑↓: move • Enter: tasks • ^S: scale • ^R: remove • l: logs • i: inspect • %: filter • F1: sort • F5: refresh • q: quit";
pub const STATUS_MESSAGE_TTL_SECS: i64 = 10;

// Configuration
pub const CONFIG_FILE_NAME: &str = "swarmdeck.toml";
pub const APP_DIR_NAME: &str = "swarmdeck";
pub const LOG_FILE_NAME: &str = "swarmdeck.log";
pub const PAGE_SIZE_MIN: usize = 1;
pub const PAGE_SIZE_MAX: usize = 100;
pub const LOG_LINES_MIN: usize = 10;
pub const LOG_LINES_MAX: usize = 100_000;
