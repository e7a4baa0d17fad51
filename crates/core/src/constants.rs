/// Constants used throughout the hashictl codebase
// Configuration file extensions
pub const CONFIG_EXTENSION: &str = "hcl";
pub const TEMPLATE_EXTENSION: &str = "ctmpl";
pub const VARIABLE_FILE_SUFFIX: &str = ".var.hcl";

// Template rendering
pub const DEFAULT_MAX_RENDER_DEPTH: usize = 10;
pub const PLUGIN_TIMEOUT_SECS: u64 = 30;

// Remote secret hierarchy
pub const SECRET_MOUNT: &str = "secret";
pub const UNKNOWN_ENVIRONMENT: &str = "unknown";

// Environment variable names
pub const HASHICTL_CONCURRENCY_VAR: &str = "HASHICTL_CONCURRENCY";
pub const HASHICTL_LIST_TIMEOUT_VAR: &str = "HASHICTL_LIST_TIMEOUT";
pub const HASHICTL_RESULT_TIMEOUT_VAR: &str = "HASHICTL_RESULT_TIMEOUT";
pub const HASHICTL_READ_TIMEOUT_VAR: &str = "HASHICTL_READ_TIMEOUT";

// Remote worker pool defaults
pub const DEFAULT_LIST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RESULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;
pub const CONCURRENCY_PER_CORE: usize = 3;
