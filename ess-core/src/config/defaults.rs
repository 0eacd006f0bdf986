// Single source of truth for all default values.

// --- Generation ---
pub const DEFAULT_GENERATION_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GENERATION_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GENERATION_MAX_RETRIES: u32 = 2;
pub const DEFAULT_GENERATION_INITIAL_BACKOFF_MS: u64 = 250;
pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.0;
pub const API_KEY_ENV_VARS: &[&str] = &["ESS_API_KEY", "GROQ_API_KEY"];

// --- Structured data ---
pub const DEFAULT_MAX_ROWS: usize = 50;
pub const DEFAULT_EMPLOYEES_TABLE: &str = "employees";
pub const DEFAULT_CODE_COLUMN: &str = "employee_code";
pub const DEFAULT_NAME_COLUMN: &str = "employee_name";
pub const DEFAULT_SUPERVISOR_COLUMN: &str = "supervisor_id";

// --- Documents ---
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MIN_SCORE: f32 = 0.0;
pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

// --- Access ---
/// Columns a manager may read for a direct report.
pub const DEFAULT_BASIC_FIELDS: &[&str] = &[
    "employee_code",
    "employee_name",
    "department",
    "designation",
    "employment_status",
    "supervisor_id",
    "leave_type",
    "total_allotted",
    "leaves_taken",
    "remaining",
    "request_id",
    "start_date",
    "end_date",
    "status",
];

/// Columns that are never shown to anyone but the subject and HR admins.
pub const DEFAULT_RESTRICTED_FIELDS: &[&str] = &[
    "email",
    "phone",
    "address",
    "date_of_birth",
    "gender",
    "hire_date",
    "tenure_years",
    "month",
    "gross_salary",
    "net_salary",
    "bonus",
];

// --- Session ---
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

// --- Pipeline ---
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_REQUEST_LOG_CAPACITY: usize = 10_000;
pub const DEFAULT_DEGRADATION_CAPACITY: usize = 256;
pub const RECENT_FAILURE_WINDOW_SECS: i64 = 300;
pub const LOG_FILTER_ENV_VAR: &str = "ESS_LOG";
