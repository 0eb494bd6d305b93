pub mod context;
pub mod display;
pub mod result;
pub mod scheduler;
pub mod stats;

pub use context::{ContextManager, ContextMode, SessionError, SessionProvider};
pub use result::{
    DEPENDENCY_SKIP_REASON_PREFIX, ExecutionResult, TestError, TestErrorKind, TestStatus,
};
pub use scheduler::{LogLevel, RunError, RunErrorKind, SuiteConfig, SuiteRunResult, SuiteRunner};
pub use stats::{PriorityBucket, PriorityExecutionStats, aggregate};
