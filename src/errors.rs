use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkletError {
    CacheConnection(String),
    CacheOperation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    DuplicateId(String),
    NotFound(String),
    Validation(String),
    AllocationExhausted(String),
    SyncPartialFailure(String),
    Serialization(String),
}

impl LinkletError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkletError::CacheConnection(_) => "E001",
            LinkletError::CacheOperation(_) => "E002",
            LinkletError::DatabaseConfig(_) => "E003",
            LinkletError::DatabaseConnection(_) => "E004",
            LinkletError::DatabaseOperation(_) => "E005",
            LinkletError::DuplicateId(_) => "E006",
            LinkletError::NotFound(_) => "E007",
            LinkletError::Validation(_) => "E008",
            LinkletError::AllocationExhausted(_) => "E009",
            LinkletError::SyncPartialFailure(_) => "E010",
            LinkletError::Serialization(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkletError::CacheConnection(_) => "Cache Connection Error",
            LinkletError::CacheOperation(_) => "Cache Operation Error",
            LinkletError::DatabaseConfig(_) => "Database Configuration Error",
            LinkletError::DatabaseConnection(_) => "Database Connection Error",
            LinkletError::DatabaseOperation(_) => "Database Operation Error",
            LinkletError::DuplicateId(_) => "Duplicate Short Id",
            LinkletError::NotFound(_) => "Resource Not Found",
            LinkletError::Validation(_) => "Validation Error",
            LinkletError::AllocationExhausted(_) => "Id Allocation Exhausted",
            LinkletError::SyncPartialFailure(_) => "Click Sync Partial Failure",
            LinkletError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkletError::CacheConnection(msg) => msg,
            LinkletError::CacheOperation(msg) => msg,
            LinkletError::DatabaseConfig(msg) => msg,
            LinkletError::DatabaseConnection(msg) => msg,
            LinkletError::DatabaseOperation(msg) => msg,
            LinkletError::DuplicateId(msg) => msg,
            LinkletError::NotFound(msg) => msg,
            LinkletError::Validation(msg) => msg,
            LinkletError::AllocationExhausted(msg) => msg,
            LinkletError::SyncPartialFailure(msg) => msg,
            LinkletError::Serialization(msg) => msg,
        }
    }

    /// 软错误：快速层故障只记录日志，绝不冒泡给调用方
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            LinkletError::CacheConnection(_)
                | LinkletError::CacheOperation(_)
                | LinkletError::SyncPartialFailure(_)
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkletError {}

// 便捷的构造函数
impl LinkletError {
    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        LinkletError::CacheConnection(msg.into())
    }

    pub fn cache_operation<T: Into<String>>(msg: T) -> Self {
        LinkletError::CacheOperation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkletError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkletError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkletError::DatabaseOperation(msg.into())
    }

    pub fn duplicate_id<T: Into<String>>(msg: T) -> Self {
        LinkletError::DuplicateId(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkletError::NotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkletError::Validation(msg.into())
    }

    pub fn allocation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkletError::AllocationExhausted(msg.into())
    }

    pub fn sync_partial_failure<T: Into<String>>(msg: T) -> Self {
        LinkletError::SyncPartialFailure(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkletError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkletError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkletError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for LinkletError {
    fn from(err: redis::RedisError) -> Self {
        LinkletError::CacheOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkletError {
    fn from(err: std::io::Error) -> Self {
        LinkletError::DatabaseConfig(err.to_string())
    }
}

impl From<serde_json::Error> for LinkletError {
    fn from(err: serde_json::Error) -> Self {
        LinkletError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkletError>;
