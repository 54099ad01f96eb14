use thiserror::Error;

/// 应用程序错误类型
///
/// 只有 `Parse` 与 `Config` 会作为硬错误穿过流水线边界，
/// 查询与提交错误在各自阶段内被吸收并体现在输出数据中。
#[derive(Debug, Error)]
pub enum AppError {
    /// 导出文件解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 词典或音频查询错误
    #[error("查询错误: {0}")]
    Lookup(#[from] LookupError),
    /// 卡片提交错误
    #[error("提交错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 高亮导出解析错误（致命，必须带上出错的文件）
#[derive(Debug, Error)]
pub enum ParseError {
    /// 路径不存在
    #[error("导出路径不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取导出文件失败 ({path}): {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件格式错误
    #[error("导出文件格式错误 ({path}): {reason}")]
    Malformed { path: String, reason: String },
    /// 四列长度不一致
    #[error("导出列长度不一致 ({path}): 词 {terms}, 句 {sentences}, 时间 {timestamps}, 来源 {sources}")]
    MisalignedColumns {
        path: String,
        terms: usize,
        sentences: usize,
        timestamps: usize,
        sources: usize,
    },
}

impl ParseError {
    /// 出错的文件
    pub fn path(&self) -> &str {
        match self {
            ParseError::NotFound { path }
            | ParseError::Unreadable { path, .. }
            | ParseError::Malformed { path, .. }
            | ParseError::MisalignedColumns { path, .. } => path,
        }
    }
}

/// 查询错误（非致命，降级为空字段）
#[derive(Debug, Error)]
pub enum LookupError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非成功状态码
    #[error("服务返回状态码 {status} ({endpoint})")]
    Status { endpoint: String, status: u16 },
    /// 响应内容无法解析
    #[error("响应解析失败 ({endpoint}): {reason}")]
    Decode { endpoint: String, reason: String },
}

/// 提交错误（非致命，计入失败数）
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 网络请求失败
    #[error("无法连接卡片服务 ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务拒绝请求
    #[error("卡片服务拒绝请求: {message}")]
    Rejected { message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 日期格式无效
    #[error("无效的起始日期 '{value}'，应为 YYYY-MM-DD")]
    InvalidDate { value: String },
    /// 页面解析用的选择器或正则无效
    #[error("无效的匹配模式 '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl LookupError {
    /// 创建网络请求失败错误
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        LookupError::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建响应解析失败错误
    pub fn decode(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        LookupError::Decode {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }
}

impl ConfigError {
    /// 创建匹配模式错误
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl std::fmt::Debug) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.into(),
            reason: format!("{:?}", reason),
        }
    }
}

impl ParseError {
    /// 创建文件格式错误
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        ParseError::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
