use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 表示"禁用"的取值（词典来源、音频来源共用）
pub const DISABLED: &str = "<disabled>";

/// 配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "HIGHLIGHT_IMPORT_CONFIG";

/// 自定义音频词典
///
/// `url` 中的 `@@@@` 会被替换为要查询的单词
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CustomAudioDict {
    pub name: String,
    pub url: String,
}

/// 程序配置
///
/// 只读：程序从不回写配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 导入来源 ---
    /// 导出文件或目录
    pub export_path: String,
    /// 导入器名称（会以小写形式写入标签）
    pub source_label: String,
    /// 起始日期 (YYYY-MM-DD)，为空时使用导出中最早的日期
    pub min_date: Option<String>,
    /// 允许的书名列表，为空时使用导出中出现的全部书名
    pub sources: Option<Vec<String>>,

    // --- 查询 ---
    pub target_language: String,
    /// 是否加粗句子中的单词
    pub bold_word: bool,
    pub dictionary_api_url: String,
    pub dict_source: String,
    pub dict_source2: String,
    pub audio_dict: String,
    pub custom_dicts: Vec<CustomAudioDict>,
    pub audio_format: String,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,

    // --- 卡片 ---
    pub anki_api: String,
    pub deck_name: String,
    pub note_type: String,
    pub sentence_field: String,
    pub word_field: String,
    pub definition_field: String,
    pub definition2_field: String,
    pub pronunciation_field: String,
    /// 全局标签（空格分隔）
    pub tags: String,

    // --- 运行 ---
    /// 只组装并打印卡片，不提交
    pub dry_run: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_path: "highlights".to_string(),
            source_label: "Generic".to_string(),
            min_date: None,
            sources: None,
            target_language: "en".to_string(),
            bold_word: true,
            dictionary_api_url: "http://127.0.0.1:39284".to_string(),
            dict_source: "Wiktionary (English)".to_string(),
            dict_source2: DISABLED.to_string(),
            audio_dict: "Forvo (all)".to_string(),
            custom_dicts: Vec::new(),
            audio_format: "mp3".to_string(),
            request_timeout_secs: 30,
            anki_api: "http://127.0.0.1:8765".to_string(),
            deck_name: "Default".to_string(),
            note_type: "Basic".to_string(),
            sentence_field: "Sentence".to_string(),
            word_field: "Word".to_string(),
            definition_field: "Definition".to_string(),
            definition2_field: "Definition#2".to_string(),
            pronunciation_field: "Pronunciation".to_string(),
            tags: "highlight_import".to_string(),
            dry_run: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：配置文件（如果设置了环境变量）+ 环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                Self::from_toml_file(Path::new(&path))?.with_env_overrides()
            }
            _ => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// 只从环境变量加载
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失的键使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn with_env_overrides(self) -> Self {
        let d = self;
        Self {
            export_path: env_string("EXPORT_PATH").unwrap_or(d.export_path),
            source_label: env_string("SOURCE_LABEL").unwrap_or(d.source_label),
            min_date: env_string("MIN_DATE").or(d.min_date),
            sources: env_string("SOURCES").map(|v| split_list(&v)).or(d.sources),
            target_language: env_string("TARGET_LANGUAGE").unwrap_or(d.target_language),
            bold_word: env_parse("BOLD_WORD").unwrap_or(d.bold_word),
            dictionary_api_url: env_string("DICTIONARY_API_URL").unwrap_or(d.dictionary_api_url),
            dict_source: env_string("DICT_SOURCE").unwrap_or(d.dict_source),
            dict_source2: env_string("DICT_SOURCE2").unwrap_or(d.dict_source2),
            audio_dict: env_string("AUDIO_DICT").unwrap_or(d.audio_dict),
            custom_dicts: env_string("CUSTOM_DICTS")
                .and_then(|v| serde_json::from_str(&v).ok())
                .unwrap_or(d.custom_dicts),
            audio_format: env_string("AUDIO_FORMAT").unwrap_or(d.audio_format),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(d.request_timeout_secs),
            anki_api: env_string("ANKI_API").unwrap_or(d.anki_api),
            deck_name: env_string("DECK_NAME").unwrap_or(d.deck_name),
            note_type: env_string("NOTE_TYPE").unwrap_or(d.note_type),
            sentence_field: env_string("SENTENCE_FIELD").unwrap_or(d.sentence_field),
            word_field: env_string("WORD_FIELD").unwrap_or(d.word_field),
            definition_field: env_string("DEFINITION_FIELD").unwrap_or(d.definition_field),
            definition2_field: env_string("DEFINITION2_FIELD").unwrap_or(d.definition2_field),
            pronunciation_field: env_string("PRONUNCIATION_FIELD").unwrap_or(d.pronunciation_field),
            tags: env_string("TAGS").unwrap_or(d.tags),
            dry_run: env_parse("DRY_RUN").unwrap_or(d.dry_run),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(d.verbose_logging),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(date) = &self.min_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(ConfigError::InvalidDate {
                    value: date.clone(),
                });
            }
        }
        Ok(())
    }

    /// 是否启用了音频查询
    pub fn audio_enabled(&self) -> bool {
        self.audio_dict != DISABLED
    }

    /// 是否启用了第二词典
    pub fn secondary_dictionary_enabled(&self) -> bool {
        self.dict_source2 != DISABLED
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
