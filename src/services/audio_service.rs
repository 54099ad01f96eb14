//! 发音音频服务 - 业务能力层
//!
//! 只负责"给一个词找发音"能力。返回的候选按提供方自己的排序排列，
//! 调用方取第一个。

use crate::config::{Config, CustomAudioDict, DISABLED};
use crate::error::{ConfigError, LookupError};
use crate::infrastructure::HttpExecutor;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// 一个发音候选
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCandidate {
    /// 描述性标签，如 `"speaker(usa)/word.mp3"`
    pub label: String,
    /// URL 或本地路径
    pub reference: String,
}

/// 发音查询能力
#[allow(async_fn_in_trait)]
pub trait AudioLookup {
    /// 候选为空表示没有找到发音
    async fn fetch_audio(&self, word: &str, language: &str)
        -> Result<Vec<AudioCandidate>, LookupError>;
}

/// 根据配置选择的发音来源
pub enum AudioProvider {
    Forvo(ForvoAudio),
    Custom(CustomAudio),
}

impl AudioProvider {
    /// 按 `audio_dict` 选择来源；禁用或找不到对应的自定义词典时返回 None
    pub fn from_config(http: HttpExecutor, config: &Config) -> Result<Option<Self>, ConfigError> {
        let provider = match config.audio_dict.as_str() {
            DISABLED => None,
            "Forvo (all)" => Some(AudioProvider::Forvo(ForvoAudio::new(
                http,
                &config.audio_format,
                ForvoMode::All,
            )?)),
            "Forvo (best)" => Some(AudioProvider::Forvo(ForvoAudio::new(
                http,
                &config.audio_format,
                ForvoMode::Best,
            )?)),
            name => match config.custom_dicts.iter().find(|d| d.name == name) {
                Some(dict) => Some(AudioProvider::Custom(CustomAudio::new(dict.clone()))),
                None => {
                    warn!("⚠️ 未知的音频来源 '{}'，不查询发音", name);
                    None
                }
            },
        };
        Ok(provider)
    }
}

impl AudioLookup for AudioProvider {
    async fn fetch_audio(
        &self,
        word: &str,
        language: &str,
    ) -> Result<Vec<AudioCandidate>, LookupError> {
        match self {
            AudioProvider::Forvo(forvo) => forvo.fetch_audio(word, language).await,
            AudioProvider::Custom(custom) => custom.fetch_audio(word, language).await,
        }
    }
}

// ========== 自定义 URL 模板 ==========

/// 自定义音频词典：URL 模板中的 `@@@@` 替换为单词
pub struct CustomAudio {
    dict: CustomAudioDict,
}

impl CustomAudio {
    pub fn new(dict: CustomAudioDict) -> Self {
        Self { dict }
    }
}

impl AudioLookup for CustomAudio {
    async fn fetch_audio(
        &self,
        word: &str,
        _language: &str,
    ) -> Result<Vec<AudioCandidate>, LookupError> {
        if self.dict.url.trim().is_empty() {
            return Ok(Vec::new());
        }
        let reference = self.dict.url.replace("@@@@", &urlencoding::encode(word));
        Ok(vec![AudioCandidate {
            label: format!("{}/{}", self.dict.name, word),
            reference,
        }])
    }
}

// ========== Forvo ==========

/// Forvo 返回全部发音还是只返回票数最高的一个
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForvoMode {
    All,
    Best,
}

/// 从 Forvo 单词页面抓取的发音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pronunciation {
    pub language: String,
    pub accent: Option<String>,
    pub headword: String,
    pub votes: i64,
    pub origin: String,
    pub download_url: String,
}

/// Forvo 发音来源
pub struct ForvoAudio {
    http: HttpExecutor,
    base_url: String,
    parser: ForvoParser,
    mode: ForvoMode,
}

impl ForvoAudio {
    pub fn new(
        http: HttpExecutor,
        audio_format: &str,
        mode: ForvoMode,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            http,
            base_url: "https://forvo.com".to_string(),
            parser: ForvoParser::new(audio_format)?,
            mode,
        })
    }

    /// 替换站点地址（测试用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl AudioLookup for ForvoAudio {
    async fn fetch_audio(
        &self,
        word: &str,
        language: &str,
    ) -> Result<Vec<AudioCandidate>, LookupError> {
        let endpoint = format!("{}/word/{}", self.base_url, urlencoding::encode(word));
        debug!("查询 Forvo 发音: {}", endpoint);

        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| LookupError::network(&endpoint, e))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(LookupError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let page = response
            .text()
            .await
            .map_err(|e| LookupError::decode(&endpoint, e))?;

        let pronunciations = self.parser.parse(&page, word, language, None);
        debug!("Forvo 找到 {} 个发音", pronunciations.len());

        Ok(to_candidates(&pronunciations, self.mode))
    }
}

/// 按模式转换为候选（输入已按票数排序）
fn to_candidates(pronunciations: &[Pronunciation], mode: ForvoMode) -> Vec<AudioCandidate> {
    match mode {
        ForvoMode::All => pronunciations
            .iter()
            .map(|p| {
                let extension = p.download_url.rsplit('.').next().unwrap_or_default();
                let accent = p
                    .accent
                    .as_deref()
                    .map(|a| format!("({})", a))
                    .unwrap_or_default();
                AudioCandidate {
                    label: format!("{}{}/{}.{}", p.origin, accent, p.headword, extension),
                    reference: p.download_url.clone(),
                }
            })
            .collect(),
        ForvoMode::Best => pronunciations
            .first()
            .map(|p| AudioCandidate {
                label: format!("{}/{}", p.origin, p.headword),
                reference: p.download_url.clone(),
            })
            .into_iter()
            .collect(),
    }
}

/// Forvo 单词页面解析器
pub struct ForvoParser {
    audio_format: String,
    list_sel: Selector,
    more_sel: Selector,
    play_sel: Selector,
    votes_sel: Selector,
    user_sel: Selector,
    list_id_re: Regex,
    play_re: Regex,
    play_fallback_re: Regex,
    votes_re: Regex,
    origin_re: Regex,
}

impl ForvoParser {
    pub fn new(audio_format: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            audio_format: audio_format.to_string(),
            list_sel: selector(r#"[id^="pronunciations-list-"]"#)?,
            more_sel: selector(".more")?,
            play_sel: selector(r#"[id^="play_"]"#)?,
            votes_sel: selector(".num_votes span")?,
            user_sel: selector(".info .ofLink")?,
            list_id_re: pattern(r"^pronunciations-list-([a-z]+)(?:_([a-z]+))?")?,
            play_re: pattern(r"Play\(\d+,'[^']+','[^']+',\w+,'([^']+)")?,
            play_fallback_re: pattern(r"Play\(\d+,'[^']+','([^']+)")?,
            votes_re: pattern(r"-?\d+")?,
            origin_re: pattern(r"(?s)Pronunciation by(.*)")?,
        })
    }

    /// 解析页面中指定语言（和口音）的发音，按票数从高到低排序
    pub fn parse(
        &self,
        page: &str,
        word: &str,
        language: &str,
        accent: Option<&str>,
    ) -> Vec<Pronunciation> {
        let document = Html::parse_document(page);
        let mut pronunciations = Vec::new();

        for list in document.select(&self.list_sel) {
            let Some(caps) = list.value().id().and_then(|id| self.list_id_re.captures(id)) else {
                continue;
            };
            let list_language = caps.get(1).map_or("", |m| m.as_str());
            let list_accent = caps.get(2).map(|m| m.as_str().to_string());
            if list_language != language {
                continue;
            }
            if accent.is_some() && list_accent.as_deref() != accent {
                continue;
            }

            // 只看列表的直接子项，分享菜单里嵌套的 li 不算
            let items = list
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "li");
            for item in items {
                // 没有 .more 的条目不是发音（广告、占位等）
                if item.select(&self.more_sel).next().is_none() {
                    continue;
                }
                let Some(download_url) = self.download_url(item) else {
                    continue;
                };

                pronunciations.push(Pronunciation {
                    language: list_language.to_string(),
                    accent: list_accent.clone(),
                    headword: word.trim().to_string(),
                    votes: self.votes(item),
                    origin: self.origin(item),
                    download_url,
                });
            }
        }

        // 稳定排序：票数相同的保持页面顺序
        pronunciations.sort_by(|a, b| b.votes.cmp(&a.votes));
        pronunciations
    }

    fn download_url(&self, item: ElementRef) -> Option<String> {
        let onclick = item
            .select(&self.play_sel)
            .find_map(|el| el.value().attr("onclick"))?;
        let (prefix, encoded) = match self.play_re.captures(onclick) {
            Some(caps) => ("audios/", caps.get(1)?.as_str()),
            None => ("", self.play_fallback_re.captures(onclick)?.get(1)?.as_str()),
        };
        let decoded = BASE64.decode(encoded).ok()?;
        let path = String::from_utf8(decoded).ok()?;
        // 换扩展名即可拿到对应格式
        let stem = match path.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem,
            _ => path.as_str(),
        };
        Some(format!(
            "https://audio00.forvo.com/{}{}/{}.{}",
            prefix, self.audio_format, stem, self.audio_format
        ))
    }

    fn votes(&self, item: ElementRef) -> i64 {
        item.select(&self.votes_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .and_then(|text| {
                self.votes_re
                    .find(&text)
                    .and_then(|m| m.as_str().parse().ok())
            })
            .unwrap_or(0)
    }

    /// 上传者：优先取用户链接，否则从 "Pronunciation by xxx" 文本中取
    fn origin(&self, item: ElementRef) -> String {
        if let Some(user) = item.select(&self.user_sel).next() {
            return user.text().collect::<String>().trim().to_string();
        }
        item.children()
            .find_map(|node| {
                let text = match ElementRef::wrap(node) {
                    Some(el) => el.text().next()?.to_string(),
                    None => node.value().as_text()?.to_string(),
                };
                let caps = self.origin_re.captures(&text)?;
                Some(caps.get(1)?.as_str().trim().to_string())
            })
            .unwrap_or_default()
    }
}

fn selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::invalid_pattern(css, e))
}

fn pattern(re: &str) -> Result<Regex, ConfigError> {
    Regex::new(re).map_err(|e| ConfigError::invalid_pattern(re, e))
}
