//! 卡片组装
//!
//! 把查询完成的词条映射为卡片：字段名、标签、富文本转换、音频附件

use regex::Regex;
use std::collections::BTreeMap;

use crate::config::Config;
use crate::models::{AudioAttachment, AudioSource, FlashcardPayload, ResolvedEntry};

/// 卡片模板（字段映射 + 标签配置）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTemplate {
    pub deck_name: String,
    pub model_name: String,
    pub sentence_field: String,
    pub word_field: String,
    pub definition_field: String,
    /// 仅在配置了第二词典时写入
    pub definition2_field: Option<String>,
    /// 仅在启用发音时附加音频
    pub pronunciation_field: Option<String>,
    /// 全局标签（空格分隔）
    pub tags: String,
    /// 导入器名称
    pub source_label: String,
    /// 句子中是否带有加粗标记
    pub bold_word: bool,
}

impl NoteTemplate {
    pub fn from_config(config: &Config) -> Self {
        Self {
            deck_name: config.deck_name.clone(),
            model_name: config.note_type.clone(),
            sentence_field: config.sentence_field.clone(),
            word_field: config.word_field.clone(),
            definition_field: config.definition_field.clone(),
            definition2_field: config
                .secondary_dictionary_enabled()
                .then(|| config.definition2_field.clone()),
            pronunciation_field: config
                .audio_enabled()
                .then(|| config.pronunciation_field.clone()),
            tags: config.tags.clone(),
            source_label: config.source_label.clone(),
            bold_word: config.bold_word,
        }
    }
}

/// 卡片组装器
pub struct NoteBuilder {
    template: NoteTemplate,
    emphasis_re: Regex,
}

impl NoteBuilder {
    pub fn new(template: NoteTemplate) -> Result<Self, regex::Error> {
        Ok(Self {
            template,
            // 句子中的下划线在加粗前已被去掉，所以成对的 __ 只可能是标记
            emphasis_re: Regex::new(r"(?s)__(.+?)__")?,
        })
    }

    pub fn template(&self) -> &NoteTemplate {
        &self.template
    }

    /// 组装全部词条；单词、句子或释义为空的词条不生成卡片
    pub fn assemble(&self, entries: &[ResolvedEntry]) -> Vec<FlashcardPayload> {
        entries.iter().filter_map(|entry| self.build(entry)).collect()
    }

    /// 组装单个词条
    pub fn build(&self, entry: &ResolvedEntry) -> Option<FlashcardPayload> {
        if entry.word.is_empty() || entry.sentence.is_empty() || entry.definition.is_empty() {
            return None;
        }
        let t = &self.template;

        let sentence = if t.bold_word {
            self.emphasis_re
                .replace_all(&entry.sentence, "<strong>$1</strong>")
                .into_owned()
        } else {
            entry.sentence.clone()
        };

        let mut fields = BTreeMap::new();
        fields.insert(t.sentence_field.clone(), sentence);
        fields.insert(t.word_field.clone(), entry.word.clone());
        fields.insert(t.definition_field.clone(), to_line_breaks(&entry.definition));
        if let Some(field) = &t.definition2_field {
            fields.insert(field.clone(), to_line_breaks(&entry.definition2));
        }

        let audio = match &t.pronunciation_field {
            Some(field) if !entry.audio_ref.is_empty() => Some(AudioAttachment {
                source: AudioSource::from_ref(&entry.audio_ref),
                filename: audio_filename(&entry.audio_ref),
                fields: vec![field.clone()],
            }),
            _ => None,
        };

        Some(FlashcardPayload {
            deck_name: t.deck_name.clone(),
            model_name: t.model_name.clone(),
            fields,
            tags: self.tags_for(&entry.source_name),
            audio,
        })
    }

    /// 全局标签 + 小写导入器名称 + 书名（空格换成下划线）
    fn tags_for(&self, source_name: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .template
            .tags
            .split_whitespace()
            .map(str::to_string)
            .collect();
        tags.push(self.template.source_label.to_lowercase());
        tags.push(source_name.replace(' ', "_"));
        tags
    }
}

/// 换行转为 `<br>`
fn to_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

/// 路径或 URL 的最后一段（反斜杠视为分隔符）
pub fn audio_filename(audio_ref: &str) -> String {
    audio_ref
        .replace('\\', "/")
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> NoteTemplate {
        NoteTemplate {
            deck_name: "Reading".into(),
            model_name: "Basic".into(),
            sentence_field: "Sentence".into(),
            word_field: "Word".into(),
            definition_field: "Definition".into(),
            definition2_field: None,
            pronunciation_field: Some("Pronunciation".into()),
            tags: " highlight_import ".into(),
            source_label: "KOReader".into(),
            bold_word: true,
        }
    }

    fn entry() -> ResolvedEntry {
        ResolvedEntry {
            word: "gaze".into(),
            sentence: "A long __gaze__ back.".into(),
            definition: "a steady look\nintent".into(),
            definition2: "regard\nfixe".into(),
            audio_ref: String::new(),
            source_name: "The Left Hand of Darkness".into(),
        }
    }

    #[test]
    fn test_build_maps_fields_and_tags() {
        let builder = NoteBuilder::new(template()).unwrap();
        let payload = builder.build(&entry()).unwrap();

        assert_eq!(payload.deck_name, "Reading");
        assert_eq!(payload.fields["Sentence"], "A long <strong>gaze</strong> back.");
        assert_eq!(payload.fields["Word"], "gaze");
        assert_eq!(payload.fields["Definition"], "a steady look<br>intent");
        assert!(!payload.fields.contains_key("Definition#2"));
        assert_eq!(
            payload.tags,
            vec!["highlight_import", "koreader", "The_Left_Hand_of_Darkness"]
        );
        assert!(payload.audio.is_none());
    }

    #[test]
    fn test_build_skips_incomplete_entries() {
        let builder = NoteBuilder::new(template()).unwrap();
        for blank in 0..3 {
            let mut e = entry();
            match blank {
                0 => e.word.clear(),
                1 => e.sentence.clear(),
                _ => e.definition.clear(),
            }
            assert!(builder.build(&e).is_none());
        }
    }

    #[test]
    fn test_secondary_definition_field() {
        let builder = NoteBuilder::new(NoteTemplate {
            definition2_field: Some("Definition#2".into()),
            ..template()
        })
        .unwrap();

        let payload = builder.build(&entry()).unwrap();
        assert_eq!(payload.fields["Definition#2"], "regard<br>fixe");

        // 第二释义为空也写入字段
        let payload = builder
            .build(&ResolvedEntry {
                definition2: String::new(),
                ..entry()
            })
            .unwrap();
        assert_eq!(payload.fields["Definition#2"], "");
    }

    #[test]
    fn test_audio_attachment_url_and_path() {
        let builder = NoteBuilder::new(template()).unwrap();

        let remote = builder
            .build(&ResolvedEntry {
                audio_ref: "https://audio00.forvo.com/audios/mp3/a/b/gaze.mp3".into(),
                ..entry()
            })
            .unwrap();
        let audio = remote.audio.unwrap();
        assert!(matches!(audio.source, AudioSource::Url(_)));
        assert_eq!(audio.filename, "gaze.mp3");
        assert_eq!(audio.fields, vec!["Pronunciation"]);

        let local = builder
            .build(&ResolvedEntry {
                audio_ref: "C:\\Users\\me\\audio\\gaze.ogg".into(),
                ..entry()
            })
            .unwrap();
        let audio = local.audio.unwrap();
        assert_eq!(audio.source, AudioSource::Path("C:\\Users\\me\\audio\\gaze.ogg".into()));
        assert_eq!(audio.filename, "gaze.ogg");
    }

    #[test]
    fn test_no_audio_when_provider_disabled() {
        let builder = NoteBuilder::new(NoteTemplate {
            pronunciation_field: None,
            ..template()
        })
        .unwrap();

        let payload = builder
            .build(&ResolvedEntry {
                audio_ref: "https://example.org/gaze.mp3".into(),
                ..entry()
            })
            .unwrap();
        assert!(payload.audio.is_none());
    }

    #[test]
    fn test_markers_left_alone_without_bold() {
        let builder = NoteBuilder::new(NoteTemplate {
            bold_word: false,
            ..template()
        })
        .unwrap();

        let payload = builder.build(&entry()).unwrap();
        assert_eq!(payload.fields["Sentence"], "A long __gaze__ back.");
    }

    #[test]
    fn test_emphasis_accepts_non_word_characters() {
        let builder = NoteBuilder::new(template()).unwrap();
        let payload = builder
            .build(&ResolvedEntry {
                word: "well-known".into(),
                sentence: "A __well-known__ fact.".into(),
                ..entry()
            })
            .unwrap();

        assert_eq!(payload.fields["Sentence"], "A <strong>well-known</strong> fact.");
        assert!(!payload.fields["Sentence"].contains("__"));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let builder = NoteBuilder::new(template()).unwrap();
        let entries = vec![
            entry(),
            ResolvedEntry {
                definition: String::new(),
                ..entry()
            },
            entry(),
        ];

        let first = serde_json::to_string(&builder.assemble(&entries)).unwrap();
        let second = serde_json::to_string(&builder.assemble(&entries)).unwrap();

        assert_eq!(first, second);
        assert_eq!(builder.assemble(&entries).len(), 2);
    }

    #[test]
    fn test_audio_filename() {
        assert_eq!(audio_filename("a\\b/c.mp3"), "c.mp3");
        assert_eq!(audio_filename("c.mp3"), "c.mp3");
        assert_eq!(audio_filename("https://x.org/dir/"), "");
    }
}
