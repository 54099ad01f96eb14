use highlight_import::error::{LookupError, SubmissionError};
use highlight_import::models::{
    AudioSource, FilterCriteria, FlashcardPayload, RawHighlight, SubmissionSummary,
};
use highlight_import::orchestrator::{run_pipeline, BatchReport};
use highlight_import::services::{
    AudioCandidate, AudioLookup, DictionaryEntry, DictionaryLookup, NoteSink,
};
use highlight_import::workflow::{HighlightFlow, NoteBuilder, NoteTemplate, ResolveOptions};
use std::cell::RefCell;
use std::collections::HashMap;

const NOT_FOUND: &str = "<b>Definition for \"running\" not found</b>";

struct FakeDictionary {
    entries: HashMap<String, DictionaryEntry>,
}

impl FakeDictionary {
    fn new(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(query, word, definition)| {
                    (
                        query.to_string(),
                        DictionaryEntry {
                            word: word.to_string(),
                            definition: definition.to_string(),
                            definition2: None,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl DictionaryLookup for FakeDictionary {
    async fn lookup(&self, word: &str, _language: &str) -> Result<DictionaryEntry, LookupError> {
        self.entries.get(word).cloned().ok_or(LookupError::Status {
            endpoint: format!("fake://define/{}", word),
            status: 404,
        })
    }
}

struct FakeAudio {
    candidates: Vec<AudioCandidate>,
}

impl AudioLookup for FakeAudio {
    async fn fetch_audio(
        &self,
        _word: &str,
        _language: &str,
    ) -> Result<Vec<AudioCandidate>, LookupError> {
        Ok(self.candidates.clone())
    }
}

/// 记录收到的卡片
struct RecordingSink {
    flags: Option<Vec<bool>>,
    received: RefCell<Vec<FlashcardPayload>>,
}

impl RecordingSink {
    fn accepting() -> Self {
        Self {
            flags: None,
            received: RefCell::new(Vec::new()),
        }
    }

    fn answering(flags: Vec<bool>) -> Self {
        Self {
            flags: Some(flags),
            received: RefCell::new(Vec::new()),
        }
    }
}

impl NoteSink for RecordingSink {
    async fn add_notes(&self, notes: &[FlashcardPayload]) -> Result<Vec<bool>, SubmissionError> {
        self.received.borrow_mut().extend_from_slice(notes);
        Ok(self.flags.clone().unwrap_or_else(|| vec![true; notes.len()]))
    }
}

fn options() -> ResolveOptions {
    ResolveOptions {
        bold_word: true,
        language: "en".into(),
    }
}

fn template(with_audio: bool) -> NoteTemplate {
    NoteTemplate {
        deck_name: "Reading".into(),
        model_name: "Basic".into(),
        sentence_field: "Sentence".into(),
        word_field: "Word".into(),
        definition_field: "Definition".into(),
        definition2_field: None,
        pronunciation_field: with_audio.then(|| "Pronunciation".to_string()),
        tags: "highlight_import".into(),
        source_label: "KOReader".into(),
        bold_word: true,
    }
}

fn running_highlight() -> Vec<RawHighlight> {
    vec![RawHighlight::new(
        "running,",
        "I was running_home.",
        "2023-05-01T10:00:00",
        "BookA",
    )]
}

async fn run_without_audio(
    highlights: &[RawHighlight],
    criteria: &FilterCriteria,
    dictionary: &FakeDictionary,
    sink: &RecordingSink,
) -> BatchReport {
    let flow: HighlightFlow<'_, _, FakeAudio> = HighlightFlow::new(dictionary, None, options());
    let builder = NoteBuilder::new(template(false)).unwrap();
    run_pipeline(highlights, criteria, &flow, &builder, Some(sink)).await
}

#[tokio::test]
async fn test_running_scenario_produces_one_card() {
    let dictionary = FakeDictionary::new(&[("running", "running", "to move fast")]);
    let sink = RecordingSink::accepting();
    let criteria = FilterCriteria::new("2023-04-01", ["BookA"]);

    let report = run_without_audio(&running_highlight(), &criteria, &dictionary, &sink).await;

    assert_eq!(report.selected, 1);
    assert_eq!(report.definitions_found, 1);
    assert_eq!(report.assembled, 1);
    assert_eq!(report.summary, SubmissionSummary { total: 1, succeeded: 1 });

    let received = sink.received.borrow();
    assert_eq!(received.len(), 1);
    let card = &received[0];
    assert_eq!(card.fields["Word"], "running");
    assert_eq!(card.fields["Sentence"], "I was <strong>running</strong>home.");
    assert_eq!(card.fields["Definition"], "to move fast");
    assert!(card.tags.contains(&"BookA".to_string()));
    assert!(card.tags.contains(&"koreader".to_string()));
    assert!(card.audio.is_none());
}

#[tokio::test]
async fn test_not_found_sentinel_yields_no_card() {
    let dictionary = FakeDictionary::new(&[("running", "running", NOT_FOUND)]);
    let sink = RecordingSink::accepting();
    let criteria = FilterCriteria::new("2023-04-01", ["BookA"]);

    let report = run_without_audio(&running_highlight(), &criteria, &dictionary, &sink).await;

    assert_eq!(report.selected, 1);
    assert_eq!(report.definitions_found, 0);
    assert_eq!(report.assembled, 0);
    assert_eq!(report.summary, SubmissionSummary { total: 0, succeeded: 0 });
    assert!(sink.received.borrow().is_empty());
}

#[tokio::test]
async fn test_min_date_after_everything_selects_nothing() {
    let dictionary = FakeDictionary::new(&[("running", "running", "to move fast")]);
    let sink = RecordingSink::accepting();
    let criteria = FilterCriteria::new("2024-01-01", ["BookA"]);

    let report = run_without_audio(&running_highlight(), &criteria, &dictionary, &sink).await;

    assert_eq!(report, BatchReport::default());
    assert!(sink.received.borrow().is_empty());
}

#[tokio::test]
async fn test_partial_submission_failure_is_counted() {
    let dictionary = FakeDictionary::new(&[
        ("gaze", "gaze", "a steady look"),
        ("quiet", "quiet", "making little noise"),
        ("ember", "ember", "a glowing coal"),
    ]);
    let sink = RecordingSink::answering(vec![true, false, true]);
    let highlights = vec![
        RawHighlight::new("gaze", "A long gaze.", "2023-05-01", "BookA"),
        RawHighlight::new("quiet", "It was quiet.", "2023-05-02", "BookA"),
        RawHighlight::new("ember", "An ember glowed.", "2023-05-03", "BookA"),
    ];
    let criteria = FilterCriteria::new("2023-01-01", ["BookA"]);

    let report = run_without_audio(&highlights, &criteria, &dictionary, &sink).await;

    assert_eq!(report.summary, SubmissionSummary { total: 3, succeeded: 2 });
    assert_eq!(sink.received.borrow().len(), 3);
}

#[tokio::test]
async fn test_empty_sentences_are_dropped_and_counted() {
    let dictionary = FakeDictionary::new(&[("gaze", "gaze", "a steady look")]);
    let sink = RecordingSink::accepting();
    let highlights = vec![
        RawHighlight::new("gaze", "", "2023-05-01", "BookA"),
        RawHighlight::new("gaze", "A long gaze.", "2023-05-02", "BookA"),
    ];
    let criteria = FilterCriteria::new("2023-01-01", ["BookA"]);

    let report = run_without_audio(&highlights, &criteria, &dictionary, &sink).await;

    assert_eq!(report.selected, 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.assembled, 1);
    assert!(sink
        .received
        .borrow()
        .iter()
        .all(|card| !card.fields["Sentence"].is_empty()));
}

#[tokio::test]
async fn test_first_audio_candidate_is_attached() {
    let dictionary = FakeDictionary::new(&[("running", "running", "to move fast")]);
    let audio = FakeAudio {
        candidates: vec![
            AudioCandidate {
                label: "top(usa)/running.mp3".into(),
                reference: "https://audio00.forvo.com/audios/mp3/r/u/running.mp3".into(),
            },
            AudioCandidate {
                label: "other(uk)/running.mp3".into(),
                reference: "https://audio00.forvo.com/audios/mp3/x/y/other.mp3".into(),
            },
        ],
    };
    let sink = RecordingSink::accepting();
    let criteria = FilterCriteria::new("2023-04-01", ["BookA"]);

    let flow = HighlightFlow::new(&dictionary, Some(&audio), options());
    let builder = NoteBuilder::new(template(true)).unwrap();
    run_pipeline(&running_highlight(), &criteria, &flow, &builder, Some(&sink)).await;

    let received = sink.received.borrow();
    let attachment = received[0].audio.as_ref().unwrap();
    assert_eq!(
        attachment.source,
        AudioSource::Url("https://audio00.forvo.com/audios/mp3/r/u/running.mp3".into())
    );
    assert_eq!(attachment.filename, "running.mp3");
    assert_eq!(attachment.fields, vec!["Pronunciation"]);
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let dictionary = FakeDictionary::new(&[("running", "running", "to move fast")]);
    let criteria = FilterCriteria::new("2023-04-01", ["BookA"]);

    let flow: HighlightFlow<'_, _, FakeAudio> = HighlightFlow::new(&dictionary, None, options());
    let builder = NoteBuilder::new(template(false)).unwrap();
    let report = run_pipeline(
        &running_highlight(),
        &criteria,
        &flow,
        &builder,
        None::<&RecordingSink>,
    )
    .await;

    assert_eq!(report.assembled, 1);
    assert_eq!(report.summary, SubmissionSummary { total: 1, succeeded: 0 });
}
