pub mod anki_service;
pub mod audio_service;
pub mod dictionary_service;

pub use anki_service::{AnkiConnect, NoteSink};
pub use audio_service::{
    AudioCandidate, AudioLookup, AudioProvider, CustomAudio, ForvoAudio, ForvoMode,
};
pub use dictionary_service::{
    is_not_found, DictionaryEntry, DictionaryLookup, HttpDictionary, NOT_FOUND_PREFIX,
};
