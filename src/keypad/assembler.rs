use std::sync::Arc;

use crate::error::{GlyphError, KeypadError};

use super::{ButtonRecord, Digit, KeypadMapping, MappingBuilder, Recognizer};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Recognize every button of a session and build its keypad mapping.
///
/// Glyphs are recognized in parallel on the blocking pool. All results are
/// collected before any is inserted, and insertion happens here, in record
/// order, so duplicate detection is deterministic.
pub async fn assemble_mapping(
    recognizer: Arc<Recognizer>,
    records: Vec<ButtonRecord>,
) -> Result<KeypadMapping, KeypadError> {
    let button_count = records.len();
    let handles: Vec<_> = records
        .into_iter()
        .map(|record| {
            let recognizer = Arc::clone(&recognizer);
            tokio::task::spawn_blocking(move || {
                let digit = recognizer.recognize(&record.glyph);
                (record.key_id, digit)
            })
        })
        .collect();

    let mut results: Vec<(String, Result<Digit, GlyphError>)> = Vec::with_capacity(button_count);
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|err| KeypadError::Worker(err.to_string()))?;
        results.push(outcome);
    }

    let mut builder = MappingBuilder::new();
    for (key_id, outcome) in results {
        let digit = match outcome {
            Ok(digit) => digit,
            Err(source) => {
                log_warn!("keypad glyph for key {} not recognized: {}", key_id, source);
                return Err(KeypadError::Glyph { key_id, source });
            }
        };
        builder.insert(digit, key_id)?;
    }

    let mapping = builder.finish()?;
    log_debug!("keypad mapping assembled from {} buttons", button_count);
    Ok(mapping)
}
