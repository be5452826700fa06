#![allow(dead_code)]

use std::sync::Once;

use csv_colchunk::ColumnChunk;

static LOGGER: Once = Once::new();

/// Routes `log` output through the test harness; `RUST_LOG=debug` shows
/// promotions and conversions.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Minimal stand-in for the tokenizer: integers, then floats, then text.
pub fn feed_field(chunk: &mut ColumnChunk, field: &str) {
    let trimmed = field.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        chunk.process_integer(value).expect("integer field");
    } else if let Ok(value) = trimmed.parse::<f64>() {
        chunk.process_float(value).expect("float field");
    } else {
        chunk.process_categorical(trimmed).expect("text field");
    }
}

/// Builds a chunk named `name` from raw fields in row order.
pub fn chunk_from_fields(name: &str, fields: &[&str]) -> ColumnChunk {
    let mut chunk = ColumnChunk::new(name);
    for field in fields {
        feed_field(&mut chunk, field);
    }
    chunk
}
