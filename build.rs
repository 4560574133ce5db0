//! Build script to embed the FlexWord lexicon
//!
//! Reads the plain-text word lists under `data/` and generates const slices
//! that `src/wordlists/embedded.rs` includes. Entries are uppercased here so
//! the runtime never has to normalize the embedded lists.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const LISTS: &[(&str, &str, &str)] = &[
    ("data/answers.txt", "answers.rs", "ANSWERS"),
    ("data/allowed.txt", "allowed.rs", "ALLOWED"),
];

const WRITE_FAILED: &str = "writing to a String cannot fail";

fn main() {
    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");

    for &(input, output, const_name) in LISTS {
        generate_word_list(input, &Path::new(&out_dir).join(output), const_name);
        println!("cargo:rerun-if-changed={input}");
    }
}

fn generate_word_list(input_path: &str, output_path: &Path, const_name: &str) {
    let content = fs::read_to_string(input_path)
        .unwrap_or_else(|e| panic!("Failed to read {input_path}: {e}"));

    let words: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_ascii_uppercase)
        .collect();

    for word in &words {
        assert!(
            word.len() == 5 && word.bytes().all(|b| b.is_ascii_uppercase()),
            "{input_path}: '{word}' is not a 5-letter word"
        );
    }

    let mut source = String::new();
    writeln!(source, "// Generated from {input_path}; do not edit.").expect(WRITE_FAILED);
    writeln!(source).expect(WRITE_FAILED);
    writeln!(source, "/// Words from `{input_path}` ({} entries)", words.len()).expect(WRITE_FAILED);
    writeln!(source, "pub const {const_name}: &[&str] = &[").expect(WRITE_FAILED);
    for word in &words {
        writeln!(source, "    \"{word}\",").expect(WRITE_FAILED);
    }
    writeln!(source, "];").expect(WRITE_FAILED);

    fs::write(output_path, source)
        .unwrap_or_else(|e| panic!("Failed to write {}: {e}", output_path.display()));
}
