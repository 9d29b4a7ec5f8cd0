#![no_main]

use libfuzzer_sys::fuzz_target;
use sprig_core::markup::{Scanner, ScannerConfig, TokenBuf};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must not panic or loop forever, and must always end cleanly.
        let tokens = Scanner::from_text(input, &ScannerConfig::default()).tokenize();
        assert_eq!(tokens.last(), Some(&TokenBuf::EndOfInput));
    }
});
