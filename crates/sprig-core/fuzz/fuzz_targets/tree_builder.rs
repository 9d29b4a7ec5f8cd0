#![no_main]

use libfuzzer_sys::fuzz_target;
use sprig_core::markup::serialize::to_markup;
use sprig_core::markup::tree_builder::parse;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let doc = parse(input);
        assert!(doc.root_element().is_some());
        assert!(doc.body().is_some());
        let _markup = to_markup(&doc);
    }
});
