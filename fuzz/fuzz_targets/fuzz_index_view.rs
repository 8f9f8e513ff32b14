#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce errors, never panics or out-of-bounds reads
    if let Ok(view) = geotrie::index::view::TrieView::parse(data) {
        let _ = view.search(b"wydj55");
        let _ = view.search(b"");
        let _ = view.search(&data[..data.len().min(12)]);
        let _ = view.verify();
    }
});
